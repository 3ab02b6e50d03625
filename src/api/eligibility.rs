//! Holder eligibility check against the configured supply share.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{parse_address, AppState};
use crate::engine::evaluate_eligibility;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct EligibilityQuery {
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub address: String,
    pub balance: String,
    pub share_percent: String,
    pub threshold_percent: String,
    pub eligible: bool,
}

pub async fn get_eligibility(
    Query(params): Query<EligibilityQuery>,
    State(state): State<AppState>,
) -> Result<Json<EligibilityResponse>, AppError> {
    let address = parse_address(&params.address, "address")?;

    let balance = state
        .chain()
        .fetch_token_balance(&address, &state.config.token_mint)
        .await?;
    let result = evaluate_eligibility(
        balance,
        state.config.total_supply,
        state.config.eligible_percent,
    );

    Ok(Json(EligibilityResponse {
        address: address.to_string(),
        balance: result.balance.to_canonical_string(),
        share_percent: result.share_percent.to_canonical_string(),
        threshold_percent: result.threshold_percent.to_canonical_string(),
        eligible: result.eligible,
    }))
}
