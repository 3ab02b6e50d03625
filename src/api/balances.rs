use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{parse_address, AppState};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct BalancesQuery {
    /// Defaults to the watched address.
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    pub address: String,
    pub sol: String,
    pub lamports: u64,
    pub token: String,
}

pub async fn get_balances(
    Query(params): Query<BalancesQuery>,
    State(state): State<AppState>,
) -> Result<Json<BalancesResponse>, AppError> {
    let address = match params.address.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_address(raw, "address")?,
        _ => state.config.watched_address.clone(),
    };

    let chain = state.chain();
    let lamports = chain.fetch_balance(&address).await?;
    let token = chain
        .fetch_token_balance(&address, &state.config.token_mint)
        .await?;

    Ok(Json(BalancesResponse {
        address: address.to_string(),
        sol: lamports.to_sol().to_canonical_string(),
        lamports: lamports.as_u64(),
        token: token.to_canonical_string(),
    }))
}
