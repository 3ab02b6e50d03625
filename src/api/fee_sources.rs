//! Fee-source matcher: incoming transfers from the configured fee source.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{resolve_limit, AppState};
use crate::domain::Direction;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct FeeSourcesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSourcesResponse {
    pub fee_source: String,
    pub match_count: usize,
    pub total: String,
    pub total_lamports: u64,
    pub matches: Vec<FeeMatchDto>,
    pub complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeMatchDto {
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub amount: String,
}

pub async fn get_fee_sources(
    Query(params): Query<FeeSourcesQuery>,
    State(state): State<AppState>,
) -> Result<Json<FeeSourcesResponse>, AppError> {
    let fee_source = state
        .config
        .fee_source_address
        .clone()
        .ok_or_else(|| AppError::NotFound("No fee source address configured".into()))?;
    let limit = resolve_limit(params.limit, state.config.fetch.signature_limit)?;

    let (ledger, collection) = state.scan_watched(Some(fee_source.clone()), limit).await?;

    let matches: Vec<FeeMatchDto> = ledger
        .events_in(Direction::In)
        .map(|e| FeeMatchDto {
            signature: e.signature.to_string(),
            time: e.time.map(|t| t.as_secs()),
            amount: e.amount.to_sol().to_canonical_string(),
        })
        .collect();

    Ok(Json(FeeSourcesResponse {
        fee_source: fee_source.to_string(),
        match_count: matches.len(),
        total: ledger.total_in_sol().to_canonical_string(),
        total_lamports: ledger.total_in.as_u64(),
        matches,
        complete: collection.complete,
    }))
}
