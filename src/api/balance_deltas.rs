use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{resolve_limit, AppState};
use crate::domain::{Decimal, Lamports};
use crate::engine::{summarize_balance_deltas, BalanceDelta};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct BalanceDeltasQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDeltasResponse {
    pub watched_address: String,
    pub total_in: String,
    pub total_out: String,
    pub net: String,
    pub entries: Vec<BalanceDeltaDto>,
    pub complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDeltaDto {
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Signed SOL change, fees included.
    pub delta: String,
}

impl From<&BalanceDelta> for BalanceDeltaDto {
    fn from(d: &BalanceDelta) -> Self {
        let magnitude =
            Lamports::new(u64::try_from(d.delta.unsigned_abs()).unwrap_or(u64::MAX)).to_sol();
        let delta = if d.delta < 0 {
            Decimal::zero() - magnitude
        } else {
            magnitude
        };
        Self {
            signature: d.signature.to_string(),
            time: d.time.map(|t| t.as_secs()),
            delta: delta.to_canonical_string(),
        }
    }
}

pub async fn get_balance_deltas(
    Query(params): Query<BalanceDeltasQuery>,
    State(state): State<AppState>,
) -> Result<Json<BalanceDeltasResponse>, AppError> {
    let limit = resolve_limit(params.limit, state.config.fetch.signature_limit)?;
    let watched = &state.config.watched_address;

    let collection = state.collector.collect(watched, limit).await?;
    let summary = summarize_balance_deltas(&collection.records, watched);

    Ok(Json(BalanceDeltasResponse {
        watched_address: watched.to_string(),
        total_in: summary.total_in.to_sol().to_canonical_string(),
        total_out: summary.total_out.to_sol().to_canonical_string(),
        net: summary.net_sol().to_canonical_string(),
        entries: summary.entries.iter().map(BalanceDeltaDto::from).collect(),
        complete: collection.complete,
    }))
}
