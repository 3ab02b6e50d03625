use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{parse_address, resolve_limit, AppState};
use crate::domain::{Direction, TransferEvent};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    pub counterparty: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub watched_address: String,
    pub total_in: String,
    pub total_out: String,
    pub total_in_lamports: u64,
    pub total_out_lamports: u64,
    pub event_count: usize,
    pub events: Vec<TransferEventDto>,
    pub records_scanned: usize,
    pub records_missing: usize,
    pub records_failed: usize,
    pub complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEventDto {
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub direction: Direction,
    pub source: String,
    pub destination: String,
    pub amount: String,
    pub amount_lamports: u64,
}

impl From<&TransferEvent> for TransferEventDto {
    fn from(e: &TransferEvent) -> Self {
        Self {
            signature: e.signature.to_string(),
            time: e.time.map(|t| t.as_secs()),
            direction: e.direction,
            source: e.source.to_string(),
            destination: e.destination.to_string(),
            amount: e.amount.to_sol().to_canonical_string(),
            amount_lamports: e.amount.as_u64(),
        }
    }
}

pub async fn get_ledger(
    Query(params): Query<LedgerQuery>,
    State(state): State<AppState>,
) -> Result<Json<LedgerResponse>, AppError> {
    let counterparty = match params.counterparty.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_address(raw, "counterparty")?),
        _ => None,
    };
    let limit = resolve_limit(params.limit, state.config.fetch.signature_limit)?;

    let (ledger, collection) = state.scan_watched(counterparty, limit).await?;

    Ok(Json(LedgerResponse {
        watched_address: ledger.watched.to_string(),
        total_in: ledger.total_in_sol().to_canonical_string(),
        total_out: ledger.total_out_sol().to_canonical_string(),
        total_in_lamports: ledger.total_in.as_u64(),
        total_out_lamports: ledger.total_out.as_u64(),
        event_count: ledger.matched_events.len(),
        events: ledger.matched_events.iter().map(TransferEventDto::from).collect(),
        records_scanned: ledger.records_scanned,
        records_missing: ledger.records_missing,
        records_failed: ledger.records_failed,
        complete: collection.complete,
    }))
}
