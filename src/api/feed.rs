//! Donation feed endpoint: recent outgoing transfers from the watched wallet.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Decimal, Direction, Lamports};
use crate::engine::{build_feed, FeedFilter, FeedItem};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub search: Option<String>,
    /// SOL, strictly exceeded. Defaults to 0.1.
    pub min_amount: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub items: Vec<FeedItemDto>,
    pub complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemDto {
    pub signature: String,
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_rfc3339: Option<String>,
    pub amount: String,
    pub direction: Direction,
    pub counterparty: String,
}

impl From<FeedItem> for FeedItemDto {
    fn from(item: FeedItem) -> Self {
        Self {
            signature: item.signature,
            time: item.time,
            time_rfc3339: item.time_rfc3339,
            amount: item.amount.to_canonical_string(),
            direction: item.direction,
            counterparty: item.counterparty,
        }
    }
}

pub async fn get_feed(
    Query(params): Query<FeedQuery>,
    State(state): State<AppState>,
) -> Result<Json<FeedResponse>, AppError> {
    let min_amount = match params.min_amount.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let sol = Decimal::from_str_canonical(raw)
                .map_err(|_| AppError::BadRequest("minAmount must be a decimal number".into()))?;
            if sol.is_negative() {
                return Err(AppError::BadRequest("minAmount must not be negative".into()));
            }
            let lamports = Lamports::from_sol_floor(sol)
                .ok_or_else(|| AppError::BadRequest("minAmount out of range".into()))?;
            Some(lamports)
        }
        _ => None,
    };

    let filter = FeedFilter {
        min_amount,
        search: params.search,
    };

    let (ledger, collection) = state
        .scan_watched(None, state.config.fetch.feed_limit)
        .await?;

    let items = build_feed(&ledger, &filter)
        .into_iter()
        .map(FeedItemDto::from)
        .collect();

    Ok(Json(FeedResponse {
        items,
        complete: collection.complete,
    }))
}
