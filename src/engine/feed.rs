//! Donation feed: outgoing transfers from the watched address, filtered for
//! display.

use crate::domain::{Decimal, Direction, Lamports, TransferEvent};
use crate::engine::Ledger;
use serde::Serialize;

/// Default display floor, strictly exceeded: 0.10 SOL.
pub const DEFAULT_MIN_AMOUNT: Lamports = Lamports(100_000_000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub signature: String,
    /// Block time in seconds, 0 when unknown.
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_rfc3339: Option<String>,
    pub amount: Decimal,
    pub direction: Direction,
    pub counterparty: String,
}

impl FeedItem {
    fn from_event(event: &TransferEvent) -> Self {
        Self {
            signature: event.signature.to_string(),
            time: event.time.map(|t| t.as_secs()).unwrap_or(0),
            time_rfc3339: event.time.and_then(|t| t.to_rfc3339()),
            amount: event.amount.to_sol(),
            direction: event.direction,
            counterparty: event.counterparty().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    /// Items must be strictly above this amount.
    pub min_amount: Option<Lamports>,
    pub search: Option<String>,
}

impl FeedFilter {
    fn accepts(&self, event: &TransferEvent) -> bool {
        let floor = self.min_amount.unwrap_or(DEFAULT_MIN_AMOUNT);
        if event.amount <= floor {
            return false;
        }

        let Some(query) = self
            .search
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
        else {
            return true;
        };

        // Decimal parsing rejects "nan"/"inf", which stay text searches.
        if Decimal::from_str_canonical(&query).is_ok() {
            let sol = event.amount.to_sol();
            return sol.to_canonical_string().contains(&query) || sol.to_fixed(9).contains(&query);
        }

        event.counterparty().as_str().to_lowercase().contains(&query)
            || event.signature.as_str().to_lowercase().contains(&query)
    }
}

/// Outgoing events of `ledger` that pass `filter`, in ledger order.
pub fn build_feed(ledger: &Ledger, filter: &FeedFilter) -> Vec<FeedItem> {
    ledger
        .events_in(Direction::Out)
        .filter(|e| filter.accepts(e))
        .map(FeedItem::from_event)
        .collect()
}
