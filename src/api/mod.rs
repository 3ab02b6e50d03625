pub mod balance_deltas;
pub mod balances;
pub mod eligibility;
pub mod fee_sources;
pub mod feed;
pub mod health;
pub mod ledger;

use crate::config::Config;
use crate::datasource::ChainSource;
use crate::domain::Address;
use crate::engine::{Ledger, TransferLedgerScanner};
use crate::error::AppError;
use crate::orchestration::collector::{Collection, HistoryCollector};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub collector: HistoryCollector,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn ChainSource>) -> Self {
        let collector = HistoryCollector::new(source, config.fetch);
        Self { config, collector }
    }

    pub fn chain(&self) -> &Arc<dyn ChainSource> {
        self.collector.source()
    }

    /// Collect the watched address's recent history and scan it.
    pub(crate) async fn scan_watched(
        &self,
        counterparty: Option<Address>,
        limit: usize,
    ) -> Result<(Ledger, Collection), AppError> {
        let watched = &self.config.watched_address;
        let collection = self.collector.collect(watched, limit).await?;
        let ledger = TransferLedgerScanner::new(watched.clone())
            .with_counterparty(counterparty)
            .scan(&collection.records);
        Ok((ledger, collection))
    }
}

/// Requested page size, or `default`. Must be within 1..=1000.
pub(crate) fn resolve_limit(requested: Option<usize>, default: usize) -> Result<usize, AppError> {
    let limit = requested.unwrap_or(default);
    if !(1..=1000).contains(&limit) {
        return Err(AppError::BadRequest(
            "limit must be between 1 and 1000".into(),
        ));
    }
    Ok(limit)
}

pub(crate) fn parse_address(raw: &str, field: &str) -> Result<Address, AppError> {
    Address::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid {}: {}", field, e)))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/ledger", get(ledger::get_ledger))
        .route("/v1/feed", get(feed::get_feed))
        .route("/v1/fee-sources", get(fee_sources::get_fee_sources))
        .route("/v1/balance-deltas", get(balance_deltas::get_balance_deltas))
        .route("/v1/balances", get(balances::get_balances))
        .route("/v1/eligibility", get(eligibility::get_eligibility))
        .layer(cors)
        .with_state(state)
}
