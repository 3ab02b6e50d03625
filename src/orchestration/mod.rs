//! Async coordination over the chain and swap collaborators.

pub mod buyback;
pub mod collector;

pub use buyback::{BuybackError, BuybackMonitor, CycleOutcome};
pub use collector::{Collection, CollectorError, HistoryCollector};
