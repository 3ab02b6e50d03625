//! Pure computation over already-fetched chain data. No I/O.

pub mod balance_delta;
pub mod buyback;
pub mod eligibility;
pub mod feed;
pub mod ledger;

pub use balance_delta::{summarize_balance_deltas, BalanceDelta, BalanceDeltaSummary};
pub use buyback::{plan_buyback, BuybackDecision, SkipReason};
pub use eligibility::{evaluate as evaluate_eligibility, is_eligible, Eligibility};
pub use feed::{build_feed, FeedFilter, FeedItem};
pub use ledger::{scan, Ledger, TransferLedgerScanner};
