pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use datasource::{ChainSource, DataSourceError, MockChainSource, SolanaRpcSource};
pub use domain::{
    Address, Decimal, Direction, Instruction, Lamports, Signature, TransactionRecord,
    TransferEvent, UnixTime,
};
pub use engine::{scan, Ledger, TransferLedgerScanner};
pub use error::AppError;
pub use orchestration::HistoryCollector;
