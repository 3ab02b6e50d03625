//! Chain data source abstraction: signature history, parsed transactions and
//! balances, fetched from an external RPC node.

use crate::domain::{Address, Decimal, Lamports, Signature, TransactionRecord, UnixTime};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod solana_rpc;
pub mod swap;

pub use mock::MockChainSource;
pub use solana_rpc::SolanaRpcSource;
pub use swap::{AggregatorError, Quote, SwapAggregator, SwapSource, WRAPPED_SOL_MINT};

/// Maximum page size accepted by `getSignaturesForAddress`.
pub const MAX_SIGNATURE_PAGE: usize = 1000;

/// One entry of an address's signature history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub signature: Signature,
    pub slot: u64,
    pub block_time: Option<UnixTime>,
    /// Set when the transaction failed on-chain.
    pub err: Option<String>,
}

impl SignatureInfo {
    pub fn new(signature: &str, slot: u64) -> Self {
        Self {
            signature: Signature::new(signature.to_string()),
            slot,
            block_time: None,
            err: None,
        }
    }
}

/// Chain RPC collaborator.
///
/// Implementations own retry/backoff for transient failures. Callers own
/// pacing between requests.
#[async_trait]
pub trait ChainSource: Send + Sync + fmt::Debug {
    /// Fetch up to `limit` signatures for `address`, most recent first,
    /// starting strictly before `before` when given.
    async fn fetch_signatures(
        &self,
        address: &Address,
        limit: usize,
        before: Option<&Signature>,
    ) -> Result<Vec<SignatureInfo>, DataSourceError>;

    /// Fetch a parsed transaction. `Ok(None)` when the node has no record.
    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionRecord>, DataSourceError>;

    /// Native balance of `address`.
    async fn fetch_balance(&self, address: &Address) -> Result<Lamports, DataSourceError>;

    /// UI-unit balance of `mint` held by `owner`, summed over all its token
    /// accounts. Zero when the owner has none.
    async fn fetch_token_balance(
        &self,
        owner: &Address,
        mint: &Address,
    ) -> Result<Decimal, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 5xx server error)
    HttpError { status: u16, message: String },
    /// JSON-RPC error object returned by the node
    RpcError { code: i64, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
