//! History collection: page through an address's signatures and fetch each
//! transaction, producing the ordered record list the scanner consumes.

use crate::config::FetchConfig;
use crate::datasource::{ChainSource, DataSourceError, SignatureInfo, MAX_SIGNATURE_PAGE};
use crate::domain::{Address, Signature, TransactionRecord};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Records gathered for one address, most recent first.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// `None` where a lookup failed or the node had no record.
    pub records: Vec<Option<TransactionRecord>>,
    pub signatures_listed: usize,
    /// Listed signatures whose transaction failed on-chain. They are still
    /// fetched, with the record marked `failed`.
    pub failed_listed: usize,
    /// False when the deadline cut the fetch short. Records then hold the
    /// prefix gathered so far.
    pub complete: bool,
}

impl Collection {
    pub fn missing(&self) -> usize {
        self.records.iter().filter(|r| r.is_none()).count()
    }
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

#[derive(Clone)]
pub struct HistoryCollector {
    source: Arc<dyn ChainSource>,
    fetch: FetchConfig,
}

impl HistoryCollector {
    pub fn new(source: Arc<dyn ChainSource>, fetch: FetchConfig) -> Self {
        Self { source, fetch }
    }

    pub fn source(&self) -> &Arc<dyn ChainSource> {
        &self.source
    }

    /// List up to `limit` signatures for `address`, paging with `before`.
    pub async fn list_signatures(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, CollectorError> {
        let mut out: Vec<SignatureInfo> = Vec::new();
        let mut before: Option<Signature> = None;

        while out.len() < limit {
            let page_size = (limit - out.len()).min(MAX_SIGNATURE_PAGE);
            let page = self
                .source
                .fetch_signatures(address, page_size, before.as_ref())
                .await?;
            let exhausted = page.len() < page_size;
            before = page.last().map(|s| s.signature.clone());
            out.extend(page);
            if exhausted || before.is_none() {
                break;
            }
        }

        Ok(out)
    }

    /// Collect the `limit` most recent transactions of `address`.
    ///
    /// Failing to list signatures is an error. Failing to fetch a single
    /// transaction yields `None` in its slot. Hitting the deadline yields a
    /// partial, order-preserving prefix.
    pub async fn collect(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Collection, CollectorError> {
        let deadline = Instant::now() + self.fetch.deadline;

        let listed = self.list_signatures(address, limit).await?;
        let signatures_listed = listed.len();
        let failed_listed = listed.iter().filter(|s| s.err.is_some()).count();

        let (records, complete) = if self.fetch.concurrency <= 1 {
            self.fetch_sequential(&listed, deadline).await
        } else {
            self.fetch_buffered(listed, deadline).await
        };

        let collection = Collection {
            records,
            signatures_listed,
            failed_listed,
            complete,
        };

        info!(
            address = %address,
            listed = collection.signatures_listed,
            failed = collection.failed_listed,
            fetched = collection.records.len(),
            missing = collection.missing(),
            complete = collection.complete,
            "History collected"
        );

        Ok(collection)
    }

    async fn fetch_sequential(
        &self,
        signatures: &[SignatureInfo],
        deadline: Instant,
    ) -> (Vec<Option<TransactionRecord>>, bool) {
        let mut records = Vec::with_capacity(signatures.len());

        for (i, info) in signatures.iter().enumerate() {
            // Pace the provider between sequential requests.
            if i > 0
                && !self.fetch.delay.is_zero()
                && timeout_at(deadline, sleep(self.fetch.delay)).await.is_err()
            {
                return (records, false);
            }
            match timeout_at(deadline, fetch_one(self.source.as_ref(), info)).await {
                Ok(record) => records.push(record),
                Err(_) => {
                    warn!(fetched = records.len(), "Collection deadline reached");
                    return (records, false);
                }
            }
        }

        (records, true)
    }

    async fn fetch_buffered(
        &self,
        signatures: Vec<SignatureInfo>,
        deadline: Instant,
    ) -> (Vec<Option<TransactionRecord>>, bool) {
        let total = signatures.len();
        let source = self.source.clone();
        let fetches = stream::iter(signatures)
            .map(move |info| {
                let source = source.clone();
                async move { fetch_one(source.as_ref(), &info).await }
            })
            .buffered(self.fetch.concurrency);
        tokio::pin!(fetches);

        let mut records = Vec::with_capacity(total);
        loop {
            match timeout_at(deadline, fetches.next()).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => return (records, true),
                Err(_) => {
                    warn!(fetched = records.len(), total, "Collection deadline reached");
                    return (records, false);
                }
            }
        }
    }
}

/// Fetch failures become `None`; the scan continues without that record.
/// A listed `err` marks the record failed.
async fn fetch_one(source: &dyn ChainSource, info: &SignatureInfo) -> Option<TransactionRecord> {
    let signature = &info.signature;
    match source.fetch_transaction(signature).await {
        Ok(Some(record)) if info.err.is_some() => {
            debug!(signature = %signature, "Transaction failed on-chain");
            Some(record.mark_failed())
        }
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            debug!(signature = %signature, "Transaction not found");
            None
        }
        Err(e) => {
            warn!(signature = %signature, error = %e, "Failed to fetch transaction");
            None
        }
    }
}
