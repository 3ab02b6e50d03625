//! Mock chain source for testing without network calls.

use super::{ChainSource, DataSourceError, SignatureInfo};
use crate::domain::{Address, Decimal, Lamports, Signature, TransactionRecord};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Mock chain source returning predefined data.
///
/// Signature history is served most recent first, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockChainSource {
    history: HashMap<Address, Vec<SignatureInfo>>,
    transactions: HashMap<Signature, TransactionRecord>,
    failing: HashSet<Signature>,
    balances: HashMap<Address, Lamports>,
    token_balances: HashMap<(Address, Address), Decimal>,
    latency: Option<Duration>,
    transaction_calls: Arc<AtomicUsize>,
}

impl MockChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `tx` in `address`'s history (appended as the next-older entry)
    /// and make it fetchable.
    pub fn with_transaction(mut self, address: &Address, tx: TransactionRecord) -> Self {
        self.push_signature(address, &tx.signature);
        self.transactions.insert(tx.signature.clone(), tx);
        self
    }

    /// Record `tx` as a transaction that failed on-chain: its history entry
    /// carries an `err`, and the fetched record is served as given.
    pub fn with_failed_signature(mut self, address: &Address, tx: TransactionRecord) -> Self {
        self.push_signature(address, &tx.signature);
        if let Some(entry) = self
            .history
            .get_mut(address)
            .and_then(|history| history.last_mut())
        {
            entry.err = Some(r#"{"InstructionError":[0,{"Custom":1}]}"#.to_string());
        }
        self.transactions.insert(tx.signature.clone(), tx);
        self
    }

    /// A signature in the history whose lookup returns `Ok(None)`.
    pub fn with_missing_transaction(mut self, address: &Address, signature: &str) -> Self {
        self.push_signature(address, &Signature::new(signature.to_string()));
        self
    }

    /// A signature in the history whose lookup fails with a network error.
    pub fn with_failing_transaction(mut self, address: &Address, signature: &str) -> Self {
        let sig = Signature::new(signature.to_string());
        self.push_signature(address, &sig);
        self.failing.insert(sig);
        self
    }

    pub fn with_balance(mut self, address: &Address, lamports: u64) -> Self {
        self.balances.insert(address.clone(), Lamports::new(lamports));
        self
    }

    pub fn with_token_balance(mut self, owner: &Address, mint: &Address, amount: Decimal) -> Self {
        self.token_balances
            .insert((owner.clone(), mint.clone()), amount);
        self
    }

    /// Delay every transaction fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `fetch_transaction` calls served so far.
    pub fn transaction_calls(&self) -> usize {
        self.transaction_calls.load(Ordering::SeqCst)
    }

    fn push_signature(&mut self, address: &Address, signature: &Signature) {
        let history = self.history.entry(address.clone()).or_default();
        let slot = u64::MAX - history.len() as u64;
        history.push(SignatureInfo::new(signature.as_str(), slot));
    }
}

#[async_trait]
impl ChainSource for MockChainSource {
    async fn fetch_signatures(
        &self,
        address: &Address,
        limit: usize,
        before: Option<&Signature>,
    ) -> Result<Vec<SignatureInfo>, DataSourceError> {
        let Some(history) = self.history.get(address) else {
            return Ok(Vec::new());
        };

        let start = match before {
            Some(before) => match history.iter().position(|s| &s.signature == before) {
                Some(idx) => idx + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };

        Ok(history.iter().skip(start).take(limit).cloned().collect())
    }

    async fn fetch_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionRecord>, DataSourceError> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.contains(signature) {
            return Err(DataSourceError::NetworkError(format!(
                "simulated failure for {}",
                signature
            )));
        }
        Ok(self.transactions.get(signature).cloned())
    }

    async fn fetch_balance(&self, address: &Address) -> Result<Lamports, DataSourceError> {
        Ok(self.balances.get(address).copied().unwrap_or_default())
    }

    async fn fetch_token_balance(
        &self,
        owner: &Address,
        mint: &Address,
    ) -> Result<Decimal, DataSourceError> {
        Ok(self
            .token_balances
            .get(&(owner.clone(), mint.clone()))
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s.to_string())
    }

    fn source() -> MockChainSource {
        let w = addr("W");
        MockChainSource::new()
            .with_transaction(&w, TransactionRecord::new("s1", None))
            .with_missing_transaction(&w, "s2")
            .with_transaction(&w, TransactionRecord::new("s3", None))
    }

    #[tokio::test]
    async fn test_fetch_signatures_pages_with_before() {
        let mock = source();
        let w = addr("W");
        let first = mock.fetch_signatures(&w, 2, None).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].signature.as_str(), "s2");

        let rest = mock
            .fetch_signatures(&w, 10, Some(&first[1].signature))
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].signature.as_str(), "s3");
    }

    #[tokio::test]
    async fn test_missing_transaction_is_none() {
        let mock = source();
        let tx = mock
            .fetch_transaction(&Signature::new("s2".to_string()))
            .await
            .unwrap();
        assert!(tx.is_none());
        assert_eq!(mock.transaction_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_transaction_errors() {
        let w = addr("W");
        let mock = MockChainSource::new().with_failing_transaction(&w, "bad");
        let result = mock.fetch_transaction(&Signature::new("bad".to_string())).await;
        assert!(matches!(result, Err(DataSourceError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_failed_signature_carries_err() {
        let w = addr("W");
        let mock = MockChainSource::new()
            .with_transaction(&w, TransactionRecord::new("ok", None))
            .with_failed_signature(&w, TransactionRecord::new("bad", None));
        let sigs = mock.fetch_signatures(&w, 10, None).await.unwrap();
        assert_eq!(sigs[0].err, None);
        assert!(sigs[1].err.is_some());
        assert!(mock
            .fetch_transaction(&Signature::new("bad".to_string()))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_balances_default_to_zero() {
        let mock = MockChainSource::new().with_balance(&addr("W"), 5);
        assert_eq!(mock.fetch_balance(&addr("W")).await.unwrap(), Lamports::new(5));
        assert_eq!(mock.fetch_balance(&addr("X")).await.unwrap(), Lamports::ZERO);
        assert_eq!(
            mock.fetch_token_balance(&addr("W"), &addr("M")).await.unwrap(),
            Decimal::zero()
        );
    }
}
