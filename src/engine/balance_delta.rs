//! Balance-delta audit: net lamport change of the watched account per
//! transaction, fees included.

use crate::domain::{Address, Decimal, Lamports, Signature, TransactionRecord, UnixTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceDelta {
    pub signature: Signature,
    pub time: Option<UnixTime>,
    /// Signed lamport change (post - pre).
    pub delta: i128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceDeltaSummary {
    pub total_in: Lamports,
    pub total_out: Lamports,
    /// Only non-zero deltas.
    pub entries: Vec<BalanceDelta>,
}

impl BalanceDeltaSummary {
    /// total_in - total_out, in SOL.
    pub fn net_sol(&self) -> Decimal {
        self.total_in.to_sol() - self.total_out.to_sol()
    }
}

/// Sum positive and negative balance changes of `watched` across `records`.
///
/// Records without balance metadata, or where `watched` is not an account,
/// contribute nothing. Records that failed on-chain are included: the fee
/// was still charged.
pub fn summarize_balance_deltas(
    records: &[Option<TransactionRecord>],
    watched: &Address,
) -> BalanceDeltaSummary {
    let mut summary = BalanceDeltaSummary {
        total_in: Lamports::ZERO,
        total_out: Lamports::ZERO,
        entries: Vec::new(),
    };

    for record in records.iter().flatten() {
        let Some(delta) = record
            .balances
            .as_ref()
            .and_then(|meta| meta.delta_for(watched))
        else {
            continue;
        };

        if delta == 0 {
            continue;
        }
        let magnitude = Lamports::new(u64::try_from(delta.unsigned_abs()).unwrap_or(u64::MAX));
        if delta > 0 {
            summary.total_in += magnitude;
        } else {
            summary.total_out += magnitude;
        }
        summary.entries.push(BalanceDelta {
            signature: record.signature.clone(),
            time: record.block_time,
            delta,
        });
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BalanceMeta;

    fn record(sig: &str, keys: &[&str], pre: Vec<u64>, post: Vec<u64>) -> Option<TransactionRecord> {
        Some(TransactionRecord::new(sig, None).with_balances(BalanceMeta {
            account_keys: keys.iter().map(|k| Address::new(k.to_string())).collect(),
            pre_balances: pre,
            post_balances: post,
        }))
    }

    #[test]
    fn test_in_and_out_split_by_sign() {
        let w = Address::new("W".to_string());
        let records = vec![
            record("a", &["X", "W"], vec![10, 100], vec![5, 150]),
            None,
            record("b", &["W"], vec![150], vec![120]),
            record("c", &["X"], vec![1], vec![2]),
            Some(TransactionRecord::new("d", None)),
        ];

        let summary = summarize_balance_deltas(&records, &w);
        assert_eq!(summary.total_in, Lamports::new(50));
        assert_eq!(summary.total_out, Lamports::new(30));
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.entries[1].delta, -30);
        assert_eq!(summary.net_sol(), Lamports::new(20).to_sol());
    }

    #[test]
    fn test_zero_delta_not_listed() {
        let w = Address::new("W".to_string());
        let records = vec![record("a", &["W"], vec![5], vec![5])];
        let summary = summarize_balance_deltas(&records, &w);
        assert!(summary.entries.is_empty());
    }

    #[test]
    fn test_failed_transaction_fee_is_counted() {
        let w = Address::new("W".to_string());
        let failed = TransactionRecord::new("f", None)
            .with_balances(BalanceMeta {
                account_keys: vec![w.clone()],
                pre_balances: vec![1_000_000_000],
                post_balances: vec![999_995_000],
            })
            .mark_failed();

        let summary = summarize_balance_deltas(&[Some(failed)], &w);
        assert_eq!(summary.total_out, Lamports::new(5_000));
        assert_eq!(summary.entries.len(), 1);
    }
}
