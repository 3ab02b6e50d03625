//! Transfer ledger scanning: classify native transfers touching a watched
//! address and aggregate them into directional totals.

use crate::domain::{Address, Decimal, Direction, Lamports, TransactionRecord, TransferEvent};
use serde::Serialize;

/// Aggregate of native transfers for one watched address.
///
/// Rebuilt from scratch on every scan. Totals are kept in lamports and only
/// converted to SOL by [`Ledger::total_in_sol`] / [`Ledger::total_out_sol`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub watched: Address,
    pub total_in: Lamports,
    pub total_out: Lamports,
    /// Matched events in record order, then flattened instruction order.
    pub matched_events: Vec<TransferEvent>,
    /// Present records that were classified.
    pub records_scanned: usize,
    /// Absent entries (failed lookups) that were skipped.
    pub records_missing: usize,
    /// Records that failed on-chain; their transfers never happened.
    pub records_failed: usize,
}

impl Ledger {
    pub fn empty(watched: Address) -> Self {
        Self {
            watched,
            total_in: Lamports::ZERO,
            total_out: Lamports::ZERO,
            matched_events: Vec::new(),
            records_scanned: 0,
            records_missing: 0,
            records_failed: 0,
        }
    }

    pub fn total_in_sol(&self) -> Decimal {
        self.total_in.to_sol()
    }

    pub fn total_out_sol(&self) -> Decimal {
        self.total_out.to_sol()
    }

    pub fn events_in(&self, direction: Direction) -> impl Iterator<Item = &TransferEvent> {
        self.matched_events
            .iter()
            .filter(move |e| e.direction == direction)
    }
}

/// Scans fetched transaction records for transfers touching one address.
#[derive(Debug, Clone)]
pub struct TransferLedgerScanner {
    watched: Address,
    counterparty: Option<Address>,
}

impl TransferLedgerScanner {
    pub fn new(watched: Address) -> Self {
        Self {
            watched,
            counterparty: None,
        }
    }

    /// Only keep transfers whose non-watched side equals `counterparty`.
    pub fn with_counterparty(mut self, counterparty: Option<Address>) -> Self {
        self.counterparty = counterparty;
        self
    }

    /// Scan `records` (most recent first, `None` for failed lookups).
    ///
    /// Never fails: absent records and non-transfer instructions contribute
    /// nothing. Any prefix of a fetch is a valid input.
    pub fn scan(&self, records: &[Option<TransactionRecord>]) -> Ledger {
        let mut ledger = Ledger::empty(self.watched.clone());

        for record in records {
            let Some(record) = record else {
                ledger.records_missing += 1;
                continue;
            };
            if record.failed {
                ledger.records_failed += 1;
                continue;
            }
            ledger.records_scanned += 1;
            self.scan_record(record, &mut ledger);
        }

        ledger
    }

    fn scan_record(&self, record: &TransactionRecord, ledger: &mut Ledger) {
        for transfer in record.all_instructions().filter_map(|ix| ix.as_transfer()) {
            // In and Out are independent accumulators: a self-transfer hits both.
            for direction in [Direction::In, Direction::Out] {
                let (ours, theirs) = match direction {
                    Direction::In => (&transfer.destination, &transfer.source),
                    Direction::Out => (&transfer.source, &transfer.destination),
                };
                if *ours != self.watched {
                    continue;
                }
                if let Some(cp) = &self.counterparty {
                    if theirs != cp {
                        continue;
                    }
                }

                match direction {
                    Direction::In => ledger.total_in += transfer.lamports,
                    Direction::Out => ledger.total_out += transfer.lamports,
                }
                ledger.matched_events.push(TransferEvent {
                    source: transfer.source.clone(),
                    destination: transfer.destination.clone(),
                    amount: transfer.lamports,
                    signature: record.signature.clone(),
                    time: record.block_time,
                    direction,
                });
            }
        }
    }
}

/// Convenience wrapper over [`TransferLedgerScanner`].
pub fn scan(
    records: &[Option<TransactionRecord>],
    watched: &Address,
    counterparty: Option<&Address>,
) -> Ledger {
    TransferLedgerScanner::new(watched.clone())
        .with_counterparty(counterparty.cloned())
        .scan(records)
}
