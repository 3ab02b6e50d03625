use whalewatch::domain::{Address, Direction, Instruction, Lamports, TransactionRecord};
use whalewatch::engine::{build_feed, scan, FeedFilter, TransferLedgerScanner};

const WATCHED: &str = "Watched";

fn watched() -> Address {
    Address::new(WATCHED.to_string())
}

fn transfer_tx(sig: &str, src: &str, dst: &str, lamports: u64) -> TransactionRecord {
    TransactionRecord::new(sig, Some(1_700_000_000))
        .with_instruction(Instruction::transfer(src, dst, lamports))
}

#[test]
fn test_mixed_history_with_absent_record() {
    let records = vec![
        Some(transfer_tx("A", "X", WATCHED, 2_000_000_000)),
        None,
        Some(transfer_tx("C", WATCHED, "Y", 500_000_000)),
    ];

    let ledger = scan(&records, &watched(), None);

    assert_eq!(ledger.total_in_sol().to_canonical_string(), "2");
    assert_eq!(ledger.total_out_sol().to_canonical_string(), "0.5");
    let sigs: Vec<&str> = ledger
        .matched_events
        .iter()
        .map(|e| e.signature.as_str())
        .collect();
    assert_eq!(sigs, vec!["A", "C"]);
    assert_eq!(ledger.records_scanned, 2);
    assert_eq!(ledger.records_missing, 1);
}

#[test]
fn test_scan_is_deterministic() {
    let records = vec![
        Some(transfer_tx("A", "X", WATCHED, 7)),
        Some(transfer_tx("B", WATCHED, WATCHED, 3)),
        None,
    ];
    let scanner = TransferLedgerScanner::new(watched());
    assert_eq!(scanner.scan(&records), scanner.scan(&records));
}

#[test]
fn test_empty_history_yields_zero_ledger() {
    let ledger = scan(&[], &watched(), None);
    assert_eq!(ledger.total_in, Lamports::ZERO);
    assert_eq!(ledger.total_out, Lamports::ZERO);
    assert!(ledger.matched_events.is_empty());
}

#[test]
fn test_counterparty_mismatch_excludes_event() {
    let records = vec![Some(transfer_tx("A", WATCHED, "Y", 1_000_000_000))];
    let ledger = scan(&records, &watched(), Some(&Address::new("Z".to_string())));
    assert_eq!(ledger.total_out, Lamports::ZERO);
    assert!(ledger.matched_events.is_empty());
}

#[test]
fn test_inner_transfers_feed_the_feed() {
    // A swap-like transaction: non-transfer top level, transfer in an inner list.
    let records = vec![Some(
        TransactionRecord::new("Swap", Some(1_700_000_000))
            .with_instruction(Instruction::other("spl-token"))
            .with_inner_instructions(vec![
                Instruction::other("compute-budget"),
                Instruction::transfer(WATCHED, "Charity", 1_234_000_000),
            ]),
    )];

    let ledger = TransferLedgerScanner::new(watched()).scan(&records);
    assert_eq!(ledger.events_in(Direction::Out).count(), 1);

    let feed = build_feed(&ledger, &FeedFilter::default());
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].counterparty, "Charity");
    assert_eq!(feed[0].amount.to_canonical_string(), "1.234");
    assert_eq!(feed[0].time_rfc3339.as_deref(), Some("2023-11-14T22:13:20+00:00"));
}
