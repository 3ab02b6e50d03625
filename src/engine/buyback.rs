//! Buyback sizing: decide whether the wallet balance justifies a swap and
//! how many lamports to spend.

use crate::domain::Lamports;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BelowThreshold,
    ReserveExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuybackDecision {
    Skip(SkipReason),
    Swap { lamports: Lamports },
}

/// Spend everything above `reserve`, provided `balance` reaches `min_threshold`.
pub fn plan_buyback(balance: Lamports, min_threshold: Lamports, reserve: Lamports) -> BuybackDecision {
    if balance < min_threshold {
        return BuybackDecision::Skip(SkipReason::BelowThreshold);
    }

    let spendable = balance.saturating_sub(reserve);
    if spendable == Lamports::ZERO {
        return BuybackDecision::Skip(SkipReason::ReserveExhausted);
    }

    BuybackDecision::Swap {
        lamports: spendable,
    }
}
