//! Holder eligibility: share of total supply against a percentage threshold.

use crate::domain::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub balance: Decimal,
    pub share_percent: Decimal,
    pub threshold_percent: Decimal,
    pub eligible: bool,
}

/// `(balance / total_supply) * 100 >= threshold_percent`.
///
/// `total_supply` is validated non-zero at configuration time; a zero supply
/// here yields a zero share rather than a panic.
pub fn is_eligible(balance: Decimal, total_supply: Decimal, threshold_percent: Decimal) -> bool {
    evaluate(balance, total_supply, threshold_percent).eligible
}

pub fn evaluate(balance: Decimal, total_supply: Decimal, threshold_percent: Decimal) -> Eligibility {
    let share_percent = balance
        .checked_div(total_supply)
        .map(|share| share * Decimal::hundred())
        .unwrap_or_else(Decimal::zero);

    Eligibility {
        balance,
        share_percent,
        threshold_percent,
        eligible: !total_supply.is_zero() && share_percent >= threshold_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_exact_threshold_is_eligible() {
        // 0.5% of one billion
        assert!(is_eligible(d("5000000"), d("1000000000"), d("0.5")));
    }

    #[test]
    fn test_below_threshold() {
        assert!(!is_eligible(d("4999999.99"), d("1000000000"), d("0.5")));
    }

    #[test]
    fn test_share_percent_reported() {
        let e = evaluate(d("10000000"), d("1000000000"), d("0.5"));
        assert_eq!(e.share_percent, d("1"));
        assert!(e.eligible);
    }

    #[test]
    fn test_zero_supply_never_eligible() {
        let e = evaluate(d("1"), Decimal::zero(), Decimal::zero());
        assert!(!e.eligible);
        assert_eq!(e.share_percent, Decimal::zero());
    }

    #[test]
    fn test_zero_balance_with_zero_threshold() {
        assert!(is_eligible(Decimal::zero(), d("1000"), Decimal::zero()));
    }
}
