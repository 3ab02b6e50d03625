//! Native-currency amounts: integer lamports and lossless display decimals.
//!
//! Totals are always accumulated in [`Lamports`] and converted to SOL once,
//! at the output boundary, via [`Lamports::to_sol`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal places of the SOL display unit.
pub const SOL_DECIMALS: u32 = 9;

/// Amount of native currency in its smallest unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Lamports(pub u64);

impl Lamports {
    pub const ZERO: Lamports = Lamports(0);

    pub fn new(lamports: u64) -> Self {
        Lamports(lamports)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Convert to the SOL display unit. Exact: one division by 10^9.
    pub fn to_sol(&self) -> Decimal {
        Decimal(RustDecimal::from_i128_with_scale(self.0 as i128, SOL_DECIMALS).normalize())
    }

    /// Convert a SOL amount to lamports, flooring any sub-lamport remainder.
    ///
    /// Returns None for negative or overflowing inputs.
    pub fn from_sol_floor(sol: Decimal) -> Option<Self> {
        if sol.is_negative() {
            return None;
        }
        let scaled = sol.inner().checked_mul(RustDecimal::from(LAMPORTS_PER_SOL))?;
        let floored = scaled.floor();
        floored.to_u64().map(Lamports)
    }

    pub fn saturating_sub(self, rhs: Lamports) -> Lamports {
        Lamports(self.0.saturating_sub(rhs.0))
    }
}

impl std::ops::Add for Lamports {
    type Output = Lamports;

    fn add(self, rhs: Lamports) -> Lamports {
        Lamports(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for Lamports {
    fn add_assign(&mut self, rhs: Lamports) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Lamports {
    fn sum<I: Iterator<Item = Lamports>>(iter: I) -> Self {
        iter.fold(Lamports::ZERO, |acc, l| acc + l)
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lossless decimal for display-unit amounts (SOL, token UI amounts, percents).
///
/// Serializes to a JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s.trim()).map(Decimal)
    }

    /// Canonical string: trailing zeros removed, no exponent.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// Fixed-point rendering with exactly `dp` decimal places.
    pub fn to_fixed(&self, dp: u32) -> String {
        format!("{:.*}", dp as usize, self.0.round_dp(dp))
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Division that returns None instead of panicking on a zero divisor.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}
