//! # Money Module
//!
//! Provides the `Money` type used for prices, costs, cash counts and every
//! derived total (revenue, production cost, discharge loss, profit).
//!
//! ## Integer Cents Only
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog price 0.80  ──►  stored as 80 cents                            │
//! │                                                                         │
//! │  sold 23 × 5.00      ──►  23 × 500 = 11_500 cents                       │
//! │  Σ amount            ──►  exact, no rounding step anywhere              │
//! │                                                                         │
//! │  Floats never enter the reconciliation path.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Arithmetic saturates at the `i64` bounds. Input limits keep live values
//! far below them, but a hand-edited database row must not crash a report.
//!
//! ## Usage
//! ```rust
//! use hearth_core::money::Money;
//!
//! let price = Money::from_cents(500);
//! let amount = price.multiply_quantity(23);
//! assert_eq!(amount.cents(), 11_500);
//! assert_eq!(amount.to_string(), "115.00");
//! assert_eq!(amount.format_with("$"), "$115.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so that `estimated_profit` can go below zero when production cost
/// exceeds reconciled revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a major and a minor part.
    ///
    /// ## Example
    /// ```rust
    /// use hearth_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(55, 0).cents(), 5500);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// Only the major part carries the sign.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        let major = major.saturating_mul(100);
        if major < 0 {
            Money(major.saturating_sub(minor))
        } else {
            Money(major.saturating_add(minor))
        }
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Unit price times a quantity.
    ///
    /// ## Example
    /// ```text
    /// PANDESAL (2) cost 0.80 × produced 120
    ///      │
    ///      ▼
    /// 80 cents × 120 = 9_600 cents (96.00)
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Renders the amount with a currency symbol in front of the digits.
    ///
    /// The sign stays in front of the symbol: `-$4.00`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, abs / 100, abs % 100)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering without a symbol, e.g. `115.00` or `-4.05`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so callers can align columns with {:>10}
        f.pad(&self.format_with(""))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_symbol() {
        assert_eq!(Money::from_cents(11_500).to_string(), "115.00");
        assert_eq!(Money::from_cents(80).to_string(), "0.80");
        assert_eq!(Money::from_cents(-405).to_string(), "-4.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(2550).format_with("₱"), "₱25.50");
        assert_eq!(Money::from_cents(-400).format_with("$"), "-$4.00");
    }

    #[test]
    fn test_arithmetic() {
        let revenue = Money::from_cents(11_500);
        let cost = Money::from_cents(4_000);

        assert_eq!((revenue - cost).cents(), 7_500);
        assert_eq!((cost - revenue).cents(), -7_500);
        assert!((cost - revenue).is_negative());
        assert_eq!((revenue + cost).cents(), 15_500);
        assert_eq!((-cost).cents(), -4_000);

        let mut running = Money::zero();
        running += revenue;
        running -= cost;
        assert_eq!(running.cents(), 7_500);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_cost = Money::from_cents(80);
        assert_eq!(unit_cost.multiply_quantity(120).cents(), 9_600);
        assert_eq!((unit_cost * 0).cents(), 0);
        assert!((unit_cost * 0).is_zero());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_cents(i64::MAX / 100);
        assert_eq!(huge.multiply_quantity(1_000).cents(), i64::MAX);
        assert_eq!(Money::from_cents(-500).multiply_quantity(i64::MAX).cents(), i64::MIN);
        assert_eq!((Money::from_cents(i64::MAX) + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - Money::from_cents(1)).cents(), i64::MIN);
        assert_eq!((-Money::from_cents(i64::MIN)).cents(), i64::MAX);

        let total: Money = vec![Money::from_cents(i64::MAX); 3].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_cents(500),
            Money::from_cents(2_500),
            Money::from_cents(80),
        ];
        let by_ref: Money = amounts.iter().sum();
        let by_value: Money = amounts.into_iter().sum();
        assert_eq!(by_ref.cents(), 3_080);
        assert_eq!(by_value, by_ref);
    }

    #[test]
    fn test_serializes_as_plain_cents() {
        let json = serde_json::to_string(&Money::from_cents(1_099)).unwrap();
        assert_eq!(json, "1099");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cents(), 1_099);
    }
}
