//! # Money Module
//!
//! Provides the `Money` type (integer paise) and the `Percentage` type
//! (integer basis points) used by every cost figure in JobCost Pro.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    Qty 3000 × Rate 1.15 = 3449.9999999999995  ❌                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer paise                                            │
//! │    3000 × 115 paise = 345000 paise = ₹3,450.00  ✅                      │
//! │                                                                         │
//! │  Waste percentages are basis points (1250 = 12.5%) and every           │
//! │  percentage-of-amount rounds half-up to the nearest paisa, once.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use jobcost_core::money::{Money, Percentage};
//!
//! let rate = Money::from_paise(115);            // ₹1.15 per piece
//! let amount = rate.checked_mul_quantity(3000).unwrap(); // ₹3,450.00
//! let waste = Percentage::from_bps(500).of(amount);
//! assert_eq!(waste.paise(), 17250);             // 5% = ₹172.50
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Where Money is Used
/// ```text
/// Job.rate ──► Job.amount (qty × rate) ──┬──► Job.waste_amount
///                                        │
/// Job.cooly ─────────────────────────────┼──► Job.total_amount
///                                        │
/// MachineEntry.cost / waste_amount ──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use jobcost_core::money::Money;
    ///
    /// let rate = Money::from_paise(1250); // ₹12.50
    /// assert_eq!(rate.paise(), 1250);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the rupee part carries the sign:
    /// `from_rupees_paise(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
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
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a per-piece rate by a quantity.
    ///
    /// Returns `None` when the product does not fit in paise.
    ///
    /// ## Example
    /// ```rust
    /// use jobcost_core::money::Money;
    ///
    /// let rate = Money::from_paise(450);          // ₹4.50
    /// assert_eq!(rate.checked_mul_quantity(2000).unwrap().paise(), 900_000);
    /// assert!(rate.checked_mul_quantity(i64::MAX).is_none());
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Returns the value as a float of rupees. Display/export only.
    #[inline]
    pub fn as_rupees_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Formats an amount with Indian digit grouping (`12,34,567.89`).
///
/// ## Example
/// ```rust
/// use jobcost_core::money::{format_inr, Money};
///
/// assert_eq!(format_inr(Money::from_paise(12345678), "₹"), "₹1,23,456.78");
/// assert_eq!(format_inr(Money::from_paise(-550), "Rs. "), "-Rs. 5.50");
/// ```
pub fn format_inr(amount: Money, symbol: &str) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let digits = amount.rupees().abs().to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, last_three) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), last_three)
    };

    format!("{}{}{}.{:02}", sign, symbol, grouped, amount.paise_part())
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_inr(*self, "₹"))
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
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%).
///
/// `Percentage::from_bps(1250)` is 12.5%. Waste percentages on jobs and
/// machine entries use this type; the valid range for waste is 0..=10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// 100% in basis points.
    pub const FULL_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a human value such as `12.5`.
    ///
    /// Negative and non-finite input clamps to zero.
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percentage(0);
        }
        Percentage((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (display only).
    #[inline]
    pub fn as_percent_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Applies this percentage to an amount, rounding half away from zero
    /// to the nearest paisa.
    ///
    /// ## Implementation
    /// Integer math in i128: `(|paise| × bps + 5000) / 10000`, sign restored.
    ///
    /// ## Example
    /// ```rust
    /// use jobcost_core::money::{Money, Percentage};
    ///
    /// // ₹10.00 at 8.25% = ₹0.825 → ₹0.83
    /// let waste = Percentage::from_bps(825).of(Money::from_paise(1000));
    /// assert_eq!(waste.paise(), 83);
    /// ```
    pub fn of(&self, amount: Money) -> Money {
        self.checked_of(amount).unwrap_or(if amount.is_negative() {
            Money(i64::MIN)
        } else {
            Money(i64::MAX)
        })
    }

    /// Like [`Percentage::of`], but `None` when the result does not fit.
    ///
    /// Only possible above 100%.
    pub fn checked_of(&self, amount: Money) -> Option<Money> {
        let magnitude = (amount.paise().unsigned_abs() as i128 * self.0 as i128 + 5000) / 10000;
        let signed = if amount.is_negative() { -magnitude } else { magnitude };
        i64::try_from(signed).ok().map(Money)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_from_rupees_paise() {
        assert_eq!(Money::from_rupees_paise(10, 99).paise(), 1099);
        assert_eq!(Money::from_rupees_paise(-5, 50).paise(), -550);
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_inr(Money::from_paise(0), "₹"), "₹0.00");
        assert_eq!(format_inr(Money::from_paise(99_999), "₹"), "₹999.99");
        assert_eq!(format_inr(Money::from_paise(100_000), "₹"), "₹1,000.00");
        assert_eq!(format_inr(Money::from_paise(12_345_678), "₹"), "₹1,23,456.78");
        assert_eq!(
            format_inr(Money::from_paise(12_345_678_900), "₹"),
            "₹12,34,56,789.00"
        );
        assert_eq!(format_inr(Money::from_paise(-550), "Rs. "), "-Rs. 5.50");
    }

    #[test]
    fn test_display_uses_rupee_symbol() {
        assert_eq!(Money::from_paise(345_000).to_string(), "₹3,450.00");
    }

    #[test]
    fn test_quantity_times_rate_is_exact() {
        // 3000 pieces at ₹1.15 must be exactly ₹3,450.00
        let amount = Money::from_paise(115).checked_mul_quantity(3000).unwrap();
        assert_eq!(amount.paise(), 345_000);
    }

    #[test]
    fn test_checked_ops_detect_overflow() {
        let rate = Money::from_paise(100_000_000_000);
        assert!(rate.checked_mul_quantity(100_000_000_000).is_none());
        assert!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)).is_none());
        assert_eq!(
            Money::from_paise(40).checked_add(Money::from_paise(2)),
            Some(Money::from_paise(42))
        );
    }

    #[test]
    fn test_percentage_above_full_can_overflow() {
        let huge = Percentage::from_bps(u32::MAX);
        assert!(huge.checked_of(Money::from_paise(i64::MAX / 2)).is_none());
        assert_eq!(huge.of(Money::from_paise(i64::MAX / 2)).paise(), i64::MAX);
        assert_eq!(
            Percentage::from_bps(500).checked_of(Money::from_paise(50)),
            Some(Money::from_paise(3))
        );
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        let pct = Percentage::from_bps(825);
        assert_eq!(pct.of(Money::from_paise(1000)).paise(), 83);

        // 2.5% of ₹0.50 = 1.25 paise → 1
        assert_eq!(Percentage::from_bps(250).of(Money::from_paise(50)).paise(), 1);
        // 5% of ₹0.50 = 2.5 paise → 3
        assert_eq!(Percentage::from_bps(500).of(Money::from_paise(50)).paise(), 3);
    }

    #[test]
    fn test_percentage_negative_is_symmetric() {
        let pct = Percentage::from_bps(500);
        assert_eq!(pct.of(Money::from_paise(-50)).paise(), -3);
    }

    #[test]
    fn test_percentage_from_percent() {
        assert_eq!(Percentage::from_percent(12.5).bps(), 1250);
        assert_eq!(Percentage::from_percent(-3.0).bps(), 0);
        assert_eq!(Percentage::from_percent(f64::NAN).bps(), 0);
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_bps(500).to_string(), "5%");
        assert_eq!(Percentage::from_bps(1250).to_string(), "12.5%");
        assert_eq!(Percentage::from_bps(825).to_string(), "8.25%");
    }

    #[test]
    fn test_sum() {
        let values = [Money::from_paise(100), Money::from_paise(250)];
        let total: Money = values.iter().sum();
        assert_eq!(total.paise(), 350);
    }
}
