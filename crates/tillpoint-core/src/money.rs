//! # Money Module
//!
//! Provides the `Money` type for exact currency arithmetic.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With binary floating point:                                            │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: a fixed-point value with exactly 2 fraction digits,     │
//! │  stored as an i64 count of minor units (cents).                        │
//! │                                                                         │
//! │  Rounding happens in ONE place only: `percentage_of`, the single       │
//! │  operation that can produce a third fraction digit. Sums, differences  │
//! │  and quantity multiples are always exact.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::money::Money;
//!
//! let price = Money::from_cents(1099);              // 10.99
//! let line = price.multiply_quantity(3);             // 32.97
//! let discount = line.percentage_of(Money::from_cents(1000)); // 10% -> 3.30
//! assert_eq!(line.cents(), 3297);
//! assert_eq!(discount.cents(), 330);
//!
//! // Operator-entered text is the only fallible entry point
//! let tendered: Money = "50.00".parse().unwrap();
//! assert_eq!(tendered.cents(), 5000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Minor units per major unit (2 fraction digits).
const MINOR_PER_MAJOR: i64 = 100;

/// Denominator for `percentage_of`: the percentage itself carries 2 fraction
/// digits, so 100% is `Money::from_cents(10_000)`.
const HUNDRED_PERCENT: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value with exactly 2 fraction digits, counted in minor units.
///
/// ## Design Decisions
/// - **i64 (signed)**: `change_due` is allowed to go negative while a sale
///   is still being paid for
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Total ordering**: derived `Ord` on the minor-unit count
///
/// ## Where Money is Used
/// ```text
/// ProductSnapshot.unit_price ──► LineItem.unit_price ──► LineItem.line_subtotal
///                                                              │
///  Cart.subtotal ◄─────────────────────────────────────────────┘
///       │
///       ├──► percentage_of(discount_percent) ──► Cart.discount_amount
///       ▼
///  Cart.total ──► amount_tendered - total ──► Cart.change_due
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the fraction portion, always 0-99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
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

    /// Multiplies a unit price by a quantity. Exact, no rounding.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `pct` percent of this amount, rounded half-up to 2 fraction
    /// digits.
    ///
    /// `pct` is itself a 2-fraction-digit value: `Money::from_cents(3333)`
    /// means 33.33%. Half-up rounds ties away from zero, so negative
    /// amounts mirror positive ones.
    ///
    /// ## Implementation
    /// `(amount * pct ± 5000) / 10000` in i128, then truncation toward zero.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(9999);        // 99.99
    /// let pct = Money::from_cents(3333);             // 33.33%
    /// // 99.99 × 33.33% = 33.326667 → 33.33
    /// assert_eq!(subtotal.percentage_of(pct).cents(), 3333);
    /// ```
    pub fn percentage_of(&self, pct: Money) -> Money {
        let product = self.0 as i128 * pct.0 as i128;
        let half = HUNDRED_PERCENT / 2;
        let rounded = if product >= 0 {
            (product + half) / HUNDRED_PERCENT
        } else {
            (product - half) / HUNDRED_PERCENT
        };
        Money(rounded as i64)
    }

    /// Parses operator-entered text into Money.
    ///
    /// ## Accepted Forms
    /// - `"1500"`, `"1500.5"`, `"1500.50"`, `"1500,50"`, `".50"`, `"-3.00"`
    /// - surrounding whitespace is ignored
    ///
    /// ## Rejected (InvalidAmount)
    /// - empty input, letters or symbols, more than one separator
    /// - more than 2 fraction digits (would need rounding)
    /// - values that overflow i64 minor units
    pub fn parse(text: &str) -> CoreResult<Money> {
        let invalid = |reason: &str| CoreError::InvalidAmount {
            input: text.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = text.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (units, fraction) = match body.find(|c: char| c == '.' || c == ',') {
            Some(idx) => (&body[..idx], &body[idx + 1..]),
            None => (body, ""),
        };

        if units.is_empty() && fraction.is_empty() {
            return Err(invalid("amount is empty"));
        }

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(units) || !all_digits(fraction) {
            return Err(invalid("must contain only digits and one decimal separator"));
        }

        if fraction.len() > 2 {
            return Err(invalid("at most 2 fraction digits are allowed"));
        }

        let units_value: i64 = if units.is_empty() {
            0
        } else {
            units.parse().map_err(|_| invalid("amount is too large"))?
        };

        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => fraction.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = units_value
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|c| c.checked_add(fraction_value))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `[-]units.cc` rendering. Currency symbols and grouping are the
/// receipt/UI collaborator's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_ordering() {
        let small = Money::from_cents(-1);
        let zero = Money::zero();
        let big = Money::from_cents(10_000);

        assert!(small < zero);
        assert!(zero < big);
        assert_eq!(big.cmp(&big), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_percentage_of_exact() {
        // 1000.00 at 10% = 100.00
        let subtotal = Money::from_cents(100_000);
        let discount = subtotal.percentage_of(Money::from_cents(1000));
        assert_eq!(discount.cents(), 10_000);
    }

    #[test]
    fn test_percentage_of_rounds_half_up() {
        // 99.99 × 33.33% = 33.326667 → 33.33
        let subtotal = Money::from_cents(9999);
        assert_eq!(subtotal.percentage_of(Money::from_cents(3333)).cents(), 3333);

        // 0.10 × 5% = 0.005 → 0.01 (tie rounds up)
        let small = Money::from_cents(10);
        assert_eq!(small.percentage_of(Money::from_cents(500)).cents(), 1);

        // 0.10 × 4.99% = 0.00499 → 0.00
        assert_eq!(small.percentage_of(Money::from_cents(499)).cents(), 0);
    }

    #[test]
    fn test_percentage_of_negative_mirrors_positive() {
        let refund = Money::from_cents(-10);
        assert_eq!(refund.percentage_of(Money::from_cents(500)).cents(), -1);
    }

    #[test]
    fn test_percentage_of_bounds() {
        let subtotal = Money::from_cents(12_345);
        assert!(subtotal.percentage_of(Money::zero()).is_zero());
        assert_eq!(subtotal.percentage_of(Money::from_cents(10_000)), subtotal);
    }

    #[test]
    fn test_percentage_of_large_amount_does_not_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);
        let half = huge.percentage_of(Money::from_cents(5_000));
        assert_eq!(half.cents(), (i64::MAX / 2 + 1) / 2);
    }

    #[test]
    fn test_parse_accepted_forms() {
        assert_eq!(Money::parse("1500").unwrap().cents(), 150_000);
        assert_eq!(Money::parse("1500.5").unwrap().cents(), 150_050);
        assert_eq!(Money::parse("1500.50").unwrap().cents(), 150_050);
        assert_eq!(Money::parse("1500,05").unwrap().cents(), 150_005);
        assert_eq!(Money::parse(" .50 ").unwrap().cents(), 50);
        assert_eq!(Money::parse("12.").unwrap().cents(), 1200);
        assert_eq!(Money::parse("-3.00").unwrap().cents(), -300);
        assert_eq!("0".parse::<Money>().unwrap(), Money::zero());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "   ", "-", ".", "abc", "12a", "1.2.3", "1.234", "--5", "+5", "Rp 100"] {
            let err = Money::parse(input).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidAmount { .. }),
                "expected InvalidAmount for {:?}, got {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let err = Money::parse("99999999999999999999").unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
    }
}
