//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Chained through discount → tax → total, float error compounds.         │
//! │  A refund recomputed from float line items can miss the charged         │
//! │  amount by a cent, and a complete return MUST refund exactly what       │
//! │  was paid.                                                              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every derived amount (line subtotal, discount, tax) is rounded       │
//! │    exactly once, at the point it is derived. Re-running the same        │
//! │    formula over the same line items reproduces the same cents.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use suds_core::money::Money;
//!
//! // Create from cents (preferred)
//! let rate = Money::from_cents(1250); // $12.50 per garment
//!
//! // Arithmetic operations
//! let line = rate * 3;                       // $37.50
//! let total = line + Money::from_cents(500); // $42.50
//!
//! // NEVER do this:
//! // let bad = Money::from_float(12.50); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product tier rate ──► CartLine.unit_rate ──► line subtotal             │
/// │                                                                         │
/// │  subtotal ──► cart discount ──► tax ──► Order.total                     │
/// │                                                                         │
/// │  Order line items ──► per-item refund ──► Return.refund_amount          │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use suds_core::money::Money;
    ///
    /// let rate = Money::from_cents(1250); // Represents $12.50
    /// assert_eq!(rate.cents(), 1250);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two amounts.
    ///
    /// Used to clamp a cart discount so it never exceeds the subtotal.
    #[inline]
    pub fn clamp_at(&self, ceiling: Money) -> Money {
        Money(self.0.min(ceiling.0))
    }

    /// Multiplies a per-unit rate by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use suds_core::money::Money;
    ///
    /// let wash_and_iron = Money::from_cents(2000); // $20.00 per garment
    /// let line = wash_and_iron.times(3);
    /// assert_eq!(line.cents(), 6000); // $60.00
    /// ```
    #[inline]
    pub const fn times(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns the fraction of this amount given in basis points.
    ///
    /// ## Arguments
    /// * `bps` - Fraction in basis points (1000 = 10%)
    ///
    /// ## Rounding
    /// Integer math with half-up rounding: `(amount × bps + 5000) / 10000`.
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use suds_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(2000); // $20.00
    /// assert_eq!(subtotal.fraction_bps(1000).cents(), 200); // 10% = $2.00
    /// ```
    pub fn fraction_bps(&self, bps: u32) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (1000 = 10%)
    ///
    /// ## Example
    /// ```rust
    /// use suds_core::money::Money;
    ///
    /// let line = Money::from_cents(5000); // $50.00
    /// let discounted = line.less_percent(1000); // 10% off
    /// assert_eq!(discounted.cents(), 4500); // $45.00
    /// ```
    pub fn less_percent(&self, discount_bps: u32) -> Money {
        *self - self.fraction_bps(discount_bps)
    }

    /// Calculates tax to be ADDED on top of this amount (tax-exclusive).
    ///
    /// Used at checkout: the discounted subtotal does not yet contain tax.
    ///
    /// ## Example
    /// ```rust
    /// use suds_core::money::Money;
    /// use suds_core::types::TaxRate;
    ///
    /// let discounted = Money::from_cents(1000); // $10.00
    /// let tax = discounted.calculate_tax(TaxRate::from_bps(500)); // 5%
    /// assert_eq!(tax.cents(), 50); // $0.50 on top
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.fraction_bps(rate.bps())
    }

    /// Calculates the tax already CONTAINED in this amount (tax-inclusive).
    ///
    /// Used when redisplaying a stored order's billing breakdown: the saved
    /// total is treated as including tax. The pre-tax portion is
    /// `amount / (1 + rate)`, rounded once; the tax is the exact complement,
    /// so `pre_tax + tax == amount` always holds.
    ///
    /// ## Example
    /// ```rust
    /// use suds_core::money::Money;
    /// use suds_core::types::TaxRate;
    ///
    /// let total = Money::from_cents(1050); // $10.50 incl. 5% tax
    /// let tax = total.inclusive_tax_portion(TaxRate::from_bps(500));
    /// assert_eq!(tax.cents(), 50);
    /// assert_eq!((total - tax).cents(), 1000);
    /// ```
    pub fn inclusive_tax_portion(&self, rate: TaxRate) -> Money {
        let divisor = 10000i128 + rate.bps() as i128;
        let pre_tax = (self.0 as i128 * 10000 + divisor / 2) / divisor;
        Money::from_cents(self.0 - pre_tax as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Sum of an iterator of Money values.
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
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
        let money = Money::from_cents(1250);
        assert_eq!(money.cents(), 1250);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1250)), "$12.50");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_cents(100), Money::from_cents(250)];
        let total: Money = lines.iter().copied().sum();
        assert_eq!(total.cents(), 350);
    }

    #[test]
    fn test_fraction_bps_rounding() {
        // $10.00 at 8.25% = $0.825 → $0.83 (half-up)
        let amount = Money::from_cents(1000);
        assert_eq!(amount.fraction_bps(825).cents(), 83);

        // $10.00 at 10% = exactly $1.00
        assert_eq!(amount.fraction_bps(1000).cents(), 100);
    }

    #[test]
    fn test_less_percent() {
        let line = Money::from_cents(5000);
        assert_eq!(line.less_percent(1000).cents(), 4500);
        assert_eq!(line.less_percent(0).cents(), 5000);
        assert_eq!(line.less_percent(10000).cents(), 0);
    }

    #[test]
    fn test_exclusive_tax() {
        // $10.00 at 5% = $0.50 added on top
        let discounted = Money::from_cents(1000);
        let tax = discounted.calculate_tax(TaxRate::from_bps(500));
        assert_eq!(tax.cents(), 50);
    }

    #[test]
    fn test_inclusive_tax_round_trip() {
        // Round-trip property: pre_tax + tax == amount, exactly
        for cents in [1050, 999, 1, 123_456_789] {
            let amount = Money::from_cents(cents);
            let tax = amount.inclusive_tax_portion(TaxRate::from_bps(500));
            let pre_tax = amount - tax;
            assert_eq!((pre_tax + tax).cents(), cents);
            assert!(!tax.is_negative());
        }
    }

    #[test]
    fn test_inclusive_tax_zero_rate() {
        let amount = Money::from_cents(1000);
        let tax = amount.inclusive_tax_portion(TaxRate::zero());
        assert_eq!(tax.cents(), 0);
    }

    #[test]
    fn test_clamp_at() {
        let discount = Money::from_cents(20000); // flat $200 discount
        let subtotal = Money::from_cents(2000); // on a $20 cart
        assert_eq!(discount.clamp_at(subtotal).cents(), 2000);
        assert_eq!(subtotal.clamp_at(discount).cents(), 2000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_times() {
        let rate = Money::from_cents(299);
        assert_eq!(rate.times(3).cents(), 897);
    }
}
