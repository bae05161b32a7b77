//! # Order Totals
//!
//! Pure computation of cart/order totals: line subtotals, cart-level
//! discount, tax and grand total.
//!
//! ## Computation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Totals Pipeline                                    │
//! │                                                                         │
//! │  per line:  quantity × tier rate × (1 − line discount)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal = Σ line subtotals                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount = percentage-of-subtotal  OR  flat amount                    │
//! │             (clamped: never exceeds subtotal)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discounted = subtotal − discount                                      │
//! │       │                                                                 │
//! │       ├── Exclusive: tax = discounted × rate                           │
//! │       │              total = discounted + tax                          │
//! │       │                                                                 │
//! │       └── Inclusive: tax = portion already inside discounted           │
//! │                      total = discounted (unchanged)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is deterministic and side-effect free: calling
//! `compute_totals` twice with identical inputs yields identical output.
//! The same `line_subtotal` formula prices checkout lines AND return
//! refunds, which is what makes a complete return reconcile exactly
//! against the order total.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartDiscount, TaxMode, TaxRate};

// =============================================================================
// Totals
// =============================================================================

/// Computed totals for a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of all line subtotals, before cart discount and tax.
    pub subtotal: Money,
    /// Cart-level discount amount actually applied (post-clamp).
    pub discount: Money,
    /// Tax amount (added on top for Exclusive, carved out for Inclusive).
    pub tax: Money,
    /// Grand total payable.
    pub total: Money,
}

impl Totals {
    /// Totals of an empty cart.
    pub const fn zero() -> Self {
        Totals {
            subtotal: Money::zero(),
            discount: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
        }
    }
}

// =============================================================================
// Line Subtotal
// =============================================================================

/// Prices a single line: `quantity × unit rate × (1 − discount)`.
///
/// The one formula shared by checkout pricing and refund computation.
/// Rounds exactly once, when the line discount is applied.
///
/// ## Example
/// ```rust
/// use suds_core::money::Money;
/// use suds_core::totals::line_subtotal;
///
/// // 1 garment @ $50.00 dry-clean with 10% line discount
/// let line = line_subtotal(Money::from_cents(5000), 1, 1000);
/// assert_eq!(line.cents(), 4500);
/// ```
pub fn line_subtotal(unit_rate: Money, quantity: i64, discount_bps: u32) -> Money {
    unit_rate.times(quantity).less_percent(discount_bps)
}

// =============================================================================
// Cart/Order Totals
// =============================================================================

/// Computes subtotal, discount, tax and total from line subtotals.
///
/// ## Arguments
/// * `line_subtotals` - already-priced lines (see [`line_subtotal`])
/// * `cart_discount` - cart-level discount; clamped to the subtotal
/// * `tax_rate` - tax rate in basis points
/// * `mode` - tax convention, chosen explicitly per call site
///
/// ## Example
/// ```rust
/// use suds_core::money::Money;
/// use suds_core::totals::{compute_totals, line_subtotal};
/// use suds_core::types::{CartDiscount, TaxMode, TaxRate};
///
/// // 2 shirts @ $10.00 iron rate, $10 flat cart discount, 5% tax on top
/// let lines = [line_subtotal(Money::from_cents(1000), 2, 0)];
/// let totals = compute_totals(
///     lines,
///     CartDiscount::Flat(Money::from_cents(1000)),
///     TaxRate::from_bps(500),
///     TaxMode::Exclusive,
/// );
/// assert_eq!(totals.subtotal.cents(), 2000);
/// assert_eq!(totals.discount.cents(), 1000);
/// assert_eq!(totals.tax.cents(), 50);
/// assert_eq!(totals.total.cents(), 1050);
/// ```
pub fn compute_totals(
    line_subtotals: impl IntoIterator<Item = Money>,
    cart_discount: CartDiscount,
    tax_rate: TaxRate,
    mode: TaxMode,
) -> Totals {
    let subtotal: Money = line_subtotals.into_iter().sum();
    let discount = cart_discount.amount_against(subtotal);
    let discounted = subtotal - discount;

    let (tax, total) = match mode {
        TaxMode::Exclusive => {
            let tax = discounted.calculate_tax(tax_rate);
            (tax, discounted + tax)
        }
        TaxMode::Inclusive => {
            let tax = discounted.inclusive_tax_portion(tax_rate);
            (tax, discounted)
        }
    };

    Totals {
        subtotal,
        discount,
        tax,
        total,
    }
}

// =============================================================================
// Inclusive Billing Breakdown
// =============================================================================

/// Pre-tax/tax split of a stored amount that already contains tax.
///
/// Used when redisplaying a previously saved order's billing details:
/// the saved total is not recomputed, only decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InclusiveBreakdown {
    pub pre_tax: Money,
    pub tax: Money,
}

/// Decomposes a tax-inclusive amount into pre-tax and tax portions.
///
/// Guarantees `pre_tax + tax == amount` exactly (the tax is derived as
/// the complement of the rounded pre-tax portion).
pub fn inclusive_breakdown(amount: Money, tax_rate: TaxRate) -> InclusiveBreakdown {
    let tax = amount.inclusive_tax_portion(tax_rate);
    InclusiveBreakdown {
        pre_tax: amount - tax,
        tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
