//! # Return Reconciliation
//!
//! The pure half of return processing: validating a requested set of
//! return quantities against an order's original line items and computing
//! the refund for each.
//!
//! ## Reconciliation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Refund Reconciliation                                │
//! │                                                                         │
//! │  Request: [{product, qty}, ...]       Order lines (frozen at checkout) │
//! │       │                                      │                          │
//! │       ▼                                      ▼                          │
//! │  per product: requested qty  ≤  Σ ordered qty for that product         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  refund = qty × ORIGINAL unit rate × (1 − ORIGINAL line discount)      │
//! │           (never user-supplied figures: a refund can never exceed      │
//! │            what was actually charged for those garments)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total refund = Σ per-item refunds                                     │
//! │                                                                         │
//! │  COMPLETE return (every line at full quantity):                        │
//! │    total refund == Σ line subtotals == order subtotal, exactly,        │
//! │    because the identical line formula is recomputed                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation failures carry the index of the offending request entry and
//! produce no partial result: either the whole request reconciles or the
//! whole request is rejected.
//!
//! The same product can appear on several order lines under different
//! service tiers. A requested quantity is allocated across that product's
//! lines in checkout order, so each allocated portion is refunded at the
//! rate and discount of the line it came from.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::totals::line_subtotal;
use crate::types::OrderItem;

// =============================================================================
// Request / Result Types
// =============================================================================

/// One entry of a return request, already resolved to a product id.
///
/// Barcode fallback resolution happens at the persistence boundary;
/// by the time reconciliation runs, identity is concrete. `index` points
/// back at the original request entry for error reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedReturnItem {
    /// Position in the original request (for error messages).
    pub index: usize,
    /// Resolved product id.
    pub product_id: String,
    /// Requested return quantity.
    pub quantity: i64,
}

/// Refund computed for one requested product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RefundLine {
    pub product_id: String,
    pub quantity: i64,
    pub refund: Money,
}

/// Outcome of reconciling a return request against an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Per-product refunds, in request order.
    pub lines: Vec<RefundLine>,
    /// Sum of all per-product refunds.
    pub total_refund: Money,
    /// True when every order line is returned at full original quantity.
    pub is_complete: bool,
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Validates a return request against an order's line items and computes
/// per-product refunds.
///
/// ## Preconditions enforced here
/// - request is non-empty
/// - no product is requested twice
/// - every requested quantity is a positive integer
/// - every requested product appears in the order
/// - requested quantity never exceeds the ordered quantity for that product
/// - every computed refund is non-negative
///
/// Any violation rejects the whole request with the offending entry's
/// index; nothing is partially reconciled.
pub fn reconcile_return(
    order_items: &[OrderItem],
    requested: &[ResolvedReturnItem],
) -> CoreResult<Reconciliation> {
    if requested.is_empty() {
        return Err(CoreError::EmptyReturnRequest);
    }

    // Reject the same product listed twice: summing duplicate entries
    // silently would let two entries each pass the per-entry bound while
    // jointly exceeding the ordered quantity.
    for (i, item) in requested.iter().enumerate() {
        if requested[..i].iter().any(|r| r.product_id == item.product_id) {
            return Err(CoreError::Validation(crate::error::ValidationError::Duplicate {
                field: "return item".to_string(),
                value: item.product_id.clone(),
            }));
        }
    }

    let mut lines = Vec::with_capacity(requested.len());
    let mut total_refund = Money::zero();

    for item in requested {
        if item.quantity <= 0 {
            return Err(CoreError::Validation(
                crate::error::ValidationError::MustBePositive {
                    field: format!("return item {} quantity", item.index),
                },
            ));
        }

        let product_lines: Vec<&OrderItem> = order_items
            .iter()
            .filter(|l| l.product_id == item.product_id)
            .collect();

        if product_lines.is_empty() {
            return Err(CoreError::ProductNotInOrder {
                item_index: item.index,
                product_ref: item.product_id.clone(),
            });
        }

        let ordered: i64 = product_lines.iter().map(|l| l.quantity).sum();
        if item.quantity > ordered {
            return Err(CoreError::ReturnQuantityExceedsOrdered {
                item_index: item.index,
                product_id: item.product_id.clone(),
                ordered,
                requested: item.quantity,
            });
        }

        // Allocate the requested quantity across the product's order lines
        // in checkout order, pricing each slice at its own line's frozen
        // rate and discount.
        let mut remaining = item.quantity;
        let mut refund = Money::zero();
        for line in &product_lines {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(line.quantity);
            refund += line_subtotal(line.unit_rate(), take, line.discount_bps);
            remaining -= take;
        }

        if refund.is_negative() {
            return Err(CoreError::NegativeRefund {
                item_index: item.index,
                product_id: item.product_id.clone(),
            });
        }

        total_refund += refund;
        lines.push(RefundLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            refund,
        });
    }

    let is_complete = order_items.iter().all(|line| {
        let requested_for_product: i64 = requested
            .iter()
            .filter(|r| r.product_id == line.product_id)
            .map(|r| r.quantity)
            .sum();
        let ordered_for_product: i64 = order_items
            .iter()
            .filter(|l| l.product_id == line.product_id)
            .map(|l| l.quantity)
            .sum();
        requested_for_product == ordered_for_product
    });

    Ok(Reconciliation {
        lines,
        total_refund,
        is_complete,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceTier;
    use chrono::Utc;

    fn order_item(
        product_id: &str,
        service: ServiceTier,
        rate: i64,
        qty: i64,
        discount_bps: u32,
    ) -> OrderItem {
        OrderItem {
            id: format!("ITM-{}-{}", product_id, service),
            order_id: "TRX000001".to_string(),
            product_id: product_id.to_string(),
            name_snapshot: format!("Garment {}", product_id),
            service,
            unit_rate_cents: rate,
            quantity: qty,
            discount_bps,
            subtotal_cents: line_subtotal(Money::from_cents(rate), qty, discount_bps).cents(),
            created_at: Utc::now(),
        }
    }

    fn request(entries: &[(&str, i64)]) -> Vec<ResolvedReturnItem> {
        entries
            .iter()
            .enumerate()
            .map(|(index, (product_id, quantity))| ResolvedReturnItem {
                index,
                product_id: product_id.to_string(),
                quantity: *quantity,
            })
            .collect()
    }

    #[test]
    fn test_complete_return_refunds_order_subtotal() {
        // Product A: qty 3 @ $20.00 wash-and-iron, 0% discount
        // Product B: qty 1 @ $50.00 dry-clean, 10% discount
        // Subtotal = 60.00 + 45.00 = 105.00
        let items = [
            order_item("A", ServiceTier::WashAndIron, 2000, 3, 0),
            order_item("B", ServiceTier::DryClean, 5000, 1, 1000),
        ];
        let rec = reconcile_return(&items, &request(&[("A", 3), ("B", 1)])).unwrap();

        assert!(rec.is_complete);
        assert_eq!(rec.total_refund.cents(), 10500);
        let stored: i64 = items.iter().map(|i| i.subtotal_cents).sum();
        assert_eq!(rec.total_refund.cents(), stored);
    }

    #[test]
    fn test_partial_return() {
        let items = [order_item("A", ServiceTier::Iron, 1000, 3, 0)];
        let rec = reconcile_return(&items, &request(&[("A", 2)])).unwrap();

        assert!(!rec.is_complete);
        assert_eq!(rec.total_refund.cents(), 2000);
        assert_eq!(rec.lines.len(), 1);
        assert_eq!(rec.lines[0].quantity, 2);
    }

    #[test]
    fn test_refund_uses_original_line_discount() {
        // 10% line discount was charged; refund mirrors it
        let items = [order_item("A", ServiceTier::DryClean, 5000, 2, 1000)];
        let rec = reconcile_return(&items, &request(&[("A", 1)])).unwrap();
        assert_eq!(rec.total_refund.cents(), 4500);
    }

    #[test]
    fn test_quantity_exceeding_ordered_rejected_with_index() {
        let items = [
            order_item("A", ServiceTier::WashAndIron, 2000, 3, 0),
            order_item("B", ServiceTier::DryClean, 5000, 1, 0),
        ];
        let err = reconcile_return(&items, &request(&[("A", 5)])).unwrap_err();
        match err {
            CoreError::ReturnQuantityExceedsOrdered {
                item_index,
                ordered,
                requested,
                ..
            } => {
                assert_eq!(item_index, 0);
                assert_eq!(ordered, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_product_rejected() {
        let items = [order_item("A", ServiceTier::Iron, 1000, 1, 0)];
        let err = reconcile_return(&items, &request(&[("ZZZ", 1)])).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotInOrder { item_index: 0, .. }));
    }

    #[test]
    fn test_empty_request_rejected() {
        let items = [order_item("A", ServiceTier::Iron, 1000, 1, 0)];
        let err = reconcile_return(&items, &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyReturnRequest));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let items = [order_item("A", ServiceTier::Iron, 1000, 1, 0)];
        assert!(reconcile_return(&items, &request(&[("A", 0)])).is_err());
        assert!(reconcile_return(&items, &request(&[("A", -2)])).is_err());
    }

    #[test]
    fn test_duplicate_product_entries_rejected() {
        // Two entries of 2 each would jointly exceed the ordered 3
        let items = [order_item("A", ServiceTier::Iron, 1000, 3, 0)];
        let err = reconcile_return(&items, &request(&[("A", 2), ("A", 2)])).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_multi_tier_allocation_prices_each_slice_at_its_line() {
        // Same product on two lines: 2 ironed @ $10.00, 1 dry-cleaned @ $50.00.
        // Returning all 3 must refund 2×10 + 1×50 = 70, not 3× either rate.
        let items = [
            order_item("A", ServiceTier::Iron, 1000, 2, 0),
            order_item("A", ServiceTier::DryClean, 5000, 1, 0),
        ];
        let rec = reconcile_return(&items, &request(&[("A", 3)])).unwrap();
        assert!(rec.is_complete);
        assert_eq!(rec.total_refund.cents(), 7000);

        // Partial return of 2 consumes the first (iron) line only
        let rec = reconcile_return(&items, &request(&[("A", 2)])).unwrap();
        assert!(!rec.is_complete);
        assert_eq!(rec.total_refund.cents(), 2000);
    }
}
