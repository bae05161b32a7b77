//! # Cart
//!
//! The cashier-facing cart: lines are added per product AND service tier,
//! with the tier rate frozen at add time.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Scan barcode ───────────► add_line(product, tier, qty)                │
//! │                              │  merges into existing line when the     │
//! │                              │  same product+tier is already present   │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity(product, tier, qty)         │
//! │                              │  qty 0 removes the line                 │
//! │                                                                         │
//! │  Apply line discount ────► set_line_discount(product, tier, bps)       │
//! │                                                                         │
//! │  Checkout ───────────────► totals(cart_discount, tax_rate, mode)       │
//! │                              │  delegates to totals::compute_totals    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rate Freezing
//! The tier rate is captured when the line is added. If the product's rates
//! change afterwards, the cart keeps pricing at the captured rate - the
//! same snapshot pattern order items use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::totals::{self, Totals};
use crate::types::{CartDiscount, Product, ServiceTier, TaxMode, TaxRate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart: one product at one service tier.
///
/// The same product may appear on several lines under different tiers
/// (iron two shirts, dry-clean a third).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product ID (UUID).
    pub product_id: String,

    /// Barcode at time of adding (frozen).
    pub barcode: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Selected service tier.
    pub service: ServiceTier,

    /// Per-unit rate in cents at time of adding (frozen).
    pub unit_rate_cents: i64,

    /// Quantity in cart.
    pub quantity: i64,

    /// Per-line discount in basis points (0..=10000).
    pub discount_bps: u32,

    /// When this line was added to the cart.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a product, freezing the tier rate.
    pub fn from_product(product: &Product, service: ServiceTier, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            service,
            unit_rate_cents: product.rate_for(service).cents(),
            quantity,
            discount_bps: 0,
            added_at: Utc::now(),
        }
    }

    /// Line subtotal: quantity × frozen rate × (1 − line discount).
    pub fn subtotal(&self) -> Money {
        totals::line_subtotal(
            Money::from_cents(self.unit_rate_cents),
            self.quantity,
            self.discount_bps,
        )
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cashier's cart.
///
/// ## Invariants
/// - Lines are unique by (product_id, service tier)
/// - Quantity is always > 0 (setting 0 removes the line)
/// - Maximum lines and per-line quantity are bounded (crate constants)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the cart.
    pub lines: Vec<CartLine>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn find_line_mut(&mut self, product_id: &str, service: ServiceTier) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.service == service)
    }

    /// Adds a product at a service tier, merging quantity into an existing
    /// line for the same product+tier.
    pub fn add_line(
        &mut self,
        product: &Product,
        service: ServiceTier,
        quantity: i64,
    ) -> CoreResult<()> {
        if let Some(line) = self.find_line_mut(&product.id, service) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        self.lines
            .push(CartLine::from_product(product, service, quantity));
        Ok(())
    }

    /// Updates the quantity of a line. Quantity 0 removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        service: ServiceTier,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id, service);
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        match self.find_line_mut(product_id, service) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Sets the per-line discount (basis points, 0..=10000).
    pub fn set_line_discount(
        &mut self,
        product_id: &str,
        service: ServiceTier,
        discount_bps: u32,
    ) -> CoreResult<()> {
        if discount_bps > 10000 {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 10000,
            }
            .into());
        }
        match self.find_line_mut(product_id, service) {
            Some(line) => {
                line.discount_bps = discount_bps;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Removes a line by product ID and tier.
    pub fn remove_line(&mut self, product_id: &str, service: ServiceTier) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines
            .retain(|l| !(l.product_id == product_id && l.service == service));

        if self.lines.len() == initial_len {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Computes the cart subtotal (before cart discount and tax).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal()).sum()
    }

    /// Computes full totals for this cart.
    pub fn totals(&self, cart_discount: CartDiscount, tax_rate: TaxRate, mode: TaxMode) -> Totals {
        totals::compute_totals(
            self.lines.iter().map(|l| l.subtotal()),
            cart_discount,
            tax_rate,
            mode,
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
