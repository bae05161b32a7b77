//! # Checkout Service
//!
//! Turns a cart into a persisted order.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Flow                                     │
//! │                                                                         │
//! │  1. VALIDATE (no side effects)                                         │
//! │     ├── cart non-empty, quantities and discounts in range              │
//! │     ├── customer exists                                                │
//! │     ├── totals computed (Exclusive tax at checkout)                    │
//! │     ├── split-tender amounts sum to the total                          │
//! │     └── tracked products have sufficient stock                         │
//! │                                                                         │
//! │  2. MINT IDS                                                           │
//! │     └── TRX order id, ITM item ids (fatal on failure: nothing          │
//! │         is persisted under a missing id)                               │
//! │                                                                         │
//! │  3. PERSIST                                                            │
//! │     └── order row, then item rows (snapshot pattern)                   │
//! │                                                                         │
//! │  4. STOCK                                                              │
//! │     └── atomic guarded decrement per tracked product; a lost race      │
//! │         is logged, not fatal                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use suds_core::sequence::prefixes;
use suds_core::totals::{inclusive_breakdown, InclusiveBreakdown, Totals};
use suds_core::validation::{validate_discount_bps, validate_payment_split, validate_quantity};
use suds_core::{
    Cart, CartDiscount, CodPaymentStatus, CoreError, DeliveryStatus, Money, Order, OrderItem,
    OrderStatus, PaymentMethod, Product, ValidationError,
};

use crate::config::PosConfig;
use crate::error::DbError;
use crate::pool::Database;
use crate::sequence::IdGenerator;

// =============================================================================
// Request / Response Types
// =============================================================================

/// How the customer is paying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    /// Cash portion for split tender; `None` otherwise.
    pub cash_amount_cents: Option<i64>,
    /// Card portion for split tender; `None` otherwise.
    pub card_amount_cents: Option<i64>,
}

impl PaymentDetails {
    /// Single-method payment without a split.
    pub fn simple(method: PaymentMethod) -> Self {
        PaymentDetails {
            method,
            cash_amount_cents: None,
            card_amount_cents: None,
        }
    }

    /// Split tender: part cash, part card.
    pub fn split(cash_amount_cents: i64, card_amount_cents: i64) -> Self {
        PaymentDetails {
            method: PaymentMethod::Both,
            cash_amount_cents: Some(cash_amount_cents),
            card_amount_cents: Some(card_amount_cents),
        }
    }
}

/// Everything the receipt UI needs after checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub totals: Totals,
}

// =============================================================================
// Errors
// =============================================================================

/// Checkout failure modes.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Malformed input; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Business rule violation; nothing was written.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error("Checkout persistence failed: {0}")]
    Persistence(#[from] DbError),
}

// =============================================================================
// Checkout Service
// =============================================================================

/// Orchestrates cart → order persistence.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    ids: IdGenerator,
    config: PosConfig,
}

impl CheckoutService {
    /// Creates a checkout service with the persisted sequence store.
    pub fn new(db: Database, config: PosConfig) -> Self {
        let ids = IdGenerator::sql(db.pool().clone(), config.retry_policy());
        CheckoutService { db, ids, config }
    }

    /// Creates a checkout service with an explicit id generator
    /// (swappable for isolated harnesses).
    pub fn with_id_generator(db: Database, config: PosConfig, ids: IdGenerator) -> Self {
        CheckoutService { db, ids, config }
    }

    /// Checks out a cart for a customer.
    ///
    /// All validation happens before any write; a validation failure has
    /// zero side effects.
    pub async fn checkout(
        &self,
        cart: &Cart,
        customer_id: &str,
        payment: PaymentDetails,
        cart_discount: CartDiscount,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        debug!(customer_id = %customer_id, lines = cart.line_count(), "checkout requested");

        if cart.is_empty() {
            return Err(ValidationError::Required {
                field: "cart".to_string(),
            }
            .into());
        }
        for line in &cart.lines {
            validate_quantity(line.quantity)?;
            validate_discount_bps(line.discount_bps)?;
        }
        if let CartDiscount::Percentage(bps) = cart_discount {
            validate_discount_bps(bps)?;
        }

        self.db
            .customers()
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        // Checkout always prices tax-exclusive (the configured mode);
        // the Inclusive convention only ever applies to stored-order
        // redisplay via billing_breakdown.
        let totals = cart.totals(
            cart_discount,
            self.config.tax_rate(),
            self.config.checkout_tax_mode,
        );

        validate_payment_split(
            payment.method,
            payment.cash_amount_cents,
            payment.card_amount_cents,
            totals.total.cents(),
        )?;

        // Stock pre-check against current rows. The later decrement
        // re-checks atomically; this pass exists to reject before writing.
        let mut tracked: Vec<(&suds_core::CartLine, Product)> = Vec::new();
        for line in &cart.lines {
            let product = self
                .db
                .products()
                .get_by_id(&line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            if product.track_stock {
                let available = product.current_stock.unwrap_or(0);
                if available < line.quantity {
                    return Err(CoreError::InsufficientStock {
                        name: product.name,
                        available,
                        requested: line.quantity,
                    }
                    .into());
                }
                tracked.push((line, product));
            }
        }

        let order_id = self
            .ids
            .next_id(prefixes::ORDER, self.config.id_width_order)
            .await?;
        let now = Utc::now();

        let is_cod = payment.method == PaymentMethod::Cod;
        let order = Order {
            id: order_id.clone(),
            customer_id: customer_id.to_string(),
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            payment_method: payment.method,
            cash_amount_cents: payment.cash_amount_cents,
            card_amount_cents: payment.card_amount_cents,
            status: OrderStatus::Pending,
            delivery_status: is_cod.then_some(DeliveryStatus::Pending),
            cod_payment_status: is_cod.then_some(CodPaymentStatus::Unpaid),
            notes: None,
            created_at: now,
            updated_at: now,
        };

        self.db.orders().insert_order(&order).await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let item_id = self
                .ids
                .next_id(prefixes::ORDER_ITEM, self.config.id_width_order_item)
                .await?;
            let item = OrderItem {
                id: item_id,
                order_id: order_id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                service: line.service,
                unit_rate_cents: line.unit_rate_cents,
                quantity: line.quantity,
                discount_bps: line.discount_bps,
                subtotal_cents: line.subtotal().cents(),
                created_at: now,
            };
            self.db.orders().insert_item(&item).await?;
            items.push(item);
        }

        for (line, product) in tracked {
            let decremented = self
                .db
                .products()
                .try_decrement_stock(&product.id, line.quantity)
                .await?;
            if !decremented {
                // Lost a race with a concurrent checkout since the
                // pre-check; the order stands, stock needs a recount.
                warn!(
                    order_id = %order_id,
                    product_id = %product.id,
                    quantity = line.quantity,
                    "stock decrement refused after checkout; stock level needs review"
                );
            }
        }

        info!(
            order_id = %order_id,
            customer_id = %customer_id,
            total = %totals.total,
            items = items.len(),
            "Order created"
        );

        Ok(CheckoutReceipt {
            order,
            items,
            totals,
        })
    }

    /// Billing breakdown of a stored order for redisplay.
    ///
    /// The saved discounted subtotal is treated as tax-INCLUSIVE and only
    /// decomposed; totals are never recomputed here.
    pub async fn billing_breakdown(
        &self,
        order_id: &str,
    ) -> Result<InclusiveBreakdown, CheckoutError> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        let discounted = Money::from_cents(order.subtotal_cents - order.discount_cents);
        Ok(inclusive_breakdown(discounted, self.config.tax_rate()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
