//! # Domain Types
//!
//! Core domain types used throughout Suds POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Return       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (TRX000123) │   │  id (R00042)    │       │
//! │  │  barcode        │   │  status         │   │  order_id       │       │
//! │  │  3 tier rates   │   │  total_cents    │   │  refund_amount  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ServiceTier    │   │  OrderStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Iron           │   │  Pending        │   │  Cash / Card    │       │
//! │  │  WashAndIron    │   │  Completed      │   │  Both (split)   │       │
//! │  │  DryClean       │   │  Cancelled      │   │  Cod / Credit   │       │
//! │  └─────────────────┘   │  Returned       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products carry a UUID v4 `id` (immutable, used for relations) plus a
//! `barcode` business key. Orders, customers, returns and line items carry
//! human-readable sequential ids (`TRX000123`, `C00042`, `R00007`, ...)
//! minted by the sequence generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (typical laundry service tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Tax Mode
// =============================================================================

/// Tax calculation convention.
///
/// The system deliberately supports both conventions as an explicit knob:
/// checkout computes tax on top of the discounted subtotal (Exclusive),
/// while redisplaying a stored order's billing breakdown treats the saved
/// amount as already containing tax (Inclusive). A call site always picks
/// one mode; the two are never merged or inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Tax added on top of the discounted subtotal (checkout).
    Exclusive,
    /// Discounted subtotal already contains tax (stored-order redisplay).
    Inclusive,
}

impl Default for TaxMode {
    fn default() -> Self {
        TaxMode::Exclusive
    }
}

// =============================================================================
// Service Tier
// =============================================================================

/// The service selected for a cart line: exactly one of three tiers,
/// each priced independently per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ServiceTier {
    /// Ironing only.
    Iron,
    /// Wash and iron.
    WashAndIron,
    /// Dry cleaning.
    DryClean,
}

impl ServiceTier {
    /// All tiers, in display order.
    pub const ALL: [ServiceTier; 3] = [
        ServiceTier::Iron,
        ServiceTier::WashAndIron,
        ServiceTier::DryClean,
    ];
}

impl std::fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceTier::Iron => write!(f, "iron"),
            ServiceTier::WashAndIron => write!(f, "wash_and_iron"),
            ServiceTier::DryClean => write!(f, "dry_clean"),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A garment type offered for laundry service.
///
/// Every product carries three independent per-unit rates, one per service
/// tier. All three are always present and non-negative; the legacy
/// single-price schema is not representable here.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Product category (e.g. "shirts", "bedding").
    pub category: String,

    /// Barcode - unique business lookup key.
    pub barcode: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Per-unit rate for the iron tier, in cents.
    pub iron_rate_cents: i64,

    /// Per-unit rate for the wash-and-iron tier, in cents.
    pub wash_and_iron_rate_cents: i64,

    /// Per-unit rate for the dry-clean tier, in cents.
    pub dry_clean_rate_cents: i64,

    /// Whether to track stock for this product.
    /// Stock tracking is optional: garments brought in by customers
    /// need no stock, while retail items (detergent, bags) do.
    pub track_stock: bool,

    /// Current stock level (meaningful only when track_stock is set).
    pub current_stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the per-unit rate for a service tier.
    ///
    /// A corrupt (negative) stored rate fails closed to zero rather than
    /// panicking or pricing a line negatively; persistence-layer validation
    /// reports such rows as data-quality defects.
    pub fn rate_for(&self, tier: ServiceTier) -> Money {
        let cents = match tier {
            ServiceTier::Iron => self.iron_rate_cents,
            ServiceTier::WashAndIron => self.wash_and_iron_rate_cents,
            ServiceTier::DryClean => self.dry_clean_rate_cents,
        };
        if cents < 0 {
            Money::zero()
        } else {
            Money::from_cents(cents)
        }
    }

    /// Checks whether all three tier rates are well-formed (non-negative).
    pub fn rates_are_valid(&self) -> bool {
        self.iron_rate_cents >= 0
            && self.wash_and_iron_rate_cents >= 0
            && self.dry_clean_rate_cents >= 0
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    /// Sequential human-readable id (prefix `C`, e.g. `C00042`).
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order taken, garments in process.
    Pending,
    /// Order paid and picked up.
    Completed,
    /// Order cancelled before completion. Terminal.
    Cancelled,
    /// Order fully or partially refunded via return processing. Terminal.
    Returned,
}

impl OrderStatus {
    /// Terminal statuses admit no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
            OrderStatus::Returned => write!(f, "returned"),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Split tender: part cash, part card. The split amounts must sum
    /// to the order total.
    Both,
    /// Cash on delivery; delivery/payment sub-status applies.
    Cod,
    /// On customer credit (account settled later).
    Credit,
}

// =============================================================================
// Delivery / COD Sub-Status
// =============================================================================

/// Delivery progress for COD orders. Meaningless for other payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    OutForDelivery,
    Delivered,
}

/// Collection state for COD orders. Meaningless for other payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CodPaymentStatus {
    Unpaid,
    Collected,
}

// =============================================================================
// Cart Discount
// =============================================================================

/// A single discount applied to the whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CartDiscount {
    /// Percentage of the cart subtotal, in basis points (1000 = 10%).
    Percentage(u32),
    /// Flat currency amount, taken literally.
    Flat(Money),
}

impl CartDiscount {
    /// No discount.
    pub const fn none() -> Self {
        CartDiscount::Flat(Money::zero())
    }

    /// Computes the discount amount against a subtotal.
    ///
    /// The result is clamped to the subtotal: a flat discount larger than
    /// the cart never produces a negative discounted subtotal.
    pub fn amount_against(&self, subtotal: Money) -> Money {
        let raw = match *self {
            CartDiscount::Percentage(bps) => subtotal.fraction_bps(bps),
            CartDiscount::Flat(amount) => amount,
        };
        raw.clamp_at(subtotal)
    }
}

impl Default for CartDiscount {
    fn default() -> Self {
        CartDiscount::none()
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order created at checkout.
///
/// Totals are derived once at checkout and frozen; line items are immutable
/// after creation. Return processing never mutates them - it creates
/// separate Return records and flips the order status.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    /// Sequential human-readable id (prefix `TRX`, e.g. `TRX000123`).
    pub id: String,
    pub customer_id: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// For `Both`: cash portion. Must sum with card portion to total.
    pub cash_amount_cents: Option<i64>,
    /// For `Both`: card portion.
    pub card_amount_cents: Option<i64>,
    pub status: OrderStatus,
    /// Only meaningful for COD orders.
    pub delivery_status: Option<DeliveryStatus>,
    /// Only meaningful for COD orders.
    pub cod_payment_status: Option<CodPaymentStatus>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    /// Sequential id (prefix `ITM`).
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of checkout (frozen).
    pub name_snapshot: String,
    /// Selected service tier. Determines which product rate applied.
    pub service: ServiceTier,
    /// Per-unit rate in cents at time of checkout (frozen).
    pub unit_rate_cents: i64,
    /// Quantity ordered.
    pub quantity: i64,
    /// Per-line discount in basis points (0..=10000).
    pub discount_bps: u32,
    /// Line subtotal: quantity × rate × (1 − discount), rounded once.
    pub subtotal_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the frozen unit rate as Money.
    #[inline]
    pub fn unit_rate(&self) -> Money {
        Money::from_cents(self.unit_rate_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Return
// =============================================================================

/// A processed return against an order.
/// Created exactly once per return operation; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Return {
    /// Sequential id (prefix `R`).
    pub id: String,
    pub order_id: String,
    pub reason: Option<String>,
    /// Total refunded, in cents. Sum of the per-item refunds.
    pub refund_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Return {
    /// Returns the total refund as Money.
    #[inline]
    pub fn refund_amount(&self) -> Money {
        Money::from_cents(self.refund_amount_cents)
    }
}

// =============================================================================
// Return Item
// =============================================================================

/// A single product's share of a return.
///
/// Invariant (application-enforced): returned quantity per product never
/// exceeds the quantity of that product in the referenced order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReturnItem {
    /// Sequential id (prefix `RI`).
    pub id: String,
    pub return_id: String,
    pub product_id: String,
    /// Quantity returned.
    pub quantity: i64,
    /// Refund for this item: quantity × original rate × (1 − original
    /// line discount), mirroring the checkout line-subtotal formula.
    pub refund_amount_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
