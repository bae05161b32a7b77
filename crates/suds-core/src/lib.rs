//! # suds-core: Pure Business Logic for Suds POS
//!
//! This crate is the **heart** of Suds POS, a laundry point-of-sale system.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Suds POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │    Cart UI ──► Checkout UI ──► Orders UI ──► Returns UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON API                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ suds-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  totals   │  │   cart    │  │   │
//! │  │   │  Product  │  │   Money   │  │ discounts │  │   Cart    │  │   │
//! │  │   │   Order   │  │  TaxRate  │  │ tax modes │  │ CartLine  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │ sequence  │  │ validation│                                 │   │
//! │  │   │ id format │  │   rules   │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    suds-db (Database Layer)                     │   │
//! │  │      SQLite repositories, sequences, checkout/return services   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Return, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`totals`] - Cart/order totals: discounts and dual tax conventions
//! - [`cart`] - The cashier cart with rate snapshotting
//! - [`returns`] - Return/refund reconciliation against an order's lines
//! - [`sequence`] - Human-readable sequential id formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use suds_core::money::Money;
//! use suds_core::totals::{compute_totals, line_subtotal};
//! use suds_core::types::{CartDiscount, TaxMode, TaxRate};
//!
//! // 2 shirts ironed @ $10.00 each, $10 flat discount, 5% tax on top
//! let lines = [line_subtotal(Money::from_cents(1000), 2, 0)];
//! let totals = compute_totals(
//!     lines,
//!     CartDiscount::Flat(Money::from_cents(1000)),
//!     TaxRate::from_bps(500),
//!     TaxMode::Exclusive,
//! );
//! assert_eq!(totals.total.cents(), 1050); // $10.50
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod returns;
pub mod sequence;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use suds_core::Money` instead of
// `use suds_core::money::Money`

pub use cart::{Cart, CartLine};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use returns::{reconcile_return, Reconciliation, RefundLine, ResolvedReturnItem};
pub use totals::{compute_totals, line_subtotal, Totals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps tickets printable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
