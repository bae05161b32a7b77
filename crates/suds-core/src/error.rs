//! # Error Types
//!
//! Domain-specific error types for suds-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  suds-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations (not-found,           │
//! │  │                      conflicts, refund bounds)                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  suds-db errors (separate crate)                                       │
//! │  ├── DbError          - Persistence failures                           │
//! │  └── ReturnError      - Multi-step return processing outcomes          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → service error → API boundary      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order id, item index, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found (by id or barcode).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A return request listed no items.
    #[error("Return request must contain at least one item")]
    EmptyReturnRequest,

    /// A requested item could not be resolved to a product in the order.
    ///
    /// The item index points at the offending entry of the request so
    /// the cashier UI can highlight it.
    #[error("Return item {item_index}: product {product_ref} is not part of the order")]
    ProductNotInOrder {
        item_index: usize,
        product_ref: String,
    },

    /// A return request entry carried no resolvable product reference
    /// (no product id, and barcode lookup found nothing).
    #[error("Return item {item_index}: could not resolve product reference '{reference}'")]
    ReturnItemUnresolved {
        item_index: usize,
        reference: String,
    },

    /// Requested return quantity exceeds what was originally ordered.
    ///
    /// ## User Workflow
    /// ```text
    /// Return request (qty: 5)
    ///      │
    ///      ▼
    /// Original order line: qty 3
    ///      │
    ///      ▼
    /// ReturnQuantityExceedsOrdered { item_index: 0, ordered: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 were ordered"
    /// ```
    #[error(
        "Return item {item_index}: requested quantity {requested} exceeds ordered quantity {ordered}"
    )]
    ReturnQuantityExceedsOrdered {
        item_index: usize,
        product_id: String,
        ordered: i64,
        requested: i64,
    },

    /// A computed per-item refund came out negative.
    /// Indicates corrupt line-item data; the return is rejected wholesale.
    #[error("Return item {item_index}: computed refund for {product_id} is negative")]
    NegativeRefund {
        item_index: usize,
        product_id: String,
    },

    /// Insufficient stock to complete checkout for a tracked product.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, bad barcode characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
