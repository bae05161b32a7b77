//! # suds-db: Database Layer for Suds POS
//!
//! This crate provides database access and the multi-step business
//! services for the Suds POS system. It uses SQLite for local storage
//! with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Suds POS Data Flow                               │
//! │                                                                         │
//! │  API handler (checkout / process_return / lookup)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     suds-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Sequences   │  │   │
//! │  │   │ checkout.rs   │───►│ product.rs    │    │ sequence.rs  │  │   │
//! │  │   │ returns.rs    │    │ order.rs      │◄───│ TRX, C, R,   │  │   │
//! │  │   │ customers.rs  │    │ returns.rs    │    │ RI, ITM      │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │   ┌───────────────┐    ┌───────▼───────┐    ┌──────────────┐  │   │
//! │  │   │  RetryPolicy  │    │   Database    │    │  Migrations  │  │   │
//! │  │   │  (backoff)    │    │   (pool.rs)   │    │  (embedded)  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`config`] - Env-loaded POS configuration
//! - [`retry`] - The one retry-with-backoff policy
//! - [`sequence`] - Sequence counter stores and the id generator
//! - [`repository`] - Repository implementations (product, order, etc.)
//! - [`service`] - Multi-step operations (checkout, returns, customers)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use suds_db::{Database, DbConfig, PosConfig};
//! use suds_db::service::{CheckoutService, ReturnService};
//!
//! let db = Database::new(DbConfig::new("path/to/suds.db")).await?;
//! let config = PosConfig::load()?;
//!
//! let checkout = CheckoutService::new(db.clone(), config.clone());
//! let receipt = checkout.checkout(&cart, "C00042", payment, discount).await?;
//!
//! let returns = ReturnService::new(db, config);
//! let processed = returns.process_return(&receipt.order.id, &items, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod retry;
pub mod sequence;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, PosConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use retry::RetryPolicy;
pub use sequence::{IdGenerator, MemorySequenceStore, SequenceStore, SqlSequenceStore};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::returns::ReturnRepository;

// Service re-exports
pub use service::{
    CheckoutError, CheckoutReceipt, CheckoutService, CustomerError, CustomerService,
    PaymentDetails, ProcessedReturn, ProductError, ProductService, ReturnError,
    ReturnRequestItem, ReturnService, TierRates,
};
