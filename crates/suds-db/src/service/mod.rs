//! # Services
//!
//! Multi-step business operations orchestrating repositories, the sequence
//! generator and suds-core math:
//!
//! - [`checkout`] - cart → persisted order (+ stock decrements)
//! - [`customers`] - customer creation with sequential `C` ids
//! - [`products`] - product registration and cashier lookup
//! - [`returns`] - return processing: validate, refund, persist, flip status
//!
//! Repositories stay dumb; every business decision and side-effect ordering
//! lives here.

pub mod checkout;
pub mod customers;
pub mod products;
pub mod returns;

pub use checkout::{CheckoutError, CheckoutReceipt, CheckoutService, PaymentDetails};
pub use customers::{CustomerError, CustomerService};
pub use products::{ProductError, ProductService, TierRates};
pub use returns::{ProcessedReturn, ReturnError, ReturnRequestItem, ReturnService};
