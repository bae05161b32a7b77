//! # Return Service
//!
//! Processes returns against an order: validate, compute refunds from the
//! original line items, persist, restock, flip the order status.
//!
//! ## Side-Effect Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Return Processing                                    │
//! │                                                                         │
//! │  0. VALIDATE (zero side effects on failure)                            │
//! │     ├── order exists and is not in a terminal status                   │
//! │     ├── every entry resolves to a product (id, else barcode lookup)    │
//! │     └── reconcile against original line items (suds-core)              │
//! │                                                                         │
//! │  1. MINT IDS          R return id, RI item ids                         │
//! │  2. PERSIST           return row, then item rows                       │
//! │     └── item failure → compensating delete of the return row           │
//! │         (best effort, NOT a transaction; a failed cleanup is           │
//! │          surfaced as CleanupFailed for manual reconciliation)          │
//! │  3. RESTOCK           atomic increment per tracked product            │
//! │     └── failures are logged, not fatal                                 │
//! │  4. FLIP STATUS       orders.mark_returned - the one-shot guard;       │
//! │     └── a lost race here deletes our return and reports Conflict       │
//! │                                                                         │
//! │  Each later step depends on the earlier one's output, so the order     │
//! │  is fixed. There is no un-return.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use suds_core::returns::{reconcile_return, ResolvedReturnItem};
use suds_core::sequence::prefixes;
use suds_core::validation::{validate_reason, validate_uuid};
use suds_core::{CoreError, Return, ReturnItem};

use crate::config::PosConfig;
use crate::error::DbError;
use crate::pool::Database;
use crate::sequence::IdGenerator;

// =============================================================================
// Request / Response Types
// =============================================================================

/// One entry of a return request as received from the counter.
///
/// Identity resolution prefers the product id; a barcode is accepted as
/// fallback when the id is absent (the cashier scanned the garment tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequestItem {
    pub product_id: Option<String>,
    pub barcode: Option<String>,
    pub quantity: i64,
}

/// A fully processed return.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedReturn {
    pub record: Return,
    pub items: Vec<ReturnItem>,
    /// True when every line of the order was returned at full quantity.
    pub is_complete: bool,
}

// =============================================================================
// Errors
// =============================================================================

/// Return processing failure modes.
///
/// `Validation` means the request was rejected before any write and had
/// zero side effects. `Persistence` means storage failed mid-flight but
/// compensation succeeded, so retrying is safe. `CleanupFailed` means the
/// store holds an orphaned return record that needs manual reconciliation.
#[derive(Debug, Error)]
pub enum ReturnError {
    /// Precondition violation (bad quantity, unknown product, empty
    /// request, negative refund). Carries the offending item index.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// Referenced order does not exist.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order was already returned (or cancelled): the idempotency
    /// guard tripped. No side effects.
    #[error("Order {order_id} is {status}, cannot be returned")]
    Conflict { order_id: String, status: String },

    /// Storage failed after validation passed.
    #[error("Return processing failed: {0}")]
    Persistence(#[from] DbError),

    /// Return record persisted, items failed, AND the compensating delete
    /// failed too. The orphaned record is inspectable under `return_id`.
    #[error("Return {return_id} partially persisted; cleanup failed: {source}")]
    CleanupFailed { return_id: String, source: DbError },
}

// =============================================================================
// Return Service
// =============================================================================

/// Orchestrates return processing end to end.
#[derive(Debug, Clone)]
pub struct ReturnService {
    db: Database,
    ids: IdGenerator,
    config: PosConfig,
}

impl ReturnService {
    /// Creates a return service with the persisted sequence store.
    pub fn new(db: Database, config: PosConfig) -> Self {
        let ids = IdGenerator::sql(db.pool().clone(), config.retry_policy());
        ReturnService { db, ids, config }
    }

    /// Creates a return service with an explicit id generator.
    pub fn with_id_generator(db: Database, config: PosConfig, ids: IdGenerator) -> Self {
        ReturnService { db, ids, config }
    }

    /// Processes a return against an order.
    ///
    /// Refunds are recomputed from the ORIGINAL order line items (frozen
    /// rate, tier and line discount) - never from caller-supplied figures -
    /// so a refund can never exceed what was charged. A complete return
    /// (every line at full quantity) refunds exactly the sum the lines
    /// were charged at.
    pub async fn process_return(
        &self,
        order_id: &str,
        requested: &[ReturnRequestItem],
        reason: Option<String>,
    ) -> Result<ProcessedReturn, ReturnError> {
        debug!(order_id = %order_id, entries = requested.len(), "process_return requested");

        validate_reason(reason.as_deref()).map_err(CoreError::from)?;

        // -- Preconditions, no side effects past this block --------------

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ReturnError::NotFound(order_id.to_string()))?;

        if order.status.is_terminal() {
            return Err(ReturnError::Conflict {
                order_id: order_id.to_string(),
                status: order.status.to_string(),
            });
        }

        let resolved = self.resolve_items(requested).await?;
        let order_items = self.db.orders().get_items(order_id).await?;
        let reconciliation = reconcile_return(&order_items, &resolved)?;

        // -- Side effects, in dependency order ---------------------------

        let return_id = self
            .ids
            .next_id(prefixes::RETURN, self.config.id_width_return)
            .await?;
        let now = Utc::now();

        let record = Return {
            id: return_id.clone(),
            order_id: order_id.to_string(),
            reason,
            refund_amount_cents: reconciliation.total_refund.cents(),
            created_at: now,
        };
        self.db.returns().insert_return(&record).await?;

        let mut items = Vec::with_capacity(reconciliation.lines.len());
        for line in &reconciliation.lines {
            let item_id = match self
                .ids
                .next_id(prefixes::RETURN_ITEM, self.config.id_width_return_item)
                .await
            {
                Ok(id) => id,
                Err(e) => return Err(self.compensate(&return_id, e).await),
            };
            let item = ReturnItem {
                id: item_id,
                return_id: return_id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                refund_amount_cents: line.refund.cents(),
                created_at: now,
            };
            if let Err(e) = self.db.returns().insert_item(&item).await {
                return Err(self.compensate(&return_id, e).await);
            }
            items.push(item);
        }

        // Restock returned quantities. Only tracked products move; a
        // failure here leaves the refund valid, so it is reported, not
        // propagated.
        for line in &reconciliation.lines {
            if let Err(e) = self
                .db
                .products()
                .increment_stock(&line.product_id, line.quantity)
                .await
            {
                warn!(
                    return_id = %return_id,
                    product_id = %line.product_id,
                    error = %e,
                    "restock failed after return; stock level needs review"
                );
            }
        }

        // One-shot status flip. A concurrent return that won the race
        // leaves zero rows affected; our records are then withdrawn.
        match self.db.orders().mark_returned(order_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    order_id = %order_id,
                    return_id = %return_id,
                    "order was returned concurrently; withdrawing duplicate return"
                );
                let _ = self.db.returns().delete_return(&return_id).await;
                return Err(ReturnError::Conflict {
                    order_id: order_id.to_string(),
                    status: "returned".to_string(),
                });
            }
            Err(e) => return Err(self.compensate(&return_id, e).await),
        }

        info!(
            return_id = %return_id,
            order_id = %order_id,
            refund = %reconciliation.total_refund,
            complete = reconciliation.is_complete,
            "Return processed"
        );

        Ok(ProcessedReturn {
            record,
            items,
            is_complete: reconciliation.is_complete,
        })
    }

    /// Resolves request entries to concrete product ids.
    ///
    /// Prefers the explicit product id; falls back to barcode lookup.
    /// Resolution must succeed for every entry or the whole request fails.
    async fn resolve_items(
        &self,
        requested: &[ReturnRequestItem],
    ) -> Result<Vec<ResolvedReturnItem>, ReturnError> {
        let mut resolved = Vec::with_capacity(requested.len());

        for (index, entry) in requested.iter().enumerate() {
            let product_id = if let Some(id) = &entry.product_id {
                validate_uuid(id).map_err(CoreError::from)?;
                id.clone()
            } else if let Some(barcode) = &entry.barcode {
                match self.db.products().get_by_barcode(barcode).await? {
                    Some(product) => product.id,
                    None => {
                        return Err(CoreError::ReturnItemUnresolved {
                            item_index: index,
                            reference: barcode.clone(),
                        }
                        .into())
                    }
                }
            } else {
                return Err(CoreError::ReturnItemUnresolved {
                    item_index: index,
                    reference: "(none)".to_string(),
                }
                .into());
            };

            resolved.push(ResolvedReturnItem {
                index,
                product_id,
                quantity: entry.quantity,
            });
        }

        Ok(resolved)
    }

    /// Best-effort removal of a partially persisted return.
    async fn compensate(&self, return_id: &str, cause: DbError) -> ReturnError {
        match self.db.returns().delete_return(return_id).await {
            Ok(()) => {
                warn!(
                    return_id = %return_id,
                    error = %cause,
                    "return withdrawn after partial persistence"
                );
                ReturnError::Persistence(cause)
            }
            Err(cleanup_err) => {
                error!(
                    return_id = %return_id,
                    cause = %cause,
                    cleanup_error = %cleanup_err,
                    "orphaned return record left behind; manual reconciliation required"
                );
                ReturnError::CleanupFailed {
                    return_id: return_id.to_string(),
                    source: cleanup_err,
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PosConfig;
    use crate::pool::DbConfig;
    use crate::service::checkout::{CheckoutService, PaymentDetails};
    use suds_core::{Cart, CartDiscount, OrderStatus, PaymentMethod, Product, ServiceTier};
    use uuid::Uuid;

    async fn test_db() -> Database {
        // RUST_LOG=debug cargo test -p suds-db shows the service logs
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn zero_tax_config() -> PosConfig {
        PosConfig {
            tax_rate_bps: 0,
            ..PosConfig::default()
        }
    }

    async fn seed_customer(db: &Database) -> String {
        let customer = suds_core::Customer {
            id: "C00001".to_string(),
            name: "Jordan Vale".to_string(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        };
        db.customers().insert(&customer).await.unwrap();
        customer.id
    }

    async fn seed_product(
        db: &Database,
        barcode: &str,
        rates: (i64, i64, i64),
        stock: Option<i64>,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: format!("Garment {}", barcode),
            category: "shirts".to_string(),
            barcode: barcode.to_string(),
            description: None,
            iron_rate_cents: rates.0,
            wash_and_iron_rate_cents: rates.1,
            dry_clean_rate_cents: rates.2,
            track_stock: stock.is_some(),
            current_stock: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    /// Checks out the reference order from the worked example:
    /// Product A qty 3 @ $20.00 wash-and-iron, Product B qty 1 @ $50.00
    /// dry-clean with 10% line discount. Total (no tax, no cart discount)
    /// = 60 + 45 = $105.00.
    async fn seed_reference_order(db: &Database) -> (String, Product, Product) {
        let customer_id = seed_customer(db).await;
        let a = seed_product(db, "SHIRT-A", (500, 2000, 9000), None).await;
        let b = seed_product(db, "COAT-B", (700, 3000, 5000), None).await;

        let mut cart = Cart::new();
        cart.add_line(&a, ServiceTier::WashAndIron, 3).unwrap();
        cart.add_line(&b, ServiceTier::DryClean, 1).unwrap();
        cart.set_line_discount(&b.id, ServiceTier::DryClean, 1000)
            .unwrap();

        let checkout = CheckoutService::new(db.clone(), zero_tax_config());
        let receipt = checkout
            .checkout(
                &cart,
                &customer_id,
                PaymentDetails::simple(PaymentMethod::Cash),
                CartDiscount::none(),
            )
            .await
            .unwrap();

        assert_eq!(receipt.order.total_cents, 10500);
        (receipt.order.id, a, b)
    }

    fn by_id(product: &Product, quantity: i64) -> ReturnRequestItem {
        ReturnRequestItem {
            product_id: Some(product.id.clone()),
            barcode: None,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_complete_return_refunds_order_total() {
        let db = test_db().await;
        let (order_id, a, b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let processed = service
            .process_return(
                &order_id,
                &[by_id(&a, 3), by_id(&b, 1)],
                Some("order cancelled at pickup".to_string()),
            )
            .await
            .unwrap();

        assert!(processed.is_complete);
        assert_eq!(processed.record.refund_amount_cents, 10500);
        assert_eq!(processed.record.id, "R00001");
        assert_eq!(processed.items.len(), 2);
        assert!(processed.items.iter().all(|i| i.id.starts_with("RI")));

        // Refund equals the order's total-paid amount
        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(processed.record.refund_amount_cents, order.total_cents);
        assert_eq!(order.status, OrderStatus::Returned);

        // Records are queryable as one unit
        let stored = db.returns().get_by_id("R00001").await.unwrap().unwrap();
        assert_eq!(stored.order_id, order_id);
        assert_eq!(db.returns().get_items("R00001").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_return_refunds_requested_slice() {
        let db = test_db().await;
        let (order_id, a, _b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let processed = service
            .process_return(&order_id, &[by_id(&a, 2)], None)
            .await
            .unwrap();

        assert!(!processed.is_complete);
        // 2 of 3 wash-and-iron @ $20.00
        assert_eq!(processed.record.refund_amount_cents, 4000);

        // Status still flips: a return is a terminal event for the order
        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Returned);
    }

    #[tokio::test]
    async fn test_double_return_conflicts_with_no_side_effects() {
        let db = test_db().await;
        let (order_id, a, b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        service
            .process_return(&order_id, &[by_id(&a, 3), by_id(&b, 1)], None)
            .await
            .unwrap();

        let err = service
            .process_return(&order_id, &[by_id(&a, 1)], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReturnError::Conflict { .. }));

        // Exactly one return on record
        assert_eq!(db.returns().list_by_order(&order_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_excess_quantity_rejected_with_item_index() {
        let db = test_db().await;
        let (order_id, a, _b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let err = service
            .process_return(&order_id, &[by_id(&a, 5)], None)
            .await
            .unwrap_err();

        match err {
            ReturnError::Validation(CoreError::ReturnQuantityExceedsOrdered {
                item_index,
                ordered,
                requested,
                ..
            }) => {
                assert_eq!(item_index, 0);
                assert_eq!(ordered, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Zero side effects: no return rows, order untouched
        assert!(db.returns().list_by_order(&order_id).await.unwrap().is_empty());
        let order = db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_order_not_found() {
        let db = test_db().await;
        seed_customer(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let err = service
            .process_return(
                "TRX999999",
                &[ReturnRequestItem {
                    product_id: Some("whatever".to_string()),
                    barcode: None,
                    quantity: 1,
                }],
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReturnError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_request_rejected() {
        let db = test_db().await;
        let (order_id, _a, _b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let err = service.process_return(&order_id, &[], None).await.unwrap_err();
        assert!(matches!(
            err,
            ReturnError::Validation(CoreError::EmptyReturnRequest)
        ));
    }

    #[tokio::test]
    async fn test_barcode_fallback_resolution() {
        let db = test_db().await;
        let (order_id, a, b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let processed = service
            .process_return(
                &order_id,
                &[
                    ReturnRequestItem {
                        product_id: None,
                        barcode: Some(a.barcode.clone()),
                        quantity: 3,
                    },
                    ReturnRequestItem {
                        product_id: None,
                        barcode: Some(b.barcode.clone()),
                        quantity: 1,
                    },
                ],
                None,
            )
            .await
            .unwrap();

        assert!(processed.is_complete);
        assert_eq!(processed.record.refund_amount_cents, 10500);
    }

    #[tokio::test]
    async fn test_unresolvable_reference_rejected() {
        let db = test_db().await;
        let (order_id, _a, _b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let err = service
            .process_return(
                &order_id,
                &[ReturnRequestItem {
                    product_id: None,
                    barcode: Some("NO-SUCH-TAG".to_string()),
                    quantity: 1,
                }],
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReturnError::Validation(CoreError::ReturnItemUnresolved { item_index: 0, .. })
        ));
        assert!(db.returns().list_by_order(&order_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_return_restocks_tracked_products() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;
        let product = seed_product(&db, "BAG-001", (500, 500, 500), Some(10)).await;

        let mut cart = Cart::new();
        cart.add_line(&product, ServiceTier::Iron, 4).unwrap();

        let checkout = CheckoutService::new(db.clone(), zero_tax_config());
        let receipt = checkout
            .checkout(
                &cart,
                &customer_id,
                PaymentDetails::simple(PaymentMethod::Cash),
                CartDiscount::none(),
            )
            .await
            .unwrap();
        assert_eq!(
            db.products()
                .get_by_id(&product.id)
                .await
                .unwrap()
                .unwrap()
                .current_stock,
            Some(6)
        );

        let service = ReturnService::new(db.clone(), zero_tax_config());
        service
            .process_return(&receipt.order.id, &[by_id(&product, 3)], None)
            .await
            .unwrap();

        assert_eq!(
            db.products()
                .get_by_id(&product.id)
                .await
                .unwrap()
                .unwrap()
                .current_stock,
            Some(9)
        );
    }

    #[tokio::test]
    async fn test_refund_mirrors_original_line_discount() {
        let db = test_db().await;
        let (order_id, _a, b) = seed_reference_order(&db).await;

        let service = ReturnService::new(db.clone(), zero_tax_config());
        let processed = service
            .process_return(&order_id, &[by_id(&b, 1)], None)
            .await
            .unwrap();

        // B was charged 1 × $50.00 × 0.9 = $45.00; refund must match
        assert_eq!(processed.record.refund_amount_cents, 4500);
    }
}
