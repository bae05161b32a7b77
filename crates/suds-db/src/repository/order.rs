//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CHECKOUT (service layer)                                           │
//! │     └── insert_order() + insert_item()×N → Order { status: Pending }   │
//! │                                                                         │
//! │  2. PICKUP / DELIVERY                                                  │
//! │     └── complete() → Order { status: Completed }                       │
//! │     └── update_delivery() for COD sub-status                           │
//! │                                                                         │
//! │  3. (TERMINAL) CANCEL or RETURN                                        │
//! │     └── cancel()        → Order { status: Cancelled }                  │
//! │     └── mark_returned() → Order { status: Returned }  (one-shot)       │
//! │                                                                         │
//! │  All transitions are guarded UPDATEs: the WHERE clause names the       │
//! │  statuses the transition is legal from, and rows_affected() == 0       │
//! │  means the order was not in such a status.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use suds_core::{CodPaymentStatus, DeliveryStatus, Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = r#"
    id, customer_id,
    subtotal_cents, discount_cents, tax_cents, total_cents,
    payment_method, cash_amount_cents, card_amount_cents,
    status, delivery_status, cod_payment_status, notes,
    created_at, updated_at
"#;

const ORDER_ITEM_COLUMNS: &str = r#"
    id, order_id, product_id, name_snapshot, service,
    unit_rate_cents, quantity, discount_bps, subtotal_cents, created_at
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order.
    pub async fn insert_order(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = %order.total_cents, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id,
                subtotal_cents, discount_cents, tax_cents, total_cents,
                payment_method, cash_amount_cents, card_amount_cents,
                status, delivery_status, cod_payment_status, notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(order.payment_method)
        .bind(order.cash_amount_cents)
        .bind(order.card_amount_cents)
        .bind(order.status)
        .bind(order.delivery_status)
        .bind(order.cod_payment_status)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts an order line item.
    ///
    /// ## Snapshot Pattern
    /// Product name and the selected tier rate are copied onto the item.
    /// This preserves the order history even if the product changes later,
    /// and it is what return refunds are computed from.
    pub async fn insert_item(&self, item: &OrderItem) -> DbResult<()> {
        debug!(order_id = %item.order_id, product_id = %item.product_id, "Inserting order item");

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, name_snapshot, service,
                unit_rate_cents, quantity, discount_bps, subtotal_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(item.service)
        .bind(item.unit_rate_cents)
        .bind(item.quantity)
        .bind(item.discount_bps)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order =
            sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(order)
    }

    /// Gets all line items for an order, in checkout order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            r#"
            SELECT {ORDER_ITEM_COLUMNS} FROM order_items
            WHERE order_id = ?1
            ORDER BY created_at, id
            "#
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_by_customer(&self, customer_id: &str, limit: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        ))
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists orders in a given status, newest first.
    pub async fn list_by_status(&self, status: OrderStatus, limit: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE status = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Marks a pending order completed (garments picked up / delivered).
    pub async fn complete(&self, order_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'completed', updated_at = ?2 WHERE id = ?1 AND status = 'pending'",
        )
        .bind(order_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        Ok(())
    }

    /// Cancels a pending order.
    pub async fn cancel(&self, order_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'cancelled', updated_at = ?2 WHERE id = ?1 AND status = 'pending'",
        )
        .bind(order_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        Ok(())
    }

    /// Updates COD delivery/collection sub-status.
    ///
    /// Only applies to COD orders that are not in a terminal status.
    pub async fn update_delivery(
        &self,
        order_id: &str,
        delivery_status: DeliveryStatus,
        cod_payment_status: CodPaymentStatus,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                delivery_status = ?2,
                cod_payment_status = ?3,
                updated_at = ?4
            WHERE id = ?1
              AND payment_method = 'cod'
              AND status NOT IN ('cancelled', 'returned')
            "#,
        )
        .bind(order_id)
        .bind(delivery_status)
        .bind(cod_payment_status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("COD order", order_id));
        }

        Ok(())
    }

    /// Flips an order to `returned`. One-shot and irreversible.
    ///
    /// The WHERE clause is the idempotency guard: only orders not yet in a
    /// terminal status can transition, so a second return attempt (or a
    /// concurrent one) affects zero rows and reports `false`.
    pub async fn mark_returned(&self, order_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = 'returned', updated_at = ?2
            WHERE id = ?1 AND status IN ('pending', 'completed')
            "#,
        )
        .bind(order_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use suds_core::{PaymentMethod, ServiceTier};

    async fn seed_customer(db: &Database, id: &str) {
        db.customers()
            .insert(&suds_core::Customer {
                id: id.to_string(),
                name: "Test Customer".to_string(),
                phone: None,
                address: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    fn sample_order(id: &str, customer_id: &str, method: PaymentMethod) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            subtotal_cents: 2000,
            discount_cents: 0,
            tax_cents: 100,
            total_cents: 2100,
            payment_method: method,
            cash_amount_cents: None,
            card_amount_cents: None,
            status: OrderStatus::Pending,
            delivery_status: matches!(method, PaymentMethod::Cod).then_some(DeliveryStatus::Pending),
            cod_payment_status: matches!(method, PaymentMethod::Cod)
                .then_some(CodPaymentStatus::Unpaid),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_customer(&db, "C00001").await;
        let repo = db.orders();

        repo.insert_order(&sample_order("TRX000001", "C00001", PaymentMethod::Cash))
            .await
            .unwrap();

        let order = repo.get_by_id("TRX000001").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(order.total_cents, 2100);
    }

    #[tokio::test]
    async fn test_status_transitions_guarded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_customer(&db, "C00001").await;
        let repo = db.orders();

        repo.insert_order(&sample_order("TRX000001", "C00001", PaymentMethod::Cash))
            .await
            .unwrap();

        repo.complete("TRX000001").await.unwrap();
        // Completing twice finds no pending order
        assert!(repo.complete("TRX000001").await.is_err());
        // Cancelling a completed order is refused
        assert!(repo.cancel("TRX000001").await.is_err());
    }

    #[tokio::test]
    async fn test_mark_returned_is_one_shot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_customer(&db, "C00001").await;
        let repo = db.orders();

        repo.insert_order(&sample_order("TRX000001", "C00001", PaymentMethod::Cash))
            .await
            .unwrap();

        assert!(repo.mark_returned("TRX000001").await.unwrap());
        assert!(!repo.mark_returned("TRX000001").await.unwrap());

        let order = repo.get_by_id("TRX000001").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Returned);
    }

    #[tokio::test]
    async fn test_update_delivery_only_for_cod() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_customer(&db, "C00001").await;
        let repo = db.orders();

        repo.insert_order(&sample_order("TRX000001", "C00001", PaymentMethod::Cod))
            .await
            .unwrap();
        repo.insert_order(&sample_order("TRX000002", "C00001", PaymentMethod::Cash))
            .await
            .unwrap();

        repo.update_delivery(
            "TRX000001",
            DeliveryStatus::Delivered,
            CodPaymentStatus::Collected,
        )
        .await
        .unwrap();

        let cod = repo.get_by_id("TRX000001").await.unwrap().unwrap();
        assert_eq!(cod.delivery_status, Some(DeliveryStatus::Delivered));
        assert_eq!(cod.cod_payment_status, Some(CodPaymentStatus::Collected));

        // Non-COD order rejects delivery updates
        assert!(repo
            .update_delivery(
                "TRX000002",
                DeliveryStatus::Delivered,
                CodPaymentStatus::Collected,
            )
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_items_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_customer(&db, "C00001").await;
        let repo = db.orders();

        repo.insert_order(&sample_order("TRX000001", "C00001", PaymentMethod::Cash))
            .await
            .unwrap();

        // Items reference a product row
        let product_id = {
            let product = suds_core::Product {
                id: uuid::Uuid::new_v4().to_string(),
                name: "Dress Shirt".to_string(),
                category: "shirts".to_string(),
                barcode: "SHIRT-001".to_string(),
                description: None,
                iron_rate_cents: 1000,
                wash_and_iron_rate_cents: 2000,
                dry_clean_rate_cents: 5000,
                track_stock: false,
                current_stock: None,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            db.products().insert(&product).await.unwrap();
            product.id
        };

        repo.insert_item(&OrderItem {
            id: "ITM000001".to_string(),
            order_id: "TRX000001".to_string(),
            product_id: product_id.clone(),
            name_snapshot: "Dress Shirt".to_string(),
            service: ServiceTier::WashAndIron,
            unit_rate_cents: 2000,
            quantity: 1,
            discount_bps: 0,
            subtotal_cents: 2000,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

        let items = repo.get_items("TRX000001").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].service, ServiceTier::WashAndIron);
        assert_eq!(items[0].product_id, product_id);
    }
}
