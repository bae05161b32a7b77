//! # Return Repository
//!
//! Database operations for returns and return items.
//!
//! A Return and its ReturnItems are one logical unit, but they are written
//! as separate inserts (no transaction - the compensating delete in the
//! return service is the cleanup path when item persistence fails partway).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use suds_core::{Return, ReturnItem};

const RETURN_COLUMNS: &str = "id, order_id, reason, refund_amount_cents, created_at";
const RETURN_ITEM_COLUMNS: &str = "id, return_id, product_id, quantity, refund_amount_cents, created_at";

/// Repository for return database operations.
#[derive(Debug, Clone)]
pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    /// Creates a new ReturnRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReturnRepository { pool }
    }

    /// Inserts a return record.
    pub async fn insert_return(&self, ret: &Return) -> DbResult<()> {
        debug!(id = %ret.id, order_id = %ret.order_id, refund = %ret.refund_amount_cents, "Inserting return");

        sqlx::query(
            r#"
            INSERT INTO returns (id, order_id, reason, refund_amount_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&ret.id)
        .bind(&ret.order_id)
        .bind(&ret.reason)
        .bind(ret.refund_amount_cents)
        .bind(ret.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a return item.
    pub async fn insert_item(&self, item: &ReturnItem) -> DbResult<()> {
        debug!(return_id = %item.return_id, product_id = %item.product_id, "Inserting return item");

        sqlx::query(
            r#"
            INSERT INTO return_items (
                id, return_id, product_id, quantity, refund_amount_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.return_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.refund_amount_cents)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a return record (compensating cleanup).
    ///
    /// `ON DELETE CASCADE` removes any items that did make it in.
    /// Deleting an already-absent return is not an error.
    pub async fn delete_return(&self, return_id: &str) -> DbResult<()> {
        debug!(id = %return_id, "Deleting return (compensation)");

        sqlx::query("DELETE FROM returns WHERE id = ?1")
            .bind(return_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets a return by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Return>> {
        let ret = sqlx::query_as::<_, Return>(&format!(
            "SELECT {RETURN_COLUMNS} FROM returns WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ret)
    }

    /// Gets all items of a return.
    pub async fn get_items(&self, return_id: &str) -> DbResult<Vec<ReturnItem>> {
        let items = sqlx::query_as::<_, ReturnItem>(&format!(
            r#"
            SELECT {RETURN_ITEM_COLUMNS} FROM return_items
            WHERE return_id = ?1
            ORDER BY created_at, id
            "#
        ))
        .bind(return_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists returns recorded against an order.
    pub async fn list_by_order(&self, order_id: &str) -> DbResult<Vec<Return>> {
        let returns = sqlx::query_as::<_, Return>(&format!(
            r#"
            SELECT {RETURN_COLUMNS} FROM returns
            WHERE order_id = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(returns)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
