//! # Product Repository
//!
//! Database operations for products: CRUD, barcode lookup, search, and
//! atomic stock adjustments.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use suds_core::Product;

const PRODUCT_COLUMNS: &str = r#"
    id, name, category, barcode, description,
    iron_rate_cents, wash_and_iron_rate_cents, dry_clean_rate_cents,
    track_stock, current_stock, is_active,
    created_at, updated_at
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, barcode = %product.barcode, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, barcode, description,
                iron_rate_cents, wash_and_iron_rate_cents, dry_clean_rate_cents,
                track_stock, current_stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.iron_rate_cents)
        .bind(product.wash_and_iron_rate_cents)
        .bind(product.dry_clean_rate_cents)
        .bind(product.track_stock)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its barcode (the scan path).
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1 AND is_active = 1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches active products by name or barcode.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Product>> {
        let pattern = format!("%{}%", query);
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE is_active = 1 AND (name LIKE ?1 OR barcode LIKE ?1)
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products in a category.
    pub async fn list_by_category(&self, category: &str, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE is_active = 1 AND category = ?1
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Updates the three tier rates of a product.
    pub async fn update_rates(
        &self,
        id: &str,
        iron_rate_cents: i64,
        wash_and_iron_rate_cents: i64,
        dry_clean_rate_cents: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                iron_rate_cents = ?2,
                wash_and_iron_rate_cents = ?3,
                dry_clean_rate_cents = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(iron_rate_cents)
        .bind(wash_and_iron_rate_cents)
        .bind(dry_clean_rate_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Atomically adds stock back to a tracked product.
    ///
    /// Untracked products are a no-op: garments brought in by customers
    /// have nothing to restock.
    pub async fn increment_stock(&self, id: &str, quantity: i64) -> DbResult<()> {
        debug!(id = %id, quantity = %quantity, "Incrementing stock");

        sqlx::query(
            r#"
            UPDATE products SET
                current_stock = COALESCE(current_stock, 0) + ?2,
                updated_at = ?3
            WHERE id = ?1 AND track_stock = 1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically removes stock from a tracked product.
    ///
    /// The decrement only applies when enough stock is available - the
    /// guard and the write are one statement, so concurrent checkouts
    /// cannot both take the last unit.
    ///
    /// Returns `false` when the product is tracked but stock was
    /// insufficient (or the product is untracked/missing).
    pub async fn try_decrement_stock(&self, id: &str, quantity: i64) -> DbResult<bool> {
        debug!(id = %id, quantity = %quantity, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                current_stock = current_stock - ?2,
                updated_at = ?3
            WHERE id = ?1
              AND track_stock = 1
              AND current_stock IS NOT NULL
              AND current_stock >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
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
    use uuid::Uuid;

    fn sample_product(barcode: &str, track_stock: bool, stock: Option<i64>) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            name: "Dress Shirt".to_string(),
            category: "shirts".to_string(),
            barcode: barcode.to_string(),
            description: Some("button-down".to_string()),
            iron_rate_cents: 1000,
            wash_and_iron_rate_cents: 2000,
            dry_clean_rate_cents: 5000,
            track_stock,
            current_stock: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("SHIRT-001", false, None);
        repo.insert(&product).await.unwrap();

        let by_id = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Dress Shirt");
        assert_eq!(by_id.dry_clean_rate_cents, 5000);

        let by_barcode = repo.get_by_barcode("SHIRT-001").await.unwrap().unwrap();
        assert_eq!(by_barcode.id, product.id);

        assert!(repo.get_by_barcode("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("SHIRT-001", false, None))
            .await
            .unwrap();
        let err = repo
            .insert(&sample_product("SHIRT-001", false, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_matches_name_and_barcode() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&sample_product("SHIRT-001", false, None))
            .await
            .unwrap();

        assert_eq!(repo.search("dress", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("SHIRT-0", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("towel", 10).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_stock_decrement_guard() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("BAG-001", true, Some(3));
        repo.insert(&product).await.unwrap();

        assert!(repo.try_decrement_stock(&product.id, 2).await.unwrap());
        // Only 1 left: decrementing 2 must refuse and change nothing
        assert!(!repo.try_decrement_stock(&product.id, 2).await.unwrap());

        let current = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(current.current_stock, Some(1));
    }

    #[tokio::test]
    async fn test_stock_noop_for_untracked() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("SHIRT-001", false, None);
        repo.insert(&product).await.unwrap();

        assert!(!repo.try_decrement_stock(&product.id, 1).await.unwrap());
        repo.increment_stock(&product.id, 1).await.unwrap();

        let current = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(current.current_stock, None);
    }

    #[tokio::test]
    async fn test_update_rates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("SHIRT-001", false, None);
        repo.insert(&product).await.unwrap();

        repo.update_rates(&product.id, 1100, 2200, 5500).await.unwrap();

        let current = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(current.iron_rate_cents, 1100);
        assert_eq!(current.wash_and_iron_rate_cents, 2200);
        assert_eq!(current.dry_clean_rate_cents, 5500);

        assert!(repo.update_rates("missing", 1, 2, 3).await.is_err());
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_barcode_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = sample_product("SHIRT-001", false, None);
        repo.insert(&product).await.unwrap();
        repo.deactivate(&product.id).await.unwrap();

        assert!(repo.get_by_barcode("SHIRT-001").await.unwrap().is_none());
        // Still reachable by id for historical orders
        assert!(repo.get_by_id(&product.id).await.unwrap().is_some());
    }
}
