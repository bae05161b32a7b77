//! # Product Service
//!
//! Product registration and cashier lookup.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use suds_core::validation::{validate_barcode, validate_name, validate_rate_cents};
use suds_core::{Product, ValidationError};

use crate::error::DbError;
use crate::pool::Database;

/// Product operation failure modes.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Product persistence failed: {0}")]
    Persistence(#[from] DbError),
}

/// Per-unit rates for the three service tiers, in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRates {
    pub iron_cents: i64,
    pub wash_and_iron_cents: i64,
    pub dry_clean_cents: i64,
}

/// Orchestrates product registration and lookup.
#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
}

impl ProductService {
    /// Creates a product service.
    pub fn new(db: Database) -> Self {
        ProductService { db }
    }

    /// Registers a new garment type under a fresh UUID.
    ///
    /// All three tier rates are required and validated up front: a product
    /// can never enter the catalog with a missing or negative rate.
    pub async fn create(
        &self,
        name: &str,
        category: &str,
        barcode: &str,
        rates: TierRates,
        description: Option<String>,
        initial_stock: Option<i64>,
    ) -> Result<Product, ProductError> {
        validate_name(name)?;
        validate_barcode(barcode)?;
        validate_rate_cents(rates.iron_cents)?;
        validate_rate_cents(rates.wash_and_iron_cents)?;
        validate_rate_cents(rates.dry_clean_cents)?;

        debug!(name = %name, barcode = %barcode, "Creating product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            category: category.trim().to_string(),
            barcode: barcode.trim().to_string(),
            description,
            iron_rate_cents: rates.iron_cents,
            wash_and_iron_rate_cents: rates.wash_and_iron_cents,
            dry_clean_rate_cents: rates.dry_clean_cents,
            track_stock: initial_stock.is_some(),
            current_stock: initial_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.products().insert(&product).await?;

        info!(product_id = %product.id, barcode = %product.barcode, "Product created");
        Ok(product)
    }

    /// Cashier lookup: exact barcode match first (the scan path), then
    /// name/barcode substring search.
    pub async fn lookup(&self, query: &str, limit: i64) -> Result<Vec<Product>, ProductError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(product) = self.db.products().get_by_barcode(query).await? {
            return Ok(vec![product]);
        }

        Ok(self.db.products().search(query, limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    fn shirt_rates() -> TierRates {
        TierRates {
            iron_cents: 1000,
            wash_and_iron_cents: 2000,
            dry_clean_cents: 5000,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_barcode() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = ProductService::new(db.clone());

        let product = service
            .create("Dress Shirt", "shirts", "SHIRT-001", shirt_rates(), None, None)
            .await
            .unwrap();
        assert!(!product.track_stock);

        let found = service.lookup("SHIRT-001", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, product.id);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_rate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = ProductService::new(db.clone());

        let err = service
            .create(
                "Dress Shirt",
                "shirts",
                "SHIRT-001",
                TierRates {
                    iron_cents: -1,
                    wash_and_iron_cents: 2000,
                    dry_clean_cents: 5000,
                },
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::Validation(_)));
    }

    #[tokio::test]
    async fn test_lookup_falls_back_to_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = ProductService::new(db.clone());

        service
            .create("Dress Shirt", "shirts", "SHIRT-001", shirt_rates(), None, None)
            .await
            .unwrap();
        service
            .create("Duvet Cover", "bedding", "DUVET-001", shirt_rates(), None, None)
            .await
            .unwrap();

        let found = service.lookup("duvet", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].barcode, "DUVET-001");

        assert!(service.lookup("", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initial_stock_enables_tracking() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = ProductService::new(db.clone());

        let product = service
            .create("Detergent", "retail", "DET-001", shirt_rates(), None, Some(12))
            .await
            .unwrap();
        assert!(product.track_stock);
        assert_eq!(product.current_stock, Some(12));
    }
}
