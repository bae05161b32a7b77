//! # Customer Service
//!
//! Customer creation with sequential `C` ids.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use suds_core::sequence::prefixes;
use suds_core::validation::validate_name;
use suds_core::{Customer, ValidationError};

use crate::config::PosConfig;
use crate::error::DbError;
use crate::pool::Database;
use crate::sequence::IdGenerator;

/// Customer operation failure modes.
#[derive(Debug, Error)]
pub enum CustomerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Customer persistence failed: {0}")]
    Persistence(#[from] DbError),
}

/// Orchestrates customer creation.
#[derive(Debug, Clone)]
pub struct CustomerService {
    db: Database,
    ids: IdGenerator,
    config: PosConfig,
}

impl CustomerService {
    /// Creates a customer service with the persisted sequence store.
    pub fn new(db: Database, config: PosConfig) -> Self {
        let ids = IdGenerator::sql(db.pool().clone(), config.retry_policy());
        CustomerService { db, ids, config }
    }

    /// Creates a customer service with an explicit id generator.
    pub fn with_id_generator(db: Database, config: PosConfig, ids: IdGenerator) -> Self {
        CustomerService { db, ids, config }
    }

    /// Registers a new customer under a fresh sequential id.
    pub async fn create(
        &self,
        name: &str,
        phone: Option<String>,
        address: Option<String>,
    ) -> Result<Customer, CustomerError> {
        validate_name(name)?;
        debug!(name = %name, "Creating customer");

        let id = self
            .ids
            .next_id(prefixes::CUSTOMER, self.config.id_width_customer)
            .await?;

        let customer = Customer {
            id: id.clone(),
            name: name.trim().to_string(),
            phone,
            address,
            created_at: Utc::now(),
        };
        self.db.customers().insert(&customer).await?;

        info!(customer_id = %id, "Customer created");
        Ok(customer)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CustomerService::new(db.clone(), PosConfig::default());

        let first = service.create("Jordan Vale", None, None).await.unwrap();
        let second = service
            .create("Sam Porter", Some("555-0101".to_string()), None)
            .await
            .unwrap();

        assert_eq!(first.id, "C00001");
        assert_eq!(second.id, "C00002");

        let stored = db.customers().get_by_id("C00002").await.unwrap().unwrap();
        assert_eq!(stored.name, "Sam Porter");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CustomerService::new(db.clone(), PosConfig::default());

        let err = service.create("   ", None, None).await.unwrap_err();
        assert!(matches!(err, CustomerError::Validation(_)));
    }
}
