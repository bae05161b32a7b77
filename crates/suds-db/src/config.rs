//! POS configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for a single-store deployment.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use suds_core::types::{TaxMode, TaxRate};

use crate::retry::RetryPolicy;

/// Store-level POS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosConfig {
    /// Tax rate in basis points (500 = 5%)
    pub tax_rate_bps: u32,

    /// Tax convention applied at checkout.
    /// Redisplay of stored billing breakdowns always uses Inclusive;
    /// this knob never changes that.
    pub checkout_tax_mode: TaxMode,

    /// Digit width for order ids (TRX000123)
    pub id_width_order: usize,

    /// Digit width for order item ids (ITM000456)
    pub id_width_order_item: usize,

    /// Digit width for customer ids (C00042)
    pub id_width_customer: usize,

    /// Digit width for return ids (R00007)
    pub id_width_return: usize,

    /// Digit width for return item ids (RI00019)
    pub id_width_return_item: usize,

    /// Max attempts for retryable persistence operations
    pub retry_max_attempts: u32,

    /// Base retry delay in milliseconds
    pub retry_base_delay_ms: u64,

    /// Exponential retry multiplier
    pub retry_multiplier: f64,
}

impl PosConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = PosConfig {
            tax_rate_bps: env::var("SUDS_TAX_RATE_BPS")
                .unwrap_or_else(|_| "500".to_string()) // 5%
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SUDS_TAX_RATE_BPS".to_string()))?,

            checkout_tax_mode: match env::var("SUDS_CHECKOUT_TAX_MODE")
                .unwrap_or_else(|_| "exclusive".to_string())
                .to_lowercase()
                .as_str()
            {
                "exclusive" => TaxMode::Exclusive,
                "inclusive" => TaxMode::Inclusive,
                _ => return Err(ConfigError::InvalidValue("SUDS_CHECKOUT_TAX_MODE".to_string())),
            },

            id_width_order: parse_env_or("SUDS_ID_WIDTH_ORDER", 6)?,
            id_width_order_item: parse_env_or("SUDS_ID_WIDTH_ORDER_ITEM", 6)?,
            id_width_customer: parse_env_or("SUDS_ID_WIDTH_CUSTOMER", 5)?,
            id_width_return: parse_env_or("SUDS_ID_WIDTH_RETURN", 5)?,
            id_width_return_item: parse_env_or("SUDS_ID_WIDTH_RETURN_ITEM", 5)?,

            retry_max_attempts: parse_env_or("SUDS_RETRY_MAX_ATTEMPTS", 5)?,
            retry_base_delay_ms: parse_env_or("SUDS_RETRY_BASE_DELAY_MS", 50)?,

            retry_multiplier: env::var("SUDS_RETRY_MULTIPLIER")
                .unwrap_or_else(|_| "2.0".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SUDS_RETRY_MULTIPLIER".to_string()))?,
        };

        suds_core::validation::validate_tax_rate_bps(config.tax_rate_bps)
            .map_err(|_| ConfigError::InvalidValue("SUDS_TAX_RATE_BPS".to_string()))?;

        Ok(config)
    }

    /// Returns the configured tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Returns the retry policy for retryable persistence operations.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
            self.retry_multiplier,
        )
    }
}

impl Default for PosConfig {
    fn default() -> Self {
        PosConfig {
            tax_rate_bps: 500,
            checkout_tax_mode: TaxMode::Exclusive,
            id_width_order: 6,
            id_width_order_item: 6,
            id_width_customer: 5,
            id_width_return: 5,
            id_width_return_item: 5,
            retry_max_attempts: 5,
            retry_base_delay_ms: 50,
            retry_multiplier: 2.0,
        }
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PosConfig::default();
        assert_eq!(config.tax_rate_bps, 500);
        assert_eq!(config.checkout_tax_mode, TaxMode::Exclusive);
        assert_eq!(config.id_width_order, 6);
        assert_eq!(config.id_width_customer, 5);
        assert_eq!(config.retry_policy().max_attempts, 5);
    }
}
