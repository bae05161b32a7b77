//! # Validation Module
//!
//! Input validation utilities for Suds POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate cashier feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation before any write      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / CHECK constraints                             │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: a validation failure NEVER produces side effects    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::PaymentMethod;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use suds_core::validation::validate_barcode;
///
/// assert!(validate_barcode("SHIRT-001").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("has space").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 50,
        });
    }

    if !barcode
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product or customer name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an optional return reason.
///
/// Empty/absent is fine; an overly long reason is rejected.
pub fn validate_reason(reason: Option<&str>) -> ValidationResult<()> {
    if let Some(reason) = reason {
        if reason.len() > 500 {
            return Err(ValidationError::TooLong {
                field: "reason".to_string(),
                max: 500,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a per-unit rate in cents.
///
/// Zero is allowed (promotional items); negative is not.
pub fn validate_rate_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "rate".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount in basis points (0% to 100%).
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Payment Validators
// =============================================================================

/// Validates split-tender amounts against the order total.
///
/// ## Rules
/// - `Both`: cash and card portions required, non-negative, and summing
///   exactly to the total
/// - Any other method: split portions must be absent
pub fn validate_payment_split(
    method: PaymentMethod,
    cash_cents: Option<i64>,
    card_cents: Option<i64>,
    total_cents: i64,
) -> ValidationResult<()> {
    match method {
        PaymentMethod::Both => {
            let cash = cash_cents.ok_or_else(|| ValidationError::Required {
                field: "cash_amount".to_string(),
            })?;
            let card = card_cents.ok_or_else(|| ValidationError::Required {
                field: "card_amount".to_string(),
            })?;
            if cash < 0 {
                return Err(ValidationError::MustBePositive {
                    field: "cash_amount".to_string(),
                });
            }
            if card < 0 {
                return Err(ValidationError::MustBePositive {
                    field: "card_amount".to_string(),
                });
            }
            if cash + card != total_cents {
                return Err(ValidationError::InvalidFormat {
                    field: "payment_split".to_string(),
                    reason: format!(
                        "cash {} + card {} must equal total {}",
                        cash, card, total_cents
                    ),
                });
            }
            Ok(())
        }
        _ => {
            if cash_cents.is_some() || card_cents.is_some() {
                return Err(ValidationError::InvalidFormat {
                    field: "payment_split".to_string(),
                    reason: "split amounts only apply to the 'both' payment method".to_string(),
                });
            }
            Ok(())
        }
    }
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format (product primary keys).
///
/// ## Example
/// ```rust
/// use suds_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("SHIRT-001").is_ok());
        assert!(validate_barcode("BC_123").is_ok());

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Dress Shirt").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_rate_cents() {
        assert!(validate_rate_cents(0).is_ok());
        assert!(validate_rate_cents(1250).is_ok());
        assert!(validate_rate_cents(-100).is_err());
    }

    #[test]
    fn test_validate_discount_bps() {
        assert!(validate_discount_bps(0).is_ok());
        assert!(validate_discount_bps(10000).is_ok());
        assert!(validate_discount_bps(10001).is_err());
    }

    #[test]
    fn test_validate_payment_split_both() {
        assert!(validate_payment_split(PaymentMethod::Both, Some(600), Some(450), 1050).is_ok());
        assert!(validate_payment_split(PaymentMethod::Both, Some(600), Some(400), 1050).is_err());
        assert!(validate_payment_split(PaymentMethod::Both, None, Some(1050), 1050).is_err());
        assert!(validate_payment_split(PaymentMethod::Both, Some(-1), Some(1051), 1050).is_err());
    }

    #[test]
    fn test_validate_payment_split_other_methods() {
        assert!(validate_payment_split(PaymentMethod::Cash, None, None, 1050).is_ok());
        assert!(validate_payment_split(PaymentMethod::Cash, Some(1050), None, 1050).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason(None).is_ok());
        assert!(validate_reason(Some("shrunk in the wash")).is_ok());
        assert!(validate_reason(Some(&"x".repeat(600))).is_err());
    }
}
