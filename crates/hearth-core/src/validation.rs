//! # Validation Module
//!
//! Input shape checks for catalog items, counts and cash amounts.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog add/update            Shift open/close/counts                  │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  validate_item_name            validate_count                           │
//! │  validate_unit                 validate_cash_cents                      │
//! │  validate_price_cents          validate_quantity_limit                  │
//! │       │                               │                                 │
//! │       └──────────► ValidationError ◄──┘                                 │
//! │                          │                                              │
//! │                          ▼                                              │
//! │                  CoreError::Validation                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A ledger quantity below one is a `CoreError::InvalidQuantity` raised by the
//! shift itself; only the upper limit lives here.
//!
//! ## Limits
//! Every count, quantity and price is capped so that the reconciliation
//! products (`sold × price`, `produced × cost`) stay far inside `i64`.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted item name.
pub const MAX_NAME_LEN: usize = 100;

/// Longest accepted display unit ("pcs", "loaf", "btl").
pub const MAX_UNIT_LEN: usize = 20;

/// Longest accepted item id.
pub const MAX_ID_LEN: usize = 64;

/// Largest single ledger entry (units produced, sold or discharged at once).
pub const MAX_QUANTITY: i64 = 100_000;

/// Largest beginning or ending inventory count for one item.
pub const MAX_COUNT: i64 = 1_000_000;

/// Largest catalog price: 1,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Largest cash drawer amount: 100,000,000.00.
pub const MAX_CASH_CENTS: i64 = 10_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use hearth_core::validation::validate_item_name;
///
/// assert_eq!(validate_item_name("  PANDESAL (5) ").unwrap(), "PANDESAL (5)");
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a display unit and returns it trimmed.
pub fn validate_unit(unit: &str) -> ValidationResult<String> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if unit.chars().count() > MAX_UNIT_LEN {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: MAX_UNIT_LEN,
        });
    }

    Ok(unit.to_string())
}

/// Validates a caller-supplied item id.
///
/// Ids are opaque: anything non-blank without surrounding whitespace works,
/// so the seed ids "1".."31" and generated UUIDs both pass.
pub fn validate_item_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.trim() != id {
        return Err(ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: "must not start or end with whitespace".to_string(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_ID_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a catalog price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaways, water refills)
/// - At most [`MAX_PRICE_CENTS`]
///
/// ## Example
/// ```rust
/// use hearth_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("cost_price", 80).is_ok());
/// assert!(validate_price_cents("selling_price", 0).is_ok());
/// assert!(validate_price_cents("selling_price", -1).is_err());
/// assert!(validate_price_cents("selling_price", i64::MAX).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    non_negative(field, cents)?;
    at_most(field, cents, MAX_PRICE_CENTS)
}

/// Validates an inventory count (beginning or ending).
pub fn validate_count(field: &str, count: i64) -> ValidationResult<()> {
    non_negative(field, count)?;
    at_most(field, count, MAX_COUNT)
}

/// Validates a cash drawer amount in cents.
pub fn validate_cash_cents(field: &str, cents: i64) -> ValidationResult<()> {
    non_negative(field, cents)?;
    at_most(field, cents, MAX_CASH_CENTS)
}

/// Upper bound for one ledger entry.
///
/// ```text
/// hearth produce 13 250000
///      │
///      ├── qty < 1?        → CoreError::InvalidQuantity (checked by Shift)
///      ├── qty > 100_000?  → ValidationError::TooLarge
///      └── OK → entry appended
/// ```
pub fn validate_quantity_limit(quantity: i64) -> ValidationResult<()> {
    at_most("quantity", quantity, MAX_QUANTITY)
}

fn non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn at_most(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if value > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
