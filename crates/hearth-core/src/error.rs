//! # Error Types
//!
//! Domain-specific error types for hearth-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hearth-core errors (this file)                                        │
//! │  ├── CoreError        - Shift, ledger and catalog rule violations      │
//! │  └── ValidationError  - Input shape/range failures                     │
//! │                                                                         │
//! │  hearth-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  hearth-terminal errors                                                │
//! │  ├── StoreError       - What a store command returns                   │
//! │  └── AppError         - Coded errors for the CLI / a UI                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → AppError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The reconciliation engine has no error type: it always produces a
//! displayable result. Every variant here comes from a write path.

use thiserror::Error;

use crate::types::ShiftStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by catalog, lifecycle and ledger operations.
///
/// A command that returns one of these has not changed any state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested transition is not legal from the current shift status.
    ///
    /// ## When This Occurs
    /// - `start_shift` while a shift is already OPEN
    /// - `end_shift` or `prefill_ending_inventory` while CLOSED
    #[error("Cannot {operation} while shift is {status}")]
    InvalidState {
        operation: &'static str,
        status: ShiftStatus,
    },

    /// A ledger or ending-inventory write was attempted on a closed shift.
    ///
    /// ## User Workflow
    /// ```text
    /// Shift closed at 21:00
    ///      │
    ///      ▼
    /// Baker logs "+12 PANDESAL"
    ///      │
    ///      ▼
    /// ShiftClosed { operation: "add production" }
    ///      │
    ///      ▼
    /// UI shows: "Start a shift before recording production"
    /// ```
    #[error("Shift is closed, cannot {operation}")]
    ShiftClosed { operation: &'static str },

    /// The item id does not exist in the catalog.
    #[error("Unknown catalog item: {0}")]
    UnknownItem(String),

    /// Catalog deletion blocked because the current shift still references the item.
    #[error("Item {item_id} is in use by the current shift ({reason})")]
    ItemInUse { item_id: String, reason: String },

    /// Another catalog item already has this name (case-insensitive, trimmed).
    #[error("An item named '{0}' already exists")]
    DuplicateName(String),

    /// Additive ledger operations need a quantity of at least one.
    #[error("Quantity must be a positive whole number, got {0}")]
    InvalidQuantity(i64),

    /// A ledger entry id passed to `remove_entry` is not in the shift.
    #[error("{kind} entry not found: {id}")]
    EntryNotFound { kind: &'static str, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be below zero.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Value is above the largest amount a bakery shift can plausibly hold.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: i64 },

    /// Invalid format (e.g., unknown category name).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., a caller-supplied id that is taken).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidState {
            operation: "start a shift",
            status: ShiftStatus::Open,
        };
        assert_eq!(err.to_string(), "Cannot start a shift while shift is OPEN");

        let err = CoreError::ShiftClosed {
            operation: "add production",
        };
        assert_eq!(err.to_string(), "Shift is closed, cannot add production");

        let err = CoreError::ItemInUse {
            item_id: "bread".to_string(),
            reason: "2 ledger entries".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Item bread is in use by the current shift (2 ledger entries)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBeNonNegative {
            field: "selling_price".to_string(),
        };
        assert_eq!(err.to_string(), "selling_price must not be negative");

        let err = ValidationError::TooLong {
            field: "unit".to_string(),
            max: 20,
        };
        assert_eq!(err.to_string(), "unit must be at most 20 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
