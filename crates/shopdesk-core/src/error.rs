//! # Error Types
//!
//! Domain-specific error types for shopdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopdesk-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopdesk-db errors                                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  shopdesk-analytics errors                                             │
//! │  └── AnalyticsError   - Fetch / cost lookup failures                   │
//! │                                                                         │
//! │  back office errors                                                    │
//! │  └── ApiError         - What callers see (serialized, generic)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A scanned barcode matched no stock item.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan "ABC-001"
    ///      │
    ///      ▼
    /// No stock item with that SKU (case-insensitive)
    ///      │
    ///      ▼
    /// UnknownSku("ABC-001") → "Item with barcode ABC-001 not found in inventory"
    /// ```
    #[error("Item with barcode {0} not found in inventory")]
    UnknownSku(String),

    /// A draft row index is out of range.
    #[error("Receipt row {index} does not exist")]
    RowNotFound { index: usize },

    /// One or more receipt lines failed the inventory check.
    ///
    /// Each entry reads `"name: reason"`; the display joins them with ", ".
    #[error("Inventory error: {}", .0.join(", "))]
    InventoryCheck(Vec<String>),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value exceeds the largest amount the shop accepts.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: i64 },

    /// Invalid format (e.g., invalid date, invalid SKU).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., a phone number listed twice).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_message_joins_reasons() {
        let err = CoreError::InventoryCheck(vec![
            "Tea: Insufficient quantity (Available: 2)".to_string(),
            "Cake: Item not found in inventory".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Inventory error: Tea: Insufficient quantity (Available: 2), Cake: Item not found in inventory"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "cashier name".to_string(),
        };
        assert_eq!(err.to_string(), "cashier name is required");

        let err = ValidationError::Negative {
            field: "price".to_string(),
        };
        assert_eq!(err.to_string(), "price cannot be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
