//! # Validation Module
//!
//! Input validation for the back office forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command (apps/backoffice)                                    │
//! │  ├── Deserialization, trimming                                         │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (quantity >= 0) constraints                      │
//! │  └── UNIQUE (shop_id, employee_id, date) on attendance                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopdesk_core::validation::{validate_sku, validate_phone_numbers};
//!
//! assert!(validate_sku("TEA-250").is_ok());
//!
//! let phones = validate_phone_numbers(&[" 555-0100 ".to_string()]).unwrap();
//! assert_eq!(phones, vec!["555-0100".to_string()]);
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::StockItemInput;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_SKU_LEN: usize = 50;
const MAX_QUERY_LEN: usize = 100;

/// Largest unit price or cost accepted, in cents.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;
/// Largest stock level or sale quantity accepted.
pub const MAX_QUANTITY: i64 = 1_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and fails with `Required` when nothing is left.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = validate_required("sku", sku)?;

    if sku.len() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an item or person name: required, at most 200 characters.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = validate_required(field, name)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(name)
}

/// Validates a search query. Empty is allowed and means "everything".
///
/// Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

/// Parses a `YYYY-MM-DD` form date.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects values below zero. Zero is allowed (free items, empty shelves).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rejects values above `max`.
pub fn validate_at_most(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if value > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Rejects zero and negative values.
pub fn validate_positive(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates and normalizes the add/edit stock form.
///
/// ## Rules
/// - name required
/// - price ≥ 0, quantity ≥ 0, cost price (if given) ≥ 0
/// - SKU optional; blank becomes `None`, otherwise it must be well-formed
/// - blank optional text fields become `None`
pub fn validate_stock_input(input: StockItemInput) -> ValidationResult<StockItemInput> {
    let name = validate_name("name", &input.name)?;
    validate_non_negative("price", input.price_cents)?;
    validate_at_most("price", input.price_cents, MAX_PRICE_CENTS)?;
    validate_non_negative("quantity", input.quantity)?;
    validate_at_most("quantity", input.quantity, MAX_QUANTITY)?;
    if let Some(cost) = input.cost_price_cents {
        validate_non_negative("cost price", cost)?;
        validate_at_most("cost price", cost, MAX_PRICE_CENTS)?;
    }

    let sku = normalize_optional(input.sku);
    if let Some(sku) = &sku {
        validate_sku(sku)?;
    }

    Ok(StockItemInput {
        name,
        description: normalize_optional(input.description),
        price_cents: input.price_cents,
        cost_price_cents: input.cost_price_cents,
        quantity: input.quantity,
        category: normalize_optional(input.category),
        sku,
        supplier: normalize_optional(input.supplier),
    })
}

/// Trims a settings list (phone numbers, cashier names, manager names).
///
/// Blank entries and repeats are errors; order is preserved.
pub fn validate_unique_list(field: &str, values: &[String]) -> ValidationResult<Vec<String>> {
    let mut cleaned: Vec<String> = Vec::with_capacity(values.len());
    for raw in values {
        let value = validate_required(field, raw)?;
        if cleaned.contains(&value) {
            return Err(ValidationError::Duplicate {
                field: field.to_string(),
                value,
            });
        }
        cleaned.push(value);
    }
    Ok(cleaned)
}

/// [`validate_unique_list`] for the shop's phone numbers.
pub fn validate_phone_numbers(numbers: &[String]) -> ValidationResult<Vec<String>> {
    validate_unique_list("phone number", numbers)
}

/// Trims an optional text field, mapping blank to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_input() -> StockItemInput {
        StockItemInput {
            name: "  Green Tea  ".to_string(),
            description: Some("   ".to_string()),
            price_cents: 1500,
            cost_price_cents: Some(1000),
            quantity: 12,
            category: Some("Beverages".to_string()),
            sku: Some(" ".to_string()),
            supplier: None,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_stock_input_is_normalized() {
        let input = validate_stock_input(stock_input()).unwrap();
        assert_eq!(input.name, "Green Tea");
        assert_eq!(input.description, None);
        assert_eq!(input.sku, None);
        assert_eq!(input.category.as_deref(), Some("Beverages"));
    }

    #[test]
    fn test_stock_input_rejects_bad_values() {
        let mut input = stock_input();
        input.name = " ".to_string();
        assert!(matches!(
            validate_stock_input(input),
            Err(ValidationError::Required { .. })
        ));

        let mut input = stock_input();
        input.quantity = -1;
        assert!(matches!(
            validate_stock_input(input),
            Err(ValidationError::Negative { .. })
        ));

        let mut input = stock_input();
        input.cost_price_cents = Some(-5);
        assert!(validate_stock_input(input).is_err());

        let mut input = stock_input();
        input.price_cents = i64::MAX / 2 + 1;
        assert!(matches!(
            validate_stock_input(input),
            Err(ValidationError::TooLarge { max: MAX_PRICE_CENTS, .. })
        ));

        let mut input = stock_input();
        input.sku = Some("bad sku!".to_string());
        assert!(matches!(
            validate_stock_input(input),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_phone_numbers() {
        let phones = validate_phone_numbers(&[
            " 555-0100".to_string(),
            "555-0101 ".to_string(),
        ])
        .unwrap();
        assert_eq!(phones, vec!["555-0100", "555-0101"]);

        assert!(matches!(
            validate_phone_numbers(&["555-0100".to_string(), " 555-0100 ".to_string()]),
            Err(ValidationError::Duplicate { .. })
        ));
        assert!(validate_phone_numbers(&["".to_string()]).is_err());
        assert!(validate_phone_numbers(&[]).unwrap().is_empty());

        let err = validate_unique_list("cashier name", &["Ann".to_string(), "Ann".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "cashier name 'Ann' already exists");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("date", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("date", "2023-02-29").is_err());
        assert!(parse_date("date", "29/02/2024").is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_non_negative("price", 0).is_ok());
        assert!(validate_non_negative("price", -1).is_err());
        assert!(validate_positive("quantity", 1).is_ok());
        assert!(validate_positive("quantity", 0).is_err());
        assert!(validate_at_most("quantity", MAX_QUANTITY, MAX_QUANTITY).is_ok());
        assert!(matches!(
            validate_at_most("quantity", MAX_QUANTITY + 1, MAX_QUANTITY),
            Err(ValidationError::TooLarge { max: MAX_QUANTITY, .. })
        ));
    }
}
