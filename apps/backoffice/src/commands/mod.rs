//! # Back Office Commands
//!
//! One async function per screen action. Each takes the shared
//! [`AppState`](crate::state::AppState) plus plain inputs and returns a
//! camelCase DTO or an [`ApiError`](crate::error::ApiError).
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (shared sort types)
//! ├── analytics.rs   ◄─── Daily / monthly / yearly sales and profit
//! ├── attendance.rs  ◄─── Mark and list attendance
//! ├── dashboard.rs   ◄─── Counts, recent receipts, today's attendance
//! ├── employee.rs    ◄─── Add, list, delete employees
//! ├── receipt.rs     ◄─── Create, view, list receipts
//! ├── settings.rs    ◄─── Shop profile
//! └── stock.rs       ◄─── Stock CRUD, categories, barcode lookup
//! ```
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  `shopdesk receipts --search tea`                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::receipt::list_receipts(&state, ReceiptQuery { .. })          │
//! │         │                                                               │
//! │         ├──► shopdesk-core   validation, filters, totals               │
//! │         ├──► shopdesk-db     repository reads and writes               │
//! │         ▼                                                               │
//! │  Vec<ReceiptDto> ──► serde_json ──► stdout                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod analytics;
pub mod attendance;
pub mod dashboard;
pub mod employee;
pub mod receipt;
pub mod settings;
pub mod stock;

use serde::{Deserialize, Serialize};
use shopdesk_core::ValidationError;
use std::cmp::Ordering;
use std::str::FromStr;

/// Direction for list sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Applies the direction to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(ValidationError::InvalidFormat {
                field: "sort direction".to_string(),
                reason: format!("expected asc or desc, got '{}'", other),
            }),
        }
    }
}

/// Case-insensitive substring match. An empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction() {
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!(SortDirection::default(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Green Tea", "tea"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Coffee", "tea"));
    }
}
