//! # Repository Module
//!
//! Database repository implementations for the shop back office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Back office command / sales analytics                                 │
//! │       │                                                                 │
//! │       │  db.stock().cost_price_by_name("demo-shop", "Green Tea")       │
//! │       ▼                                                                 │
//! │  StockRepository                                                       │
//! │  ├── list_by_shop(&self, shop_id)                                      │
//! │  ├── find_by_sku(&self, shop_id, sku)                                  │
//! │  ├── cost_price_by_name(&self, shop_id, name)                          │
//! │  └── decrement_for_sale(&self, shop_id, items)                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every query is scoped by shop_id.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ShopRepository`](shop::ShopRepository) - Shop profile (settings)
//! - [`ReceiptRepository`](receipt::ReceiptRepository) - Receipts and their items
//! - [`StockRepository`](stock::StockRepository) - Inventory CRUD, lookups and decrements
//! - [`EmployeeRepository`](employee::EmployeeRepository) - Staff records
//! - [`AttendanceRepository`](attendance::AttendanceRepository) - Daily attendance marks
//!
//! ## Timestamps
//! Instants are written as RFC 3339 UTC text with millisecond precision via
//! [`ts`], so `ORDER BY timestamp` on the text column is chronological.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

pub mod attendance;
pub mod employee;
pub mod receipt;
pub mod shop;
pub mod stock;

/// Formats an instant for storage, e.g. `2025-03-14T09:30:12.123Z`.
pub(crate) fn ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generates a new record ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
