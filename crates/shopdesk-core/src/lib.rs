//! # shopdesk-core: Pure Business Logic for Shopdesk
//!
//! This crate holds the shop back office's business rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopdesk Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Back office (apps/backoffice)                   │   │
//! │  │   receipts, stock, employees, attendance, dashboard, reports   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopdesk-analytics                              │   │
//! │  │   fetch receipts ──► resolve cost prices ──► aggregate          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopdesk-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌───────┐ │   │
//! │  │   │  types  │ │  money  │ │ period  │ │ analytics │ │ draft │ │   │
//! │  │   │ Receipt │ │  Money  │ │ Window  │ │ CostBook  │ │ rows  │ │   │
//! │  │   │ Stock   │ │ margins │ │ buckets │ │ SalesRpt  │ │ scan  │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └───────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopdesk-db (Record Store)                      │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Receipt, StockItem, Employee, Attendance, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`period`] - Report granularity and inclusive aggregation windows
//! - [`analytics`] - Sales and profit aggregation over a set of receipts
//! - [`draft`] - New-receipt state transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shopdesk_core::money::Money;
//!
//! // 30% assumed margin on a $20.00 line with unknown cost
//! let price = Money::from_cents(2000);
//! let profit = price.apply_margin_bps(shopdesk_core::FALLBACK_MARGIN_BPS);
//! assert_eq!(profit.cents(), 600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod draft;
pub mod error;
pub mod money;
pub mod period;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{calculate_sales_and_profit, CostBook, SalesReport, SalesTotals};
pub use draft::ReceiptDraft;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use period::{Granularity, ReportWindow};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Assumed margin when an item's cost price is unknown, in basis points.
///
/// 3000 bps = 30%. Profit for such a line is `price × 30% × quantity`.
pub const FALLBACK_MARGIN_BPS: u32 = 3000;

/// Number of receipts shown on the dashboard's "recent" list.
pub const DEFAULT_RECENT_RECEIPTS: usize = 5;

/// Shop used by the CLI and seed data when none is configured.
pub const DEFAULT_SHOP_ID: &str = "demo-shop";

/// Name shown for attendance rows whose employee no longer exists.
pub const UNKNOWN_EMPLOYEE: &str = "Unknown Employee";
