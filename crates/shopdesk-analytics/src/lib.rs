//! # shopdesk-analytics: Sales & Profit Aggregation
//!
//! Answers "how much did this shop sell, and what did it earn" for a day,
//! a calendar month or a calendar year.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Aggregation                                      │
//! │                                                                         │
//! │  reference date ("2025-03-14", or garbage → today)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportWindow::containing(granularity, date, shop offset)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.fetch_receipts_by_shop(shop)    ── all receipts, no date filter  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  keep receipts with start <= timestamp <= end                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve_costs: one lookup per distinct item name lacking a cost,       │
//! │                 at most `lookup_concurrency` in flight                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  build_report: totals + per-day / per-month breakdown                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any fetch or lookup failure fails the whole aggregation; there are no
//! partial totals.
//!
//! ## Module Organization
//! - [`store`] - The [`RecordStore`] collaborator contract
//! - [`cost`] - Memoized, bounded cost-price resolution
//! - [`service`] - [`SalesAnalytics`] entry points
//! - [`error`] - Analytics error types

pub mod cost;
pub mod error;
pub mod service;
pub mod store;

pub use cost::resolve_costs;
pub use error::{AnalyticsError, AnalyticsResult};
pub use service::{AnalyticsConfig, SalesAnalytics};
pub use store::RecordStore;

/// Default number of cost lookups in flight per aggregation.
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 4;
