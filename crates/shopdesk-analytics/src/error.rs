//! # Analytics Error Types
//!
//! Store failures carry the underlying error as their source; callers log
//! it and show a generic message.

use chrono::NaiveDate;
use shopdesk_db::DbError;
use thiserror::Error;

/// Result type alias for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Receipts for the shop could not be read.
    #[error("Failed to fetch receipts for shop {shop_id}")]
    Fetch {
        shop_id: String,
        #[source]
        source: DbError,
    },

    /// A cost-price lookup failed.
    #[error("Failed to look up cost price for '{name}'")]
    Lookup {
        name: String,
        #[source]
        source: DbError,
    },

    /// Neither the requested date nor today yields a representable window.
    #[error("No report window for {reference}")]
    WindowOutOfRange { reference: NaiveDate },
}
