//! # Sales Analytics Service
//!
//! Entry points for the sales report.
//!
//! ## Usage
//! ```rust,ignore
//! let analytics = SalesAnalytics::new(db.clone(), AnalyticsConfig::default());
//!
//! // Typed reference date
//! let march = analytics.monthly_sales_and_profit("demo-shop", date).await?;
//!
//! // Raw user input; anything unparseable means "today"
//! let today = analytics
//!     .sales_and_profit("demo-shop", Granularity::Day, "not-a-date")
//!     .await?;
//! ```

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tracing::{info, warn};

use crate::cost::resolve_costs;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::store::RecordStore;
use crate::DEFAULT_LOOKUP_CONCURRENCY;
use shopdesk_core::analytics::{build_report, receipts_in_window};
use shopdesk_core::period::parse_reference_date;
use shopdesk_core::{Granularity, ReportWindow, SalesReport};

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Shop's offset from UTC in minutes; windows are local calendar
    /// periods in this offset.
    pub utc_offset_minutes: i32,

    /// Maximum cost lookups in flight per aggregation.
    pub lookup_concurrency: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            utc_offset_minutes: 0,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

impl AnalyticsConfig {
    /// The configured offset, or UTC if it is out of range.
    pub fn offset(&self) -> FixedOffset {
        match FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)) {
            Some(offset) => offset,
            None => {
                warn!(
                    utc_offset_minutes = self.utc_offset_minutes,
                    "UTC offset out of range, using UTC"
                );
                Utc.fix()
            }
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Sales and profit aggregation over a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct SalesAnalytics<S> {
    store: S,
    config: AnalyticsConfig,
}

impl<S: RecordStore> SalesAnalytics<S> {
    pub fn new(store: S, config: AnalyticsConfig) -> Self {
        SalesAnalytics { store, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Today's date in the shop's offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.offset()).date_naive()
    }

    /// Sales and profit for the day containing `date`.
    pub async fn daily_sales_and_profit(
        &self,
        shop_id: &str,
        date: NaiveDate,
    ) -> AnalyticsResult<SalesReport> {
        self.report(shop_id, Granularity::Day, date).await
    }

    /// Sales and profit for the calendar month containing `date`, with a
    /// per-day breakdown.
    pub async fn monthly_sales_and_profit(
        &self,
        shop_id: &str,
        date: NaiveDate,
    ) -> AnalyticsResult<SalesReport> {
        self.report(shop_id, Granularity::Month, date).await
    }

    /// Sales and profit for the calendar year containing `date`, with a
    /// per-month breakdown.
    pub async fn yearly_sales_and_profit(
        &self,
        shop_id: &str,
        date: NaiveDate,
    ) -> AnalyticsResult<SalesReport> {
        self.report(shop_id, Granularity::Year, date).await
    }

    /// Report for a raw reference date as typed by a user.
    ///
    /// Input that is not a recognizable date, or whose window would fall
    /// outside the calendar, falls back to today.
    pub async fn sales_and_profit(
        &self,
        shop_id: &str,
        granularity: Granularity,
        reference: &str,
    ) -> AnalyticsResult<SalesReport> {
        let offset = self.config.offset();
        let parsed = parse_reference_date(reference, offset)
            .filter(|date| ReportWindow::containing(granularity, *date, offset).is_some());
        let date = match parsed {
            Some(date) => date,
            None => {
                let today = self.today();
                warn!(reference = %reference, fallback = %today, "Invalid reference date, using today");
                today
            }
        };

        self.report(shop_id, granularity, date).await
    }

    /// Builds the report for the `granularity` window containing `date`.
    pub async fn report(
        &self,
        shop_id: &str,
        granularity: Granularity,
        date: NaiveDate,
    ) -> AnalyticsResult<SalesReport> {
        let window = self.window(granularity, date)?;

        let receipts = self
            .store
            .fetch_receipts_by_shop(shop_id)
            .await
            .map_err(|source| AnalyticsError::Fetch {
                shop_id: shop_id.to_string(),
                source,
            })?;

        let in_window = receipts_in_window(&window, &receipts);
        let costs = resolve_costs(
            &self.store,
            shop_id,
            in_window.iter().copied(),
            self.config.lookup_concurrency,
        )
        .await?;

        let report = build_report(&window, &receipts, &costs);

        info!(
            shop_id = %shop_id,
            granularity = %granularity,
            reference = %date,
            sales = %report.totals.sales,
            profit = %report.totals.profit,
            transactions = report.totals.transaction_count,
            "Sales report computed"
        );

        Ok(report)
    }

    fn window(&self, granularity: Granularity, date: NaiveDate) -> AnalyticsResult<ReportWindow> {
        let offset = self.config.offset();
        if let Some(window) = ReportWindow::containing(granularity, date, offset) {
            return Ok(window);
        }

        let today = self.today();
        warn!(reference = %date, fallback = %today, "Reference date out of range, using today");
        ReportWindow::containing(granularity, today, offset)
            .ok_or(AnalyticsError::WindowOutOfRange { reference: date })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
