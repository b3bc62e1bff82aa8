//! # Sales Report Commands
//!
//! Thin wrapper over [`SalesAnalytics`](shopdesk_analytics::SalesAnalytics):
//! picks the reference date, formats money with the shop's currency symbol
//! and maps any failure to the generic "Failed to calculate sales and
//! profit" error.
//!
//! ## Reference Date
//! | Input            | Window built from            |
//! |------------------|------------------------------|
//! | `None`           | today (shop offset)          |
//! | `"2025-03-14"`   | that day                     |
//! | `"2025-03"`      | 2025-03-01                   |
//! | `"garbage"`      | today, with a warning logged |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use shopdesk_core::analytics::BreakdownRow;
use shopdesk_core::{Granularity, SalesReport};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownDto {
    /// Day of month (`05`) or month (`Mar`).
    pub label: String,
    pub period_start: NaiveDate,
    pub sales_cents: i64,
    pub profit_cents: i64,
    pub total_items: i64,
    pub transaction_count: i64,
}

impl From<BreakdownRow> for BreakdownDto {
    fn from(row: BreakdownRow) -> Self {
        BreakdownDto {
            label: row.label,
            period_start: row.period_start,
            sales_cents: row.sales.cents(),
            profit_cents: row.profit.cents(),
            total_items: row.total_items,
            transaction_count: row.transaction_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportDto {
    pub granularity: Granularity,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub sales_cents: i64,
    pub profit_cents: i64,
    /// Formatted with the shop's currency symbol, e.g. `$12.50`.
    pub sales: String,
    pub profit: String,
    pub total_items: i64,
    pub transaction_count: i64,
    /// Empty for daily reports.
    pub breakdown: Vec<BreakdownDto>,
}

impl SalesReportDto {
    fn new(report: SalesReport, currency_symbol: &str) -> Self {
        let totals = report.totals;
        SalesReportDto {
            granularity: report.granularity,
            window_start: report.window_start,
            window_end: report.window_end,
            sales_cents: totals.sales.cents(),
            profit_cents: totals.profit.cents(),
            sales: totals.sales.format_with(currency_symbol),
            profit: totals.profit.format_with(currency_symbol),
            total_items: totals.total_items,
            transaction_count: totals.transaction_count,
            breakdown: report.breakdown.into_iter().map(BreakdownDto::from).collect(),
        }
    }
}

/// Sales and profit for the day, month or year around `reference`.
pub async fn sales_report(
    state: &AppState,
    granularity: Granularity,
    reference: Option<&str>,
) -> ApiResult<SalesReportDto> {
    let start = Instant::now();
    let shop_id = state.shop_id();
    debug!(shop_id = %shop_id, granularity = %granularity, reference = ?reference, "sales_report command");

    let analytics = state.analytics();
    let report = match reference {
        Some(raw) => analytics.sales_and_profit(shop_id, granularity, raw).await?,
        None => analytics.report(shop_id, granularity, analytics.today()).await?,
    };

    debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "sales_report complete");
    Ok(SalesReportDto::new(report, &state.config().shop.currency_symbol))
}
