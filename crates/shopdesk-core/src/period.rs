//! # Report Periods
//!
//! Granularity and inclusive aggregation windows for the sales report.
//!
//! ## Window Shape
//! ```text
//! reference date: 2025-03-14, offset +05:30
//!
//!  Day    [2025-03-14 00:00:00.000 local ─── 2025-03-14 23:59:59.999 local]
//!  Month  [2025-03-01 00:00:00.000 local ─── 2025-03-31 23:59:59.999 local]
//!  Year   [2025-01-01 00:00:00.000 local ─── 2025-12-31 23:59:59.999 local]
//!
//!  Both ends are INCLUSIVE. The end is the next window's start minus 1 ms.
//! ```
//!
//! Windows are computed in the shop's fixed UTC offset and stored as UTC
//! instants so they compare directly against receipt timestamps.
//!
//! ## Breakdown Buckets
//! | Granularity | Bucket        | Label  |
//! |-------------|---------------|--------|
//! | Day         | none          |        |
//! | Month       | calendar day  | `dd`   |
//! | Year        | calendar month| `MMM`  |

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Granularity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    /// Whether reports at this granularity carry a per-bucket breakdown.
    #[inline]
    pub const fn has_breakdown(&self) -> bool {
        !matches!(self, Granularity::Day)
    }

    /// Display label of a breakdown bucket that starts on `bucket_start`.
    pub fn bucket_label(&self, bucket_start: NaiveDate) -> String {
        match self {
            Granularity::Day | Granularity::Month => bucket_start.format("%d").to_string(),
            Granularity::Year => bucket_start.format("%b").to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        })
    }
}

/// Accepts `day|month|year` and the screen's `daily|monthly|yearly`.
impl FromStr for Granularity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            other => Err(ValidationError::InvalidFormat {
                field: "granularity".to_string(),
                reason: format!("expected day, month or year, got '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Reference Date
// =============================================================================

/// Parses the report's reference date.
///
/// Accepted forms: `YYYY-MM-DD`, `YYYY-MM` (first of month), `YYYY` (January
/// first) and RFC 3339 instants (converted to the shop's local date).
/// Returns `None` for anything else; callers fall back to today.
///
/// ```rust
/// use chrono::{FixedOffset, NaiveDate};
/// use shopdesk_core::period::parse_reference_date;
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// assert_eq!(
///     parse_reference_date("2025-03", utc),
///     NaiveDate::from_ymd_opt(2025, 3, 1)
/// );
/// assert_eq!(parse_reference_date("not a date", utc), None);
/// ```
pub fn parse_reference_date(input: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&offset).date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d") {
        return Some(date);
    }
    if input.len() == 4 && input.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = input.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

// =============================================================================
// Report Window
// =============================================================================

/// Inclusive `[start, end]` range of a day, month or year in a shop's offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub granularity: Granularity,
    /// Local calendar date the window was built from.
    pub reference: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(skip)]
    offset: FixedOffset,
}

impl ReportWindow {
    /// Window in UTC, for callers with no shop offset.
    pub fn containing_utc(granularity: Granularity, reference: NaiveDate) -> Option<Self> {
        Self::containing(granularity, reference, Utc.fix())
    }

    /// Builds the window of `granularity` that contains `reference`.
    ///
    /// Returns `None` when either bound falls outside the representable
    /// calendar, which only happens for dates near chrono's year limits.
    pub fn containing(
        granularity: Granularity,
        reference: NaiveDate,
        offset: FixedOffset,
    ) -> Option<Self> {
        let first_day = match granularity {
            Granularity::Day => reference,
            Granularity::Month => reference.with_day0(0)?,
            Granularity::Year => reference.with_ordinal0(0)?,
        };
        let next_first_day = match granularity {
            Granularity::Day => first_day.checked_add_signed(Duration::days(1))?,
            Granularity::Month => first_day.checked_add_months(Months::new(1))?,
            Granularity::Year => first_day.checked_add_months(Months::new(12))?,
        };

        let start = local_midnight_to_utc(first_day, offset)?;
        let end = local_midnight_to_utc(next_first_day, offset)?
            .checked_sub_signed(Duration::milliseconds(1))?;

        Some(ReportWindow {
            granularity,
            reference,
            start,
            end,
            offset,
        })
    }

    /// Offset the window was computed in.
    #[inline]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Inclusive on both ends.
    #[inline]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    /// First local day of the breakdown bucket `timestamp` falls in, or
    /// `None` for day windows which have no breakdown.
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> Option<NaiveDate> {
        let local = timestamp.with_timezone(&self.offset).date_naive();
        match self.granularity {
            Granularity::Day => None,
            Granularity::Month => Some(local),
            Granularity::Year => local.with_day0(0),
        }
    }
}

fn local_midnight_to_utc(date: NaiveDate, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let local: NaiveDateTime = date.and_time(NaiveTime::MIN);
    let utc = local.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
    Some(DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_day_window_bounds() {
        let window = ReportWindow::containing(Granularity::Day, date(2025, 3, 14), utc()).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap() - Duration::milliseconds(1)
        );
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.start - Duration::milliseconds(1)));
        assert!(!window.contains(window.end + Duration::milliseconds(1)));
    }

    #[test]
    fn test_month_window_handles_february_and_december() {
        let feb = ReportWindow::containing(Granularity::Month, date(2024, 2, 17), utc()).unwrap();
        assert_eq!(feb.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(
            feb.end,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() - Duration::milliseconds(1)
        );

        let dec = ReportWindow::containing(Granularity::Month, date(2024, 12, 31), utc()).unwrap();
        assert_eq!(
            dec.end,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_year_window() {
        let window = ReportWindow::containing(Granularity::Year, date(2023, 7, 4), utc()).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_window_respects_offset() {
        // +05:30: local midnight is 18:30 UTC the previous day
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let window = ReportWindow::containing(Granularity::Day, date(2025, 3, 14), ist).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 13, 18, 30, 0).unwrap());

        let late_evening_utc = Utc.with_ymd_and_hms(2025, 3, 13, 20, 0, 0).unwrap();
        assert!(window.contains(late_evening_utc));
    }

    #[test]
    fn test_window_near_calendar_limits_is_none() {
        let last_year = NaiveDate::MAX.year();
        let late = date(last_year, 6, 1);
        assert!(ReportWindow::containing(Granularity::Year, late, utc()).is_none());
        assert!(ReportWindow::containing(Granularity::Month, NaiveDate::MAX, utc()).is_none());
        assert!(ReportWindow::containing(Granularity::Day, NaiveDate::MAX, utc()).is_none());

        // Local midnight of the first representable day is before it in UTC
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        assert!(ReportWindow::containing(Granularity::Day, NaiveDate::MIN, ist).is_none());
        assert!(ReportWindow::containing(Granularity::Day, NaiveDate::MIN, utc()).is_some());
    }

    #[test]
    fn test_bucket_start() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();

        let day = ReportWindow::containing(Granularity::Day, date(2025, 3, 14), utc()).unwrap();
        assert_eq!(day.bucket_start(ts), None);

        let month = ReportWindow::containing(Granularity::Month, date(2025, 3, 1), utc()).unwrap();
        assert_eq!(month.bucket_start(ts), Some(date(2025, 3, 14)));

        let year = ReportWindow::containing(Granularity::Year, date(2025, 1, 1), utc()).unwrap();
        assert_eq!(year.bucket_start(ts), Some(date(2025, 3, 1)));
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(Granularity::Month.bucket_label(date(2025, 3, 4)), "04");
        assert_eq!(Granularity::Year.bucket_label(date(2025, 3, 1)), "Mar");
    }

    #[test]
    fn test_parse_reference_date() {
        assert_eq!(parse_reference_date("2025-03-14", utc()), Some(date(2025, 3, 14)));
        assert_eq!(parse_reference_date("2025-03", utc()), Some(date(2025, 3, 1)));
        assert_eq!(parse_reference_date("2025", utc()), Some(date(2025, 1, 1)));
        assert_eq!(
            parse_reference_date("2025-03-14T23:30:00-02:00", utc()),
            Some(date(2025, 3, 15))
        );
        assert_eq!(parse_reference_date("", utc()), None);
        assert_eq!(parse_reference_date("2025-13-01", utc()), None);
        assert_eq!(parse_reference_date("yesterday", utc()), None);
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("monthly".parse::<Granularity>().unwrap(), Granularity::Month);
        assert_eq!("YEAR".parse::<Granularity>().unwrap(), Granularity::Year);
        assert!("weekly".parse::<Granularity>().is_err());
        assert!(!Granularity::Day.has_breakdown());
    }
}
