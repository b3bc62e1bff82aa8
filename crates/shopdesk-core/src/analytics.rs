//! # Sales & Profit Aggregation
//!
//! Pure aggregation over receipts. Cost prices that are not embedded in a
//! receipt arrive pre-resolved in a [`CostBook`]; this module never looks
//! anything up itself.
//!
//! ## Profit Per Line
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cost = embedded cost price (if > 0)                                    │
//! │       ?? cost book entry for the item name (if > 0)                     │
//! │                                                                         │
//! │  cost known   → profit = (price − cost) × quantity                      │
//! │  cost unknown → profit = price × 30% × quantity   (assumed margin)      │
//! │                                                                         │
//! │  Example: price 15.00, cost 10.00, qty 2 → 10.00                        │
//! │  Example: price 20.00, no cost,    qty 1 →  6.00                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are the sum of receipt totals, not of line totals, so a receipt
//! whose stored total disagrees with its lines is reported as stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use ts_rs::TS;

use crate::money::Money;
use crate::period::{Granularity, ReportWindow};
use crate::types::{Receipt, ReceiptItem};
use crate::FALLBACK_MARGIN_BPS;

// =============================================================================
// Cost Book
// =============================================================================

/// Item name → current cost price, resolved once per aggregation.
///
/// A name maps to `None` when the store had no usable cost for it; that is
/// remembered too so the name is not looked up again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostBook {
    entries: HashMap<String, Option<Money>>,
}

impl CostBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the lookup result for `name`. Non-positive costs count as
    /// unknown.
    pub fn insert(&mut self, name: impl Into<String>, cost: Option<Money>) {
        self.entries
            .insert(name.into(), cost.filter(Money::is_positive));
    }

    /// Usable cost for `name`, if one was resolved.
    pub fn get(&self, name: &str) -> Option<Money> {
        self.entries.get(name).copied().flatten()
    }

    /// Whether `name` has already been looked up.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct item names among `receipts` that need a store lookup: the
    /// name is non-empty, the embedded cost is missing or non-positive, and
    /// the book has no entry for it yet.
    ///
    /// Names come back in first-seen order.
    pub fn missing_names<'a>(&self, receipts: impl IntoIterator<Item = &'a Receipt>) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut names = Vec::new();
        for receipt in receipts {
            for item in &receipt.items {
                if item.name.is_empty()
                    || item.known_cost_price().is_some()
                    || self.contains(&item.name)
                {
                    continue;
                }
                if seen.insert(item.name.as_str()) {
                    names.push(item.name.clone());
                }
            }
        }
        names
    }
}

impl FromIterator<(String, Option<Money>)> for CostBook {
    fn from_iter<I: IntoIterator<Item = (String, Option<Money>)>>(iter: I) -> Self {
        let mut book = CostBook::new();
        for (name, cost) in iter {
            book.insert(name, cost);
        }
        book
    }
}

// =============================================================================
// Line Math
// =============================================================================

/// Cost price to use for `item`: embedded first, then the cost book.
pub fn resolve_cost(item: &ReceiptItem, costs: &CostBook) -> Option<Money> {
    item.known_cost_price().or_else(|| costs.get(&item.name))
}

/// Profit contributed by one receipt line.
///
/// ```rust
/// use shopdesk_core::analytics::line_profit;
/// use shopdesk_core::{Money, ReceiptItem};
///
/// let item = ReceiptItem {
///     name: "Tea".into(),
///     price_cents: 1500,
///     quantity: 2,
///     cost_price_cents: None,
/// };
/// assert_eq!(line_profit(&item, Some(Money::from_cents(1000))).cents(), 1000);
/// assert_eq!(line_profit(&item, None).cents(), 900);
/// ```
pub fn line_profit(item: &ReceiptItem, cost: Option<Money>) -> Money {
    match cost.filter(Money::is_positive) {
        Some(cost) => (item.price() - cost).multiply_quantity(item.quantity),
        None => item.line_total().apply_margin_bps(FALLBACK_MARGIN_BPS),
    }
}

// =============================================================================
// Totals
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesTotals {
    pub sales: Money,
    pub profit: Money,
    pub total_items: i64,
    pub transaction_count: i64,
}

impl SalesTotals {
    /// Folds one receipt into the running totals.
    pub fn add_receipt(&mut self, receipt: &Receipt, costs: &CostBook) {
        self.sales += receipt.total_amount();
        for item in &receipt.items {
            self.profit += line_profit(item, resolve_cost(item, costs));
            self.total_items += item.quantity;
        }
        self.transaction_count += 1;
    }
}

/// Totals over `receipts` with cost prices taken from the receipts
/// themselves or, failing that, from `costs`.
///
/// Callers are expected to have already narrowed `receipts` to the window
/// of interest.
pub fn calculate_sales_and_profit<'a>(
    receipts: impl IntoIterator<Item = &'a Receipt>,
    costs: &CostBook,
) -> SalesTotals {
    receipts
        .into_iter()
        .fold(SalesTotals::default(), |mut totals, receipt| {
            totals.add_receipt(receipt, costs);
            totals
        })
}

// =============================================================================
// Report
// =============================================================================

/// One row of the month (per-day) or year (per-month) breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BreakdownRow {
    /// `dd` for days, `MMM` for months.
    pub label: String,
    #[ts(as = "String")]
    pub period_start: NaiveDate,
    pub sales: Money,
    pub profit: Money,
    pub total_items: i64,
    pub transaction_count: i64,
}

/// A full sales report for one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub granularity: Granularity,
    #[ts(as = "String")]
    pub window_start: DateTime<Utc>,
    #[ts(as = "String")]
    pub window_end: DateTime<Utc>,
    pub totals: SalesTotals,
    /// Empty for day reports; chronological otherwise.
    pub breakdown: Vec<BreakdownRow>,
}

/// Receipts whose timestamp lies inside `window` (inclusive).
pub fn receipts_in_window<'a>(window: &ReportWindow, receipts: &'a [Receipt]) -> Vec<&'a Receipt> {
    receipts
        .iter()
        .filter(|r| window.contains(r.timestamp))
        .collect()
}

/// Builds the report for `window` from every receipt of the shop.
///
/// Receipts outside the window are ignored. Breakdown buckets only exist
/// for periods that had at least one receipt.
pub fn build_report(window: &ReportWindow, receipts: &[Receipt], costs: &CostBook) -> SalesReport {
    let in_window = receipts_in_window(window, receipts);
    let totals = calculate_sales_and_profit(in_window.iter().copied(), costs);

    let mut buckets: BTreeMap<NaiveDate, SalesTotals> = BTreeMap::new();
    for receipt in &in_window {
        if let Some(bucket) = window.bucket_start(receipt.timestamp) {
            buckets.entry(bucket).or_default().add_receipt(receipt, costs);
        }
    }

    let breakdown = buckets
        .into_iter()
        .map(|(period_start, t)| BreakdownRow {
            label: window.granularity.bucket_label(period_start),
            period_start,
            sales: t.sales,
            profit: t.profit,
            total_items: t.total_items,
            transaction_count: t.transaction_count,
        })
        .collect();

    SalesReport {
        granularity: window.granularity,
        window_start: window.start,
        window_end: window.end,
        totals,
        breakdown,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, ShopDetails};
    use chrono::{Duration, TimeZone};

    fn item(name: &str, price_cents: i64, quantity: i64, cost: Option<i64>) -> ReceiptItem {
        ReceiptItem {
            name: name.to_string(),
            price_cents,
            quantity,
            cost_price_cents: cost,
        }
    }

    fn receipt(at: DateTime<Utc>, items: Vec<ReceiptItem>) -> Receipt {
        let total = items.iter().map(|i| i.price_cents * i.quantity).sum();
        Receipt {
            id: format!("r-{}", at.timestamp_millis()),
            shop_id: "shop-1".to_string(),
            shop_details: ShopDetails::default(),
            cashier_name: "Ann".to_string(),
            manager_name: None,
            items,
            payment_method: PaymentMethod::Cash,
            transaction_id: "TXN-TEST".to_string(),
            total_amount_cents: total,
            timestamp: at,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_receipts_yield_zero_totals() {
        let receipts: Vec<Receipt> = Vec::new();
        let totals = calculate_sales_and_profit(&receipts, &CostBook::new());
        assert_eq!(totals, SalesTotals::default());
    }

    #[test]
    fn test_embedded_cost_profit() {
        let r = receipt(Utc::now(), vec![item("Tea", 1500, 2, Some(1000))]);
        let totals = calculate_sales_and_profit([&r], &CostBook::new());
        assert_eq!(totals.sales.cents(), 3000);
        assert_eq!(totals.profit.cents(), 1000);
        assert_eq!(totals.total_items, 2);
        assert_eq!(totals.transaction_count, 1);
    }

    #[test]
    fn test_unknown_cost_uses_thirty_percent_margin() {
        let r = receipt(Utc::now(), vec![item("Cake", 2000, 1, None)]);
        let totals = calculate_sales_and_profit([&r], &CostBook::new());
        assert_eq!(totals.profit.cents(), 600);
    }

    #[test]
    fn test_cost_book_fills_missing_or_zero_embedded_cost() {
        let r = receipt(
            Utc::now(),
            vec![item("Tea", 1500, 2, Some(0)), item("Cake", 2000, 1, None)],
        );
        let mut book = CostBook::new();
        book.insert("Tea", Some(Money::from_cents(1000)));
        book.insert("Cake", Some(Money::zero()));

        let totals = calculate_sales_and_profit([&r], &book);
        // Tea: (15 - 10) × 2 = 10.00, Cake: zero cost → 30% of 20.00 = 6.00
        assert_eq!(totals.profit.cents(), 1600);
    }

    #[test]
    fn test_embedded_cost_wins_over_book() {
        let line = item("Tea", 1500, 1, Some(1200));
        let mut book = CostBook::new();
        book.insert("Tea", Some(Money::from_cents(100)));
        assert_eq!(resolve_cost(&line, &book), Some(Money::from_cents(1200)));
    }

    #[test]
    fn test_negative_margin_is_reported() {
        let line = item("Loss leader", 800, 3, Some(1000));
        assert_eq!(line_profit(&line, line.known_cost_price()).cents(), -600);
    }

    #[test]
    fn test_missing_names_are_distinct_and_skip_known() {
        let receipts = vec![
            receipt(Utc::now(), vec![item("Tea", 100, 1, None), item("", 100, 1, None)]),
            receipt(
                Utc::now(),
                vec![item("Tea", 100, 1, Some(0)), item("Cake", 100, 1, Some(50))],
            ),
            receipt(Utc::now(), vec![item("Bun", 100, 1, None)]),
        ];
        let mut book = CostBook::new();
        assert_eq!(book.missing_names(&receipts), vec!["Tea", "Bun"]);

        book.insert("Tea", None);
        assert_eq!(book.missing_names(&receipts), vec!["Bun"]);
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let window = ReportWindow::containing_utc(Granularity::Day, date(2025, 3, 14)).unwrap();
        let receipts = vec![
            receipt(window.start, vec![item("A", 100, 1, None)]),
            receipt(window.end, vec![item("B", 200, 1, None)]),
            receipt(window.start - Duration::milliseconds(1), vec![item("C", 400, 1, None)]),
            receipt(window.end + Duration::milliseconds(1), vec![item("D", 800, 1, None)]),
        ];
        let report = build_report(&window, &receipts, &CostBook::new());
        assert_eq!(report.totals.sales.cents(), 300);
        assert_eq!(report.totals.transaction_count, 2);
        assert!(report.breakdown.is_empty());
    }

    #[test]
    fn test_month_breakdown_sums_to_total() {
        let window = ReportWindow::containing_utc(Granularity::Month, date(2025, 3, 1)).unwrap();
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap();
        let receipts = vec![
            receipt(at(20, 9), vec![item("Tea", 1500, 2, Some(1000))]),
            receipt(at(3, 10), vec![item("Cake", 2000, 1, None)]),
            receipt(at(20, 18), vec![item("Bun", 333, 3, None)]),
            receipt(at(31, 23), vec![item("Tea", 1500, 1, None)]),
        ];
        let mut book = CostBook::new();
        book.insert("Tea", Some(Money::from_cents(900)));

        let report = build_report(&window, &receipts, &book);
        let labels: Vec<&str> = report.breakdown.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["03", "20", "31"]);

        let sales: Money = report.breakdown.iter().map(|r| r.sales).sum();
        let profit: Money = report.breakdown.iter().map(|r| r.profit).sum();
        assert_eq!(sales, report.totals.sales);
        assert_eq!(profit, report.totals.profit);
        assert_eq!(report.breakdown[1].transaction_count, 2);
    }

    #[test]
    fn test_year_breakdown_sums_to_total() {
        let window = ReportWindow::containing_utc(Granularity::Year, date(2024, 6, 15)).unwrap();
        let at = |m: u32, d: u32| Utc.with_ymd_and_hms(2024, m, d, 12, 0, 0).unwrap();
        let receipts = vec![
            receipt(at(11, 2), vec![item("Tea", 1500, 1, None)]),
            receipt(at(1, 31), vec![item("Cake", 2000, 2, Some(1500))]),
            receipt(at(11, 28), vec![item("Bun", 250, 4, None)]),
            receipt(
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                vec![item("Late", 9900, 1, None)],
            ),
        ];
        let report = build_report(&window, &receipts, &CostBook::new());

        let labels: Vec<&str> = report.breakdown.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Nov"]);
        assert_eq!(report.totals.transaction_count, 3);

        let sales: Money = report.breakdown.iter().map(|r| r.sales).sum();
        let profit: Money = report.breakdown.iter().map(|r| r.profit).sum();
        assert_eq!(sales, report.totals.sales);
        assert_eq!(profit, report.totals.profit);
    }
}
