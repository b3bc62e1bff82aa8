//! # Domain Types
//!
//! Core domain types used throughout Shopdesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Receipt      │   │   StockItem     │   │    Employee     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  shop_id        │   │  shop_id        │   │  shop_id        │       │
//! │  │  transaction_id │   │  name / sku     │   │  name, position │       │
//! │  │  items[]        │   │  price, cost    │   │  salary_cents   │       │
//! │  │  total_amount   │   │  quantity ≥ 0   │   │  joining_date   │       │
//! │  └────────┬────────┘   └─────────────────┘   └────────┬────────┘       │
//! │           │                                           │                 │
//! │  ┌────────▼────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │  ReceiptItem    │   │  ShopProfile    │   │AttendanceRecord │       │
//! │  │  name, price    │   │  shop_name      │   │ (employee, date)│       │
//! │  │  quantity       │   │  phone_numbers  │   │  status         │       │
//! │  │  cost_price?    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenancy
//! Every persisted record carries a `shop_id`. Nothing in the back office
//! reads across shops.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
    MobilePayment,
}

impl PaymentMethod {
    /// All methods, in the order the receipt form offers them.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::MobilePayment,
    ];

    /// Label printed on receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::MobilePayment => "Mobile Payment",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts both the printed label ("Credit Card") and the stored form
/// ("credit_card"), case-insensitively.
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.label().to_lowercase().replace(' ', "_") == normalized)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "payment method".to_string(),
                reason: format!("unknown payment method '{}'", s.trim()),
            })
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Shop header printed on a receipt, frozen at time of sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShopDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// A line item on a receipt.
///
/// `cost_price_cents` is the stock item's cost price at the moment of sale,
/// when one was known. Older receipts may lack it; the sales report then
/// looks the cost up from current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptItem {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub cost_price_cents: Option<i64>,
}

impl ReceiptItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Embedded cost price, only when it is usable for profit (> 0).
    pub fn known_cost_price(&self) -> Option<Money> {
        self.cost_price_cents
            .filter(|c| *c > 0)
            .map(Money::from_cents)
    }

    /// price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

/// An immutable record of a completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub id: String,
    pub shop_id: String,
    pub shop_details: ShopDetails,
    pub cashier_name: String,
    pub manager_name: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub payment_method: PaymentMethod,
    /// Human-facing receipt number, e.g. `TXN-250314-093012-4F2A`.
    pub transaction_id: String,
    pub total_amount_cents: i64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl Receipt {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Sum of line quantities.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Builds a transaction id of the form `TXN-YYMMDD-HHMMSS-XXXX`.
///
/// `at` is the shop-local wall clock time of the sale; the suffix is the first
/// four hex digits of `nonce`, uppercased.
///
/// ```rust
/// use chrono::NaiveDate;
/// use shopdesk_core::types::transaction_id;
/// use uuid::Uuid;
///
/// let at = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(9, 30, 12).unwrap();
/// let nonce = Uuid::parse_str("4f2a0000-0000-4000-8000-000000000000").unwrap();
/// assert_eq!(transaction_id(at, nonce), "TXN-250314-093012-4F2A");
/// ```
pub fn transaction_id(at: NaiveDateTime, nonce: Uuid) -> String {
    let suffix: String = nonce.simple().to_string().chars().take(4).collect();
    format!("TXN-{}-{}", at.format("%y%m%d-%H%M%S"), suffix.to_uppercase())
}

// =============================================================================
// Stock Item
// =============================================================================

/// An inventory record. Invariant: `quantity >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockItem {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
    pub quantity: i64,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub supplier: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Cost price when it is usable for profit (> 0).
    pub fn known_cost_price(&self) -> Option<Money> {
        self.cost_price_cents
            .filter(|c| *c > 0)
            .map(Money::from_cents)
    }

    /// Checks whether `requested` units can be sold from this record.
    #[inline]
    pub fn can_sell(&self, requested: i64) -> bool {
        self.quantity >= requested
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::of(self.quantity)
    }
}

/// Shelf status shown next to each stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum StockLevel {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockLevel {
    /// Quantities at or below this count as low.
    pub const LOW_THRESHOLD: i64 = 10;

    pub fn of(quantity: i64) -> Self {
        if quantity <= 0 {
            StockLevel::OutOfStock
        } else if quantity <= Self::LOW_THRESHOLD {
            StockLevel::LowStock
        } else {
            StockLevel::InStock
        }
    }
}

/// Fields accepted when adding or editing a stock item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockItemInput {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
    pub quantity: i64,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub supplier: Option<String>,
}

// =============================================================================
// Employees & Attendance
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub position: String,
    pub contact: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub salary_cents: i64,
    #[ts(as = "String")]
    pub joining_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    HalfDay,
    Leave,
}

impl AttendanceStatus {
    /// Stored form, e.g. `half-day`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::HalfDay => "half-day",
            AttendanceStatus::Leave => "leave",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "half-day" | "half_day" => Ok(AttendanceStatus::HalfDay),
            "leave" => Ok(AttendanceStatus::Leave),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown attendance status '{}'", other),
            }),
        }
    }
}

/// One employee's attendance for one day. Unique on (shop, employee, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceRecord {
    pub id: String,
    pub shop_id: String,
    pub employee_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Dashboard tally for a single day.
///
/// Half days count as present; leave counts as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub total: usize,
}

impl AttendanceSummary {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        records
            .into_iter()
            .fold(AttendanceSummary::default(), |mut acc, r| {
                match r.status {
                    AttendanceStatus::Present | AttendanceStatus::HalfDay => acc.present += 1,
                    AttendanceStatus::Absent | AttendanceStatus::Leave => acc.absent += 1,
                }
                acc.total += 1;
                acc
            })
    }
}

// =============================================================================
// Shop Profile
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShopProfile {
    pub shop_id: String,
    pub shop_name: String,
    pub address: String,
    pub phone_numbers: Vec<String>,
    /// Names offered in the receipt form's cashier picker.
    pub cashier_names: Vec<String>,
    /// Names offered in the receipt form's manager picker.
    pub manager_names: Vec<String>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ShopProfile {
    /// Header to freeze onto a new receipt.
    pub fn receipt_details(&self) -> ShopDetails {
        ShopDetails {
            name: self.shop_name.clone(),
            address: self.address.clone(),
            phone: self.phone_numbers.join(", "),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn attendance(status: AttendanceStatus) -> AttendanceRecord {
        let now = Utc::now();
        AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            shop_id: "shop-1".to_string(),
            employee_id: Uuid::new_v4().to_string(),
            date: now.date_naive(),
            status,
            check_in: None,
            check_out: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("Credit Card".parse::<PaymentMethod>().unwrap(), PaymentMethod::CreditCard);
        assert_eq!("mobile_payment".parse::<PaymentMethod>().unwrap(), PaymentMethod::MobilePayment);
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::BankTransfer.to_string(), "Bank Transfer");
    }

    #[test]
    fn test_stock_level_thresholds() {
        assert_eq!(StockLevel::of(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::of(-2), StockLevel::OutOfStock);
        assert_eq!(StockLevel::of(1), StockLevel::LowStock);
        assert_eq!(StockLevel::of(10), StockLevel::LowStock);
        assert_eq!(StockLevel::of(11), StockLevel::InStock);
        assert_eq!(
            serde_json::to_string(&StockLevel::OutOfStock).unwrap(),
            "\"out-of-stock\""
        );
    }

    #[test]
    fn test_attendance_status_serde() {
        let json = serde_json::to_string(&AttendanceStatus::HalfDay).unwrap();
        assert_eq!(json, "\"half-day\"");
        assert_eq!("half-day".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::HalfDay);
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::Present);
    }

    #[test]
    fn test_attendance_summary_groups_statuses() {
        let records = vec![
            attendance(AttendanceStatus::Present),
            attendance(AttendanceStatus::HalfDay),
            attendance(AttendanceStatus::Absent),
            attendance(AttendanceStatus::Leave),
            attendance(AttendanceStatus::Present),
        ];
        let summary = AttendanceSummary::tally(&records);
        assert_eq!(summary, AttendanceSummary { present: 3, absent: 2, total: 5 });
    }

    #[test]
    fn test_receipt_item_cost_price_must_be_positive() {
        let mut item = ReceiptItem {
            name: "Tea".to_string(),
            price_cents: 1500,
            quantity: 2,
            cost_price_cents: Some(0),
        };
        assert_eq!(item.known_cost_price(), None);
        item.cost_price_cents = Some(1000);
        assert_eq!(item.known_cost_price(), Some(Money::from_cents(1000)));
        assert_eq!(item.line_total().cents(), 3000);
    }

    #[test]
    fn test_shop_profile_joins_phone_numbers() {
        let profile = ShopProfile {
            shop_id: "shop-1".to_string(),
            shop_name: "Corner Store".to_string(),
            address: "1 Main St".to_string(),
            phone_numbers: vec!["555-0100".to_string(), "555-0101".to_string()],
            cashier_names: vec![],
            manager_names: vec![],
            updated_at: Utc::now(),
        };
        assert_eq!(profile.receipt_details().phone, "555-0100, 555-0101");
    }

    #[test]
    fn test_transaction_id_format() {
        let at = NaiveDate::from_ymd_opt(2024, 12, 1)
            .unwrap()
            .and_hms_opt(23, 5, 9)
            .unwrap();
        let id = transaction_id(at, Uuid::new_v4());
        assert!(id.starts_with("TXN-241201-230509-"));
        let suffix = &id["TXN-241201-230509-".len()..];
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
