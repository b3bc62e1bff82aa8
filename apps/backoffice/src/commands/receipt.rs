//! # Receipt Commands
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    New Receipt Submission                               │
//! │                                                                         │
//! │  ReceiptDraft (rows, cashier, manager, payment method)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  draft.validate()            cashier required, name/price/qty per row  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  draft.check_inventory()     every row in stock, enough quantity       │
//! │       │                      (all failures reported together)          │
//! │       ▼                                                                 │
//! │  draft.into_items()          canonical names + frozen cost prices      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  receipts().insert()         receipt + items, one transaction          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stock().decrement_for_sale() clamped at 0                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check and the decrement are separate steps, so two cashiers
//! selling the last unit at once can both succeed. Quantities never go
//! below zero.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use shopdesk_core::validation::{parse_date, validate_search_query};
use shopdesk_core::{
    transaction_id, Money, PaymentMethod, Receipt, ReceiptDraft, ReceiptItem, StockItem,
    ValidationError,
};
use shopdesk_db::repository::generate_id;

use super::{contains_ignore_case, SortDirection};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItemDto {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub cost_price_cents: Option<i64>,
    pub line_total_cents: i64,
}

impl From<ReceiptItem> for ReceiptItemDto {
    fn from(item: ReceiptItem) -> Self {
        ReceiptItemDto {
            line_total_cents: item.line_total().cents(),
            name: item.name,
            price_cents: item.price_cents,
            quantity: item.quantity,
            cost_price_cents: item.cost_price_cents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDto {
    pub id: String,
    pub transaction_id: String,
    pub shop_name: String,
    pub shop_address: String,
    pub shop_phone: String,
    pub cashier_name: String,
    pub manager_name: Option<String>,
    /// Printed label, e.g. "Credit Card".
    pub payment_method: String,
    pub items: Vec<ReceiptItemDto>,
    pub item_count: i64,
    pub total_amount_cents: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<Receipt> for ReceiptDto {
    fn from(r: Receipt) -> Self {
        ReceiptDto {
            item_count: r.item_count(),
            id: r.id,
            transaction_id: r.transaction_id,
            shop_name: r.shop_details.name,
            shop_address: r.shop_details.address,
            shop_phone: r.shop_details.phone,
            cashier_name: r.cashier_name,
            manager_name: r.manager_name,
            payment_method: r.payment_method.label().to_string(),
            items: r.items.into_iter().map(ReceiptItemDto::from).collect(),
            total_amount_cents: r.total_amount_cents,
            timestamp: r.timestamp,
        }
    }
}

// =============================================================================
// Query
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReceiptSort {
    #[default]
    Timestamp,
    TotalAmount,
}

impl FromStr for ReceiptSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "timestamp" | "date" => Ok(ReceiptSort::Timestamp),
            "total" | "totalamount" => Ok(ReceiptSort::TotalAmount),
            other => Err(ValidationError::InvalidFormat {
                field: "sort".to_string(),
                reason: format!("expected timestamp or total, got '{}'", other),
            }),
        }
    }
}

/// Receipt list filters. Defaults list everything, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptQuery {
    /// Matches transaction id, cashier name or any item name.
    pub search: Option<String>,
    /// `YYYY-MM-DD`; keeps receipts from that shop-local day.
    pub date: Option<String>,
    #[serde(default)]
    pub sort: ReceiptSort,
    #[serde(default)]
    pub direction: SortDirection,
}

fn matches_search(receipt: &Receipt, needle_lower: &str) -> bool {
    contains_ignore_case(&receipt.transaction_id, needle_lower)
        || contains_ignore_case(&receipt.cashier_name, needle_lower)
        || receipt
            .items
            .iter()
            .any(|item| contains_ignore_case(&item.name, needle_lower))
}

// =============================================================================
// Commands
// =============================================================================

/// Validates a draft, saves it as a receipt and takes the sold quantities
/// out of stock.
///
/// ## Returns
/// The stored receipt, or `VALIDATION_ERROR` / `INVENTORY_ERROR` with
/// every problem listed.
pub async fn create_receipt(state: &AppState, draft: ReceiptDraft) -> ApiResult<ReceiptDto> {
    let start = Instant::now();
    let shop_id = state.shop_id();
    debug!(shop_id = %shop_id, rows = draft.rows().len(), "create_receipt command");

    draft.validate()?;

    let stock = state.db().stock().list_by_shop(shop_id).await?;
    draft.check_inventory(&stock)?;

    let shop_details = state
        .db()
        .shops()
        .get_profile(shop_id)
        .await?
        .map(|profile| profile.receipt_details())
        .unwrap_or_default();

    let cashier_name = draft.cashier_name().trim().to_string();
    let manager_name = draft
        .manager_name()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    let payment_method = draft.payment_method();
    let items = draft.into_items(&stock);
    let total: Money = items.iter().map(ReceiptItem::line_total).sum();

    // Stored timestamps keep millisecond precision
    let now = Utc::now().trunc_subsecs(3);
    let local = now
        .with_timezone(&state.analytics().config().offset())
        .naive_local();

    let receipt = Receipt {
        id: generate_id(),
        shop_id: shop_id.to_string(),
        shop_details,
        cashier_name,
        manager_name,
        items,
        payment_method,
        transaction_id: transaction_id(local, Uuid::new_v4()),
        total_amount_cents: total.cents(),
        timestamp: now,
    };

    state.db().receipts().insert(&receipt).await?;
    let decremented = state
        .db()
        .stock()
        .decrement_for_sale(shop_id, &receipt.items)
        .await?;

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        receipt_id = %receipt.id,
        transaction_id = %receipt.transaction_id,
        total_cents = receipt.total_amount_cents,
        stock_rows_updated = decremented,
        "Receipt created"
    );

    Ok(ReceiptDto::from(receipt))
}

/// One typed line of a quick sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub name: String,
    pub quantity: i64,
    /// Overrides the stock price when given.
    pub price_cents: Option<i64>,
}

/// A sale entered without the interactive form: typed lines plus
/// scanned barcodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub cashier_name: String,
    pub manager_name: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub lines: Vec<SaleLine>,
    #[serde(default)]
    pub scanned_skus: Vec<String>,
}

/// Builds the draft a cashier would have produced on the form.
///
/// Typed lines fill rows in order (price taken from stock on a name
/// match); each scan then adds a row or bumps an existing one.
pub fn build_draft(request: SaleRequest, stock: &[StockItem]) -> ApiResult<ReceiptDraft> {
    let mut draft = ReceiptDraft::new()
        .with_cashier(request.cashier_name)
        .with_payment_method(request.payment_method);
    if let Some(manager) = request.manager_name {
        draft = draft.with_manager(manager);
    }

    let typed = request.lines.len();
    for (index, line) in request.lines.into_iter().enumerate() {
        if index > 0 {
            draft = draft.add_row();
        }
        draft = draft
            .set_name(index, line.name, stock)?
            .set_quantity(index, line.quantity)?;
        if let Some(price) = line.price_cents {
            draft = draft.set_price(index, Money::from_cents(price))?;
        }
    }

    for sku in &request.scanned_skus {
        draft = draft.scan_sku(sku, stock)?;
    }

    // Scans alone leave the form's initial blank row behind
    if typed == 0 && draft.rows().len() > 1 {
        draft = draft.remove_row(0)?;
    }

    Ok(draft)
}

/// Quick sale: builds the draft from `request` and submits it.
pub async fn sell(state: &AppState, request: SaleRequest) -> ApiResult<ReceiptDto> {
    let stock = state.db().stock().list_by_shop(state.shop_id()).await?;
    let draft = build_draft(request, &stock)?;
    create_receipt(state, draft).await
}

/// Gets one receipt. Receipts of other shops read as not found.
pub async fn get_receipt(state: &AppState, id: &str) -> ApiResult<ReceiptDto> {
    debug!(id = %id, "get_receipt command");
    let receipt = state
        .db()
        .receipts()
        .get_by_id(state.shop_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Receipt", id))?;
    Ok(ReceiptDto::from(receipt))
}

/// Lists the shop's receipts with search, date filter and sorting.
pub async fn list_receipts(state: &AppState, query: ReceiptQuery) -> ApiResult<Vec<ReceiptDto>> {
    let start = Instant::now();
    let needle = validate_search_query(query.search.as_deref().unwrap_or_default())?.to_lowercase();
    let date = query
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| parse_date("date", d))
        .transpose()?;
    let offset = state.analytics().config().offset();

    let mut receipts: Vec<Receipt> = state
        .db()
        .receipts()
        .list_by_shop(state.shop_id())
        .await?
        .into_iter()
        .filter(|r| matches_search(r, &needle))
        .filter(|r| match date {
            Some(date) => r.timestamp.with_timezone(&offset).date_naive() == date,
            None => true,
        })
        .collect();

    receipts.sort_by(|a, b| {
        let ordering = match query.sort {
            ReceiptSort::Timestamp => a.timestamp.cmp(&b.timestamp),
            ReceiptSort::TotalAmount => a.total_amount_cents.cmp(&b.total_amount_cents),
        };
        query.direction.apply(ordering)
    });

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = receipts.len(),
        "list_receipts complete"
    );

    Ok(receipts.into_iter().map(ReceiptDto::from).collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
