//! # Receipt Draft
//!
//! State of the new-receipt screen as an immutable value. Every edit
//! consumes the draft and returns the next one, so a screen can keep the
//! previous state for undo or discard it freely.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ReceiptDraft::new()        one empty row, qty 1, Cash                  │
//! │        │                                                                │
//! │        ├── add_row / remove_row (never below one row)                   │
//! │        ├── set_name  ──► price filled from stock (case-insensitive)     │
//! │        ├── set_price / set_quantity                                     │
//! │        ├── scan_sku  ──► +1 on matching row, or a new row               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  validate()          cashier, names, price > 0, qty > 0                 │
//! │  check_inventory()   every row in stock with enough quantity            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  into_items()        ReceiptItem[] with cost price frozen from stock    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, ReceiptItem, StockItem};
use crate::validation::{
    validate_at_most, validate_positive, validate_required, MAX_PRICE_CENTS, MAX_QUANTITY,
};

/// One editable line of the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DraftRow {
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl Default for DraftRow {
    fn default() -> Self {
        DraftRow {
            name: String::new(),
            price_cents: 0,
            quantity: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptDraft {
    rows: Vec<DraftRow>,
    cashier_name: String,
    manager_name: String,
    payment_method: PaymentMethod,
}

impl Default for ReceiptDraft {
    fn default() -> Self {
        Self::new()
    }
}

fn find_by_name<'a>(stock: &'a [StockItem], name: &str) -> Option<&'a StockItem> {
    let needle = name.trim().to_lowercase();
    stock.iter().find(|s| s.name.to_lowercase() == needle)
}

impl ReceiptDraft {
    pub fn new() -> Self {
        ReceiptDraft {
            rows: vec![DraftRow::default()],
            cashier_name: String::new(),
            manager_name: String::new(),
            payment_method: PaymentMethod::default(),
        }
    }

    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    pub fn cashier_name(&self) -> &str {
        &self.cashier_name
    }

    /// Manager name, `None` when left blank.
    pub fn manager_name(&self) -> Option<&str> {
        let name = self.manager_name.trim();
        (!name.is_empty()).then_some(name)
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    pub fn with_cashier(mut self, name: impl Into<String>) -> Self {
        self.cashier_name = name.into();
        self
    }

    pub fn with_manager(mut self, name: impl Into<String>) -> Self {
        self.manager_name = name.into();
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    /// Appends an empty row.
    pub fn add_row(mut self) -> Self {
        self.rows.push(DraftRow::default());
        self
    }

    /// Removes row `index`. The last remaining row is never removed.
    pub fn remove_row(mut self, index: usize) -> CoreResult<Self> {
        if index >= self.rows.len() {
            return Err(CoreError::RowNotFound { index });
        }
        if self.rows.len() > 1 {
            self.rows.remove(index);
        }
        Ok(self)
    }

    /// Sets a row's item name and, when the name matches a stock item
    /// (case-insensitive), its price.
    pub fn set_name(mut self, index: usize, name: impl Into<String>, stock: &[StockItem]) -> CoreResult<Self> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowNotFound { index })?;
        row.name = name.into();
        if let Some(item) = find_by_name(stock, &row.name) {
            row.price_cents = item.price_cents;
        }
        Ok(self)
    }

    pub fn set_price(mut self, index: usize, price: Money) -> CoreResult<Self> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowNotFound { index })?;
        row.price_cents = price.cents();
        Ok(self)
    }

    pub fn set_quantity(mut self, index: usize, quantity: i64) -> CoreResult<Self> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowNotFound { index })?;
        row.quantity = quantity;
        Ok(self)
    }

    /// Applies a barcode scan.
    ///
    /// The SKU is matched case-insensitively. If a row already holds the
    /// item (by name, case-insensitive) its quantity goes up by one;
    /// otherwise a new row with the stock price and quantity 1 is added.
    pub fn scan_sku(mut self, sku: &str, stock: &[StockItem]) -> CoreResult<Self> {
        let needle = sku.trim().to_lowercase();
        let item = stock
            .iter()
            .find(|s| s.sku.as_deref().map(str::to_lowercase).as_deref() == Some(needle.as_str()))
            .ok_or_else(|| CoreError::UnknownSku(sku.trim().to_string()))?;

        let item_name = item.name.to_lowercase();
        match self
            .rows
            .iter_mut()
            .find(|row| row.name.to_lowercase() == item_name)
        {
            Some(row) => row.quantity = row.quantity.max(0) + 1,
            None => self.rows.push(DraftRow {
                name: item.name.clone(),
                price_cents: item.price_cents,
                quantity: 1,
            }),
        }
        Ok(self)
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    /// Σ price × quantity over all rows.
    pub fn total(&self) -> Money {
        self.rows
            .iter()
            .map(|r| Money::from_cents(r.price_cents).multiply_quantity(r.quantity))
            .sum()
    }

    /// Like [`ReceiptDraft::total`], `None` if the sum does not fit in cents.
    pub fn checked_total(&self) -> Option<Money> {
        self.rows.iter().try_fold(Money::zero(), |acc, r| {
            Money::from_cents(r.price_cents)
                .checked_multiply_quantity(r.quantity)
                .and_then(|line| acc.checked_add(line))
        })
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Form-level checks run before touching inventory.
    pub fn validate(&self) -> CoreResult<()> {
        validate_required("cashier name", &self.cashier_name)?;
        for row in &self.rows {
            if row.name.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "item name".to_string(),
                }
                .into());
            }
            validate_positive("item price", row.price_cents)?;
            validate_at_most("item price", row.price_cents, MAX_PRICE_CENTS)?;
            validate_positive("item quantity", row.quantity)?;
            validate_at_most("item quantity", row.quantity, MAX_QUANTITY)?;
        }
        if self.checked_total().is_none() {
            return Err(ValidationError::InvalidFormat {
                field: "receipt total".to_string(),
                reason: "amount is too large".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Every row must name a stock item (case-insensitive) holding at least
    /// the requested quantity. All failing rows are reported together.
    pub fn check_inventory(&self, stock: &[StockItem]) -> CoreResult<()> {
        let problems: Vec<String> = self
            .rows
            .iter()
            .filter_map(|row| match find_by_name(stock, &row.name) {
                None => Some(format!("{}: Item not found in inventory", row.name)),
                Some(item) if !item.can_sell(row.quantity) => Some(format!(
                    "{}: Insufficient quantity (Available: {})",
                    row.name, item.quantity
                )),
                Some(_) => None,
            })
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InventoryCheck(problems))
        }
    }

    /// Converts the rows into receipt lines.
    ///
    /// Rows matching a stock item take the item's canonical name and freeze
    /// its current cost price onto the line.
    pub fn into_items(self, stock: &[StockItem]) -> Vec<ReceiptItem> {
        self.rows
            .into_iter()
            .map(|row| {
                let matched = find_by_name(stock, &row.name);
                ReceiptItem {
                    name: matched.map_or_else(|| row.name.trim().to_string(), |s| s.name.clone()),
                    price_cents: row.price_cents,
                    quantity: row.quantity,
                    cost_price_cents: matched
                        .and_then(StockItem::known_cost_price)
                        .map(|c| c.cents()),
                }
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stock(name: &str, sku: &str, price: i64, cost: Option<i64>, qty: i64) -> StockItem {
        let now = Utc::now();
        StockItem {
            id: format!("id-{}", sku),
            shop_id: "shop-1".to_string(),
            name: name.to_string(),
            description: None,
            price_cents: price,
            cost_price_cents: cost,
            quantity: qty,
            category: None,
            sku: Some(sku.to_string()),
            supplier: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn shelf() -> Vec<StockItem> {
        vec![
            stock("Green Tea", "TEA-01", 1500, Some(1000), 10),
            stock("Cake", "CAKE-01", 2000, None, 1),
        ]
    }

    #[test]
    fn test_new_draft_has_one_row() {
        let draft = ReceiptDraft::new();
        assert_eq!(draft.rows().len(), 1);
        assert_eq!(draft.rows()[0].quantity, 1);
        assert_eq!(draft.payment_method(), PaymentMethod::Cash);
        assert!(draft.total().is_zero());
    }

    #[test]
    fn test_remove_keeps_last_row() {
        let draft = ReceiptDraft::new().add_row();
        let draft = draft.remove_row(0).unwrap();
        assert_eq!(draft.rows().len(), 1);
        let draft = draft.remove_row(0).unwrap();
        assert_eq!(draft.rows().len(), 1);
        assert!(matches!(
            draft.remove_row(4),
            Err(CoreError::RowNotFound { index: 4 })
        ));
    }

    #[test]
    fn test_set_name_fills_price_case_insensitively() {
        let draft = ReceiptDraft::new().set_name(0, "green tea", &shelf()).unwrap();
        assert_eq!(draft.rows()[0].price_cents, 1500);

        let draft = draft.set_name(0, "Unknown", &shelf()).unwrap();
        assert_eq!(draft.rows()[0].price_cents, 1500);
    }

    #[test]
    fn test_scan_increments_or_appends() {
        let draft = ReceiptDraft::new().scan_sku("tea-01", &shelf()).unwrap();
        assert_eq!(draft.rows().len(), 2);
        assert_eq!(draft.rows()[1].name, "Green Tea");

        let draft = draft.scan_sku("TEA-01", &shelf()).unwrap();
        assert_eq!(draft.rows().len(), 2);
        assert_eq!(draft.rows()[1].quantity, 2);
        assert_eq!(draft.total().cents(), 3000);

        assert!(matches!(
            draft.scan_sku("NOPE", &shelf()),
            Err(CoreError::UnknownSku(sku)) if sku == "NOPE"
        ));
    }

    #[test]
    fn test_validate_requires_cashier_and_positive_values() {
        let draft = ReceiptDraft::new()
            .set_name(0, "Cake", &shelf())
            .unwrap();
        assert!(draft.validate().is_err());

        let draft = draft.with_cashier("Ann");
        assert!(draft.validate().is_ok());

        let draft = draft.set_quantity(0, 0).unwrap();
        assert!(draft.validate().is_err());

        let draft = draft.set_quantity(0, 1).unwrap().add_row();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_amounts_that_would_overflow() {
        let draft = ReceiptDraft::new()
            .with_cashier("Ann")
            .set_name(0, "Green Tea", &shelf())
            .and_then(|d| d.set_price(0, Money::from_cents(i64::MAX / 2 + 1)))
            .and_then(|d| d.set_quantity(0, 2))
            .unwrap();
        assert!(matches!(
            draft.validate(),
            Err(CoreError::Validation(ValidationError::TooLarge { ref field, .. })) if field == "item price"
        ));

        let draft = draft
            .set_price(0, Money::from_cents(1500))
            .and_then(|d| d.set_quantity(0, MAX_QUANTITY + 1))
            .unwrap();
        assert!(draft.validate().is_err());

        // Every row at the bounds, but too many rows for the total to fit
        let mut draft = ReceiptDraft::new().with_cashier("Ann");
        for index in 0..10_000 {
            if index > 0 {
                draft = draft.add_row();
            }
            draft = draft
                .set_name(index, "Green Tea", &shelf())
                .and_then(|d| d.set_price(index, Money::from_cents(MAX_PRICE_CENTS)))
                .and_then(|d| d.set_quantity(index, MAX_QUANTITY))
                .unwrap();
        }
        assert_eq!(draft.checked_total(), None);
        assert!(matches!(
            draft.validate(),
            Err(CoreError::Validation(ValidationError::InvalidFormat { ref field, .. })) if field == "receipt total"
        ));
    }

    #[test]
    fn test_inventory_check_reports_every_problem() {
        let draft = ReceiptDraft::new()
            .set_name(0, "Cake", &shelf())
            .and_then(|d| d.set_quantity(0, 3))
            .map(ReceiptDraft::add_row)
            .and_then(|d| d.set_name(1, "Scones", &shelf()))
            .unwrap();

        let err = draft.check_inventory(&shelf()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Inventory error: Cake: Insufficient quantity (Available: 1), Scones: Item not found in inventory"
        );
    }

    #[test]
    fn test_into_items_freezes_cost_and_canonical_name() {
        let items = ReceiptDraft::new()
            .set_name(0, "GREEN TEA", &shelf())
            .and_then(|d| d.set_quantity(0, 2))
            .map(ReceiptDraft::add_row)
            .and_then(|d| d.set_name(1, "cake", &shelf()))
            .unwrap()
            .into_items(&shelf());

        assert_eq!(items[0].name, "Green Tea");
        assert_eq!(items[0].cost_price_cents, Some(1000));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[1].name, "Cake");
        assert_eq!(items[1].cost_price_cents, None);
    }
}
