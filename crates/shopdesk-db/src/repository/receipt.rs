//! # Receipt Repository
//!
//! Database operations for receipts and their line items.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  receipts                          receipt_items                        │
//! │  ┌──────────────────────────┐      ┌───────────────────────────────┐   │
//! │  │ id            (PK)       │◄─────│ receipt_id   (FK, cascade)    │   │
//! │  │ shop_id                  │      │ position     (0, 1, 2, ...)   │   │
//! │  │ shop_name/address/phone  │      │ name                          │   │
//! │  │ cashier_name             │      │ price_cents                   │   │
//! │  │ manager_name             │      │ quantity                      │   │
//! │  │ payment_method           │      │ cost_price_cents (nullable)   │   │
//! │  │ transaction_id           │      └───────────────────────────────┘   │
//! │  │ total_amount_cents       │                                          │
//! │  │ timestamp                │                                          │
//! │  └──────────────────────────┘                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipts are written once, together with their items, in a single
//! transaction and never updated afterwards.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::ts;
use crate::error::DbResult;
use shopdesk_core::{PaymentMethod, Receipt, ReceiptItem, ShopDetails};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    id: String,
    shop_id: String,
    shop_name: String,
    shop_address: String,
    shop_phone: String,
    cashier_name: String,
    manager_name: Option<String>,
    payment_method: PaymentMethod,
    transaction_id: String,
    total_amount_cents: i64,
    timestamp: DateTime<Utc>,
}

impl ReceiptRow {
    fn into_receipt(self, items: Vec<ReceiptItem>) -> Receipt {
        Receipt {
            id: self.id,
            shop_id: self.shop_id,
            shop_details: ShopDetails {
                name: self.shop_name,
                address: self.shop_address,
                phone: self.shop_phone,
            },
            cashier_name: self.cashier_name,
            manager_name: self.manager_name,
            items,
            payment_method: self.payment_method,
            transaction_id: self.transaction_id,
            total_amount_cents: self.total_amount_cents,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    receipt_id: String,
    name: String,
    price_cents: i64,
    quantity: i64,
    cost_price_cents: Option<i64>,
}

impl From<ItemRow> for ReceiptItem {
    fn from(row: ItemRow) -> Self {
        ReceiptItem {
            name: row.name,
            price_cents: row.price_cents,
            quantity: row.quantity,
            cost_price_cents: row.cost_price_cents,
        }
    }
}

const RECEIPT_COLUMNS: &str = r#"
    r.id, r.shop_id, r.shop_name, r.shop_address, r.shop_phone,
    r.cashier_name, r.manager_name, r.payment_method, r.transaction_id,
    r.total_amount_cents, r.timestamp
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for receipt database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.receipts();
///
/// repo.insert(&receipt).await?;
/// let all = repo.list_by_shop("demo-shop").await?;
/// let latest = repo.recent("demo-shop", 5).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Inserts a receipt and all of its items atomically.
    ///
    /// ## Returns
    /// * `Ok(())` - Receipt and items written
    /// * `Err(DbError::UniqueViolation)` - Receipt ID already exists
    pub async fn insert(&self, receipt: &Receipt) -> DbResult<()> {
        debug!(
            id = %receipt.id,
            shop_id = %receipt.shop_id,
            items = receipt.items.len(),
            "Inserting receipt"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO receipts (
                id, shop_id, shop_name, shop_address, shop_phone,
                cashier_name, manager_name, payment_method, transaction_id,
                total_amount_cents, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&receipt.id)
        .bind(&receipt.shop_id)
        .bind(&receipt.shop_details.name)
        .bind(&receipt.shop_details.address)
        .bind(&receipt.shop_details.phone)
        .bind(&receipt.cashier_name)
        .bind(&receipt.manager_name)
        .bind(receipt.payment_method)
        .bind(&receipt.transaction_id)
        .bind(receipt.total_amount_cents)
        .bind(ts(&receipt.timestamp))
        .execute(&mut *tx)
        .await?;

        for (position, item) in receipt.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO receipt_items (
                    receipt_id, position, name, price_cents, quantity, cost_price_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&receipt.id)
            .bind(position as i64)
            .bind(&item.name)
            .bind(item.price_cents)
            .bind(item.quantity)
            .bind(item.cost_price_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a receipt by ID, scoped to the owning shop.
    ///
    /// A receipt belonging to another shop reads as `None`.
    pub async fn get_by_id(&self, shop_id: &str, id: &str) -> DbResult<Option<Receipt>> {
        let sql = format!(
            "SELECT {} FROM receipts r WHERE r.id = ?1 AND r.shop_id = ?2",
            RECEIPT_COLUMNS
        );
        let row = sqlx::query_as::<_, ReceiptRow>(&sql)
            .bind(id)
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT receipt_id, name, price_cents, quantity, cost_price_cents
            FROM receipt_items
            WHERE receipt_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ReceiptItem::from)
        .collect();

        Ok(Some(row.into_receipt(items)))
    }

    /// Lists every receipt of a shop, newest first, with items.
    pub async fn list_by_shop(&self, shop_id: &str) -> DbResult<Vec<Receipt>> {
        debug!(shop_id = %shop_id, "Listing receipts");

        let sql = format!(
            "SELECT {} FROM receipts r WHERE r.shop_id = ?1 ORDER BY r.timestamp DESC, r.id",
            RECEIPT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReceiptRow>(&sql)
            .bind(shop_id)
            .fetch_all(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT ri.receipt_id, ri.name, ri.price_cents, ri.quantity, ri.cost_price_cents
            FROM receipt_items ri
            INNER JOIN receipts r ON r.id = ri.receipt_id
            WHERE r.shop_id = ?1
            ORDER BY ri.receipt_id, ri.position
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        let receipts = attach_items(rows, items);
        debug!(count = receipts.len(), "Receipts listed");
        Ok(receipts)
    }

    /// The `limit` most recent receipts of a shop, newest first.
    pub async fn recent(&self, shop_id: &str, limit: usize) -> DbResult<Vec<Receipt>> {
        let sql = format!(
            "SELECT {} FROM receipts r WHERE r.shop_id = ?1 ORDER BY r.timestamp DESC, r.id LIMIT ?2",
            RECEIPT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReceiptRow>(&sql)
            .bind(shop_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT ri.receipt_id, ri.name, ri.price_cents, ri.quantity, ri.cost_price_cents
            FROM receipt_items ri
            INNER JOIN (
                SELECT id FROM receipts
                WHERE shop_id = ?1
                ORDER BY timestamp DESC, id
                LIMIT ?2
            ) latest ON latest.id = ri.receipt_id
            ORDER BY ri.receipt_id, ri.position
            "#,
        )
        .bind(shop_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(attach_items(rows, items))
    }

    /// Counts the receipts of a shop.
    pub async fn count_by_shop(&self, shop_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipts WHERE shop_id = ?1")
            .bind(shop_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Joins item rows onto their receipts, keeping the receipt order.
fn attach_items(rows: Vec<ReceiptRow>, items: Vec<ItemRow>) -> Vec<Receipt> {
    let mut by_receipt: HashMap<String, Vec<ReceiptItem>> = HashMap::new();
    for item in items {
        by_receipt
            .entry(item.receipt_id.clone())
            .or_default()
            .push(ReceiptItem::from(item));
    }

    rows.into_iter()
        .map(|row| {
            let items = by_receipt.remove(&row.id).unwrap_or_default();
            row.into_receipt(items)
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use shopdesk_core::{PaymentMethod, Receipt, ReceiptItem, ShopDetails};

    fn item(name: &str, price_cents: i64, quantity: i64, cost: Option<i64>) -> ReceiptItem {
        ReceiptItem {
            name: name.to_string(),
            price_cents,
            quantity,
            cost_price_cents: cost,
        }
    }

    fn receipt(id: &str, shop_id: &str, at: DateTime<Utc>, items: Vec<ReceiptItem>) -> Receipt {
        let total = items.iter().map(|i| i.price_cents * i.quantity).sum();
        Receipt {
            id: id.to_string(),
            shop_id: shop_id.to_string(),
            shop_details: ShopDetails {
                name: "Corner Store".to_string(),
                address: "12 Market Road".to_string(),
                phone: "555-0100".to_string(),
            },
            cashier_name: "Asha".to_string(),
            manager_name: None,
            items,
            payment_method: PaymentMethod::Cash,
            transaction_id: format!("TXN-{}", id),
            total_amount_cents: total,
            timestamp: at,
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_preserves_items_in_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.receipts();

        let mut r = receipt(
            "r-1",
            "shop-1",
            base(),
            vec![item("Green Tea", 1500, 2, Some(1000)), item("Biscuits", 250, 4, None)],
        );
        r.manager_name = Some("Ravi".to_string());
        r.payment_method = PaymentMethod::MobilePayment;
        repo.insert(&r).await.unwrap();

        let loaded = repo.get_by_id("shop-1", "r-1").await.unwrap().unwrap();
        assert_eq!(loaded, r);
    }

    #[tokio::test]
    async fn test_get_by_id_is_scoped_to_shop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.receipts();
        repo.insert(&receipt("r-1", "shop-1", base(), vec![item("Tea", 100, 1, None)]))
            .await
            .unwrap();

        assert!(repo.get_by_id("shop-2", "r-1").await.unwrap().is_none());
        assert!(repo.get_by_id("shop-1", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.receipts();
        let r = receipt("r-1", "shop-1", base(), vec![item("Tea", 100, 1, None)]);
        repo.insert(&r).await.unwrap();

        let err = repo.insert(&r).await.unwrap_err();
        assert!(matches!(err, crate::DbError::UniqueViolation { .. }));

        let loaded = repo.get_by_id("shop-1", "r-1").await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 1);
    }

    #[tokio::test]
    async fn test_list_recent_and_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.receipts();

        for n in 0..4 {
            let at = base() + Duration::hours(n);
            let r = receipt(&format!("r-{}", n), "shop-1", at, vec![item("Tea", 100, n + 1, None)]);
            repo.insert(&r).await.unwrap();
        }
        repo.insert(&receipt("other", "shop-2", base(), vec![item("Tea", 100, 1, None)]))
            .await
            .unwrap();

        let all = repo.list_by_shop("shop-1").await.unwrap();
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-3", "r-2", "r-1", "r-0"]);
        assert_eq!(all[0].items[0].quantity, 4);

        let latest = repo.recent("shop-1", 2).await.unwrap();
        let ids: Vec<&str> = latest.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r-3", "r-2"]);
        assert!(latest.iter().all(|r| r.items.len() == 1));

        assert_eq!(repo.count_by_shop("shop-1").await.unwrap(), 4);
        assert_eq!(repo.count_by_shop("shop-3").await.unwrap(), 0);
    }
}
