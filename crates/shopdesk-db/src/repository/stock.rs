//! # Stock Repository
//!
//! Database operations for a shop's inventory.
//!
//! ## Key Operations
//! - CRUD scoped by shop
//! - Exact-name and case-insensitive SKU lookups
//! - Cost price lookup feeding the sales report
//! - Quantity decrement after a sale
//!
//! ## Sale Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Decrement After A Sale                         │
//! │                                                                         │
//! │  Receipt items: [Green Tea x2, Biscuits x10, Mystery Box x1]           │
//! │       │                                                                 │
//! │       ▼  one transaction, one UPDATE per item                          │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ stock_items (shop_id = demo-shop)        │                           │
//! │  │                                          │                           │
//! │  │ Green Tea   qty 12 ──► 10                │                           │
//! │  │ Biscuits    qty  4 ──►  0  (clamped)     │                           │
//! │  │ (no row named Mystery Box: ignored)      │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │                                                                         │
//! │  Names match exactly; when several rows share a name, the oldest       │
//! │  one is decremented.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{generate_id, ts};
use crate::error::{DbError, DbResult};
use shopdesk_core::{Money, ReceiptItem, StockItem, StockItemInput};

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: String,
    shop_id: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    cost_price_cents: Option<i64>,
    quantity: i64,
    category: Option<String>,
    sku: Option<String>,
    supplier: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockRow> for StockItem {
    fn from(row: StockRow) -> Self {
        StockItem {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            cost_price_cents: row.cost_price_cents,
            quantity: row.quantity,
            category: row.category,
            sku: row.sku,
            supplier: row.supplier,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const STOCK_COLUMNS: &str = r#"
    id, shop_id, name, description, price_cents, cost_price_cents,
    quantity, category, sku, supplier, created_at, updated_at
"#;

/// Repository for stock database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.stock();
///
/// let item = repo.insert("demo-shop", &input).await?;
/// let by_sku = repo.find_by_sku("demo-shop", "tea-001").await?;
/// let cost = repo.cost_price_by_name("demo-shop", "Green Tea").await?;
/// ```
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Inserts a new stock item for `shop_id`.
    ///
    /// ## Arguments
    /// * `input` - Already validated fields
    ///
    /// ## Returns
    /// The stored item with generated ID and timestamps.
    pub async fn insert(&self, shop_id: &str, input: &StockItemInput) -> DbResult<StockItem> {
        debug!(shop_id = %shop_id, name = %input.name, "Inserting stock item");

        let id = generate_id();
        let now = ts(&Utc::now());

        sqlx::query(
            r#"
            INSERT INTO stock_items (
                id, shop_id, name, description, price_cents, cost_price_cents,
                quantity, category, sku, supplier, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
        )
        .bind(&id)
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.cost_price_cents)
        .bind(input.quantity)
        .bind(&input.category)
        .bind(&input.sku)
        .bind(&input.supplier)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(shop_id, &id)
            .await?
            .ok_or_else(|| DbError::not_found("StockItem", &id))
    }

    /// Gets a stock item by ID within a shop.
    pub async fn get_by_id(&self, shop_id: &str, id: &str) -> DbResult<Option<StockItem>> {
        let sql = format!(
            "SELECT {} FROM stock_items WHERE id = ?1 AND shop_id = ?2",
            STOCK_COLUMNS
        );
        let row = sqlx::query_as::<_, StockRow>(&sql)
            .bind(id)
            .bind(shop_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(StockItem::from))
    }

    /// Lists all stock items of a shop ordered by name.
    pub async fn list_by_shop(&self, shop_id: &str) -> DbResult<Vec<StockItem>> {
        let sql = format!(
            "SELECT {} FROM stock_items WHERE shop_id = ?1 ORDER BY name, created_at",
            STOCK_COLUMNS
        );
        let rows = sqlx::query_as::<_, StockRow>(&sql)
            .bind(shop_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(shop_id = %shop_id, count = rows.len(), "Stock listed");
        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    /// Finds the oldest stock item whose name matches exactly (case-sensitive).
    pub async fn find_by_name(&self, shop_id: &str, name: &str) -> DbResult<Option<StockItem>> {
        let sql = format!(
            "SELECT {} FROM stock_items WHERE shop_id = ?1 AND name = ?2 ORDER BY created_at, id LIMIT 1",
            STOCK_COLUMNS
        );
        let row = sqlx::query_as::<_, StockRow>(&sql)
            .bind(shop_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(StockItem::from))
    }

    /// Finds a stock item by SKU, ignoring case.
    pub async fn find_by_sku(&self, shop_id: &str, sku: &str) -> DbResult<Option<StockItem>> {
        let sql = format!(
            "SELECT {} FROM stock_items WHERE shop_id = ?1 AND sku = ?2 COLLATE NOCASE ORDER BY created_at, id LIMIT 1",
            STOCK_COLUMNS
        );
        let row = sqlx::query_as::<_, StockRow>(&sql)
            .bind(shop_id)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(StockItem::from))
    }

    /// Current cost price of the stock item named exactly `name`.
    ///
    /// ## Returns
    /// * `Ok(Some(cost))` - Item exists and has a cost price recorded
    /// * `Ok(None)` - No such item, or its cost price is unset
    pub async fn cost_price_by_name(&self, shop_id: &str, name: &str) -> DbResult<Option<Money>> {
        debug!(shop_id = %shop_id, name = %name, "Looking up cost price");

        let cost: Option<Option<i64>> = sqlx::query_scalar(
            r#"
            SELECT cost_price_cents
            FROM stock_items
            WHERE shop_id = ?1 AND name = ?2
            ORDER BY created_at, id
            LIMIT 1
            "#,
        )
        .bind(shop_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cost.flatten().map(Money::from_cents))
    }

    /// Replaces the editable fields of an item owned by `shop_id`.
    ///
    /// ## Returns
    /// * `Ok(StockItem)` - The updated item
    /// * `Err(DbError::NotFound)` - No such item in this shop
    pub async fn update(&self, shop_id: &str, id: &str, input: &StockItemInput) -> DbResult<StockItem> {
        debug!(shop_id = %shop_id, id = %id, "Updating stock item");

        let result = sqlx::query(
            r#"
            UPDATE stock_items SET
                name = ?3,
                description = ?4,
                price_cents = ?5,
                cost_price_cents = ?6,
                quantity = ?7,
                category = ?8,
                sku = ?9,
                supplier = ?10,
                updated_at = ?11
            WHERE id = ?1 AND shop_id = ?2
            "#,
        )
        .bind(id)
        .bind(shop_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.cost_price_cents)
        .bind(input.quantity)
        .bind(&input.category)
        .bind(&input.sku)
        .bind(&input.supplier)
        .bind(ts(&Utc::now()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockItem", id));
        }

        self.get_by_id(shop_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("StockItem", id))
    }

    /// Deletes an item owned by `shop_id`.
    pub async fn delete(&self, shop_id: &str, id: &str) -> DbResult<()> {
        debug!(shop_id = %shop_id, id = %id, "Deleting stock item");

        let result = sqlx::query("DELETE FROM stock_items WHERE id = ?1 AND shop_id = ?2")
            .bind(id)
            .bind(shop_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockItem", id));
        }

        Ok(())
    }

    /// Decrements stock for every sold item, clamping at zero.
    ///
    /// Items whose name matches no stock row are skipped.
    ///
    /// ## Returns
    /// Number of stock rows updated.
    pub async fn decrement_for_sale(&self, shop_id: &str, items: &[ReceiptItem]) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;
        let now = ts(&Utc::now());
        let mut updated = 0;

        for item in items {
            let result = sqlx::query(
                r#"
                UPDATE stock_items
                SET quantity = MAX(quantity - ?3, 0),
                    updated_at = ?4
                WHERE id = (
                    SELECT id FROM stock_items
                    WHERE shop_id = ?1 AND name = ?2
                    ORDER BY created_at, id
                    LIMIT 1
                )
                "#,
            )
            .bind(shop_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                debug!(name = %item.name, "No stock row for sold item");
            }
            updated += result.rows_affected();
        }

        tx.commit().await?;
        debug!(shop_id = %shop_id, updated, "Stock decremented");
        Ok(updated)
    }

    /// Distinct non-empty categories of a shop, sorted.
    pub async fn categories(&self, shop_id: &str) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT category
            FROM stock_items
            WHERE shop_id = ?1 AND category IS NOT NULL AND category <> ''
            ORDER BY category
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
