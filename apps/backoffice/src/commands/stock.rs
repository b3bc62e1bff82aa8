//! # Stock Commands
//!
//! Stock list, add/edit/delete, categories and barcode lookup.
//!
//! ## List Filters
//! ```text
//! search   "tea"      ─► name, description or category contains (any case)
//! category "Drinks"   ─► exact category
//! sort     name | price | quantity | updatedAt, asc or desc
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

use shopdesk_core::validation::{validate_search_query, validate_sku, validate_stock_input};
use shopdesk_core::{CoreError, StockItem, StockItemInput, StockLevel, ValidationError};
use shopdesk_db::DbError;

use super::{contains_ignore_case, SortDirection};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_price_cents: Option<i64>,
    pub quantity: i64,
    pub stock_level: StockLevel,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StockItem> for StockItemDto {
    fn from(s: StockItem) -> Self {
        let stock_level = s.stock_level();
        StockItemDto {
            id: s.id,
            name: s.name,
            description: s.description,
            price_cents: s.price_cents,
            cost_price_cents: s.cost_price_cents,
            quantity: s.quantity,
            stock_level,
            category: s.category,
            sku: s.sku,
            supplier: s.supplier,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockSort {
    #[default]
    Name,
    Price,
    Quantity,
    UpdatedAt,
}

impl FromStr for StockSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "name" => Ok(StockSort::Name),
            "price" => Ok(StockSort::Price),
            "quantity" | "qty" => Ok(StockSort::Quantity),
            "updatedat" | "updated" => Ok(StockSort::UpdatedAt),
            other => Err(ValidationError::InvalidFormat {
                field: "sort".to_string(),
                reason: format!("expected name, price, quantity or updated-at, got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub sort: StockSort,
    #[serde(default = "ascending")]
    pub direction: SortDirection,
}

fn ascending() -> SortDirection {
    SortDirection::Asc
}

/// Everything, A to Z.
impl Default for StockQuery {
    fn default() -> Self {
        StockQuery {
            search: None,
            category: None,
            sort: StockSort::Name,
            direction: SortDirection::Asc,
        }
    }
}

/// Fails when another item of the shop already carries `sku`.
async fn ensure_sku_free(state: &AppState, sku: Option<&str>, except_id: Option<&str>) -> ApiResult<()> {
    let Some(sku) = sku else {
        return Ok(());
    };
    match state.db().stock().find_by_sku(state.shop_id(), sku).await? {
        Some(existing) if Some(existing.id.as_str()) != except_id => {
            Err(DbError::duplicate("SKU", sku).into())
        }
        _ => Ok(()),
    }
}

/// Lists the shop's stock with search, category filter and sorting.
pub async fn list_stock(state: &AppState, query: StockQuery) -> ApiResult<Vec<StockItemDto>> {
    let start = Instant::now();
    let needle = validate_search_query(query.search.as_deref().unwrap_or_default())?.to_lowercase();
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut items: Vec<StockItem> = state
        .db()
        .stock()
        .list_by_shop(state.shop_id())
        .await?
        .into_iter()
        .filter(|s| {
            contains_ignore_case(&s.name, &needle)
                || s.description
                    .as_deref()
                    .is_some_and(|d| contains_ignore_case(d, &needle))
                || s.category
                    .as_deref()
                    .is_some_and(|c| contains_ignore_case(c, &needle))
        })
        .filter(|s| category.is_none() || s.category.as_deref() == category)
        .collect();

    items.sort_by(|a, b| {
        let ordering = match query.sort {
            StockSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            StockSort::Price => a.price_cents.cmp(&b.price_cents),
            StockSort::Quantity => a.quantity.cmp(&b.quantity),
            StockSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        query.direction.apply(ordering)
    });

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = items.len(),
        "list_stock complete"
    );

    Ok(items.into_iter().map(StockItemDto::from).collect())
}

pub async fn add_stock_item(state: &AppState, input: StockItemInput) -> ApiResult<StockItemDto> {
    let input = validate_stock_input(input)?;
    ensure_sku_free(state, input.sku.as_deref(), None).await?;

    let item = state.db().stock().insert(state.shop_id(), &input).await?;
    info!(id = %item.id, name = %item.name, "Stock item added");
    Ok(StockItemDto::from(item))
}

/// Edits an item. Items of other shops read as not found.
pub async fn update_stock_item(
    state: &AppState,
    id: &str,
    input: StockItemInput,
) -> ApiResult<StockItemDto> {
    let input = validate_stock_input(input)?;
    ensure_sku_free(state, input.sku.as_deref(), Some(id)).await?;

    let item = state.db().stock().update(state.shop_id(), id, &input).await?;
    info!(id = %item.id, "Stock item updated");
    Ok(StockItemDto::from(item))
}

pub async fn delete_stock_item(state: &AppState, id: &str) -> ApiResult<()> {
    state.db().stock().delete(state.shop_id(), id).await?;
    info!(id = %id, "Stock item deleted");
    Ok(())
}

/// Distinct categories, for the filter dropdown.
pub async fn list_categories(state: &AppState) -> ApiResult<Vec<String>> {
    Ok(state.db().stock().categories(state.shop_id()).await?)
}

/// Looks up a scanned barcode (case-insensitive SKU match).
pub async fn find_by_barcode(state: &AppState, sku: &str) -> ApiResult<StockItemDto> {
    debug!(sku = %sku, "find_by_barcode command");
    validate_sku(sku)?;
    let item = state
        .db()
        .stock()
        .find_by_sku(state.shop_id(), sku.trim())
        .await?
        .ok_or_else(|| ApiError::from(CoreError::UnknownSku(sku.trim().to_string())))?;
    Ok(StockItemDto::from(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;

    fn input(name: &str, price: i64, qty: i64, category: Option<&str>, sku: Option<&str>) -> StockItemInput {
        StockItemInput {
            name: name.to_string(),
            price_cents: price,
            quantity: qty,
            category: category.map(str::to_string),
            sku: sku.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_and_list_with_filters() {
        let state = test_support::state().await;
        add_stock_item(&state, input("Green Tea", 250, 10, Some("Drinks"), Some("TEA-1"))).await.unwrap();
        add_stock_item(&state, input("coffee", 900, 3, Some("Drinks"), None)).await.unwrap();
        add_stock_item(&state, input("Bread", 300, 20, Some("Bakery"), None)).await.unwrap();

        let all = list_stock(&state, StockQuery::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bread", "coffee", "Green Tea"]);
        let levels: Vec<StockLevel> = all.iter().map(|s| s.stock_level).collect();
        assert_eq!(
            levels,
            vec![StockLevel::InStock, StockLevel::LowStock, StockLevel::LowStock]
        );

        let drinks = list_stock(
            &state,
            StockQuery {
                category: Some("Drinks".into()),
                sort: StockSort::Price,
                direction: SortDirection::Desc,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(drinks.len(), 2);
        assert_eq!(drinks[0].name, "coffee");

        let bakery_search = list_stock(
            &state,
            StockQuery {
                search: Some("BAKE".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(bakery_search.len(), 1);
        assert_eq!(bakery_search[0].name, "Bread");

        assert_eq!(list_categories(&state).await.unwrap(), vec!["Bakery", "Drinks"]);
    }

    #[tokio::test]
    async fn test_validation_and_duplicate_sku() {
        let state = test_support::state().await;

        let err = add_stock_item(&state, input("  ", 100, 1, None, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_stock_item(&state, input("Tea", -1, 1, None, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_stock_item(&state, input("Tea", 100, 1, None, Some("bad sku!"))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add_stock_item(&state, input("Tea", i64::MAX / 2 + 1, 1, None, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        add_stock_item(&state, input("Tea", 100, 1, None, Some("TEA-1"))).await.unwrap();
        let err = add_stock_item(&state, input("Other Tea", 100, 1, None, Some("tea-1"))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("already exists"));
    }

    #[tokio::test]
    async fn test_update_keeps_own_sku_and_delete() {
        let state = test_support::state().await;
        let item = add_stock_item(&state, input("Tea", 100, 1, None, Some("TEA-1"))).await.unwrap();

        let updated = update_stock_item(&state, &item.id, input("Tea", 150, 4, Some("Drinks"), Some("TEA-1")))
            .await
            .unwrap();
        assert_eq!(updated.price_cents, 150);
        assert_eq!(updated.quantity, 4);

        let sold_out = update_stock_item(&state, &item.id, input("Tea", 150, 0, Some("Drinks"), Some("TEA-1")))
            .await
            .unwrap();
        assert_eq!(sold_out.stock_level, StockLevel::OutOfStock);

        let err = update_stock_item(&state, "missing", input("Tea", 1, 1, None, None)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        delete_stock_item(&state, &item.id).await.unwrap();
        assert!(list_stock(&state, StockQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_barcode() {
        let state = test_support::state().await;
        add_stock_item(&state, input("Tea", 100, 1, None, Some("TEA-1"))).await.unwrap();

        assert_eq!(find_by_barcode(&state, "tea-1").await.unwrap().name, "Tea");

        let err = find_by_barcode(&state, "NOPE-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Item with barcode NOPE-1 not found in inventory");
    }
}
