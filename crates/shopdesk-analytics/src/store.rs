//! # Record Store Contract
//!
//! What the aggregation needs from storage, and nothing more.

use async_trait::async_trait;
use shopdesk_core::{Money, Receipt};
use shopdesk_db::{Database, DbResult};

/// Read access to a shop's receipts and current stock cost prices.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every receipt of the shop, in no particular order.
    async fn fetch_receipts_by_shop(&self, shop_id: &str) -> DbResult<Vec<Receipt>>;

    /// Cost price of the stock item named exactly `item_name` (case-sensitive),
    /// or `None` when there is no such item or it has no cost price.
    async fn fetch_stock_item_cost_price(
        &self,
        shop_id: &str,
        item_name: &str,
    ) -> DbResult<Option<Money>>;
}

#[async_trait]
impl RecordStore for Database {
    async fn fetch_receipts_by_shop(&self, shop_id: &str) -> DbResult<Vec<Receipt>> {
        self.receipts().list_by_shop(shop_id).await
    }

    async fn fetch_stock_item_cost_price(
        &self,
        shop_id: &str,
        item_name: &str,
    ) -> DbResult<Option<Money>> {
        self.stock().cost_price_by_name(shop_id, item_name).await
    }
}
