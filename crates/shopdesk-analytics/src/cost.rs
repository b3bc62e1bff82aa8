//! # Cost-Price Resolution
//!
//! Builds the [`CostBook`] for one aggregation.
//!
//! ```text
//! receipts ──► missing_names ──► [Tea, Cake, Soap]
//!                                   │
//!                                   ▼  buffer_unordered(lookup_concurrency)
//!                   store.fetch_stock_item_cost_price(shop, name)
//!                                   │
//!                                   ▼
//!                     CostBook { Tea: 10.00, Cake: None, Soap: 2.50 }
//! ```
//!
//! Each distinct name is fetched once. The first failed lookup fails the
//! whole resolution.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::store::RecordStore;
use shopdesk_core::{CostBook, Receipt};

/// Looks up the current cost price of every item name in `receipts` that
/// has no usable embedded cost.
pub async fn resolve_costs<'a, S>(
    store: &S,
    shop_id: &str,
    receipts: impl IntoIterator<Item = &'a Receipt>,
    concurrency: usize,
) -> AnalyticsResult<CostBook>
where
    S: RecordStore + ?Sized,
{
    let names = CostBook::new().missing_names(receipts);
    if names.is_empty() {
        return Ok(CostBook::new());
    }

    debug!(shop_id = %shop_id, names = names.len(), concurrency, "Resolving cost prices");

    let book = stream::iter(names)
        .map(|name| async move {
            let cost = store
                .fetch_stock_item_cost_price(shop_id, &name)
                .await
                .map_err(|source| AnalyticsError::Lookup {
                    name: name.clone(),
                    source,
                })?;
            Ok::<_, AnalyticsError>((name, cost))
        })
        .buffer_unordered(concurrency.max(1))
        .try_fold(CostBook::new(), |mut book, (name, cost)| async move {
            book.insert(name, cost);
            Ok(book)
        })
        .await?;

    debug!(resolved = book.len(), "Cost prices resolved");
    Ok(book)
}
