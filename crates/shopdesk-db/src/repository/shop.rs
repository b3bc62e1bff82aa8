//! # Shop Repository
//!
//! Persists the shop profile edited on the settings screen.
//!
//! Phone numbers and the cashier/manager pick lists are stored as JSON
//! arrays in TEXT columns; a profile that was never saved reads as `None`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::ts;
use crate::error::{DbError, DbResult};
use shopdesk_core::ShopProfile;

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    shop_id: String,
    shop_name: String,
    address: String,
    phone_numbers: String,
    cashier_names: String,
    manager_names: String,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShopRow> for ShopProfile {
    type Error = DbError;

    fn try_from(row: ShopRow) -> Result<Self, Self::Error> {
        Ok(ShopProfile {
            shop_id: row.shop_id,
            shop_name: row.shop_name,
            address: row.address,
            phone_numbers: decode_list("phone_numbers", &row.phone_numbers)?,
            cashier_names: decode_list("cashier_names", &row.cashier_names)?,
            manager_names: decode_list("manager_names", &row.manager_names)?,
            updated_at: row.updated_at,
        })
    }
}

fn decode_list(column: &str, raw: &str) -> DbResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| DbError::Corrupt {
        column: column.to_string(),
        reason: e.to_string(),
    })
}

fn encode_list(column: &str, values: &[String]) -> DbResult<String> {
    serde_json::to_string(values).map_err(|e| DbError::Corrupt {
        column: column.to_string(),
        reason: e.to_string(),
    })
}

/// Repository for the shop profile.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    /// Creates a new ShopRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Loads the profile of `shop_id`, if one has been saved.
    pub async fn get_profile(&self, shop_id: &str) -> DbResult<Option<ShopProfile>> {
        let row = sqlx::query_as::<_, ShopRow>(
            r#"
            SELECT shop_id, shop_name, address,
                   phone_numbers, cashier_names, manager_names,
                   updated_at
            FROM shops
            WHERE shop_id = ?1
            "#,
        )
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ShopProfile::try_from).transpose()
    }

    /// Inserts or replaces the profile, stamping `updated_at` with now.
    ///
    /// ## Returns
    /// The profile as stored.
    pub async fn upsert_profile(&self, profile: &ShopProfile) -> DbResult<ShopProfile> {
        debug!(shop_id = %profile.shop_id, "Saving shop profile");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO shops (
                shop_id, shop_name, address,
                phone_numbers, cashier_names, manager_names, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (shop_id) DO UPDATE SET
                shop_name = excluded.shop_name,
                address = excluded.address,
                phone_numbers = excluded.phone_numbers,
                cashier_names = excluded.cashier_names,
                manager_names = excluded.manager_names,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.shop_id)
        .bind(&profile.shop_name)
        .bind(&profile.address)
        .bind(encode_list("phone_numbers", &profile.phone_numbers)?)
        .bind(encode_list("cashier_names", &profile.cashier_names)?)
        .bind(encode_list("manager_names", &profile.manager_names)?)
        .bind(ts(&now))
        .execute(&self.pool)
        .await?;

        self.get_profile(&profile.shop_id)
            .await?
            .ok_or_else(|| DbError::not_found("Shop", &profile.shop_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use shopdesk_core::ShopProfile;

    fn profile(name: &str) -> ShopProfile {
        ShopProfile {
            shop_id: "shop-1".to_string(),
            shop_name: name.to_string(),
            address: "12 Market Road".to_string(),
            phone_numbers: vec!["555-0100".to_string(), "555-0101".to_string()],
            cashier_names: vec!["Asha".to_string()],
            manager_names: vec![],
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_profile_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.shops().get_profile("shop-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_roundtrips_lists_and_replaces() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.shops();

        let saved = repo.upsert_profile(&profile("Corner Store")).await.unwrap();
        assert_eq!(saved.phone_numbers, vec!["555-0100", "555-0101"]);
        assert_eq!(saved.cashier_names, vec!["Asha"]);
        assert!(saved.manager_names.is_empty());

        let renamed = repo.upsert_profile(&profile("Corner Store II")).await.unwrap();
        assert_eq!(renamed.shop_name, "Corner Store II");
        assert!(renamed.updated_at >= saved.updated_at);

        // Other shops are unaffected
        assert!(repo.get_profile("shop-2").await.unwrap().is_none());
    }
}
