//! # Application State
//!
//! Everything a command needs, opened once per process.
//!
//! The `Database` holds a `SqlitePool`, which is cheap to clone and safe to
//! share, so the analytics service gets its own handle to the same pool.

use shopdesk_analytics::SalesAnalytics;
use shopdesk_db::{Database, DbConfig};
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    config: AppConfig,
    analytics: SalesAnalytics<Database>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let analytics = SalesAnalytics::new(db.clone(), config.analytics());
        AppState {
            db,
            config,
            analytics,
        }
    }

    /// Opens the configured database file, creating its directory if needed,
    /// and runs migrations.
    pub async fn open(config: AppConfig) -> ApiResult<Self> {
        if let Some(parent) = config.database.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    tracing::error!(?parent, "Failed to create data directory: {}", e);
                    crate::error::ApiError::internal("Could not create data directory")
                })?;
            }
        }

        let db = Database::new(config.db_config()).await?;
        info!(path = ?config.database.path, shop_id = %config.shop.id, "Database connected");

        Ok(AppState::new(db, config))
    }

    /// Fresh in-memory database, for tests and demos.
    pub async fn in_memory(config: AppConfig) -> ApiResult<Self> {
        let db = Database::new(DbConfig::in_memory()).await?;
        Ok(AppState::new(db, config))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn analytics(&self) -> &SalesAnalytics<Database> {
        &self.analytics
    }

    /// Shop every command acts on.
    pub fn shop_id(&self) -> &str {
        &self.config.shop.id
    }
}
