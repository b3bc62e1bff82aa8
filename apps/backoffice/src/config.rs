//! # Back Office Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPDESK_DB_PATH=./shopdesk.db                                     │
//! │     SHOPDESK_SHOP_ID=corner-store                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $SHOPDESK_CONFIG, or                                               │
//! │     ~/.config/shopdesk/config.toml (Linux)                             │
//! │     ~/Library/Application Support/com.shopdesk.backoffice/config.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     shop "demo-shop", UTC, 4 cost lookups in flight                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/shopdesk/shopdesk.db"
//! max_connections = 5          # default: reports.lookup_concurrency + 1
//! acquire_timeout_secs = 30
//!
//! [shop]
//! id = "corner-store"
//! utc_offset_minutes = 330     # +05:30
//! currency_symbol = "$"
//!
//! [reports]
//! lookup_concurrency = 4
//! recent_receipts = 5
//! ```
//!
//! ## Environment Variables
//! | Variable                        | Field                         |
//! |---------------------------------|-------------------------------|
//! | `SHOPDESK_CONFIG`               | config file path              |
//! | `SHOPDESK_DB_PATH`              | `database.path`               |
//! | `SHOPDESK_DB_MAX_CONNECTIONS`   | `database.max_connections`    |
//! | `SHOPDESK_SHOP_ID`              | `shop.id`                     |
//! | `SHOPDESK_UTC_OFFSET_MINUTES`   | `shop.utc_offset_minutes`     |
//! | `SHOPDESK_CURRENCY_SYMBOL`      | `shop.currency_symbol`        |
//! | `SHOPDESK_LOOKUP_CONCURRENCY`   | `reports.lookup_concurrency`  |
//! | `SHOPDESK_RECENT_RECEIPTS`      | `reports.recent_receipts`     |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use shopdesk_analytics::{AnalyticsConfig, DEFAULT_LOOKUP_CONCURRENCY};
use shopdesk_core::{DEFAULT_RECENT_RECEIPTS, DEFAULT_SHOP_ID};
use shopdesk_db::DbConfig;

/// Westmost and eastmost real-world UTC offsets.
const MIN_UTC_OFFSET_MINUTES: i32 = -12 * 60;
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

const MAX_LOOKUP_CONCURRENCY: usize = 64;
const MAX_DB_CONNECTIONS: u32 = 128;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file; created on first run.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Pool size. Unset means one more than `reports.lookup_concurrency`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,

    /// Seconds a query waits for a free connection.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: None,
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopSettings {
    /// Shop every command acts on unless overridden.
    #[serde(default = "default_shop_id")]
    pub id: String,

    /// Shop's offset from UTC; report windows are local calendar periods.
    #[serde(default)]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            id: default_shop_id(),
            utc_offset_minutes: 0,
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,

    /// Receipts shown on the dashboard.
    #[serde(default = "default_recent_receipts")]
    pub recent_receipts: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            lookup_concurrency: default_lookup_concurrency(),
            recent_receipts: default_recent_receipts(),
        }
    }
}

fn default_database_path() -> PathBuf {
    match directories::ProjectDirs::from("com", "shopdesk", "backoffice") {
        Some(dirs) => dirs.data_dir().join("shopdesk.db"),
        None => PathBuf::from("shopdesk.db"),
    }
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_shop_id() -> String {
    DEFAULT_SHOP_ID.to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_lookup_concurrency() -> usize {
    DEFAULT_LOOKUP_CONCURRENCY
}

fn default_recent_receipts() -> usize {
    DEFAULT_RECENT_RECEIPTS
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete back office configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub shop: ShopSettings,

    #[serde(default)]
    pub reports: ReportSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, `$SHOPDESK_CONFIG`, or the platform default)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`load`](Self::load) with an injectable environment.
    pub fn load_with<F>(config_path: Option<PathBuf>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = config_path.or_else(|| env("SHOPDESK_CONFIG").map(PathBuf::from));
        match explicit {
            Some(path) => config = Self::from_file(&path)?,
            None => {
                if let Some(path) = Self::default_config_path() {
                    if path.exists() {
                        config = Self::from_file(&path)?;
                    } else {
                        debug!(?path, "Config file not found, using defaults");
                    }
                }
            }
        }

        config.apply_env_overrides(env);
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks ranges and required values.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.shop.id.trim().is_empty() {
            return Err(ConfigError::Invalid("shop.id must not be empty".into()));
        }

        if !(MIN_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&self.shop.utc_offset_minutes) {
            return Err(ConfigError::Invalid(format!(
                "shop.utc_offset_minutes must be between {} and {}, got {}",
                MIN_UTC_OFFSET_MINUTES, MAX_UTC_OFFSET_MINUTES, self.shop.utc_offset_minutes
            )));
        }

        if self.shop.currency_symbol.is_empty() {
            return Err(ConfigError::Invalid("shop.currency_symbol must not be empty".into()));
        }

        if !(1..=MAX_LOOKUP_CONCURRENCY).contains(&self.reports.lookup_concurrency) {
            return Err(ConfigError::Invalid(format!(
                "reports.lookup_concurrency must be between 1 and {}, got {}",
                MAX_LOOKUP_CONCURRENCY, self.reports.lookup_concurrency
            )));
        }

        if let Some(max) = self.database.max_connections {
            if !(1..=MAX_DB_CONNECTIONS).contains(&max) {
                return Err(ConfigError::Invalid(format!(
                    "database.max_connections must be between 1 and {}, got {}",
                    MAX_DB_CONNECTIONS, max
                )));
            }
        }

        if self.database.acquire_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "database.acquire_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.reports.recent_receipts == 0 {
            return Err(ConfigError::Invalid(
                "reports.recent_receipts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Settings handed to the sales report.
    pub fn analytics(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            utc_offset_minutes: self.shop.utc_offset_minutes,
            lookup_concurrency: self.reports.lookup_concurrency,
        }
    }

    /// Pool settings for the record store.
    pub fn db_config(&self) -> DbConfig {
        let max_connections = self.database.max_connections.unwrap_or_else(|| {
            u32::try_from(self.reports.lookup_concurrency + 1).unwrap_or(MAX_DB_CONNECTIONS)
        });
        DbConfig::new(self.database.path.clone())
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env("SHOPDESK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(id) = env("SHOPDESK_SHOP_ID") {
            debug!(shop_id = %id, "Overriding shop ID from environment");
            self.shop.id = id;
        }

        if let Some(symbol) = env("SHOPDESK_CURRENCY_SYMBOL") {
            self.shop.currency_symbol = symbol;
        }

        let mut max_connections = self.database.max_connections.unwrap_or(0);
        override_parsed(&env, "SHOPDESK_DB_MAX_CONNECTIONS", &mut max_connections);
        if max_connections > 0 {
            self.database.max_connections = Some(max_connections);
        }

        override_parsed(&env, "SHOPDESK_UTC_OFFSET_MINUTES", &mut self.shop.utc_offset_minutes);
        override_parsed(&env, "SHOPDESK_LOOKUP_CONCURRENCY", &mut self.reports.lookup_concurrency);
        override_parsed(&env, "SHOPDESK_RECENT_RECEIPTS", &mut self.reports.recent_receipts);
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopdesk", "backoffice")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Replaces `target` with the parsed value of `key`, keeping the current
/// value when the variable is unset or unparseable.
fn override_parsed<F, T>(env: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = env(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(key = %key, value = %raw, "Ignoring unparseable environment override"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "shopdesk-config-{}-{}.toml",
            name,
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shop.id, DEFAULT_SHOP_ID);
        assert_eq!(config.reports.lookup_concurrency, DEFAULT_LOOKUP_CONCURRENCY);
        assert_eq!(config.reports.recent_receipts, 5);
    }

    #[test]
    fn test_file_then_env_priority() {
        let path = temp_config(
            "priority",
            r#"
            [shop]
            id = "from-file"
            utc_offset_minutes = 330

            [reports]
            lookup_concurrency = 8
            "#,
        );

        let config = AppConfig::load_with(
            Some(path.clone()),
            env_from(&[("SHOPDESK_SHOP_ID", "from-env"), ("SHOPDESK_DB_PATH", "/tmp/x.db")]),
        )
        .unwrap();

        assert_eq!(config.shop.id, "from-env");
        assert_eq!(config.shop.utc_offset_minutes, 330);
        assert_eq!(config.reports.lookup_concurrency, 8);
        // Section present but key missing: default
        assert_eq!(config.reports.recent_receipts, DEFAULT_RECENT_RECEIPTS);
        assert_eq!(config.database.path, PathBuf::from("/tmp/x.db"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_config_path_from_env() {
        let path = temp_config("env-path", "[shop]\nid = \"env-file\"\n");
        let path_str = path.to_string_lossy().to_string();

        let config =
            AppConfig::load_with(None, env_from(&[("SHOPDESK_CONFIG", path_str.as_str())])).unwrap();
        assert_eq!(config.shop.id, "env-file");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_unparseable_env_keeps_value() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env_from(&[("SHOPDESK_LOOKUP_CONCURRENCY", "many")]));
        assert_eq!(config.reports.lookup_concurrency, DEFAULT_LOOKUP_CONCURRENCY);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let mut config = AppConfig::default();
        config.shop.utc_offset_minutes = 15 * 60;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.reports.lookup_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.shop.id = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_size_follows_lookup_concurrency() {
        let mut config = AppConfig::default();
        config.reports.lookup_concurrency = 8;
        assert_eq!(config.db_config().max_connections, 9);
        assert_eq!(config.db_config().acquire_timeout, Duration::from_secs(30));

        let path = temp_config(
            "pool",
            "[database]\npath = \"/tmp/pool.db\"\nmax_connections = 3\nacquire_timeout_secs = 2\n",
        );
        let config = AppConfig::load_with(Some(path.clone()), env_from(&[])).unwrap();
        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/pool.db"));
        assert_eq!(db.max_connections, 3);
        assert_eq!(db.acquire_timeout, Duration::from_secs(2));

        let config = AppConfig::load_with(
            Some(path.clone()),
            env_from(&[("SHOPDESK_DB_MAX_CONNECTIONS", "12")]),
        )
        .unwrap();
        assert_eq!(config.db_config().max_connections, 12);
        std::fs::remove_file(path).ok();

        let mut config = AppConfig::default();
        config.database.max_connections = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = AppConfig::load_with(
            Some(PathBuf::from("/definitely/not/here/config.toml")),
            env_from(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let path = temp_config("bad", "[shop\nid = ");
        let err = AppConfig::load_with(Some(path.clone()), env_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        std::fs::remove_file(path).ok();
    }
}
