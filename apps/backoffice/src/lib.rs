//! # Shopdesk Back Office Library
//!
//! Command layer behind the `shopdesk` binary.
//!
//! ## Module Organization
//! ```text
//! shopdesk_backoffice/
//! ├── lib.rs          ◄─── You are here (startup helpers)
//! ├── config.rs       ◄─── AppConfig: TOML file + SHOPDESK_* env vars
//! ├── state.rs        ◄─── AppState: Database + config + SalesAnalytics
//! ├── commands/
//! │   ├── analytics.rs  ◄─── Sales and profit reports
//! │   ├── attendance.rs ◄─── Attendance sheet
//! │   ├── dashboard.rs  ◄─── Dashboard summary
//! │   ├── employee.rs   ◄─── Employees
//! │   ├── receipt.rs    ◄─── New receipt, receipt list and detail
//! │   ├── settings.rs   ◄─── Shop profile
//! │   └── stock.rs      ◄─── Inventory
//! └── error.rs        ◄─── ApiError returned by every command
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()         RUST_LOG or "info,shopdesk=debug,sqlx=warn" │
//! │  2. AppConfig::load()      defaults ◄ config.toml ◄ SHOPDESK_* env     │
//! │  3. AppState::open()       SQLite (WAL) + migrations                   │
//! │  4. run one command        JSON to stdout                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,shopdesk=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays valid JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopdesk_analytics=trace` - One crate only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
