//! # Schema Migrations
//!
//! The schema ships inside the binary: `sqlx::migrate!` embeds every file
//! under the workspace `migrations/sqlite/` directory at compile time, and
//! [`run_migrations`] applies whichever of them the open store has not seen,
//! recording each in `_sqlx_migrations`.
//!
//! New schema changes go in a new `NNN_description.sql` file. Applied files
//! are checksummed, so editing one breaks every existing store.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    debug!(count = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}
