//! Database migration command.
//!
//! ```bash
//! eshop-cli migrate
//! ```
//!
//! Applies the migrations embedded from `crates/admin/migrations/`. Already
//! applied migrations are skipped.

use eshop_admin::db::MIGRATOR;

use super::{CommandError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!(available = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
