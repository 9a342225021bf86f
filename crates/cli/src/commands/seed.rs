//! Seed reference data.

use eshop_admin::db::SizeRepository;
use eshop_admin::db::sizes::DEFAULT_SIZES;

use super::{CommandError, connect};

/// Insert the default size labels that are not present yet.
pub async fn sizes() -> Result<(), CommandError> {
    let pool = connect().await?;

    let added = SizeRepository::new(&pool).ensure(&DEFAULT_SIZES).await?;
    if added.is_empty() {
        tracing::info!("All default sizes already exist");
    } else {
        tracing::info!(added = ?added, "Inserted sizes");
    }
    Ok(())
}
