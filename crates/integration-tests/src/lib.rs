//! Integration tests for eshop.
//!
//! # Running Tests
//!
//! ```bash
//! # Database tests (migrations are applied automatically)
//! ESHOP_DATABASE_URL=postgres://localhost/eshop_test \
//!     cargo test -p eshop-integration-tests -- --ignored
//!
//! # HTTP smoke tests additionally need a running admin server
//! ADMIN_BASE_URL=http://localhost:3001 cargo test -p eshop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `shop_schema` - Repository and constraint behavior against `PostgreSQL`
//! - `admin_http` - Requests against a running admin server
//!
//! Every test creates rows with unique names, so tests can share a database
//! and run in parallel.

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use eshop_admin::db::{self, MIGRATOR};

/// Connect to the test database and apply pending migrations.
///
/// # Panics
///
/// Panics if `ESHOP_DATABASE_URL` (or `DATABASE_URL`) is unset or the
/// database is unreachable.
#[allow(clippy::expect_used)]
pub async fn test_pool() -> PgPool {
    let url = std::env::var("ESHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("ESHOP_DATABASE_URL must be set for database tests");

    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

/// Short random suffix for unique names and slugs.
#[must_use]
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}

/// Base URL of a running admin server.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}
