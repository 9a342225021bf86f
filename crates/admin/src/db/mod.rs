//! Database operations for the shop schema.
//!
//! ## Tables
//!
//! - `shop_user` - Accounts; staff users may log into the admin panel
//! - `category`, `sub_category`, `product`, `product_image` - Catalog
//! - `size`, `size_product_map` - Size labels and the sizes offered per product
//! - `review` - Product reviews (rating 0..=5)
//! - `cart_item` - Cart lines (quantity 1..=50, computed `item_total`)
//! - `shop_order`, `order_item`, `payment` - Orders and payments
//! - `contact_message` - Contact form submissions
//! - `admin.session` - Admin session storage
//!
//! Every foreign key is `ON DELETE CASCADE`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p eshop-cli -- migrate
//! ```

pub mod carts;
pub mod catalog;
pub mod contact;
pub mod orders;
pub mod reviews;
pub mod sizes;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use catalog::{
    CategoryRepository, ProductImageRepository, ProductRepository, SubCategoryRepository,
};
pub use contact::ContactRepository;
pub use orders::{OrderItemRepository, OrderRepository, PaymentRepository};
pub use reviews::ReviewRepository;
pub use sizes::{SizeProductMapRepository, SizeRepository};
pub use users::UserRepository;

/// Embedded migrations for the shop schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A foreign key points at a row that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A value was rejected by a check constraint or could not be stored.
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Translate a write failure into the matching repository error.
///
/// `conflict` is the message used for unique violations.
pub(crate) fn map_write_error(err: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_owned();
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::InvalidReference(constraint);
        }
        if db_err.is_check_violation() {
            return RepositoryError::Invalid(constraint);
        }
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = map_write_error(sqlx::Error::RowNotFound, "slug already exists");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "not found");
        assert_eq!(
            RepositoryError::Conflict("slug already exists".to_owned()).to_string(),
            "constraint violation: slug already exists"
        );
    }
}
