//! Cart repository.
//!
//! `item_total` is never taken from the caller: it is recomputed from the
//! product's current price each time a line is written.

use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use eshop_core::{CartItemId, Money, ProductId, Quantity, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{CartItem, CartItemInput};

const CART_SELECT: &str = r"
    SELECT c.id, c.product_id, p.prod_name, c.user_id,
           u.first_name || ' ' || u.last_name AS user_display_name,
           c.size, c.quantity, c.item_total
    FROM cart_item c
    JOIN product p ON p.id = c.product_id
    JOIN shop_user u ON u.id = c.user_id
";

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    product_id: ProductId,
    prod_name: String,
    user_id: UserId,
    user_display_name: String,
    size: String,
    quantity: Quantity,
    item_total: Money,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.prod_name,
            user_id: row.user_id,
            user_display_name: row.user_display_name,
            size: row.size,
            quantity: row.quantity,
            item_total: row.item_total,
        }
    }
}

/// Compute `price * quantity` for a product inside an open transaction.
///
/// The product row is locked so the price cannot change before the line is
/// written.
pub(crate) async fn line_total(
    conn: &mut PgConnection,
    product_id: ProductId,
    quantity: Quantity,
) -> Result<Money, RepositoryError> {
    let price = sqlx::query_scalar::<_, Money>(
        "SELECT prod_price FROM product WHERE id = $1 FOR SHARE",
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| RepositoryError::InvalidReference("product".to_owned()))?;

    price
        .times(quantity)
        .map_err(|e| RepositoryError::Invalid(format!("item total: {e}")))
}

/// Repository for `cart_item` rows.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!("{CART_SELECT} ORDER BY c.id"))
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!("{CART_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Insert a cart line with its computed total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product or user is gone.
    /// Returns `RepositoryError::Invalid` if the total does not fit the column.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &CartItemInput) -> Result<CartItemId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let total = line_total(&mut tx, input.product_id, input.quantity).await?;

        let id = sqlx::query_scalar::<_, CartItemId>(
            r"
            INSERT INTO cart_item (product_id, user_id, size, quantity, item_total)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(input.product_id)
        .bind(input.user_id)
        .bind(&input.size)
        .bind(input.quantity)
        .bind(total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "duplicate cart line"))?;

        tx.commit().await?;
        Ok(id)
    }

    /// Update a cart line and recompute its total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: CartItemId, input: &CartItemInput) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let total = line_total(&mut tx, input.product_id, input.quantity).await?;

        let result = sqlx::query(
            r"
            UPDATE cart_item SET
                product_id = $2, user_id = $3, size = $4, quantity = $5, item_total = $6
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.product_id)
        .bind(input.user_id)
        .bind(&input.size)
        .bind(input.quantity)
        .bind(total)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "duplicate cart line"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM cart_item")
            .fetch_one(self.pool)
            .await?)
    }
}
