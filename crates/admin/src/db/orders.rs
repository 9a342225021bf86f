//! Order, order line and payment repositories.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use eshop_core::{
    Money, OrderId, OrderItemId, PaymentId, PaymentStatus, ProductId, Quantity, UserId,
};

use super::carts::line_total;
use super::{RepositoryError, map_write_error};
use crate::models::{
    Order, OrderInput, OrderItem, OrderItemInput, Payment, PaymentInput, ShippingAddress,
};

// =============================================================================
// Orders
// =============================================================================

const ORDER_SELECT: &str = r"
    SELECT o.id, o.user_id, u.first_name || ' ' || u.last_name AS user_display_name,
           o.order_amount, o.order_status, o.phone_no, o.address, o.state, o.city,
           o.pin_code, o.created_at, o.note
    FROM shop_order o
    JOIN shop_user u ON u.id = o.user_id
";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    user_display_name: String,
    order_amount: Money,
    order_status: PaymentStatus,
    phone_no: String,
    address: String,
    state: String,
    city: String,
    pin_code: String,
    created_at: DateTime<Utc>,
    note: Option<String>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_display_name: row.user_display_name,
            amount: row.order_amount,
            status: row.order_status,
            shipping: ShippingAddress {
                phone_no: row.phone_no,
                address: row.address,
                state: row.state,
                city: row.city,
                pin_code: row.pin_code,
            },
            created_at: row.created_at,
            note: row.note,
        }
    }
}

/// Repository for `shop_order` rows.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} ORDER BY o.created_at DESC"))
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user is gone.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &OrderInput) -> Result<OrderId, RepositoryError> {
        sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO shop_order (user_id, order_amount, order_status, phone_no, address,
                                    state, city, pin_code, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(input.user_id)
        .bind(input.amount)
        .bind(input.status)
        .bind(&input.shipping.phone_no)
        .bind(&input.shipping.address)
        .bind(&input.shipping.state)
        .bind(&input.shipping.city)
        .bind(&input.shipping.pin_code)
        .bind(input.note.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate order"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: OrderId, input: &OrderInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop_order SET
                user_id = $2, order_amount = $3, order_status = $4, phone_no = $5,
                address = $6, state = $7, city = $8, pin_code = $9, note = $10
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.user_id)
        .bind(input.amount)
        .bind(input.status)
        .bind(&input.shipping.phone_no)
        .bind(&input.shipping.address)
        .bind(&input.shipping.state)
        .bind(&input.shipping.city)
        .bind(&input.shipping.pin_code)
        .bind(input.note.as_deref())
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate order"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an order; its lines and payments cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop_order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM shop_order")
            .fetch_one(self.pool)
            .await?)
    }

    /// Select choices labelled `#<id> by <username>`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn choices(&self) -> Result<Vec<(i32, String)>, RepositoryError> {
        Ok(sqlx::query_as(
            r"
            SELECT o.id, '#' || o.id || ' by ' || u.username
            FROM shop_order o
            JOIN shop_user u ON u.id = o.user_id
            ORDER BY o.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?)
    }
}

// =============================================================================
// Order lines
// =============================================================================

const ORDER_ITEM_SELECT: &str = r"
    SELECT i.id, i.order_id, i.product_id, p.prod_name, i.size, i.quantity, i.item_total
    FROM order_item i
    JOIN product p ON p.id = i.product_id
";

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    prod_name: String,
    size: String,
    quantity: Quantity,
    item_total: Money,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.prod_name,
            size: row.size,
            quantity: row.quantity,
            item_total: row.item_total,
        }
    }
}

/// Repository for `order_item` rows. Totals are computed like cart lines.
pub struct OrderItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "{ORDER_ITEM_SELECT} ORDER BY i.order_id DESC, i.id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderItemId) -> Result<Option<OrderItem>, RepositoryError> {
        let row =
            sqlx::query_as::<_, OrderItemRow>(&format!("{ORDER_ITEM_SELECT} WHERE i.id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the order or product is gone.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &OrderItemInput) -> Result<OrderItemId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let total = line_total(&mut tx, input.product_id, input.quantity).await?;

        let id = sqlx::query_scalar::<_, OrderItemId>(
            r"
            INSERT INTO order_item (order_id, product_id, size, quantity, item_total)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(input.order_id)
        .bind(input.product_id)
        .bind(&input.size)
        .bind(input.quantity)
        .bind(total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "duplicate order line"))?;

        tx.commit().await?;
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: OrderItemId,
        input: &OrderItemInput,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let total = line_total(&mut tx, input.product_id, input.quantity).await?;

        let result = sqlx::query(
            r"
            UPDATE order_item SET
                order_id = $2, product_id = $3, size = $4, quantity = $5, item_total = $6
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.order_id)
        .bind(input.product_id)
        .bind(&input.size)
        .bind(input.quantity)
        .bind(total)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "duplicate order line"))?;

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
    pub async fn delete(&self, id: OrderItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM order_item WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM order_item")
            .fetch_one(self.pool)
            .await?)
    }
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: PaymentId,
    order_id: OrderId,
    pay_date: DateTime<Utc>,
    pay_status: PaymentStatus,
    pay_info: Option<String>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            pay_date: row.pay_date,
            status: row.pay_status,
            info: row.pay_info,
        }
    }
}

/// Repository for `payment` rows.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT id, order_id, pay_date, pay_status, pay_info
            FROM payment
            ORDER BY pay_date DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "SELECT id, order_id, pay_date, pay_status, pay_info FROM payment WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the order is gone.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &PaymentInput) -> Result<PaymentId, RepositoryError> {
        sqlx::query_scalar::<_, PaymentId>(
            r"
            INSERT INTO payment (order_id, pay_status, pay_info)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(input.order_id)
        .bind(input.status)
        .bind(input.info.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate payment"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: PaymentId, input: &PaymentInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE payment SET order_id = $2, pay_status = $3, pay_info = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(input.order_id)
        .bind(input.status)
        .bind(input.info.as_deref())
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate payment"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: PaymentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM payment WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM payment")
            .fetch_one(self.pool)
            .await?)
    }
}
