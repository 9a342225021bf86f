//! Review repository.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;

use eshop_core::{ProductId, Rating, ReviewId, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{Review, ReviewInput};

const REVIEW_SELECT: &str = r"
    SELECT r.id, r.product_id, p.prod_name, r.user_id,
           u.first_name || ' ' || u.last_name AS user_display_name,
           r.rating, r.review, r.date
    FROM review r
    JOIN product p ON p.id = r.product_id
    JOIN shop_user u ON u.id = r.user_id
";

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    prod_name: String,
    user_id: UserId,
    user_display_name: String,
    rating: Rating,
    review: Option<String>,
    date: NaiveDate,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.prod_name,
            user_id: row.user_id,
            user_display_name: row.user_display_name,
            rating: row.rating,
            review: row.review,
            date: row.date,
        }
    }
}

/// Repository for `review` rows.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} ORDER BY r.date DESC, r.id DESC"))
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Insert a review dated today.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product or user is gone.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &ReviewInput) -> Result<ReviewId, RepositoryError> {
        sqlx::query_scalar::<_, ReviewId>(
            r"
            INSERT INTO review (product_id, user_id, rating, review)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(input.product_id)
        .bind(input.user_id)
        .bind(input.rating)
        .bind(input.review.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate review"))
    }

    /// Update a review. The creation date is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ReviewId, input: &ReviewInput) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE review SET product_id = $2, user_id = $3, rating = $4, review = $5
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.product_id)
        .bind(input.user_id)
        .bind(input.rating)
        .bind(input.review.as_deref())
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate review"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM review")
            .fetch_one(self.pool)
            .await?)
    }
}
