//! Size labels and the product/size join table.

use sqlx::PgPool;
use tracing::instrument;

use eshop_core::{ProductId, SizeId, SizeProductMapId};

use super::{RepositoryError, map_write_error};
use crate::models::{Size, SizeInput, SizeProductMap, SizeProductMapInput};

/// Labels inserted by `seed sizes`, smallest first.
pub const DEFAULT_SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

#[derive(Debug, sqlx::FromRow)]
struct SizeRow {
    id: SizeId,
    size: String,
}

impl From<SizeRow> for Size {
    fn from(row: SizeRow) -> Self {
        Self {
            id: row.id,
            label: row.size,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SizeProductMapRow {
    id: SizeProductMapId,
    product_id: ProductId,
    prod_name: String,
    size_id: SizeId,
    size: String,
}

impl From<SizeProductMapRow> for SizeProductMap {
    fn from(row: SizeProductMapRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.prod_name,
            size_id: row.size_id,
            size_label: row.size,
        }
    }
}

/// Repository for `size` rows.
pub struct SizeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SizeRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Size>, RepositoryError> {
        let rows = sqlx::query_as::<_, SizeRow>("SELECT id, size FROM size ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: SizeId) -> Result<Option<Size>, RepositoryError> {
        let row = sqlx::query_as::<_, SizeRow>("SELECT id, size FROM size WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self))]
    pub async fn create(&self, input: &SizeInput) -> Result<SizeId, RepositoryError> {
        sqlx::query_scalar::<_, SizeId>("INSERT INTO size (size) VALUES ($1) RETURNING id")
            .bind(&input.label)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_write_error(e, "size already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the size does not exist.
    #[instrument(skip(self))]
    pub async fn update(&self, id: SizeId, input: &SizeInput) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE size SET size = $2 WHERE id = $1")
            .bind(id)
            .bind(&input.label)
            .execute(self.pool)
            .await
            .map_err(|e| map_write_error(e, "size already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: SizeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM size WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM size")
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn choices(&self) -> Result<Vec<(i32, String)>, RepositoryError> {
        Ok(sqlx::query_as("SELECT id, size FROM size ORDER BY id")
            .fetch_all(self.pool)
            .await?)
    }

    /// Insert each label that is not present yet. Returns the labels added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, labels))]
    pub async fn ensure(&self, labels: &[&str]) -> Result<Vec<String>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut added = Vec::new();

        for label in labels {
            let inserted = sqlx::query(
                r"
                INSERT INTO size (size)
                SELECT $1
                WHERE NOT EXISTS (SELECT 1 FROM size WHERE size = $1)
                ",
            )
            .bind(*label)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() > 0 {
                added.push((*label).to_owned());
            }
        }

        tx.commit().await?;
        Ok(added)
    }
}

const SIZE_PRODUCT_MAP_SELECT: &str = r"
    SELECT m.id, m.product_id, p.prod_name, m.size_id, s.size
    FROM size_product_map m
    JOIN product p ON p.id = m.product_id
    JOIN size s ON s.id = m.size_id
";

/// Repository for `size_product_map` rows.
pub struct SizeProductMapRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SizeProductMapRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SizeProductMap>, RepositoryError> {
        let rows = sqlx::query_as::<_, SizeProductMapRow>(&format!(
            "{SIZE_PRODUCT_MAP_SELECT} ORDER BY p.prod_name, s.id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: SizeProductMapId,
    ) -> Result<Option<SizeProductMap>, RepositoryError> {
        let row = sqlx::query_as::<_, SizeProductMapRow>(&format!(
            "{SIZE_PRODUCT_MAP_SELECT} WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product or size is gone.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: &SizeProductMapInput,
    ) -> Result<SizeProductMapId, RepositoryError> {
        sqlx::query_scalar::<_, SizeProductMapId>(
            "INSERT INTO size_product_map (product_id, size_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(input.product_id)
        .bind(input.size_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "size already offered for product"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: SizeProductMapId,
        input: &SizeProductMapInput,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE size_product_map SET product_id = $2, size_id = $3 WHERE id = $1")
                .bind(id)
                .bind(input.product_id)
                .bind(input.size_id)
                .execute(self.pool)
                .await
                .map_err(|e| map_write_error(e, "size already offered for product"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: SizeProductMapId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM size_product_map WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM size_product_map")
            .fetch_one(self.pool)
            .await?)
    }
}
