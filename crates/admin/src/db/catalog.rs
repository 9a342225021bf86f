//! Catalog repositories: categories, sub-categories, products and gallery images.
//!
//! Slugs are generated from the name when a row is inserted and never
//! rewritten by updates.

use sqlx::PgPool;
use tracing::instrument;

use eshop_core::{CategoryId, Money, ProductId, ProductImageId, Slug, SubCategoryId};

use super::{RepositoryError, map_write_error};
use crate::models::{
    Category, CategoryInput, Product, ProductImage, ProductImageInput, ProductInput, SubCategory,
    SubCategoryInput,
};

fn slug_for(name: &str) -> Result<Slug, RepositoryError> {
    Slug::from_name(name).map_err(|e| RepositoryError::Invalid(e.to_string()))
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    category_name: String,
    category_img: Option<String>,
    slug: Slug,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.category_name,
            image: row.category_img,
            slug: row.slug,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubCategoryRow {
    id: SubCategoryId,
    category_id: CategoryId,
    category_name: String,
    sub_category_name: String,
    sub_category_img: Option<String>,
    slug: Slug,
}

impl From<SubCategoryRow> for SubCategory {
    fn from(row: SubCategoryRow) -> Self {
        Self {
            id: row.id,
            category_id: row.category_id,
            category_name: row.category_name,
            name: row.sub_category_name,
            image: row.sub_category_img,
            slug: row.slug,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    sub_category_id: SubCategoryId,
    sub_category_name: String,
    prod_name: String,
    prod_desc: String,
    prod_price: Money,
    prod_img: Option<String>,
    q_o_h: i32,
    slug: Slug,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            sub_category_id: row.sub_category_id,
            sub_category_name: row.sub_category_name,
            name: row.prod_name,
            description: row.prod_desc,
            price: row.prod_price,
            image: row.prod_img,
            quantity_on_hand: row.q_o_h,
            slug: row.slug,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: ProductImageId,
    product_id: ProductId,
    prod_name: String,
    prod_img: Option<String>,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.prod_name,
            image: row.prod_img,
        }
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Repository for `category` rows.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, category_name, category_img, slug FROM category ORDER BY category_name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, category_name, category_img, slug FROM category WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Insert a category, deriving its slug from the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if the name yields no slug.
    /// Returns `RepositoryError::Conflict` if the slug is already used.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &CategoryInput) -> Result<CategoryId, RepositoryError> {
        let slug = slug_for(&input.name)?;
        sqlx::query_scalar::<_, CategoryId>(
            r"
            INSERT INTO category (category_name, category_img, slug)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(input.image.initial())
        .bind(&slug)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "category slug already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(&self, id: CategoryId, input: &CategoryInput) -> Result<(), RepositoryError> {
        let (touch_img, img) = input.image.binds();
        let result = sqlx::query(
            r"
            UPDATE category SET
                category_name = $2,
                category_img = CASE WHEN $3 THEN $4 ELSE category_img END
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(touch_img)
        .bind(img)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "category slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a category and, through cascades, everything filed under it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM category")
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn choices(&self) -> Result<Vec<(i32, String)>, RepositoryError> {
        Ok(
            sqlx::query_as("SELECT id, category_name FROM category ORDER BY category_name")
                .fetch_all(self.pool)
                .await?,
        )
    }
}

// =============================================================================
// Sub-categories
// =============================================================================

const SUB_CATEGORY_SELECT: &str = r"
    SELECT s.id, s.category_id, c.category_name, s.sub_category_name,
           s.sub_category_img, s.slug
    FROM sub_category s
    JOIN category c ON c.id = s.category_id
";

/// Repository for `sub_category` rows.
pub struct SubCategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubCategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List sub-categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SubCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubCategoryRow>(&format!(
            "{SUB_CATEGORY_SELECT} ORDER BY s.sub_category_name"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: SubCategoryId) -> Result<Option<SubCategory>, RepositoryError> {
        let row = sqlx::query_as::<_, SubCategoryRow>(&format!(
            "{SUB_CATEGORY_SELECT} WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already used.
    /// Returns `RepositoryError::InvalidReference` if the category is gone.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &SubCategoryInput) -> Result<SubCategoryId, RepositoryError> {
        let slug = slug_for(&input.name)?;
        sqlx::query_scalar::<_, SubCategoryId>(
            r"
            INSERT INTO sub_category (category_id, sub_category_name, sub_category_img, slug)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.image.initial())
        .bind(&slug)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "sub-category slug already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the sub-category does not exist.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(
        &self,
        id: SubCategoryId,
        input: &SubCategoryInput,
    ) -> Result<(), RepositoryError> {
        let (touch_img, img) = input.image.binds();
        let result = sqlx::query(
            r"
            UPDATE sub_category SET
                category_id = $2,
                sub_category_name = $3,
                sub_category_img = CASE WHEN $4 THEN $5 ELSE sub_category_img END
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(touch_img)
        .bind(img)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "sub-category slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: SubCategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sub_category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM sub_category")
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn choices(&self) -> Result<Vec<(i32, String)>, RepositoryError> {
        Ok(sqlx::query_as(
            "SELECT id, sub_category_name FROM sub_category ORDER BY sub_category_name",
        )
        .fetch_all(self.pool)
        .await?)
    }
}

// =============================================================================
// Products
// =============================================================================

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.sub_category_id, s.sub_category_name, p.prod_name, p.prod_desc,
           p.prod_price, p.prod_img, p.q_o_h, p.slug
    FROM product p
    JOIN sub_category s ON s.id = p.sub_category_id
";

/// Repository for `product` rows.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} ORDER BY p.prod_name"))
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Look a product up by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already used.
    /// Returns `RepositoryError::InvalidReference` if the sub-category is gone.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        let slug = slug_for(&input.name)?;
        sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO product (sub_category_id, prod_name, prod_desc, prod_price,
                                 prod_img, q_o_h, slug)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(input.sub_category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.image.initial())
        .bind(input.quantity_on_hand)
        .bind(&slug)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product slug already exists"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update(&self, id: ProductId, input: &ProductInput) -> Result<(), RepositoryError> {
        let (touch_img, img) = input.image.binds();
        let result = sqlx::query(
            r"
            UPDATE product SET
                sub_category_id = $2,
                prod_name = $3,
                prod_desc = $4,
                prod_price = $5,
                prod_img = CASE WHEN $6 THEN $7 ELSE prod_img END,
                q_o_h = $8
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.sub_category_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(touch_img)
        .bind(img)
        .bind(input.quantity_on_hand)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "product slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(self.pool)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn choices(&self) -> Result<Vec<(i32, String)>, RepositoryError> {
        Ok(
            sqlx::query_as("SELECT id, prod_name FROM product ORDER BY prod_name")
                .fetch_all(self.pool)
                .await?,
        )
    }
}

// =============================================================================
// Product gallery images
// =============================================================================

const PRODUCT_IMAGE_SELECT: &str = r"
    SELECT i.id, i.product_id, p.prod_name, i.prod_img
    FROM product_image i
    JOIN product p ON p.id = i.product_id
";

/// Repository for `product_image` rows.
pub struct ProductImageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductImageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImageRow>(&format!(
            "{PRODUCT_IMAGE_SELECT} ORDER BY p.prod_name, i.id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductImageId) -> Result<Option<ProductImage>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductImageRow>(&format!(
            "{PRODUCT_IMAGE_SELECT} WHERE i.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the product is gone.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &ProductImageInput) -> Result<ProductImageId, RepositoryError> {
        sqlx::query_scalar::<_, ProductImageId>(
            "INSERT INTO product_image (product_id, prod_img) VALUES ($1, $2) RETURNING id",
        )
        .bind(input.product_id)
        .bind(input.image.initial())
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate product image"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image row does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ProductImageId,
        input: &ProductImageInput,
    ) -> Result<(), RepositoryError> {
        let (touch_img, img) = input.image.binds();
        let result = sqlx::query(
            r"
            UPDATE product_image SET
                product_id = $2,
                prod_img = CASE WHEN $3 THEN $4 ELSE prod_img END
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.product_id)
        .bind(touch_img)
        .bind(img)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate product image"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductImageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_image WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM product_image")
            .fetch_one(self.pool)
            .await?)
    }
}
