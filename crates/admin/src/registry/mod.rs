//! Registered models for the admin panel.
//!
//! Every entity exposed in the panel implements [`AdminModel`]. The generic
//! handlers in [`crate::routes::models`] render list, form and delete
//! screens from that description, so adding a model means implementing the
//! trait and listing it in the `registry!` invocation below.

pub mod catalog;
pub mod contact;
pub mod form;
pub mod sales;
pub mod users;

use std::fmt;
use std::future::Future;

use axum::Router;
use sqlx::PgPool;

use crate::db::RepositoryError;
use crate::state::AppState;

pub use catalog::{
    CategoryAdmin, ProductAdmin, ProductImageAdmin, ReviewAdmin, SizeAdmin, SizeProductMapAdmin,
    SubCategoryAdmin,
};
pub use contact::ContactUsAdmin;
pub use form::{FieldErrors, FieldSpec, FormData, FormMode, FormValues};
pub use sales::{CartAdmin, OrderAdmin, OrderItemAdmin, PaymentAdmin};
pub use users::UserAdmin;

/// Names and URL segment of a registered model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelMeta {
    /// URL segment, e.g. `subcategory` for `/subcategory/new`.
    pub path: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
}

impl ModelMeta {
    /// Base URL of the model's screens.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/{}", self.path)
    }
}

/// An image column and the media directory its uploads go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageField {
    pub name: &'static str,
    pub upload_to: &'static str,
}

/// A model exposed through the generic CRUD screens.
///
/// IDs cross this boundary as plain `i32` path segments; implementations
/// wrap them in the entity's typed ID before calling their repository.
pub trait AdminModel: Send + Sync + 'static {
    /// A stored row, displayed with its string form.
    type Record: fmt::Display + Send + Sync;
    /// Validated form input.
    type Input: Send + Sync;

    const META: ModelMeta;
    /// List screen column headers.
    const COLUMNS: &'static [&'static str];
    const IMAGE_FIELDS: &'static [ImageField] = &[];
    /// Only superusers may open this model's screens.
    const SUPERUSER_ONLY: bool = false;
    /// Rows are login accounts; nobody may delete their own.
    const ACCOUNTS: bool = false;
    /// Field that receives the error when a write hits a unique constraint.
    const CONFLICT_FIELD: &'static str = form::NON_FIELD;
    const CONFLICT_MESSAGE: &'static str = "A record with these values already exists.";

    fn record_id(record: &Self::Record) -> i32;

    /// Cells for the list screen, one per entry in `COLUMNS`.
    fn row(record: &Self::Record) -> Vec<String>;

    /// Form values for editing an existing row.
    fn initial(record: &Self::Record) -> FormValues;

    /// Form values for a blank create form.
    fn defaults() -> FormValues {
        FormValues::new()
    }

    /// Validate a submission.
    ///
    /// # Errors
    ///
    /// Returns every field that failed validation.
    fn parse(form: &FormData, mode: FormMode) -> Result<Self::Input, FieldErrors>;

    /// Form fields, with foreign-key choices loaded from the database.
    fn fields(
        pool: &PgPool,
        mode: FormMode,
    ) -> impl Future<Output = Result<Vec<FieldSpec>, RepositoryError>> + Send;

    fn list(pool: &PgPool) -> impl Future<Output = Result<Vec<Self::Record>, RepositoryError>> + Send;

    fn get(
        pool: &PgPool,
        id: i32,
    ) -> impl Future<Output = Result<Option<Self::Record>, RepositoryError>> + Send;

    fn create(
        pool: &PgPool,
        input: &Self::Input,
    ) -> impl Future<Output = Result<i32, RepositoryError>> + Send;

    fn update(
        pool: &PgPool,
        id: i32,
        input: &Self::Input,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Returns `false` if the row did not exist.
    fn delete(pool: &PgPool, id: i32) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn count(pool: &PgPool) -> impl Future<Output = Result<i64, RepositoryError>> + Send;
}

/// A registered model as shown in navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub meta: ModelMeta,
    pub superuser_only: bool,
}

impl Registration {
    const fn of<M: AdminModel>() -> Self {
        Self {
            meta: M::META,
            superuser_only: M::SUPERUSER_ONLY,
        }
    }

    /// Whether a staff user with the given superuser flag may open it.
    #[must_use]
    pub const fn visible_to(&self, is_superuser: bool) -> bool {
        is_superuser || !self.superuser_only
    }
}

/// A registered model and its current row count.
#[derive(Debug, Clone)]
pub struct ModelCount {
    pub meta: ModelMeta,
    pub count: i64,
}

macro_rules! registry {
    ($($model:ty),+ $(,)?) => {
        /// Registered models, in navigation order.
        pub const REGISTERED: &[Registration] = &[$(Registration::of::<$model>()),+];

        /// CRUD routes for every registered model.
        pub fn routes() -> Router<AppState> {
            Router::new()
                $(.merge(crate::routes::models::routes::<$model>()))+
        }

        /// Row counts for the dashboard, skipping models the viewer cannot open.
        ///
        /// # Errors
        ///
        /// Returns `RepositoryError::Database` if any count query fails.
        pub async fn counts(
            pool: &PgPool,
            is_superuser: bool,
        ) -> Result<Vec<ModelCount>, RepositoryError> {
            let mut counts = Vec::with_capacity(REGISTERED.len());
            $(
                if Registration::of::<$model>().visible_to(is_superuser) {
                    counts.push(ModelCount {
                        meta: <$model as AdminModel>::META,
                        count: <$model as AdminModel>::count(pool).await?,
                    });
                }
            )+
            Ok(counts)
        }
    };
}

registry!(
    UserAdmin,
    CategoryAdmin,
    SubCategoryAdmin,
    ProductAdmin,
    SizeAdmin,
    SizeProductMapAdmin,
    CartAdmin,
    OrderAdmin,
    OrderItemAdmin,
    PaymentAdmin,
    ContactUsAdmin,
    ReviewAdmin,
    ProductImageAdmin,
);

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_registration_order() {
        let paths: Vec<_> = REGISTERED.iter().map(|r| r.meta.path).collect();
        assert_eq!(
            paths,
            [
                "user",
                "category",
                "subcategory",
                "product",
                "size",
                "sizeproductmap",
                "cart",
                "order",
                "orderitems",
                "payment",
                "contactus",
                "review",
                "productimages",
            ]
        );
    }

    #[test]
    fn test_paths_unique_and_not_reserved() {
        let mut seen = HashSet::new();
        for registration in REGISTERED {
            let path = registration.meta.path;
            assert!(seen.insert(path), "duplicate path {path}");
            assert!(!matches!(path, "auth" | "static" | "media" | "health"));
        }
    }

    #[test]
    fn test_only_users_are_superuser_only() {
        let restricted: Vec<_> = REGISTERED
            .iter()
            .filter(|r| !r.visible_to(false))
            .map(|r| r.meta.path)
            .collect();
        assert_eq!(restricted, ["user"]);
        assert!(REGISTERED.iter().all(|r| r.visible_to(true)));
    }

    #[test]
    fn test_image_fields() {
        let dirs: Vec<_> = [
            UserAdmin::IMAGE_FIELDS,
            CategoryAdmin::IMAGE_FIELDS,
            SubCategoryAdmin::IMAGE_FIELDS,
            ProductAdmin::IMAGE_FIELDS,
            ProductImageAdmin::IMAGE_FIELDS,
        ]
        .iter()
        .flat_map(|fields| fields.iter().map(|f| f.upload_to))
        .collect();
        assert_eq!(dirs, ["avatar", "category", "sub_category", "product", "product_img"]);
    }
}
