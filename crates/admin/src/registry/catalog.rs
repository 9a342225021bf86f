//! Catalog models: categories, products, sizes, gallery images and reviews.

use sqlx::PgPool;

use eshop_core::{
    CategoryId, Money, ProductId, ProductImageId, Rating, ReviewId, SizeId, SizeProductMapId, Slug,
    SubCategoryId,
};

use super::form::{FieldErrors, FieldSpec, FormData, FormMode, FormReader, FormValues, id_choices};
use super::{AdminModel, ImageField, ModelMeta};
use crate::db::{
    CategoryRepository, ProductImageRepository, ProductRepository, RepositoryError,
    ReviewRepository, SizeProductMapRepository, SizeRepository, SubCategoryRepository,
    UserRepository,
};
use crate::models::{
    Category, CategoryInput, Product, ProductImage, ProductImageInput, ProductInput, Review,
    ReviewInput, Size, SizeInput, SizeProductMap, SizeProductMapInput, SubCategory,
    SubCategoryInput,
};

const NAME_MAX: usize = 200;
const PRODUCT_NAME_MAX: usize = 50;
const PRODUCT_DESC_MAX: usize = 2000;
const SIZE_MAX: usize = 30;
const REVIEW_MAX: usize = 300;

/// Reject names that cannot produce a slug. Only checked on create since
/// edits never regenerate the slug.
fn check_slug(reader: &mut FormReader<'_>, field: &str, name: &str, mode: FormMode) {
    if mode == FormMode::Create
        && !name.is_empty()
        && let Err(e) = Slug::from_name(name)
    {
        reader.error(field, e.to_string());
    }
}

// =============================================================================
// Category
// =============================================================================

pub struct CategoryAdmin;

impl AdminModel for CategoryAdmin {
    type Record = Category;
    type Input = CategoryInput;

    const META: ModelMeta = ModelMeta {
        path: "category",
        verbose_name: "Category",
        verbose_name_plural: "Categories",
    };
    const COLUMNS: &'static [&'static str] = &["Category", "Slug"];
    const IMAGE_FIELDS: &'static [ImageField] = &[ImageField {
        name: "category_img",
        upload_to: "category",
    }];
    const CONFLICT_FIELD: &'static str = "category_name";
    const CONFLICT_MESSAGE: &'static str = "Category with this Slug already exists.";

    fn record_id(record: &Category) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &Category) -> Vec<String> {
        vec![record.name.clone(), record.slug.to_string()]
    }

    fn initial(record: &Category) -> FormValues {
        FormValues::new()
            .with("category_name", &record.name)
            .with_image("category_img", record.image.as_deref())
    }

    fn parse(form: &FormData, mode: FormMode) -> Result<CategoryInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let name = reader.text("category_name", NAME_MAX);
        check_slug(&mut reader, "category_name", &name, mode);
        let image = reader.image("category_img");
        reader.finish()?;
        Ok(CategoryInput { name, image })
    }

    async fn fields(_pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        Ok(vec![
            FieldSpec::text("category_name", "Category", NAME_MAX),
            FieldSpec::image("category_img", "Category Image"),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<Category>, RepositoryError> {
        CategoryRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Category>, RepositoryError> {
        CategoryRepository::new(pool).get(CategoryId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &CategoryInput) -> Result<i32, RepositoryError> {
        Ok(CategoryRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &CategoryInput) -> Result<(), RepositoryError> {
        CategoryRepository::new(pool)
            .update(CategoryId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        CategoryRepository::new(pool).delete(CategoryId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        CategoryRepository::new(pool).count().await
    }
}

// =============================================================================
// SubCategory
// =============================================================================

pub struct SubCategoryAdmin;

impl AdminModel for SubCategoryAdmin {
    type Record = SubCategory;
    type Input = SubCategoryInput;

    const META: ModelMeta = ModelMeta {
        path: "subcategory",
        verbose_name: "Sub Category",
        verbose_name_plural: "Sub Categories",
    };
    const COLUMNS: &'static [&'static str] = &["Sub Category", "Category", "Slug"];
    const IMAGE_FIELDS: &'static [ImageField] = &[ImageField {
        name: "sub_category_img",
        upload_to: "sub_category",
    }];
    const CONFLICT_FIELD: &'static str = "sub_category_name";
    const CONFLICT_MESSAGE: &'static str = "Sub Category with this Slug already exists.";

    fn record_id(record: &SubCategory) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &SubCategory) -> Vec<String> {
        vec![
            record.name.clone(),
            record.category_name.clone(),
            record.slug.to_string(),
        ]
    }

    fn initial(record: &SubCategory) -> FormValues {
        FormValues::new()
            .with("sub_category_name", &record.name)
            .with("category", record.category_id)
            .with_image("sub_category_img", record.image.as_deref())
    }

    fn parse(form: &FormData, mode: FormMode) -> Result<SubCategoryInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let name = reader.text("sub_category_name", NAME_MAX);
        check_slug(&mut reader, "sub_category_name", &name, mode);
        let category_id: CategoryId = reader.choice("category");
        let image = reader.image("sub_category_img");
        reader.finish()?;
        Ok(SubCategoryInput {
            category_id,
            name,
            image,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let categories = CategoryRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::text("sub_category_name", "Sub Category", NAME_MAX),
            FieldSpec::image("sub_category_img", "Sub Category Image"),
            FieldSpec::select("category", "Category (FK)", id_choices(categories)),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<SubCategory>, RepositoryError> {
        SubCategoryRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<SubCategory>, RepositoryError> {
        SubCategoryRepository::new(pool)
            .get(SubCategoryId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &SubCategoryInput) -> Result<i32, RepositoryError> {
        Ok(SubCategoryRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(
        pool: &PgPool,
        id: i32,
        input: &SubCategoryInput,
    ) -> Result<(), RepositoryError> {
        SubCategoryRepository::new(pool)
            .update(SubCategoryId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        SubCategoryRepository::new(pool)
            .delete(SubCategoryId::new(id))
            .await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        SubCategoryRepository::new(pool).count().await
    }
}

// =============================================================================
// Product
// =============================================================================

pub struct ProductAdmin;

impl AdminModel for ProductAdmin {
    type Record = Product;
    type Input = ProductInput;

    const META: ModelMeta = ModelMeta {
        path: "product",
        verbose_name: "Product",
        verbose_name_plural: "Products",
    };
    const COLUMNS: &'static [&'static str] = &[
        "Product Name",
        "Sub Category",
        "Price/Piece",
        "Quantity On Hand",
        "Slug",
    ];
    const IMAGE_FIELDS: &'static [ImageField] = &[ImageField {
        name: "prod_img",
        upload_to: "product",
    }];
    const CONFLICT_FIELD: &'static str = "prod_name";
    const CONFLICT_MESSAGE: &'static str = "Product with this Slug already exists.";

    fn record_id(record: &Product) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &Product) -> Vec<String> {
        vec![
            record.name.clone(),
            record.sub_category_name.clone(),
            record.price.to_string(),
            record.quantity_on_hand.to_string(),
            record.slug.to_string(),
        ]
    }

    fn initial(record: &Product) -> FormValues {
        FormValues::new()
            .with("prod_name", &record.name)
            .with("prod_desc", &record.description)
            .with("prod_price", record.price)
            .with("q_o_h", record.quantity_on_hand)
            .with("sub_category", record.sub_category_id)
            .with_image("prod_img", record.image.as_deref())
    }

    fn defaults() -> FormValues {
        FormValues::new()
            .with("prod_price", Money::default())
            .with("q_o_h", 0)
    }

    fn parse(form: &FormData, mode: FormMode) -> Result<ProductInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let name = reader.text("prod_name", PRODUCT_NAME_MAX);
        check_slug(&mut reader, "prod_name", &name, mode);
        let description = reader.text("prod_desc", PRODUCT_DESC_MAX);
        let price = reader.money("prod_price");
        let image = reader.image("prod_img");
        let quantity_on_hand = reader.non_negative("q_o_h");
        let sub_category_id: SubCategoryId = reader.choice("sub_category");
        reader.finish()?;
        Ok(ProductInput {
            sub_category_id,
            name,
            description,
            price,
            image,
            quantity_on_hand,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let sub_categories = SubCategoryRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::text("prod_name", "Product Name", PRODUCT_NAME_MAX),
            FieldSpec::textarea("prod_desc", "Product Description", PRODUCT_DESC_MAX),
            FieldSpec::decimal("prod_price", "Product Price/Piece"),
            FieldSpec::image("prod_img", "Product Image"),
            FieldSpec::integer("q_o_h", "Quantity On Hand", Some(0), None),
            FieldSpec::select(
                "sub_category",
                "Sub Category (FK)",
                id_choices(sub_categories),
            ),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(pool).get(ProductId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &ProductInput) -> Result<i32, RepositoryError> {
        Ok(ProductRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &ProductInput) -> Result<(), RepositoryError> {
        ProductRepository::new(pool)
            .update(ProductId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        ProductRepository::new(pool).delete(ProductId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        ProductRepository::new(pool).count().await
    }
}

// =============================================================================
// Product gallery images
// =============================================================================

pub struct ProductImageAdmin;

impl AdminModel for ProductImageAdmin {
    type Record = ProductImage;
    type Input = ProductImageInput;

    const META: ModelMeta = ModelMeta {
        path: "productimages",
        verbose_name: "Product Images",
        verbose_name_plural: "Product Images",
    };
    const COLUMNS: &'static [&'static str] = &["Product", "Image"];
    const IMAGE_FIELDS: &'static [ImageField] = &[ImageField {
        name: "prod_img",
        upload_to: "product_img",
    }];

    fn record_id(record: &ProductImage) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &ProductImage) -> Vec<String> {
        vec![
            record.product_name.clone(),
            record.image.clone().unwrap_or_default(),
        ]
    }

    fn initial(record: &ProductImage) -> FormValues {
        FormValues::new()
            .with("product", record.product_id)
            .with_image("prod_img", record.image.as_deref())
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<ProductImageInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let product_id: ProductId = reader.choice("product");
        let image = reader.image("prod_img");
        reader.finish()?;
        Ok(ProductImageInput { product_id, image })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let products = ProductRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::select("product", "Product (FK)", id_choices(products)),
            FieldSpec::image("prod_img", "Product Image"),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<ProductImage>, RepositoryError> {
        ProductImageRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<ProductImage>, RepositoryError> {
        ProductImageRepository::new(pool)
            .get(ProductImageId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &ProductImageInput) -> Result<i32, RepositoryError> {
        Ok(ProductImageRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(
        pool: &PgPool,
        id: i32,
        input: &ProductImageInput,
    ) -> Result<(), RepositoryError> {
        ProductImageRepository::new(pool)
            .update(ProductImageId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        ProductImageRepository::new(pool)
            .delete(ProductImageId::new(id))
            .await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        ProductImageRepository::new(pool).count().await
    }
}

// =============================================================================
// Size
// =============================================================================

pub struct SizeAdmin;

impl AdminModel for SizeAdmin {
    type Record = Size;
    type Input = SizeInput;

    const META: ModelMeta = ModelMeta {
        path: "size",
        verbose_name: "Size",
        verbose_name_plural: "Sizes",
    };
    const COLUMNS: &'static [&'static str] = &["Product Size"];

    fn record_id(record: &Size) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &Size) -> Vec<String> {
        vec![record.label.clone()]
    }

    fn initial(record: &Size) -> FormValues {
        FormValues::new().with("size", &record.label)
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<SizeInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let label = reader.text("size", SIZE_MAX);
        reader.finish()?;
        Ok(SizeInput { label })
    }

    async fn fields(_pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        Ok(vec![FieldSpec::text("size", "Product Size", SIZE_MAX)])
    }

    async fn list(pool: &PgPool) -> Result<Vec<Size>, RepositoryError> {
        SizeRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Size>, RepositoryError> {
        SizeRepository::new(pool).get(SizeId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &SizeInput) -> Result<i32, RepositoryError> {
        Ok(SizeRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &SizeInput) -> Result<(), RepositoryError> {
        SizeRepository::new(pool).update(SizeId::new(id), input).await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        SizeRepository::new(pool).delete(SizeId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        SizeRepository::new(pool).count().await
    }
}

// =============================================================================
// Sizes offered per product
// =============================================================================

pub struct SizeProductMapAdmin;

impl AdminModel for SizeProductMapAdmin {
    type Record = SizeProductMap;
    type Input = SizeProductMapInput;

    const META: ModelMeta = ModelMeta {
        path: "sizeproductmap",
        verbose_name: "Size Product Map",
        verbose_name_plural: "Size Product Maps",
    };
    const COLUMNS: &'static [&'static str] = &["Product", "Size"];

    fn record_id(record: &SizeProductMap) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &SizeProductMap) -> Vec<String> {
        vec![record.product_name.clone(), record.size_label.clone()]
    }

    fn initial(record: &SizeProductMap) -> FormValues {
        FormValues::new()
            .with("product", record.product_id)
            .with("size", record.size_id)
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<SizeProductMapInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let product_id: ProductId = reader.choice("product");
        let size_id: SizeId = reader.choice("size");
        reader.finish()?;
        Ok(SizeProductMapInput {
            product_id,
            size_id,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let products = ProductRepository::new(pool).choices().await?;
        let sizes = SizeRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::select("product", "Product (FK)", id_choices(products)),
            FieldSpec::select("size", "Size (FK)", id_choices(sizes)),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<SizeProductMap>, RepositoryError> {
        SizeProductMapRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<SizeProductMap>, RepositoryError> {
        SizeProductMapRepository::new(pool)
            .get(SizeProductMapId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &SizeProductMapInput) -> Result<i32, RepositoryError> {
        Ok(SizeProductMapRepository::new(pool)
            .create(input)
            .await?
            .as_i32())
    }

    async fn update(
        pool: &PgPool,
        id: i32,
        input: &SizeProductMapInput,
    ) -> Result<(), RepositoryError> {
        SizeProductMapRepository::new(pool)
            .update(SizeProductMapId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        SizeProductMapRepository::new(pool)
            .delete(SizeProductMapId::new(id))
            .await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        SizeProductMapRepository::new(pool).count().await
    }
}

// =============================================================================
// Review
// =============================================================================

pub struct ReviewAdmin;

impl AdminModel for ReviewAdmin {
    type Record = Review;
    type Input = ReviewInput;

    const META: ModelMeta = ModelMeta {
        path: "review",
        verbose_name: "Review",
        verbose_name_plural: "Reviews",
    };
    const COLUMNS: &'static [&'static str] = &["Product", "User", "Rating", "Date"];

    fn record_id(record: &Review) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &Review) -> Vec<String> {
        vec![
            record.product_name.clone(),
            record.user_display_name.clone(),
            record.rating.to_string(),
            record.date.to_string(),
        ]
    }

    fn initial(record: &Review) -> FormValues {
        FormValues::new()
            .with("product", record.product_id)
            .with("user", record.user_id)
            .with("rating", record.rating)
            .with_optional("review", record.review.as_deref())
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<ReviewInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let product_id: ProductId = reader.choice("product");
        let user_id = reader.choice("user");
        let rating = reader.bounded("rating", Rating::new);
        let review = reader.optional_text("review", REVIEW_MAX);
        reader.finish()?;
        Ok(ReviewInput {
            product_id,
            user_id,
            rating,
            review,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let products = ProductRepository::new(pool).choices().await?;
        let users = UserRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::select("product", "Product (FK)", id_choices(products)),
            FieldSpec::select("user", "User (FK)", id_choices(users)),
            FieldSpec::integer(
                "rating",
                "Rating",
                Some(i64::from(Rating::MIN)),
                Some(i64::from(Rating::MAX)),
            ),
            FieldSpec::textarea("review", "Review", REVIEW_MAX).optional(),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<Review>, RepositoryError> {
        ReviewRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Review>, RepositoryError> {
        ReviewRepository::new(pool).get(ReviewId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &ReviewInput) -> Result<i32, RepositoryError> {
        Ok(ReviewRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &ReviewInput) -> Result<(), RepositoryError> {
        ReviewRepository::new(pool)
            .update(ReviewId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        ReviewRepository::new(pool).delete(ReviewId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        ReviewRepository::new(pool).count().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::models::ImageUpdate;
    use crate::registry::form::REQUIRED;

    use super::*;

    #[test]
    fn test_category_requires_sluggable_name() {
        let form = FormData::from_pairs(&[("category_name", "!!!")]);
        let errors = CategoryAdmin::parse(&form, FormMode::Create).unwrap_err();
        assert_eq!(
            errors.get("category_name"),
            ["name must contain at least one letter or digit"]
        );

        // Edits never regenerate the slug, so the name is only length-checked.
        assert!(CategoryAdmin::parse(&form, FormMode::Edit).is_ok());
    }

    #[test]
    fn test_category_carries_image_update() {
        let form = FormData::from_pairs(&[("category_name", "Men")])
            .with_image("category_img", ImageUpdate::Set("category/a.png".to_owned()));
        let input = CategoryAdmin::parse(&form, FormMode::Create).unwrap();
        assert_eq!(input.name, "Men");
        assert_eq!(input.image, ImageUpdate::Set("category/a.png".to_owned()));
    }

    #[test]
    fn test_product_parse() {
        let form = FormData::from_pairs(&[
            ("prod_name", "Linen Shirt"),
            ("prod_desc", "Breathable summer shirt"),
            ("prod_price", "19.99"),
            ("q_o_h", "5"),
            ("sub_category", "3"),
        ]);
        let input = ProductAdmin::parse(&form, FormMode::Create).unwrap();
        assert_eq!(input.price.to_string(), "19.99");
        assert_eq!(input.quantity_on_hand, 5);
        assert_eq!(input.sub_category_id, SubCategoryId::new(3));
        assert_eq!(input.image, ImageUpdate::Keep);
    }

    #[test]
    fn test_product_rejects_long_name_and_negative_stock() {
        let name = "n".repeat(51);
        let form = FormData::from_pairs(&[
            ("prod_name", name.as_str()),
            ("prod_desc", "d"),
            ("prod_price", "-1"),
            ("q_o_h", "-2"),
        ]);
        let errors = ProductAdmin::parse(&form, FormMode::Create).unwrap_err();
        for field in ["prod_name", "prod_price", "q_o_h", "sub_category"] {
            assert!(!errors.get(field).is_empty(), "{field} should fail");
        }
        assert_eq!(errors.get("sub_category"), [REQUIRED]);
    }

    #[test]
    fn test_review_rating_bounds() {
        for (raw, ok) in [("0", true), ("5", true), ("7", false), ("-1", false)] {
            let form = FormData::from_pairs(&[("product", "1"), ("user", "2"), ("rating", raw)]);
            assert_eq!(
                ReviewAdmin::parse(&form, FormMode::Create).is_ok(),
                ok,
                "rating {raw}"
            );
        }
    }

    #[test]
    fn test_review_text_is_optional_but_bounded() {
        let form = FormData::from_pairs(&[("product", "1"), ("user", "2"), ("rating", "4")]);
        let input = ReviewAdmin::parse(&form, FormMode::Create).unwrap();
        assert_eq!(input.review, None);

        let long = "r".repeat(301);
        let form = FormData::from_pairs(&[
            ("product", "1"),
            ("user", "2"),
            ("rating", "4"),
            ("review", long.as_str()),
        ]);
        let errors = ReviewAdmin::parse(&form, FormMode::Create).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["review"]);
    }

    #[test]
    fn test_size_product_map_requires_both_keys() {
        let form = FormData::from_pairs(&[("product", "1")]);
        let errors = SizeProductMapAdmin::parse(&form, FormMode::Create).unwrap_err();
        assert_eq!(errors.get("size"), [REQUIRED]);
    }
}
