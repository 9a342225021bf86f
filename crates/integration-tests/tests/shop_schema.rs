//! Repository and constraint tests against a real `PostgreSQL` database.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `ESHOP_DATABASE_URL`.
//!
//! Run with: cargo test -p eshop-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::str::FromStr;

use sqlx::PgPool;

use eshop_admin::db::{
    CartRepository, CategoryRepository, OrderItemRepository, OrderRepository, PaymentRepository,
    ProductImageRepository, ProductRepository, RepositoryError, ReviewRepository,
    SizeProductMapRepository, SizeRepository, SubCategoryRepository, UserRepository,
};
use eshop_admin::models::{
    CartItemInput, CategoryInput, ImageUpdate, OrderInput, OrderItemInput, PasswordChange,
    PaymentInput, ProductImageInput, ProductInput, ReviewInput, ShippingAddress, SizeInput,
    SizeProductMapInput, SubCategoryInput, UserInput,
};
use eshop_core::{
    CartItemId, CategoryId, Gender, Money, OrderId, OrderItemId, PaymentId, PaymentStatus,
    ProductId, Quantity, Rating, ReviewId, Slug, SubCategoryId, UserId,
};
use eshop_integration_tests::{test_pool, unique_suffix};

// ============================================================================
// Fixtures
// ============================================================================

async fn create_user(pool: &PgPool, suffix: &str) -> UserId {
    UserRepository::new(pool)
        .create(&UserInput {
            username: format!("shopper-{suffix}"),
            password: PasswordChange::Set("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned()),
            first_name: "Test".to_owned(),
            last_name: "Shopper".to_owned(),
            email: None,
            is_staff: false,
            is_active: true,
            is_superuser: false,
            avatar: ImageUpdate::Keep,
            gender: Gender::Female,
            phone_no: "9876543210".to_owned(),
            address: "1 Test Street".to_owned(),
            state: "Goa".to_owned(),
            city: "Panaji".to_owned(),
            pin_code: "403001".to_owned(),
        })
        .await
        .expect("Failed to create user")
}

async fn create_category(pool: &PgPool, name: &str) -> CategoryId {
    CategoryRepository::new(pool)
        .create(&CategoryInput {
            name: name.to_owned(),
            image: ImageUpdate::Keep,
        })
        .await
        .expect("Failed to create category")
}

async fn create_sub_category(pool: &PgPool, category_id: CategoryId, name: &str) -> SubCategoryId {
    SubCategoryRepository::new(pool)
        .create(&SubCategoryInput {
            category_id,
            name: name.to_owned(),
            image: ImageUpdate::Keep,
        })
        .await
        .expect("Failed to create sub-category")
}

fn product_input(sub_category_id: SubCategoryId, name: &str, price: &str, q_o_h: i32) -> ProductInput {
    ProductInput {
        sub_category_id,
        name: name.to_owned(),
        description: "Integration test product".to_owned(),
        price: Money::from_str(price).unwrap(),
        image: ImageUpdate::Keep,
        quantity_on_hand: q_o_h,
    }
}

async fn create_product(pool: &PgPool, suffix: &str) -> (CategoryId, ProductId) {
    let category_id = create_category(pool, &format!("Apparel {suffix}")).await;
    let sub_category_id = create_sub_category(pool, category_id, &format!("Shirts {suffix}")).await;
    let product_id = ProductRepository::new(pool)
        .create(&product_input(sub_category_id, &format!("Linen Shirt {suffix}"), "19.99", 5))
        .await
        .expect("Failed to create product");
    (category_id, product_id)
}

/// Rows a shopper leaves behind: a cart line, a review and a paid order
/// for one product.
struct Purchase {
    cart_id: CartItemId,
    review_id: ReviewId,
    order_id: OrderId,
    order_item_id: OrderItemId,
    payment_id: PaymentId,
}

async fn create_purchase(pool: &PgPool, user_id: UserId, product_id: ProductId) -> Purchase {
    let cart_id = CartRepository::new(pool)
        .create(&CartItemInput {
            product_id,
            user_id,
            size: "M".to_owned(),
            quantity: Quantity::new(2).unwrap(),
        })
        .await
        .expect("Failed to create cart line");
    let review_id = ReviewRepository::new(pool)
        .create(&ReviewInput {
            product_id,
            user_id,
            rating: Rating::new(4).unwrap(),
            review: Some("Fits well".to_owned()),
        })
        .await
        .expect("Failed to create review");
    let order_id = OrderRepository::new(pool)
        .create(&OrderInput {
            user_id,
            amount: Money::from_str("39.98").unwrap(),
            status: PaymentStatus::Paid,
            shipping: ShippingAddress {
                phone_no: "9876543210".to_owned(),
                address: "1 Test Street".to_owned(),
                state: "Goa".to_owned(),
                city: "Panaji".to_owned(),
                pin_code: "403001".to_owned(),
            },
            note: None,
        })
        .await
        .expect("Failed to create order");
    let order_item_id = OrderItemRepository::new(pool)
        .create(&OrderItemInput {
            order_id,
            product_id,
            size: "M".to_owned(),
            quantity: Quantity::new(2).unwrap(),
        })
        .await
        .expect("Failed to create order item");
    let payment_id = PaymentRepository::new(pool)
        .create(&PaymentInput {
            order_id,
            status: PaymentStatus::Paid,
            info: None,
        })
        .await
        .expect("Failed to create payment");

    Purchase {
        cart_id,
        review_id,
        order_id,
        order_item_id,
        payment_id,
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_product_retrievable_by_generated_slug() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let (_, product_id) = create_product(&pool, &suffix).await;

    let slug = Slug::from_name(&format!("Linen Shirt {suffix}")).unwrap();
    assert_eq!(slug.as_str(), format!("linen-shirt-{suffix}"));

    let product = ProductRepository::new(&pool)
        .get_by_slug(&slug)
        .await
        .unwrap()
        .expect("product should be found by slug");
    assert_eq!(product.id, product_id);
    assert_eq!(product.price.to_string(), "19.99");
    assert_eq!(product.quantity_on_hand, 5);
    assert_eq!(product.slug, slug);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_duplicate_slug_is_rejected() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    create_category(&pool, &format!("Summer Wear {suffix}")).await;

    // Different name, same slug.
    let result = CategoryRepository::new(&pool)
        .create(&CategoryInput {
            name: format!("summer  wear {suffix}!"),
            image: ImageUpdate::Keep,
        })
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_slug_survives_rename() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let repo = CategoryRepository::new(&pool);
    let id = create_category(&pool, &format!("Winter {suffix}")).await;

    repo.update(
        id,
        &CategoryInput {
            name: format!("Autumn {suffix}"),
            image: ImageUpdate::Keep,
        },
    )
    .await
    .unwrap();

    let category = repo.get(id).await.unwrap().unwrap();
    assert_eq!(category.name, format!("Autumn {suffix}"));
    assert_eq!(category.slug.as_str(), format!("winter-{suffix}"));
}

// ============================================================================
// Cascades
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_deleting_category_cascades_to_dependents() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let user_id = create_user(&pool, &suffix).await;
    let (category_id, product_id) = create_product(&pool, &suffix).await;

    let size_id = SizeRepository::new(&pool)
        .create(&SizeInput {
            label: format!("T{suffix}"),
        })
        .await
        .unwrap();
    let map_id = SizeProductMapRepository::new(&pool)
        .create(&SizeProductMapInput {
            product_id,
            size_id,
        })
        .await
        .unwrap();
    let purchase = create_purchase(&pool, user_id, product_id).await;
    let image_id = ProductImageRepository::new(&pool)
        .create(&ProductImageInput {
            product_id,
            image: ImageUpdate::Set("product_img/test.png".to_owned()),
        })
        .await
        .unwrap();

    assert!(CategoryRepository::new(&pool).delete(category_id).await.unwrap());

    assert!(ProductRepository::new(&pool).get(product_id).await.unwrap().is_none());
    assert!(CartRepository::new(&pool).get(purchase.cart_id).await.unwrap().is_none());
    assert!(ReviewRepository::new(&pool).get(purchase.review_id).await.unwrap().is_none());
    assert!(OrderItemRepository::new(&pool).get(purchase.order_item_id).await.unwrap().is_none());
    assert!(SizeProductMapRepository::new(&pool).get(map_id).await.unwrap().is_none());
    assert!(ProductImageRepository::new(&pool).get(image_id).await.unwrap().is_none());

    // Sizes, users, orders and payments are not owned by the category.
    assert!(SizeRepository::new(&pool).get(size_id).await.unwrap().is_some());
    assert!(UserRepository::new(&pool).get(user_id).await.unwrap().is_some());
    assert!(OrderRepository::new(&pool).get(purchase.order_id).await.unwrap().is_some());
    assert!(PaymentRepository::new(&pool).get(purchase.payment_id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_deleting_user_cascades_to_cart_order_review() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let user_id = create_user(&pool, &suffix).await;
    let (_, product_id) = create_product(&pool, &suffix).await;
    let purchase = create_purchase(&pool, user_id, product_id).await;

    assert!(UserRepository::new(&pool).delete(user_id).await.unwrap());

    assert!(CartRepository::new(&pool).get(purchase.cart_id).await.unwrap().is_none());
    assert!(ReviewRepository::new(&pool).get(purchase.review_id).await.unwrap().is_none());
    assert!(OrderRepository::new(&pool).get(purchase.order_id).await.unwrap().is_none());
    assert!(OrderItemRepository::new(&pool).get(purchase.order_item_id).await.unwrap().is_none());
    assert!(PaymentRepository::new(&pool).get(purchase.payment_id).await.unwrap().is_none());

    // The catalog is untouched.
    assert!(ProductRepository::new(&pool).get(product_id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_deleting_order_cascades_to_items_and_payments() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let user_id = create_user(&pool, &suffix).await;
    let (_, product_id) = create_product(&pool, &suffix).await;
    let purchase = create_purchase(&pool, user_id, product_id).await;

    assert!(OrderRepository::new(&pool).delete(purchase.order_id).await.unwrap());

    assert!(OrderItemRepository::new(&pool).get(purchase.order_item_id).await.unwrap().is_none());
    assert!(PaymentRepository::new(&pool).get(purchase.payment_id).await.unwrap().is_none());
    assert!(CartRepository::new(&pool).get(purchase.cart_id).await.unwrap().is_some());
    assert!(UserRepository::new(&pool).get(user_id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_deleting_missing_row_reports_false() {
    let pool = test_pool().await;
    assert!(!CategoryRepository::new(&pool)
        .delete(CategoryId::new(i32::MAX))
        .await
        .unwrap());
}

// ============================================================================
// Computed totals
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_cart_item_total_follows_price_and_quantity() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let user_id = create_user(&pool, &suffix).await;
    let (_, product_id) = create_product(&pool, &suffix).await;
    let repo = CartRepository::new(&pool);

    let mut input = CartItemInput {
        product_id,
        user_id,
        size: "L".to_owned(),
        quantity: Quantity::new(3).unwrap(),
    };
    let id = repo.create(&input).await.unwrap();
    assert_eq!(repo.get(id).await.unwrap().unwrap().item_total.to_string(), "59.97");

    input.quantity = Quantity::new(1).unwrap();
    repo.update(id, &input).await.unwrap();
    assert_eq!(repo.get(id).await.unwrap().unwrap().item_total.to_string(), "19.99");
}

// ============================================================================
// Check constraints
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_rating_outside_range_is_rejected_by_database() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let user_id = create_user(&pool, &suffix).await;
    let (_, product_id) = create_product(&pool, &suffix).await;

    let err = sqlx::query("INSERT INTO review (product_id, user_id, rating) VALUES ($1, $2, 6)")
        .bind(product_id)
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("expected a database error");
    assert!(db_err.is_check_violation());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_quantity_outside_range_is_rejected_by_database() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    let user_id = create_user(&pool, &suffix).await;
    let (_, product_id) = create_product(&pool, &suffix).await;

    for quantity in [0_i16, 51] {
        let err = sqlx::query(
            "INSERT INTO cart_item (product_id, user_id, size, quantity) VALUES ($1, $2, 'M', $3)",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(quantity)
        .execute(&pool)
        .await
        .unwrap_err();
        let db_err = err.as_database_error().expect("expected a database error");
        assert!(db_err.is_check_violation(), "quantity {quantity} was accepted");
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (ESHOP_DATABASE_URL)"]
async fn test_duplicate_username_is_a_conflict() {
    let pool = test_pool().await;
    let suffix = unique_suffix();
    create_user(&pool, &suffix).await;

    let err = UserRepository::new(&pool)
        .create(&UserInput {
            username: format!("shopper-{suffix}"),
            password: PasswordChange::Set("x".to_owned()),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            is_staff: false,
            is_active: true,
            is_superuser: false,
            avatar: ImageUpdate::Keep,
            gender: Gender::Male,
            phone_no: String::new(),
            address: String::new(),
            state: String::new(),
            city: String::new(),
            pin_code: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}
