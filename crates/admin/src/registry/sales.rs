//! Sales models: carts, orders, order lines and payments.
//!
//! Line totals are not form fields. The repositories compute them from the
//! product price whenever a cart or order line is written.

use sqlx::PgPool;

use eshop_core::{CartItemId, OrderId, OrderItemId, PaymentId, PaymentStatus, ProductId, Quantity};

use super::form::{
    Choice, FieldErrors, FieldSpec, FormData, FormMode, FormReader, FormValues, id_choices,
};
use super::{AdminModel, ModelMeta};
use crate::db::{
    CartRepository, OrderItemRepository, OrderRepository, PaymentRepository, ProductRepository,
    RepositoryError, UserRepository,
};
use crate::models::{
    CartItem, CartItemInput, Order, OrderInput, OrderItem, OrderItemInput, Payment, PaymentInput,
    ShippingAddress,
};

const LINE_SIZE_MAX: usize = 10;
const PHONE_MAX: usize = 12;
const ADDRESS_MAX: usize = 350;
const REGION_MAX: usize = 50;
const PIN_CODE_MAX: usize = 8;
const NOTE_MAX: usize = 350;
const PAY_INFO_MAX: usize = 300;

fn status_choices() -> Vec<Choice> {
    PaymentStatus::ALL
        .iter()
        .map(|s| Choice::new(s.code(), s.label()))
        .collect()
}

fn quantity_field() -> FieldSpec {
    FieldSpec::integer(
        "quantity",
        "Quantity",
        Some(i64::from(Quantity::MIN)),
        Some(i64::from(Quantity::MAX)),
    )
}

// =============================================================================
// Cart
// =============================================================================

pub struct CartAdmin;

impl AdminModel for CartAdmin {
    type Record = CartItem;
    type Input = CartItemInput;

    const META: ModelMeta = ModelMeta {
        path: "cart",
        verbose_name: "Cart",
        verbose_name_plural: "Carts",
    };
    const COLUMNS: &'static [&'static str] = &["Product", "User", "Size", "Quantity", "Total Per Item"];

    fn record_id(record: &CartItem) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &CartItem) -> Vec<String> {
        vec![
            record.product_name.clone(),
            record.user_display_name.clone(),
            record.size.clone(),
            record.quantity.to_string(),
            record.item_total.to_string(),
        ]
    }

    fn initial(record: &CartItem) -> FormValues {
        FormValues::new()
            .with("product", record.product_id)
            .with("user", record.user_id)
            .with("size", &record.size)
            .with("quantity", record.quantity)
    }

    fn defaults() -> FormValues {
        FormValues::new().with("quantity", Quantity::default())
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<CartItemInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let product_id: ProductId = reader.choice("product");
        let user_id = reader.choice("user");
        let size = reader.text("size", LINE_SIZE_MAX);
        let quantity = reader.bounded("quantity", Quantity::new);
        reader.finish()?;
        Ok(CartItemInput {
            product_id,
            user_id,
            size,
            quantity,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let products = ProductRepository::new(pool).choices().await?;
        let users = UserRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::select("product", "Product (FK)", id_choices(products)),
            FieldSpec::select("user", "User (FK)", id_choices(users)),
            FieldSpec::text("size", "Size", LINE_SIZE_MAX),
            quantity_field().help("Total Per Item is recalculated from the product price."),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<CartItem>, RepositoryError> {
        CartRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<CartItem>, RepositoryError> {
        CartRepository::new(pool).get(CartItemId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &CartItemInput) -> Result<i32, RepositoryError> {
        Ok(CartRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &CartItemInput) -> Result<(), RepositoryError> {
        CartRepository::new(pool)
            .update(CartItemId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        CartRepository::new(pool).delete(CartItemId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        CartRepository::new(pool).count().await
    }
}

// =============================================================================
// Order
// =============================================================================

pub struct OrderAdmin;

impl AdminModel for OrderAdmin {
    type Record = Order;
    type Input = OrderInput;

    const META: ModelMeta = ModelMeta {
        path: "order",
        verbose_name: "Order",
        verbose_name_plural: "Orders",
    };
    const COLUMNS: &'static [&'static str] = &["Order", "User", "Amount", "Status", "Created"];

    fn record_id(record: &Order) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &Order) -> Vec<String> {
        vec![
            format!("#{}", record.id),
            record.user_display_name.clone(),
            record.amount.to_string(),
            record.status.label().to_owned(),
            record.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }

    fn initial(record: &Order) -> FormValues {
        FormValues::new()
            .with("user", record.user_id)
            .with("order_amount", record.amount)
            .with("order_status", record.status.code())
            .with("phone_no", &record.shipping.phone_no)
            .with("address", &record.shipping.address)
            .with("state", &record.shipping.state)
            .with("city", &record.shipping.city)
            .with("pin_code", &record.shipping.pin_code)
            .with_optional("note", record.note.as_deref())
    }

    fn defaults() -> FormValues {
        FormValues::new().with("order_status", PaymentStatus::default().code())
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<OrderInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let user_id = reader.choice("user");
        let amount = reader.money("order_amount");
        let status: PaymentStatus = reader.choice("order_status");
        let shipping = ShippingAddress {
            phone_no: reader.text("phone_no", PHONE_MAX),
            address: reader.text("address", ADDRESS_MAX),
            state: reader.text("state", REGION_MAX),
            city: reader.text("city", REGION_MAX),
            pin_code: reader.text("pin_code", PIN_CODE_MAX),
        };
        let note = reader.optional_text("note", NOTE_MAX);
        reader.finish()?;
        Ok(OrderInput {
            user_id,
            amount,
            status,
            shipping,
            note,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let users = UserRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::select("user", "User (FK)", id_choices(users)),
            FieldSpec::decimal("order_amount", "Total Order Amount"),
            FieldSpec::select("order_status", "Order Status", status_choices()),
            FieldSpec::text("phone_no", "Contact No.", PHONE_MAX),
            FieldSpec::textarea("address", "Address", ADDRESS_MAX),
            FieldSpec::text("state", "State", REGION_MAX),
            FieldSpec::text("city", "City", REGION_MAX),
            FieldSpec::text("pin_code", "Zip Code", PIN_CODE_MAX),
            FieldSpec::textarea("note", "Note", NOTE_MAX).optional(),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(pool).get(OrderId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &OrderInput) -> Result<i32, RepositoryError> {
        Ok(OrderRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &OrderInput) -> Result<(), RepositoryError> {
        OrderRepository::new(pool).update(OrderId::new(id), input).await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        OrderRepository::new(pool).delete(OrderId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        OrderRepository::new(pool).count().await
    }
}

// =============================================================================
// Order lines
// =============================================================================

pub struct OrderItemAdmin;

impl AdminModel for OrderItemAdmin {
    type Record = OrderItem;
    type Input = OrderItemInput;

    const META: ModelMeta = ModelMeta {
        path: "orderitems",
        verbose_name: "Order Items",
        verbose_name_plural: "Order Items",
    };
    const COLUMNS: &'static [&'static str] = &["Order", "Product", "Size", "Quantity", "Total Per Item"];

    fn record_id(record: &OrderItem) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &OrderItem) -> Vec<String> {
        vec![
            format!("#{}", record.order_id),
            record.product_name.clone(),
            record.size.clone(),
            record.quantity.to_string(),
            record.item_total.to_string(),
        ]
    }

    fn initial(record: &OrderItem) -> FormValues {
        FormValues::new()
            .with("order", record.order_id)
            .with("product", record.product_id)
            .with("size", &record.size)
            .with("quantity", record.quantity)
    }

    fn defaults() -> FormValues {
        FormValues::new().with("quantity", Quantity::default())
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<OrderItemInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let order_id: OrderId = reader.choice("order");
        let product_id: ProductId = reader.choice("product");
        let size = reader.text("size", LINE_SIZE_MAX);
        let quantity = reader.bounded("quantity", Quantity::new);
        reader.finish()?;
        Ok(OrderItemInput {
            order_id,
            product_id,
            size,
            quantity,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let orders = OrderRepository::new(pool).choices().await?;
        let products = ProductRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::select("order", "Order (FK)", id_choices(orders)),
            FieldSpec::select("product", "Product (FK)", id_choices(products)),
            FieldSpec::text("size", "Size", LINE_SIZE_MAX),
            quantity_field().help("Total Per Item is recalculated from the product price."),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<OrderItem>, RepositoryError> {
        OrderItemRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<OrderItem>, RepositoryError> {
        OrderItemRepository::new(pool).get(OrderItemId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &OrderItemInput) -> Result<i32, RepositoryError> {
        Ok(OrderItemRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &OrderItemInput) -> Result<(), RepositoryError> {
        OrderItemRepository::new(pool)
            .update(OrderItemId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        OrderItemRepository::new(pool)
            .delete(OrderItemId::new(id))
            .await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        OrderItemRepository::new(pool).count().await
    }
}

// =============================================================================
// Payment
// =============================================================================

pub struct PaymentAdmin;

impl AdminModel for PaymentAdmin {
    type Record = Payment;
    type Input = PaymentInput;

    const META: ModelMeta = ModelMeta {
        path: "payment",
        verbose_name: "Payment",
        verbose_name_plural: "Payments",
    };
    const COLUMNS: &'static [&'static str] = &["Order", "Payment Date", "Payment Status"];

    fn record_id(record: &Payment) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &Payment) -> Vec<String> {
        vec![
            format!("#{}", record.order_id),
            record.pay_date.format("%Y-%m-%d %H:%M").to_string(),
            record.status.label().to_owned(),
        ]
    }

    fn initial(record: &Payment) -> FormValues {
        FormValues::new()
            .with("order", record.order_id)
            .with("pay_status", record.status.code())
            .with_optional("pay_info", record.info.as_deref())
    }

    fn defaults() -> FormValues {
        FormValues::new().with("pay_status", PaymentStatus::default().code())
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<PaymentInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let order_id: OrderId = reader.choice("order");
        let status: PaymentStatus = reader.choice("pay_status");
        let info = reader.optional_text("pay_info", PAY_INFO_MAX);
        reader.finish()?;
        Ok(PaymentInput {
            order_id,
            status,
            info,
        })
    }

    async fn fields(pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let orders = OrderRepository::new(pool).choices().await?;
        Ok(vec![
            FieldSpec::select("pay_status", "Payment Status", status_choices()),
            FieldSpec::text("pay_info", "Payment Info", PAY_INFO_MAX).optional(),
            FieldSpec::select("order", "Order (FK)", id_choices(orders)),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<Payment>, RepositoryError> {
        PaymentRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<Payment>, RepositoryError> {
        PaymentRepository::new(pool).get(PaymentId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &PaymentInput) -> Result<i32, RepositoryError> {
        Ok(PaymentRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &PaymentInput) -> Result<(), RepositoryError> {
        PaymentRepository::new(pool)
            .update(PaymentId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        PaymentRepository::new(pool).delete(PaymentId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        PaymentRepository::new(pool).count().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eshop_core::UserId;

    use crate::registry::form::INVALID_CHOICE;

    use super::*;

    fn cart_form(quantity: &str) -> FormData {
        FormData::from_pairs(&[
            ("product", "1"),
            ("user", "2"),
            ("size", "M"),
            ("quantity", quantity),
        ])
    }

    #[test]
    fn test_cart_quantity_bounds() {
        assert!(CartAdmin::parse(&cart_form("1"), FormMode::Create).is_ok());
        assert!(CartAdmin::parse(&cart_form("50"), FormMode::Create).is_ok());

        for raw in ["0", "51", "two"] {
            let errors = CartAdmin::parse(&cart_form(raw), FormMode::Create).unwrap_err();
            assert_eq!(errors.fields().collect::<Vec<_>>(), ["quantity"], "{raw}");
        }
    }

    #[test]
    fn test_cart_ignores_submitted_total() {
        let mut pairs = vec![
            ("product", "1"),
            ("user", "2"),
            ("size", "M"),
            ("quantity", "3"),
        ];
        pairs.push(("item_total", "0.01"));
        let input = CartAdmin::parse(&FormData::from_pairs(&pairs), FormMode::Create).unwrap();
        assert_eq!(input.user_id, UserId::new(2));
        assert_eq!(input.quantity.get(), 3);
    }

    #[test]
    fn test_order_item_quantity_bounds() {
        let form = FormData::from_pairs(&[
            ("order", "1"),
            ("product", "1"),
            ("size", "L"),
            ("quantity", "51"),
        ]);
        let errors = OrderItemAdmin::parse(&form, FormMode::Create).unwrap_err();
        assert_eq!(
            errors.get("quantity"),
            ["Ensure this value is between 1 and 50 (got 51)."]
        );
    }

    #[test]
    fn test_order_parse_and_limits() {
        let form = FormData::from_pairs(&[
            ("user", "1"),
            ("order_amount", "120.50"),
            ("order_status", "P"),
            ("phone_no", "9876543210"),
            ("address", "12 Lake Road"),
            ("state", "Kerala"),
            ("city", "Kochi"),
            ("pin_code", "682001"),
        ]);
        let input = OrderAdmin::parse(&form, FormMode::Create).unwrap();
        assert_eq!(input.status, PaymentStatus::Paid);
        assert_eq!(input.note, None);

        let form = FormData::from_pairs(&[
            ("user", "1"),
            ("order_amount", "1"),
            ("order_status", "X"),
            ("phone_no", "1234567890123"),
            ("address", "a"),
            ("state", "s"),
            ("city", "c"),
            ("pin_code", "123456789"),
        ]);
        let errors = OrderAdmin::parse(&form, FormMode::Create).unwrap_err();
        assert_eq!(errors.get("order_status"), [INVALID_CHOICE]);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["order_status", "phone_no", "pin_code"]
        );
    }

    #[test]
    fn test_payment_defaults_info_to_none() {
        let form = FormData::from_pairs(&[("order", "4"), ("pay_status", "U"), ("pay_info", "")]);
        let input = PaymentAdmin::parse(&form, FormMode::Create).unwrap();
        assert_eq!(input.status, PaymentStatus::Unpaid);
        assert_eq!(input.info, None);
    }
}
