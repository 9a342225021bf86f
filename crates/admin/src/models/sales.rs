//! Cart, order and payment domain types.

use core::fmt;

use chrono::{DateTime, Utc};

use eshop_core::{
    CartItemId, Money, OrderId, OrderItemId, PaymentId, PaymentStatus, ProductId, Quantity,
    UserId,
};

/// Shipping contact details, copied onto each order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingAddress {
    pub phone_no: String,
    pub address: String,
    pub state: String,
    pub city: String,
    pub pin_code: String,
}

/// A line in a user's cart.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub user_id: UserId,
    pub user_display_name: String,
    pub size: String,
    pub quantity: Quantity,
    /// `product.prod_price * quantity` at the time of the last save.
    pub item_total: Money,
}

impl fmt::Display for CartItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "For {} By {} for quantity {}",
            self.product_name, self.user_display_name, self.quantity
        )
    }
}

#[derive(Debug, Clone)]
pub struct CartItemInput {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub size: String,
    pub quantity: Quantity,
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub user_display_name: String,
    pub amount: Money,
    pub status: PaymentStatus,
    pub shipping: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "By {} on {}",
            self.user_display_name,
            self.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrderInput {
    pub user_id: UserId,
    pub amount: Money,
    pub status: PaymentStatus,
    pub shipping: ShippingAddress,
    pub note: Option<String>,
}

/// A product line inside an order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    pub quantity: Quantity,
    pub item_total: Money,
}

impl fmt::Display for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "For {} Quantity {}", self.product_name, self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub size: String,
    pub quantity: Quantity,
}

/// A payment recorded against an order.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub pay_date: DateTime<Utc>,
    pub status: PaymentStatus,
    pub info: Option<String>,
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payment {} for order {}", self.id, self.order_id)
    }
}

#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub order_id: OrderId,
    pub status: PaymentStatus,
    pub info: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_cart_item_display() {
        let item = CartItem {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            product_name: "Linen Shirt".to_owned(),
            user_id: UserId::new(1),
            user_display_name: "Ada Lovelace".to_owned(),
            size: "M".to_owned(),
            quantity: Quantity::new(2).unwrap(),
            item_total: "39.98".parse().unwrap(),
        };
        assert_eq!(
            item.to_string(),
            "For Linen Shirt By Ada Lovelace for quantity 2"
        );
    }

    #[test]
    fn test_order_display() {
        let order = Order {
            id: OrderId::new(7),
            user_id: UserId::new(1),
            user_display_name: "Ada Lovelace".to_owned(),
            amount: Money::ZERO,
            status: PaymentStatus::Unpaid,
            shipping: ShippingAddress::default(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
            note: None,
        };
        assert_eq!(order.to_string(), "By Ada Lovelace on 2026-10-16 09:30:00");
    }

    #[test]
    fn test_order_item_display() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: ProductId::new(1),
            product_name: "Linen Shirt".to_owned(),
            size: "L".to_owned(),
            quantity: Quantity::new(3).unwrap(),
            item_total: Money::ZERO,
        };
        assert_eq!(item.to_string(), "For Linen Shirt Quantity 3");
    }

    #[test]
    fn test_payment_display() {
        let payment = Payment {
            id: PaymentId::new(4),
            order_id: OrderId::new(12),
            pay_date: Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
            status: PaymentStatus::Paid,
            info: None,
        };
        assert_eq!(payment.to_string(), "Payment 4 for order 12");
    }
}
