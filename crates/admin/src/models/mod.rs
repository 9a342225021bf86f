//! Domain models for the shop schema.
//!
//! Records carry the display names of the rows they reference so list
//! screens and string forms can be rendered without extra queries.

pub mod catalog;
pub mod contact;
pub mod sales;
pub mod session;
pub mod user;

pub use catalog::{
    Category, CategoryInput, Product, ProductImage, ProductImageInput, ProductInput, Review,
    ReviewInput, Size, SizeInput, SizeProductMap, SizeProductMapInput, SubCategory,
    SubCategoryInput,
};
pub use contact::{ContactMessage, ContactMessageInput};
pub use sales::{
    CartItem, CartItemInput, Order, OrderInput, OrderItem, OrderItemInput, Payment, PaymentInput,
    ShippingAddress,
};
pub use session::{CurrentAdmin, Flash, FlashLevel, keys as session_keys};
pub use user::{PasswordChange, User, UserCredentials, UserInput};

/// What to do with an image column when saving a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageUpdate {
    /// Leave the stored path untouched (no upload, no clear).
    #[default]
    Keep,
    /// Remove the stored path.
    Clear,
    /// Store a freshly uploaded file at this media-relative path.
    Set(String),
}

impl ImageUpdate {
    /// Bind values for `CASE WHEN $touch THEN $path ELSE column END`.
    #[must_use]
    pub fn binds(&self) -> (bool, Option<&str>) {
        match self {
            Self::Keep => (false, None),
            Self::Clear => (true, None),
            Self::Set(path) => (true, Some(path.as_str())),
        }
    }

    /// Value to insert for a new row.
    #[must_use]
    pub fn initial(&self) -> Option<&str> {
        match self {
            Self::Set(path) => Some(path.as_str()),
            Self::Keep | Self::Clear => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_update_binds() {
        assert_eq!(ImageUpdate::Keep.binds(), (false, None));
        assert_eq!(ImageUpdate::Clear.binds(), (true, None));
        assert_eq!(
            ImageUpdate::Set("product/a.png".to_owned()).binds(),
            (true, Some("product/a.png"))
        );
    }

    #[test]
    fn test_image_update_initial() {
        assert_eq!(ImageUpdate::Clear.initial(), None);
        assert_eq!(
            ImageUpdate::Set("avatar/b.jpg".to_owned()).initial(),
            Some("avatar/b.jpg")
        );
    }
}
