//! Catalog domain types: categories, products, sizes and reviews.

use core::fmt;

use chrono::NaiveDate;

use eshop_core::{
    CategoryId, Money, ProductId, ProductImageId, Rating, ReviewId, SizeId, SizeProductMapId,
    Slug, SubCategoryId, UserId,
};

use super::ImageUpdate;

/// Top-level product grouping.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub image: Option<String>,
    pub slug: Slug,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Form input for a category. The slug is derived from `name` on create.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub image: ImageUpdate,
}

/// Second-level grouping inside a category.
#[derive(Debug, Clone)]
pub struct SubCategory {
    pub id: SubCategoryId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub name: String,
    pub image: Option<String>,
    pub slug: Slug,
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SubCategoryInput {
    pub category_id: CategoryId,
    pub name: String,
    pub image: ImageUpdate,
}

/// A sellable product.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub sub_category_id: SubCategoryId,
    pub sub_category_name: String,
    pub name: String,
    pub description: String,
    /// Price per piece.
    pub price: Money,
    pub image: Option<String>,
    /// Quantity on hand.
    pub quantity_on_hand: i32,
    pub slug: Slug,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ProductInput {
    pub sub_category_id: SubCategoryId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: ImageUpdate,
    pub quantity_on_hand: i32,
}

/// Extra gallery image for a product.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub product_name: String,
    pub image: Option<String>,
}

impl fmt::Display for ProductImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.product_name)
    }
}

#[derive(Debug, Clone)]
pub struct ProductImageInput {
    pub product_id: ProductId,
    pub image: ImageUpdate,
}

/// A size label such as "M" or "XL".
#[derive(Debug, Clone)]
pub struct Size {
    pub id: SizeId,
    pub label: String,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone)]
pub struct SizeInput {
    pub label: String,
}

/// A size offered for a product.
#[derive(Debug, Clone)]
pub struct SizeProductMap {
    pub id: SizeProductMapId,
    pub product_id: ProductId,
    pub product_name: String,
    pub size_id: SizeId,
    pub size_label: String,
}

impl fmt::Display for SizeProductMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} size", self.product_name, self.size_label)
    }
}

#[derive(Debug, Clone)]
pub struct SizeProductMapInput {
    pub product_id: ProductId,
    pub size_id: SizeId,
}

/// A customer review of a product.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub product_name: String,
    pub user_id: UserId,
    /// Reviewer's first and last name.
    pub user_display_name: String,
    pub rating: Rating,
    pub review: Option<String>,
    /// Set when the review is created.
    pub date: NaiveDate,
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "For {} By {} on {}",
            self.product_name, self.user_display_name, self.date
        )
    }
}

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: Rating,
    pub review: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_size_product_map_display() {
        let map = SizeProductMap {
            id: SizeProductMapId::new(1),
            product_id: ProductId::new(2),
            product_name: "Linen Shirt".to_owned(),
            size_id: SizeId::new(3),
            size_label: "M".to_owned(),
        };
        assert_eq!(map.to_string(), "Linen Shirt in M size");
    }

    #[test]
    fn test_review_display() {
        let review = Review {
            id: ReviewId::new(1),
            product_id: ProductId::new(2),
            product_name: "Linen Shirt".to_owned(),
            user_id: UserId::new(3),
            user_display_name: "Ada Lovelace".to_owned(),
            rating: Rating::new(4).unwrap(),
            review: None,
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        };
        assert_eq!(
            review.to_string(),
            "For Linen Shirt By Ada Lovelace on 2026-10-16"
        );
    }
}
