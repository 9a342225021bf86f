//! Core types for the eshop schema.
//!
//! This module provides validated wrappers for the field-level rules shared
//! by the admin panel, the CLI and the database layer.

pub mod bounded;
pub mod email;
pub mod id;
pub mod image;
pub mod money;
pub mod slug;
pub mod status;

pub use bounded::{Quantity, RangeError, Rating};
pub use email::{Email, EmailError};
pub use id::*;
pub use image::{ImageError, ImageFormat, MAX_IMAGE_BYTES, validate_image};
pub use money::{Money, MoneyError};
pub use slug::{Slug, SlugError, slugify};
pub use status::{Gender, PaymentStatus};
