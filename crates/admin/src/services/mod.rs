//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password login for staff users
//! - `media` - Storage for uploaded images

pub mod auth;
pub mod media;

pub use auth::{AdminAuthError, AdminAuthService};
pub use media::{MediaError, MediaStore, media_url};
