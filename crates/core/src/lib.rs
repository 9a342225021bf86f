//! eshop core - shared types library.
//!
//! This crate provides the domain types used across the eshop workspace:
//! - `admin` - Auto-generated administration panel over the storefront schema
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! connections, no HTTP. Database encodings for the types are available
//! behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, slugs, bounded ratings and quantities,
//!   money, statuses and image upload validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
