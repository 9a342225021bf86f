//! eshop admin library.
//!
//! An auto-generated administration panel over the storefront schema:
//! every registered model gets list, create, edit and delete screens
//! driven by its [`registry::AdminModel`] description.
//!
//! # Security
//!
//! Only active staff users can log in. User accounts are managed by
//! superusers only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod routes;
pub mod services;
pub mod state;
