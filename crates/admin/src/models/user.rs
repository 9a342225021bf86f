//! Shop user domain types.

use core::fmt;

use chrono::{DateTime, Utc};

use eshop_core::{Email, Gender, UserId};

use super::ImageUpdate;

/// A shop account (domain type).
///
/// The password hash is deliberately absent; see [`UserCredentials`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<Email>,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    /// Media-relative path of the avatar image.
    pub avatar: Option<String>,
    pub gender: Gender,
    pub phone_no: String,
    pub address: String,
    pub state: String,
    pub city: String,
    pub pin_code: String,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// First and last name joined by a space.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Join first and last name the way user references are displayed.
#[must_use]
pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

/// Fields needed to authenticate a login attempt.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl UserCredentials {
    /// Only active staff accounts may use the admin panel.
    #[must_use]
    pub const fn can_access_admin(&self) -> bool {
        self.is_staff && self.is_active
    }
}

/// Password handling on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordChange {
    /// Keep the stored hash (blank password on edit).
    Keep,
    /// Replace with this argon2 PHC string.
    Set(String),
}

/// Validated form input for creating or updating a user.
#[derive(Debug, Clone)]
pub struct UserInput {
    pub username: String,
    pub password: PasswordChange,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<Email>,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
    pub avatar: ImageUpdate,
    pub gender: Gender,
    pub phone_no: String,
    pub address: String,
    pub state: String,
    pub city: String,
    pub pin_code: String,
}
