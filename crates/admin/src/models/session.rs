//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state and one-shot
//! messages shown after a redirect.

use serde::{Deserialize, Serialize};

use eshop_core::UserId;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in staff user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// User's database ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Whether the user may manage other accounts.
    pub is_superuser: bool,
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    /// CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
    /// Key for pending flash messages.
    pub const FLASH: &str = "flash";
}
