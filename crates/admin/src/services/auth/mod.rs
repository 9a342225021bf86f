//! Password authentication for staff users.
//!
//! Passwords are stored as Argon2id PHC strings in `shop_user.password_hash`.

mod error;

pub use error::AdminAuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use crate::db::UserRepository;
use crate::models::{CurrentAdmin, UserCredentials};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash checked when the username is unknown, so both failures cost one
/// Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-user-placeholder").ok());

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Check a username/password pair and record the login.
    ///
    /// A wrong password and an unknown username produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the pair does not match.
    /// Returns `AdminAuthError::NotStaff` if the account is inactive or not staff.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentAdmin, AdminAuthError> {
        let credentials = self.users.get_credentials(username.trim()).await?;
        let credentials = check_password(credentials, password)?;

        if !credentials.can_access_admin() {
            return Err(AdminAuthError::NotStaff);
        }

        self.users.touch_last_login(credentials.id).await?;

        Ok(CurrentAdmin {
            id: credentials.id,
            username: credentials.username,
            is_superuser: credentials.is_superuser,
        })
    }
}

/// Verify `password` for a looked-up account. An unknown account still runs
/// a verification against [`DUMMY_HASH`] before failing.
fn check_password(
    credentials: Option<UserCredentials>,
    password: &str,
) -> Result<UserCredentials, AdminAuthError> {
    match credentials {
        Some(credentials) => {
            verify_password(password, &credentials.password_hash)?;
            Ok(credentials)
        }
        None => {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            Err(AdminAuthError::InvalidCredentials)
        }
    }
}

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AdminAuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AdminAuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminAuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AdminAuthError::InvalidCredentials` if the password does not match
/// or the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}
