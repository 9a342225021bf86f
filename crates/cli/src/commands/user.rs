//! User account commands.
//!
//! ```bash
//! eshop-cli user create-superuser -u admin -e admin@example.com -p 'long passphrase'
//! ```

use eshop_admin::db::UserRepository;
use eshop_admin::models::{ImageUpdate, PasswordChange, UserInput};
use eshop_admin::services::auth::{hash_password, validate_password};
use eshop_core::{Email, Gender, UserId};

use super::{CommandError, connect};

const USERNAME_MAX: usize = 150;

/// Validate the arguments and build the account row.
///
/// The account is active staff with superuser rights; contact fields are
/// left blank for the user to fill in from the panel.
fn superuser_input(username: &str, email: &str, password: &str) -> Result<UserInput, CommandError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > USERNAME_MAX {
        return Err(CommandError::InvalidArgument(
            "username",
            format!("must be 1 to {USERNAME_MAX} characters"),
        ));
    }

    let email =
        Email::parse(email).map_err(|e| CommandError::InvalidArgument("email", e.to_string()))?;

    validate_password(password).map_err(|e| CommandError::InvalidArgument("password", e.to_string()))?;
    let password_hash =
        hash_password(password).map_err(|e| CommandError::InvalidArgument("password", e.to_string()))?;

    Ok(UserInput {
        username: username.to_owned(),
        password: PasswordChange::Set(password_hash),
        first_name: String::new(),
        last_name: String::new(),
        email: Some(email),
        is_staff: true,
        is_active: true,
        is_superuser: true,
        avatar: ImageUpdate::Keep,
        gender: Gender::default(),
        phone_no: String::new(),
        address: String::new(),
        state: String::new(),
        city: String::new(),
        pin_code: String::new(),
    })
}

/// Create a staff superuser.
pub async fn create_superuser(
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserId, CommandError> {
    let input = superuser_input(username, email, password)?;
    let pool = connect().await?;

    tracing::info!(username = %input.username, "Creating superuser");
    let id = UserRepository::new(&pool).create(&input).await?;

    tracing::info!(%id, "Superuser created successfully!");
    Ok(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eshop_admin::services::auth::verify_password;

    use super::*;

    #[test]
    fn test_superuser_input_flags_and_hash() {
        let input = superuser_input(" admin ", "Admin@Shop.test", "long passphrase").unwrap();
        assert_eq!(input.username, "admin");
        assert!(input.is_staff && input.is_active && input.is_superuser);
        assert_eq!(input.email.as_ref().map(Email::as_str), Some("Admin@shop.test"));

        let PasswordChange::Set(hash) = &input.password else {
            panic!("expected a password hash");
        };
        assert!(verify_password("long passphrase", hash).is_ok());
    }

    #[test]
    fn test_superuser_input_rejects_bad_arguments() {
        assert!(matches!(
            superuser_input("  ", "a@shop.test", "long passphrase"),
            Err(CommandError::InvalidArgument("username", _))
        ));
        assert!(matches!(
            superuser_input("admin", "not-an-email", "long passphrase"),
            Err(CommandError::InvalidArgument("email", _))
        ));
        assert!(matches!(
            superuser_input("admin", "a@shop.test", "short"),
            Err(CommandError::InvalidArgument("password", _))
        ));
    }
}
