//! Shop accounts.

use sqlx::PgPool;

use eshop_core::{Gender, UserId};

use super::form::{
    Choice, FieldErrors, FieldSpec, FormData, FormMode, FormReader, FormValues, REQUIRED,
};
use super::{AdminModel, ImageField, ModelMeta};
use crate::db::{RepositoryError, UserRepository};
use crate::models::{PasswordChange, User, UserInput};
use crate::services::AdminAuthError;
use crate::services::auth::{hash_password, validate_password};

const USERNAME_MAX: usize = 150;
const NAME_MAX: usize = 150;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 12;
const ADDRESS_MAX: usize = 350;
const REGION_MAX: usize = 50;
const PIN_CODE_MAX: usize = 8;

/// Accounts, including staff logins. Restricted to superusers since the
/// form can grant admin access.
pub struct UserAdmin;

impl UserAdmin {
    fn password(reader: &mut FormReader<'_>, mode: FormMode) -> PasswordChange {
        let Some(raw) = reader.password("password") else {
            if mode == FormMode::Create {
                reader.error("password", REQUIRED);
            }
            return PasswordChange::Keep;
        };

        match validate_password(&raw).and_then(|()| hash_password(&raw)) {
            Ok(hash) => PasswordChange::Set(hash),
            Err(AdminAuthError::WeakPassword(message)) => {
                reader.error("password", message);
                PasswordChange::Keep
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to hash password");
                reader.error("password", "The password could not be saved.");
                PasswordChange::Keep
            }
        }
    }
}

impl AdminModel for UserAdmin {
    type Record = User;
    type Input = UserInput;

    const META: ModelMeta = ModelMeta {
        path: "user",
        verbose_name: "User",
        verbose_name_plural: "Users",
    };
    const COLUMNS: &'static [&'static str] = &[
        "Username",
        "Name",
        "Email",
        "Staff",
        "Active",
        "Last Login",
    ];
    const IMAGE_FIELDS: &'static [ImageField] = &[ImageField {
        name: "avatar",
        upload_to: "avatar",
    }];
    const SUPERUSER_ONLY: bool = true;
    const ACCOUNTS: bool = true;
    const CONFLICT_FIELD: &'static str = "username";
    const CONFLICT_MESSAGE: &'static str = "A user with that username already exists.";

    fn record_id(record: &User) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &User) -> Vec<String> {
        let yes_no = |b: bool| if b { "Yes" } else { "No" }.to_owned();
        vec![
            record.username.clone(),
            record.display_name(),
            record
                .email
                .as_ref()
                .map(|e| e.as_str().to_owned())
                .unwrap_or_default(),
            yes_no(record.is_staff),
            yes_no(record.is_active),
            record
                .last_login
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "Never".to_owned()),
        ]
    }

    fn initial(record: &User) -> FormValues {
        FormValues::new()
            .with("username", &record.username)
            .with("first_name", &record.first_name)
            .with("last_name", &record.last_name)
            .with_optional("email", record.email.as_ref().map(|e| e.as_str()))
            .with_flag("is_staff", record.is_staff)
            .with_flag("is_active", record.is_active)
            .with_flag("is_superuser", record.is_superuser)
            .with_image("avatar", record.avatar.as_deref())
            .with("gender", record.gender.code())
            .with("phone_no", &record.phone_no)
            .with("address", &record.address)
            .with("state", &record.state)
            .with("city", &record.city)
            .with("pin_code", &record.pin_code)
    }

    fn defaults() -> FormValues {
        FormValues::new()
            .with_flag("is_active", true)
            .with("gender", Gender::default().code())
    }

    fn parse(form: &FormData, mode: FormMode) -> Result<UserInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let username = reader.text("username", USERNAME_MAX);
        let password = Self::password(&mut reader, mode);
        let first_name = reader.blank_text("first_name", NAME_MAX);
        let last_name = reader.blank_text("last_name", NAME_MAX);
        let email = reader.optional_email("email", EMAIL_MAX);
        let is_staff = reader.checkbox("is_staff");
        let is_active = reader.checkbox("is_active");
        let is_superuser = reader.checkbox("is_superuser");
        let avatar = reader.image("avatar");
        let gender: Gender = reader.choice("gender");
        let phone_no = reader.text("phone_no", PHONE_MAX);
        let address = reader.text("address", ADDRESS_MAX);
        let state = reader.text("state", REGION_MAX);
        let city = reader.text("city", REGION_MAX);
        let pin_code = reader.text("pin_code", PIN_CODE_MAX);
        reader.finish()?;

        Ok(UserInput {
            username,
            password,
            first_name,
            last_name,
            email,
            is_staff,
            is_active,
            is_superuser,
            avatar,
            gender,
            phone_no,
            address,
            state,
            city,
            pin_code,
        })
    }

    async fn fields(_pool: &PgPool, mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        let password = match mode {
            FormMode::Create => FieldSpec::password("password", "Password"),
            FormMode::Edit => FieldSpec::password("password", "Password")
                .optional()
                .help("Leave blank to keep the current password."),
        };
        let genders = Gender::ALL
            .iter()
            .map(|g| Choice::new(g.code(), g.label()))
            .collect();

        Ok(vec![
            FieldSpec::text("username", "Username", USERNAME_MAX),
            password,
            FieldSpec::text("first_name", "First name", NAME_MAX).optional(),
            FieldSpec::text("last_name", "Last name", NAME_MAX).optional(),
            FieldSpec::email("email", "Email address", EMAIL_MAX).optional(),
            FieldSpec::checkbox("is_staff", "Staff status")
                .help("Designates whether the user can log into this admin site."),
            FieldSpec::checkbox("is_active", "Active"),
            FieldSpec::checkbox("is_superuser", "Superuser status"),
            FieldSpec::image("avatar", "User Avatar"),
            FieldSpec::select("gender", "Gender", genders),
            FieldSpec::text("phone_no", "Contact No.", PHONE_MAX),
            FieldSpec::textarea("address", "Address", ADDRESS_MAX),
            FieldSpec::text("state", "State", REGION_MAX),
            FieldSpec::text("city", "City", REGION_MAX),
            FieldSpec::text("pin_code", "Zip Code", PIN_CODE_MAX),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<User>, RepositoryError> {
        UserRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(pool).get(UserId::new(id)).await
    }

    async fn create(pool: &PgPool, input: &UserInput) -> Result<i32, RepositoryError> {
        Ok(UserRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(pool: &PgPool, id: i32, input: &UserInput) -> Result<(), RepositoryError> {
        UserRepository::new(pool).update(UserId::new(id), input).await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        UserRepository::new(pool).delete(UserId::new(id)).await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        UserRepository::new(pool).count().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::services::auth::verify_password;

    use super::*;

    fn user_form(password: &str) -> FormData {
        FormData::from_pairs(&[
            ("username", "asha"),
            ("password", password),
            ("email", ""),
            ("is_staff", "on"),
            ("gender", "female"),
            ("phone_no", "9876543210"),
            ("address", "12 Lake Road"),
            ("state", "Kerala"),
            ("city", "Kochi"),
            ("pin_code", "682001"),
        ])
    }

    #[test]
    fn test_create_hashes_password() {
        let input = UserAdmin::parse(&user_form("correct horse"), FormMode::Create).unwrap();
        let PasswordChange::Set(hash) = &input.password else {
            panic!("password should be set");
        };
        assert!(verify_password("correct horse", hash).is_ok());
        assert!(input.is_staff);
        assert!(!input.is_active);
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.email, None);
    }

    #[test]
    fn test_create_requires_password() {
        let errors = UserAdmin::parse(&user_form(""), FormMode::Create).unwrap_err();
        assert_eq!(errors.get("password"), [REQUIRED]);
    }

    #[test]
    fn test_edit_blank_password_keeps_hash() {
        let input = UserAdmin::parse(&user_form(""), FormMode::Edit).unwrap();
        assert_eq!(input.password, PasswordChange::Keep);
    }

    #[test]
    fn test_short_password_rejected() {
        let errors = UserAdmin::parse(&user_form("short"), FormMode::Edit).unwrap_err();
        assert_eq!(
            errors.get("password"),
            ["password must be at least 8 characters"]
        );
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut pairs = vec![
            ("username", "asha"),
            ("gender", "male"),
            ("phone_no", "1"),
            ("address", "a"),
            ("state", "s"),
            ("city", "c"),
            ("pin_code", "1"),
        ];
        pairs.push(("email", "not-an-email"));
        let errors = UserAdmin::parse(&FormData::from_pairs(&pairs), FormMode::Edit).unwrap_err();
        assert_eq!(errors.get("email"), ["Enter a valid email address."]);
    }

    #[test]
    fn test_create_form_defaults() {
        let values = UserAdmin::defaults();
        assert_eq!(values.get("is_active"), "on");
        assert_eq!(values.get("gender"), "male");
    }
}
