//! User repository for database operations.
//!
//! Runtime-checked queries; the schema lives in `crates/admin/migrations/`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use eshop_core::{Email, Gender, UserId};

use super::{RepositoryError, map_write_error};
use crate::models::{PasswordChange, User, UserCredentials, UserInput};

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, is_staff, is_active, \
     is_superuser, avatar, gender, phone_no, address, state, city, pin_code, date_joined, last_login";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    is_staff: bool,
    is_active: bool,
    is_superuser: bool,
    avatar: Option<String>,
    gender: bool,
    phone_no: String,
    address: String,
    state: String,
    city: String,
    pin_code: String,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = if row.email.is_empty() {
            None
        } else {
            Some(Email::parse(&row.email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?)
        };

        Ok(Self {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            is_staff: row.is_staff,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            avatar: row.avatar,
            gender: Gender::from_bool(row.gender),
            phone_no: row.phone_no,
            address: row.address,
            state: row.state,
            city: row.city,
            pin_code: row.pin_code,
            date_joined: row.date_joined,
            last_login: row.last_login,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    id: UserId,
    username: String,
    password_hash: String,
    is_staff: bool,
    is_active: bool,
    is_superuser: bool,
}

impl From<CredentialsRow> for UserCredentials {
    fn from(row: CredentialsRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            is_staff: row.is_staff,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for shop user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop_user ORDER BY username"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look up login credentials by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT id, username, password_hash, is_staff, is_active, is_superuser
            FROM shop_user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if no password hash is supplied.
    /// Returns `RepositoryError::Conflict` if the username is taken.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: &UserInput) -> Result<UserId, RepositoryError> {
        let PasswordChange::Set(password_hash) = &input.password else {
            return Err(RepositoryError::Invalid("password is required".to_owned()));
        };

        let id = sqlx::query_scalar::<_, UserId>(
            r"
            INSERT INTO shop_user (
                username, password_hash, first_name, last_name, email,
                is_staff, is_active, is_superuser, avatar, gender,
                phone_no, address, state, city, pin_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            ",
        )
        .bind(&input.username)
        .bind(password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.email.as_ref().map_or("", Email::as_str))
        .bind(input.is_staff)
        .bind(input.is_active)
        .bind(input.is_superuser)
        .bind(input.avatar.initial())
        .bind(input.gender.as_bool())
        .bind(&input.phone_no)
        .bind(&input.address)
        .bind(&input.state)
        .bind(&input.city)
        .bind(&input.pin_code)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "username already exists"))?;

        Ok(id)
    }

    /// Update a user. A `PasswordChange::Keep` leaves the stored hash alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the new username is taken.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn update(&self, id: UserId, input: &UserInput) -> Result<(), RepositoryError> {
        let new_hash = match &input.password {
            PasswordChange::Keep => None,
            PasswordChange::Set(hash) => Some(hash.as_str()),
        };
        let (touch_avatar, avatar) = input.avatar.binds();

        let result = sqlx::query(
            r"
            UPDATE shop_user SET
                username = $2,
                password_hash = COALESCE($3, password_hash),
                first_name = $4,
                last_name = $5,
                email = $6,
                is_staff = $7,
                is_active = $8,
                is_superuser = $9,
                avatar = CASE WHEN $10 THEN $11 ELSE avatar END,
                gender = $12,
                phone_no = $13,
                address = $14,
                state = $15,
                city = $16,
                pin_code = $17
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.username)
        .bind(new_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.email.as_ref().map_or("", Email::as_str))
        .bind(input.is_staff)
        .bind(input.is_active)
        .bind(input.is_superuser)
        .bind(touch_avatar)
        .bind(avatar)
        .bind(input.gender.as_bool())
        .bind(&input.phone_no)
        .bind(&input.address)
        .bind(&input.state)
        .bind(&input.city)
        .bind(&input.pin_code)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "username already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Record a successful admin login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self))]
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE shop_user SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a user; carts, orders and reviews cascade.
    ///
    /// Returns `false` if no row matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop_user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM shop_user")
            .fetch_one(self.pool)
            .await?)
    }

    /// `(id, label)` pairs for select inputs, labelled by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn choices(&self) -> Result<Vec<(i32, String)>, RepositoryError> {
        Ok(
            sqlx::query_as("SELECT id, username FROM shop_user ORDER BY username")
                .fetch_all(self.pool)
                .await?,
        )
    }
}
