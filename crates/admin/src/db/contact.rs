//! Contact message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use eshop_core::{ContactMessageId, Email};

use super::{RepositoryError, map_write_error};
use crate::models::{ContactMessage, ContactMessageInput};

const CONTACT_COLUMNS: &str =
    "id, first_name, last_name, email, phone, subject, message, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ContactMessageRow {
    id: ContactMessageId,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    subject: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactMessageRow> for ContactMessage {
    type Error = RepositoryError;

    fn try_from(row: ContactMessageRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone: row.phone,
            subject: row.subject,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

/// Repository for `contact_message` rows.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactMessageRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_message ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        id: ContactMessageId,
    ) -> Result<Option<ContactMessage>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactMessageRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_message WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: &ContactMessageInput,
    ) -> Result<ContactMessageId, RepositoryError> {
        sqlx::query_scalar::<_, ContactMessageId>(
            r"
            INSERT INTO contact_message (first_name, last_name, email, phone, subject, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.email.as_str())
        .bind(&input.phone)
        .bind(&input.subject)
        .bind(&input.message)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate message"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ContactMessageId,
        input: &ContactMessageInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE contact_message SET
                first_name = $2, last_name = $3, email = $4, phone = $5,
                subject = $6, message = $7
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.email.as_str())
        .bind(&input.phone)
        .bind(&input.subject)
        .bind(&input.message)
        .execute(self.pool)
        .await
        .map_err(|e| map_write_error(e, "duplicate message"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ContactMessageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM contact_message WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM contact_message")
            .fetch_one(self.pool)
            .await?)
    }
}
