//! Contact form submissions.

use sqlx::PgPool;

use eshop_core::ContactMessageId;

use super::form::{FieldErrors, FieldSpec, FormData, FormMode, FormReader, FormValues};
use super::{AdminModel, ModelMeta};
use crate::db::{ContactRepository, RepositoryError};
use crate::models::{ContactMessage, ContactMessageInput};

const NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 70;
const PHONE_MAX: usize = 12;
const SUBJECT_MAX: usize = 80;
const MESSAGE_MAX: usize = 300;

pub struct ContactUsAdmin;

impl AdminModel for ContactUsAdmin {
    type Record = ContactMessage;
    type Input = ContactMessageInput;

    const META: ModelMeta = ModelMeta {
        path: "contactus",
        verbose_name: "Contact Us",
        verbose_name_plural: "Contact Us",
    };
    const COLUMNS: &'static [&'static str] = &["Message Title", "Name", "Email", "Received"];

    fn record_id(record: &ContactMessage) -> i32 {
        record.id.as_i32()
    }

    fn row(record: &ContactMessage) -> Vec<String> {
        vec![
            record.subject.clone(),
            format!("{} {}", record.first_name, record.last_name),
            record.email.as_str().to_owned(),
            record.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }

    fn initial(record: &ContactMessage) -> FormValues {
        FormValues::new()
            .with("first_name", &record.first_name)
            .with("last_name", &record.last_name)
            .with("email", record.email.as_str())
            .with("phone", &record.phone)
            .with("subject", &record.subject)
            .with("message", &record.message)
    }

    fn parse(form: &FormData, _mode: FormMode) -> Result<ContactMessageInput, FieldErrors> {
        let mut reader = FormReader::new(form);
        let first_name = reader.text("first_name", NAME_MAX);
        let last_name = reader.text("last_name", NAME_MAX);
        let email = reader.email("email", EMAIL_MAX);
        let phone = reader.text("phone", PHONE_MAX);
        let subject = reader.text("subject", SUBJECT_MAX);
        let message = reader.text("message", MESSAGE_MAX);
        reader.finish()?;

        // A failed email read always leaves an error behind.
        let Some(email) = email else {
            return Err(FieldErrors::single("email", super::form::REQUIRED));
        };

        Ok(ContactMessageInput {
            first_name,
            last_name,
            email,
            phone,
            subject,
            message,
        })
    }

    async fn fields(_pool: &PgPool, _mode: FormMode) -> Result<Vec<FieldSpec>, RepositoryError> {
        Ok(vec![
            FieldSpec::text("first_name", "First Name", NAME_MAX),
            FieldSpec::text("last_name", "Last Name", NAME_MAX),
            FieldSpec::email("email", "Email", EMAIL_MAX),
            FieldSpec::text("phone", "Contact No.", PHONE_MAX),
            FieldSpec::text("subject", "Message Title", SUBJECT_MAX),
            FieldSpec::textarea("message", "Message", MESSAGE_MAX),
        ])
    }

    async fn list(pool: &PgPool) -> Result<Vec<ContactMessage>, RepositoryError> {
        ContactRepository::new(pool).list().await
    }

    async fn get(pool: &PgPool, id: i32) -> Result<Option<ContactMessage>, RepositoryError> {
        ContactRepository::new(pool)
            .get(ContactMessageId::new(id))
            .await
    }

    async fn create(pool: &PgPool, input: &ContactMessageInput) -> Result<i32, RepositoryError> {
        Ok(ContactRepository::new(pool).create(input).await?.as_i32())
    }

    async fn update(
        pool: &PgPool,
        id: i32,
        input: &ContactMessageInput,
    ) -> Result<(), RepositoryError> {
        ContactRepository::new(pool)
            .update(ContactMessageId::new(id), input)
            .await
    }

    async fn delete(pool: &PgPool, id: i32) -> Result<bool, RepositoryError> {
        ContactRepository::new(pool)
            .delete(ContactMessageId::new(id))
            .await
    }

    async fn count(pool: &PgPool) -> Result<i64, RepositoryError> {
        ContactRepository::new(pool).count().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(email: &str, subject: &str) -> FormData {
        FormData::from_pairs(&[
            ("first_name", "Ravi"),
            ("last_name", "Kumar"),
            ("email", email),
            ("phone", "9876543210"),
            ("subject", subject),
            ("message", "Where is my order?"),
        ])
    }

    #[test]
    fn test_parse_valid_message() {
        let input = ContactUsAdmin::parse(&form("ravi@example.com", "Order"), FormMode::Create)
            .unwrap();
        assert_eq!(input.email.as_str(), "ravi@example.com");
    }

    #[test]
    fn test_email_limits() {
        let long = format!("{}@example.com", "a".repeat(60));
        let errors = ContactUsAdmin::parse(&form(&long, "Order"), FormMode::Create).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["email"]);

        let errors = ContactUsAdmin::parse(&form("", "Order"), FormMode::Create).unwrap_err();
        assert_eq!(errors.get("email"), [crate::registry::form::REQUIRED]);
    }

    #[test]
    fn test_subject_limit() {
        let subject = "s".repeat(81);
        let errors = ContactUsAdmin::parse(&form("ravi@example.com", &subject), FormMode::Create)
            .unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["subject"]);
    }
}
