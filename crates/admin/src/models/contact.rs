//! Contact form submissions.

use core::fmt;

use chrono::{DateTime, Utc};

use eshop_core::{ContactMessageId, Email};

/// A message sent through the contact form.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    /// Message title.
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for ContactMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} {}", self.subject, self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct ContactMessageInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_subject_and_sender() {
        let message = ContactMessage {
            id: ContactMessageId::new(1),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: Email::parse("ada@shop.test").unwrap(),
            phone: "9876543210".to_owned(),
            subject: "Late delivery".to_owned(),
            message: "Where is my order?".to_owned(),
            created_at: Utc::now(),
        };
        assert_eq!(message.to_string(), "Late delivery from Ada Lovelace");
    }
}
