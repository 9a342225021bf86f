//! Enumerated field values with fixed database encodings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Whether an order or payment has been settled.
///
/// Stored as a one-letter code: `P` (paid) or `U` (unpaid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[serde(rename = "P")]
    Paid,
    #[default]
    #[serde(rename = "U")]
    Unpaid,
}

impl PaymentStatus {
    /// All variants, in the order they are offered as choices.
    pub const ALL: [Self; 2] = [Self::Paid, Self::Unpaid];

    /// The stored one-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Paid => "P",
            Self::Unpaid => "U",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(Self::Paid),
            "U" => Ok(Self::Unpaid),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PaymentStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PaymentStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PaymentStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

/// Gender on a user profile, stored as a boolean (`true` = male).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    /// All variants, in the order they are offered as choices.
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    /// Database encoding.
    #[must_use]
    pub const fn as_bool(self) -> bool {
        matches!(self, Self::Male)
    }

    /// Decode from the database encoding.
    #[must_use]
    pub const fn from_bool(male: bool) -> Self {
        if male { Self::Male } else { Self::Female }
    }

    /// Form value used in select inputs.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(format!("invalid gender: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_codes() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.code().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("X".parse::<PaymentStatus>().is_err());
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_payment_status_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Paid).unwrap(), "\"P\"");
    }

    #[test]
    fn test_gender_bool_encoding() {
        assert!(Gender::Male.as_bool());
        assert_eq!(Gender::from_bool(false), Gender::Female);
        assert_eq!(Gender::default(), Gender::Male);
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
    }
}
