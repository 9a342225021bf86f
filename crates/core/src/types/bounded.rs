//! Small integers with enforced ranges.
//!
//! Review ratings and line-item quantities are stored as `smallint` columns
//! with `CHECK` constraints; these wrappers reject out-of-range values before
//! they reach the database.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A value fell outside the allowed range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Ensure this value is between {min} and {max} (got {value}).")]
pub struct RangeError {
    /// The rejected value.
    pub value: i64,
    /// Inclusive lower bound.
    pub min: i64,
    /// Inclusive upper bound.
    pub max: i64,
}

macro_rules! bounded_i16 {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr, $default:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i16")]
        pub struct $name(i16);

        impl $name {
            /// Smallest accepted value.
            pub const MIN: i16 = $min;
            /// Largest accepted value.
            pub const MAX: i16 = $max;

            /// Validate a value against the allowed range.
            ///
            /// # Errors
            ///
            /// Returns [`RangeError`] if `value` is outside `MIN..=MAX`.
            pub fn new(value: i64) -> Result<Self, RangeError> {
                match i16::try_from(value) {
                    Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
                    _ => Err(RangeError {
                        value,
                        min: i64::from(Self::MIN),
                        max: i64::from(Self::MAX),
                    }),
                }
            }

            /// Get the underlying value.
            #[must_use]
            pub const fn get(self) -> i16 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self($default)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = RangeError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i16 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(Self::new(i64::from(raw))?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

bounded_i16!(
    /// A product review rating, 0 to 5 stars.
    Rating,
    0,
    5,
    0
);

bounded_i16!(
    /// Units of one product in a cart or order line, 1 to 50.
    Quantity,
    1,
    50,
    1
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::new(0).unwrap().get(), 0);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert!(Rating::new(-1).is_err());
        assert!(Rating::new(6).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(Quantity::new(0).is_err());
        assert_eq!(Quantity::new(1).unwrap().get(), 1);
        assert_eq!(Quantity::new(50).unwrap().get(), 50);
        assert!(Quantity::new(51).is_err());
        assert!(Quantity::new(i64::MAX).is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Quantity::default().get(), 1);
        assert_eq!(Rating::default().get(), 0);
    }

    #[test]
    fn test_range_error_message() {
        let err = Quantity::new(99).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ensure this value is between 1 and 50 (got 99)."
        );
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<Rating>("7").is_err());
        let q: Quantity = serde_json::from_str("3").unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "3");
    }
}
