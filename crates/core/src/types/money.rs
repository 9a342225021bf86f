//! Monetary amounts stored as `numeric(8, 2)`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bounded::Quantity;

/// Errors that can occur when building a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("Enter a number.")]
    NotANumber,
    /// The amount is below zero.
    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,
    /// More than two digits after the decimal point.
    #[error("Ensure that there are no more than {0} decimal places.")]
    TooManyDecimalPlaces(u32),
    /// More digits than the column can hold.
    #[error("Ensure that there are no more than {0} digits in total.")]
    TooManyDigits(u32),
}

/// A non-negative amount with at most two decimal places and eight digits.
///
/// ```
/// use eshop_core::{Money, Quantity};
///
/// let price: Money = "19.99".parse().unwrap();
/// let total = price.times(Quantity::new(3).unwrap()).unwrap();
/// assert_eq!(total.to_string(), "59.97");
///
/// assert!("1.999".parse::<Money>().is_err());
/// assert!("1000000".parse::<Money>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Digits after the decimal point.
    pub const DECIMAL_PLACES: u32 = 2;
    /// Total digits allowed (`numeric(8, 2)`).
    pub const MAX_DIGITS: u32 = 8;
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two decimal
    /// places, or does not fit in eight digits.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }

        let amount = amount.normalize();
        if amount.scale() > Self::DECIMAL_PLACES {
            return Err(MoneyError::TooManyDecimalPlaces(Self::DECIMAL_PLACES));
        }

        let limit = Decimal::from(10_i64.pow(Self::MAX_DIGITS - Self::DECIMAL_PLACES));
        if amount >= limit {
            return Err(MoneyError::TooManyDigits(Self::MAX_DIGITS));
        }

        let mut amount = amount.abs();
        amount.rescale(Self::DECIMAL_PLACES);
        Ok(Self(amount))
    }

    /// Line total for `quantity` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::TooManyDigits`] if the product overflows the
    /// column.
    pub fn times(self, quantity: Quantity) -> Result<Self, MoneyError> {
        Self::new(self.0 * Decimal::from(quantity.get()))
    }

    /// Get the underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| MoneyError::NotANumber)?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("19.99".parse::<Money>().unwrap().to_string(), "19.99");
        assert_eq!("5".parse::<Money>().unwrap().to_string(), "5.00");
        assert_eq!(" 0.5 ".parse::<Money>().unwrap().to_string(), "0.50");
        assert_eq!("2.500".parse::<Money>().unwrap().to_string(), "2.50");
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!("abc".parse::<Money>(), Err(MoneyError::NotANumber));
        assert_eq!("-1".parse::<Money>(), Err(MoneyError::Negative));
        assert_eq!(
            "0.001".parse::<Money>(),
            Err(MoneyError::TooManyDecimalPlaces(2))
        );
        assert_eq!("1000000".parse::<Money>(), Err(MoneyError::TooManyDigits(8)));
        assert!("999999.99".parse::<Money>().is_ok());
    }

    #[test]
    fn test_times() {
        let price: Money = "19.99".parse().unwrap();
        assert_eq!(
            price.times(Quantity::new(50).unwrap()).unwrap().to_string(),
            "999.50"
        );

        let expensive: Money = "999999.99".parse().unwrap();
        assert!(expensive.times(Quantity::new(2).unwrap()).is_err());
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Money::default(), Money::ZERO);
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }
}
