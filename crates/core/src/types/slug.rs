//! URL-safe slugs for catalog entries.
//!
//! Categories, sub-categories and products each carry a slug derived from
//! their name when they are created. The slug never changes afterwards, so
//! links keep working when a product is renamed.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The name has no letters or digits to build a slug from.
    #[error("name must contain at least one letter or digit")]
    Empty,
    /// The slug is longer than the column allows.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The string contains characters outside `[a-z0-9-]` or stray hyphens.
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    Invalid,
}

/// Convert free text into slug form.
///
/// Lower-cases ASCII letters, keeps digits, and collapses every other run of
/// characters into a single hyphen. Leading and trailing hyphens are dropped.
///
/// ```
/// use eshop_core::slugify;
///
/// assert_eq!(slugify("Men's T-Shirts"), "men-s-t-shirts");
/// assert_eq!(slugify("  Summer   Sale 2024!"), "summer-sale-2024");
/// assert_eq!(slugify("***"), "");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|ch| match ch {
            'a'..='z' | '0'..='9' => ch,
            _ => '-',
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// A validated slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Maximum slug length (matches the `varchar(50)` column).
    pub const MAX_LENGTH: usize = 50;

    /// Derive a slug from a display name.
    ///
    /// Names longer than [`Self::MAX_LENGTH`] once slugified are cut at the
    /// last hyphen that fits, or hard-truncated when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the name has no letters or digits.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut slug = slugify(name);
        if slug.is_empty() {
            return Err(SlugError::Empty);
        }

        if slug.len() > Self::MAX_LENGTH {
            // slugify only yields ASCII, so byte offsets are char offsets
            let at_boundary = slug.as_bytes().get(Self::MAX_LENGTH) == Some(&b'-');
            slug.truncate(Self::MAX_LENGTH);
            if !at_boundary && let Some(cut) = slug.rfind('-') {
                slug.truncate(cut);
            }
        }

        Ok(Self(slug))
    }

    /// Parse an existing slug, e.g. from a URL path segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, too long, or not already in
    /// canonical slug form.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if slugify(s) != s {
            return Err(SlugError::Invalid);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Slug::from_name("Running Shoes").unwrap().as_str(), "running-shoes");
        assert_eq!(Slug::from_name("Kids' Wear & More").unwrap().as_str(), "kids-wear-more");
    }

    #[test]
    fn test_non_ascii_letters_become_separators() {
        assert_eq!(slugify("Café Crème"), "caf-cr-me");
    }

    #[test]
    fn test_from_name_empty() {
        assert_eq!(Slug::from_name(" -- "), Err(SlugError::Empty));
    }

    #[test]
    fn test_from_name_truncates_at_word_boundary() {
        let name = "extra comfortable organic cotton crew neck t shirt with pocket";
        let slug = Slug::from_name(name).unwrap();
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
        assert!(name.replace(' ', "-").starts_with(slug.as_str()));
    }

    #[test]
    fn test_parse() {
        assert!(Slug::parse("t-shirts").is_ok());
        assert_eq!(Slug::parse("T-Shirts"), Err(SlugError::Invalid));
        assert_eq!(Slug::parse("double--hyphen"), Err(SlugError::Invalid));
        assert_eq!(Slug::parse("-leading"), Err(SlugError::Invalid));
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_serde_rejects_invalid() {
        assert!(serde_json::from_str::<Slug>("\"Not A Slug\"").is_err());
        let slug: Slug = serde_json::from_str("\"shoes\"").unwrap();
        assert_eq!(slug.to_string(), "shoes");
    }
}
