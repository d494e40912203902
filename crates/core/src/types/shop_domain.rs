//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty (after trimming).
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot appear in a hostname.
    #[error("shop domain contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The input has no dot-separated labels.
    #[error("shop domain must contain at least one dot")]
    MissingDot,
    /// One of the dot-separated labels is empty or starts/ends with a hyphen.
    #[error("shop domain has a malformed label")]
    MalformedLabel,
}

/// The external platform domain that identifies a merchant's storefront.
///
/// Domains are the stable key for a [`Shop`](crate::ShopId) row. Parsing trims
/// surrounding whitespace and lowercases the input so that
/// `My-Store.myshopify.com` and `my-store.myshopify.com` name the same shop.
///
/// ## Constraints
///
/// - Length: 1-255 characters
/// - ASCII letters, digits, `-` and `.` only
/// - At least two labels; no empty labels, no label starting or ending with `-`
///
/// ## Examples
///
/// ```
/// use checkout_upsell_core::ShopDomain;
///
/// assert!(ShopDomain::parse("my-store.myshopify.com").is_ok());
/// assert_eq!(
///     ShopDomain::parse(" My-Store.MyShopify.com ").unwrap().as_str(),
///     "my-store.myshopify.com"
/// );
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("localhost").is_err());
/// assert!(ShopDomain::parse("https://my-store.myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum length of a hostname.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty or longer than 255 characters
    /// - Contains characters other than ASCII alphanumerics, `-` and `.`
    /// - Has fewer than two labels or a malformed label
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(ShopDomainError::InvalidCharacter(c));
        }

        if !trimmed.contains('.') {
            return Err(ShopDomainError::MissingDot);
        }

        let malformed = trimmed
            .split('.')
            .any(|label| label.is_empty() || label.starts_with('-') || label.ends_with('-'));
        if malformed {
            return Err(ShopDomainError::MalformedLabel);
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ShopDomain` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(domain: ShopDomain) -> Self {
        domain.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShopDomain {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShopDomain {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShopDomain {
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
    fn test_parse_valid_domains() {
        assert!(ShopDomain::parse("my-store.myshopify.com").is_ok());
        assert!(ShopDomain::parse("shop.example.co.uk").is_ok());
        assert!(ShopDomain::parse("a.b").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let domain = ShopDomain::parse("  Store-1.MyShopify.COM\n").unwrap();
        assert_eq!(domain.as_str(), "store-1.myshopify.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ShopDomain::parse(""), Err(ShopDomainError::Empty));
        assert_eq!(ShopDomain::parse("   "), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_parse_rejects_urls() {
        assert_eq!(
            ShopDomain::parse("https://store.myshopify.com"),
            Err(ShopDomainError::InvalidCharacter(':'))
        );
        assert_eq!(
            ShopDomain::parse("store.myshopify.com/admin"),
            Err(ShopDomainError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_parse_requires_dot() {
        assert_eq!(
            ShopDomain::parse("localhost"),
            Err(ShopDomainError::MissingDot)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_labels() {
        assert_eq!(
            ShopDomain::parse("store..myshopify.com"),
            Err(ShopDomainError::MalformedLabel)
        );
        assert_eq!(
            ShopDomain::parse("-store.myshopify.com"),
            Err(ShopDomainError::MalformedLabel)
        );
        assert_eq!(
            ShopDomain::parse("store.myshopify.com."),
            Err(ShopDomainError::MalformedLabel)
        );
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}.com", "a".repeat(ShopDomain::MAX_LENGTH));
        assert!(matches!(
            ShopDomain::parse(&long),
            Err(ShopDomainError::TooLong { .. })
        ));
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let domain: ShopDomain = serde_json::from_str("\"Shop.MyShopify.com\"").unwrap();
        assert_eq!(domain.as_str(), "shop.myshopify.com");
        assert_eq!(
            serde_json::to_string(&domain).unwrap(),
            "\"shop.myshopify.com\""
        );
        assert!(serde_json::from_str::<ShopDomain>("\"not a domain\"").is_err());
    }
}
