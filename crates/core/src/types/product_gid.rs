//! Canonical product references.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A product reference in the platform's global-ID format
/// (`gid://shopify/Product/<id>`).
///
/// Upsell selections may be stored either as bare numeric IDs or as full
/// global IDs; [`ProductGid::normalize`] maps both to the canonical form used
/// by the Storefront API `nodes` lookup.
///
/// ```
/// use checkout_upsell_core::ProductGid;
///
/// assert_eq!(ProductGid::normalize("123").as_str(), "gid://shopify/Product/123");
/// assert_eq!(
///     ProductGid::normalize("gid://shopify/Product/123").as_str(),
///     "gid://shopify/Product/123"
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductGid(String);

impl ProductGid {
    /// Scheme prefix for product global IDs.
    pub const PREFIX: &'static str = "gid://shopify/Product/";

    /// Normalize a stored identifier into the canonical global-ID format.
    ///
    /// Surrounding whitespace is trimmed; the prefix is added only when it is
    /// not already present.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with(Self::PREFIX) {
            Self(trimmed.to_owned())
        } else {
            Self(format!("{}{trimmed}", Self::PREFIX))
        }
    }

    /// Returns the global ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing resource ID (the part after the prefix).
    #[must_use]
    pub fn resource_id(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// Consumes the `ProductGid` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProductGid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_id() {
        let gid = ProductGid::normalize("8812345");
        assert_eq!(gid.as_str(), "gid://shopify/Product/8812345");
        assert_eq!(gid.resource_id(), "8812345");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = ProductGid::normalize("42");
        let twice = ProductGid::normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            ProductGid::normalize(" gid://shopify/Product/7 ").as_str(),
            "gid://shopify/Product/7"
        );
    }
}
