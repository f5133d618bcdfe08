//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input contains characters that cannot appear in a hostname.
    #[error("shop domain contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The domain is not a Shopify-hosted store domain.
    #[error("shop domain must end with .myshopify.com or .myshopify.io")]
    InvalidSuffix,
    /// The store handle before the suffix is empty.
    #[error("shop domain is missing the store handle")]
    MissingHandle,
}

/// A Shopify store domain such as `world-seasonings.myshopify.com`.
///
/// ## Constraints
///
/// - Must end with `.myshopify.com` or `.myshopify.io`
/// - Only ASCII letters, digits, `-` and `.` are allowed
/// - Normalized to lowercase; a leading `https://` / `http://` and a
///   trailing `/` are stripped
///
/// ## Examples
///
/// ```
/// use agent_helper_core::ShopDomain;
///
/// let shop = ShopDomain::parse("https://World-Seasonings.myshopify.com/").unwrap();
/// assert_eq!(shop.as_str(), "world-seasonings.myshopify.com");
/// assert_eq!(shop.handle(), "world-seasonings");
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("example.com").is_err());
/// assert!(ShopDomain::parse("evil.com/.myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Accepted hosted-store suffixes.
    pub const SUFFIXES: [&'static str; 2] = [".myshopify.com", ".myshopify.io"];

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other than
    /// ASCII alphanumerics, `-` and `.`, or is not a `myshopify` domain.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let trimmed = trimmed.trim_end_matches('/');

        if trimmed.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if let Some(c) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(ShopDomainError::InvalidCharacter(c));
        }

        let lower = trimmed.to_ascii_lowercase();
        let suffix = Self::SUFFIXES
            .iter()
            .find(|suffix| lower.ends_with(*suffix))
            .ok_or(ShopDomainError::InvalidSuffix)?;

        if lower.len() == suffix.len() {
            return Err(ShopDomainError::MissingHandle);
        }

        Ok(Self(lower))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the store handle (the part before `.myshopify.*`).
    #[must_use]
    pub fn handle(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
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
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
