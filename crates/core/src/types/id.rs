//! Shopify global ID helpers.
//!
//! The Admin API identifies every record with a global ID of the form
//! `gid://shopify/<Resource>/<numeric id>`. Operators usually paste the
//! short numeric form, so callers normalize through [`to_gid`] before
//! building a mutation.

use core::fmt;

use serde::{Deserialize, Serialize};

const GID_PREFIX: &str = "gid://shopify/";

/// Resource types that the toolkit addresses by global ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Product,
    InventoryItem,
    Location,
}

impl ResourceKind {
    /// The resource name used inside a global ID.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::InventoryItem => "InventoryItem",
            Self::Location => "Location",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize an ID to global ID form.
///
/// IDs that already start with `gid://` pass through unchanged, anything else
/// is treated as the numeric tail.
///
/// ```
/// use agent_helper_core::{ResourceKind, to_gid};
///
/// assert_eq!(to_gid(ResourceKind::Location, "42"), "gid://shopify/Location/42");
/// assert_eq!(
///     to_gid(ResourceKind::Location, "gid://shopify/Location/42"),
///     "gid://shopify/Location/42"
/// );
/// ```
#[must_use]
pub fn to_gid(kind: ResourceKind, id: &str) -> String {
    let id = id.trim();
    if id.starts_with("gid://") {
        id.to_owned()
    } else {
        format!("{GID_PREFIX}{kind}/{id}")
    }
}
