//! Shopify Admin API access layer (HIGH PRIVILEGE).
//!
//! # Security
//!
//! The access token used here is an offline Admin API token with the scopes
//! granted at install time (products, orders, customers, inventory; read and
//! write). Treat it like a password: it is held as a `SecretString` and never
//! logged.
//!
//! # Architecture
//!
//! - [`AdminClient::execute`] is the single place a request hits the network
//! - [`AdminClient::fetch_list`] pages through connections with cursors
//! - [`filter::SearchFilter`] renders the `query:` search argument
//! - [`oauth::OAuthClient`] handles the install-time code exchange
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_helper_admin::shopify::{AdminClient, EntityKind, ListQuery, SearchFilter};
//!
//! let client = AdminClient::new(&config);
//!
//! // Shop information
//! let shop = client.shop_info().await?;
//!
//! // Up to 100 active products, newest first
//! let query = ListQuery::default()
//!     .with_filter(SearchFilter::new().status("active"))
//!     .with_max_items(100);
//! let products = client.collect_list(EntityKind::Products, query).await?;
//! ```

mod admin;
pub mod filter;
pub mod oauth;
pub mod types;

pub use admin::AdminClient;
pub use admin::pagination::{EntityKind, ListQuery};
pub use admin::{InventoryAdjustment, ProductUpdate};
pub use filter::{FilterClause, FilterOp, SearchFilter};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A response or entity did not have the expected shape or value.
    #[error("Data error: {0}")]
    Data(String),

    /// The request was rejected before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(&'static str),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

impl AdminShopifyError {
    /// Whether the platform rejected the call for exceeding its rate limit.
    ///
    /// Covers both HTTP 429 and GraphQL cost throttling (`THROTTLED`).
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429,
            Self::GraphQL(errors) => errors
                .iter()
                .any(|e| e.code.as_deref() == Some("THROTTLED")),
            _ => false,
        }
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
    /// `extensions.code`, e.g. `THROTTLED` or `ACCESS_DENIED`.
    pub code: Option<String>,
}

impl GraphQLError {
    /// An error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
            code: None,
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(error: graphql_client::Error) -> Self {
        use graphql_client::PathFragment;

        Self {
            message: error.message,
            locations: error
                .locations
                .unwrap_or_default()
                .into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect(),
            path: error
                .path
                .unwrap_or_default()
                .into_iter()
                .map(|fragment| match fragment {
                    PathFragment::Key(key) => serde_json::Value::String(key),
                    PathFragment::Index(index) => serde_json::Value::from(index),
                })
                .collect(),
            code: error
                .extensions
                .as_ref()
                .and_then(|ext| ext.get("code"))
                .and_then(serde_json::Value::as_str)
                .map(String::from),
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
