//! CLI error type.

use std::path::PathBuf;

use agent_helper_admin::config::ConfigError;
use agent_helper_admin::shopify::AdminShopifyError;
use thiserror::Error;

/// Errors that end a command with exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or invalid Admin API configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Admin API call failed.
    #[error(transparent)]
    Shopify(#[from] AdminShopifyError),

    /// Input file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not the expected JSON shape.
    #[error("Invalid JSON in {path}: {source}")]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CliError {
    /// Follow-up advice printed under the error, if any.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Shopify(e) if e.is_throttled() => Some(
                "The Admin API rate limit was hit. Wait a minute and rerun, or raise --delay-ms for bulk commands.",
            ),
            Self::Config(_) => {
                Some("Set SHOPIFY_STORE_DOMAIN and SHOPIFY_ACCESS_TOKEN in the environment or .env.")
            }
            _ => None,
        }
    }
}
