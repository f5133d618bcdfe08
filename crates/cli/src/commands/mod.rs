//! Subcommand implementations.

pub mod bulk;
pub mod export;
pub mod health;
pub mod list;
pub mod report;
pub mod shop;

use std::io::Write;

use agent_helper_admin::config::AdminApiConfig;
use agent_helper_admin::shopify::AdminClient;
use serde::Serialize;

use crate::error::CliError;

/// Build an Admin API client from `SHOPIFY_*` environment variables.
pub fn client() -> Result<AdminClient, CliError> {
    let config = AdminApiConfig::from_env()?;
    tracing::debug!(store = %config.store_domain, api_version = %config.api_version, "Using store");
    Ok(AdminClient::new(&config))
}

/// Write `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
