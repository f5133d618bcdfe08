//! `agent-cli health`

use std::process::ExitCode;

use agent_helper_admin::health::{HealthThresholds, run_health_check};
use agent_helper_admin::shopify::AdminClient;
use agent_helper_core::OverallStatus;

use super::print_json;
use crate::error::CliError;

/// Print the health report; fails the process when the store is unhealthy.
pub async fn check(client: &AdminClient) -> Result<ExitCode, CliError> {
    let report = run_health_check(client, &HealthThresholds::default()).await;
    print_json(&report)?;

    if report.status == OverallStatus::Unhealthy {
        tracing::warn!("Store is unhealthy");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
