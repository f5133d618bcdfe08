//! `agent-cli report`

use agent_helper_admin::analytics::ReportPeriod;
use agent_helper_admin::shopify::AdminClient;

use super::print_json;
use crate::error::CliError;

/// Sales rollup over the last `days` days.
pub async fn sales(client: &AdminClient, days: u32) -> Result<(), CliError> {
    let report = client.sales_analytics(ReportPeriod::days(days)).await?;
    print_json(&report)
}

/// Stock levels and inventory value.
pub async fn inventory(client: &AdminClient) -> Result<(), CliError> {
    let report = client.inventory_report().await?;
    print_json(&report)
}
