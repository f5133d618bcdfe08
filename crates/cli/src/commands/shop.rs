//! `agent-cli shop`

use agent_helper_admin::shopify::AdminClient;

use super::print_json;
use crate::error::CliError;

/// Print the connected shop's details.
pub async fn show(client: &AdminClient) -> Result<(), CliError> {
    let shop = client.shop_info().await?;
    print_json(&shop)
}
