//! `agent-cli <entity> list`

use agent_helper_admin::shopify::{AdminClient, EntityKind, ListQuery};

use super::print_json;
use crate::error::CliError;

/// Print matching entities as a JSON array.
pub async fn print(client: &AdminClient, kind: EntityKind, query: ListQuery) -> Result<(), CliError> {
    let entities = client.collect_list(kind, query).await?;
    tracing::info!(kind = %kind, count = entities.len(), "Listed entities");
    print_json(&entities)
}
