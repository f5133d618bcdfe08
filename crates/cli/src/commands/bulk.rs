//! `agent-cli bulk`

use std::path::Path;
use std::process::ExitCode;

use agent_helper_admin::batch::{BatchOptions, BatchReport};
use agent_helper_admin::shopify::{AdminClient, InventoryAdjustment, ProductUpdate};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::print_json;
use crate::error::CliError;

/// Apply product updates read from `input`.
pub async fn products(
    client: &AdminClient,
    input: &Path,
    options: BatchOptions,
) -> Result<ExitCode, CliError> {
    let updates: Vec<ProductUpdate> = read_input(input).await?;
    tracing::info!(count = updates.len(), "Updating products");
    let report = client.bulk_update_products(updates, options).await;
    finish(&report)
}

/// Apply inventory adjustments read from `input`.
pub async fn inventory(
    client: &AdminClient,
    input: &Path,
    options: BatchOptions,
) -> Result<ExitCode, CliError> {
    let adjustments: Vec<InventoryAdjustment> = read_input(input).await?;
    tracing::info!(count = adjustments.len(), "Adjusting inventory");
    let report = client.bulk_adjust_inventory(adjustments, options).await;
    finish(&report)
}

async fn read_input<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CliError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
    parse_input(&raw).map_err(|source| CliError::InvalidInput {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_input<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_str(raw)
}

fn finish<R: Serialize>(report: &BatchReport<R>) -> Result<ExitCode, CliError> {
    print_json(report)?;
    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_updates() {
        let updates: Vec<ProductUpdate> = parse_input(
            r#"[{"id": "1", "input": {"title": "Flaky Salt"}}, {"id": "gid://shopify/Product/2"}]"#,
        )
        .unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].input["title"], "Flaky Salt");
        assert!(updates[1].input.is_empty());
    }

    #[test]
    fn test_parse_inventory_adjustments() {
        let adjustments: Vec<InventoryAdjustment> = parse_input(
            r#"[{"inventoryItemId": "11", "locationId": "22", "delta": 4}]"#,
        )
        .unwrap();
        assert_eq!(adjustments[0].inventory_item_id, "11");
        assert_eq!(adjustments[0].delta, 4);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let result: Result<Vec<InventoryAdjustment>, _> =
            parse_input(r#"{"inventoryItemId": "11", "locationId": "22", "delta": 4}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_input_reports_missing_file() {
        let err = read_input::<ProductUpdate>(Path::new("/nonexistent/updates.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::ReadInput { .. }));
    }
}
