//! `agent-cli export`
//!
//! Rows are written as pages arrive, so a failed fetch leaves the rows
//! written so far in the file.

use std::path::Path;
use std::pin::pin;

use agent_helper_admin::shopify::{AdminClient, Entity, EntityKind, ListQuery};
use futures::TryStreamExt;
use serde_json::Value;

use crate::error::CliError;

/// Fixed CSV columns per entity, using the platform's field names.
pub const fn columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Products => &[
            "id",
            "title",
            "handle",
            "status",
            "vendor",
            "productType",
            "totalInventory",
            "createdAt",
            "updatedAt",
            "variants",
        ],
        EntityKind::Orders => &[
            "id",
            "name",
            "email",
            "totalPriceSet",
            "displayFinancialStatus",
            "displayFulfillmentStatus",
            "createdAt",
            "lineItems",
        ],
        EntityKind::Customers => &[
            "id",
            "firstName",
            "lastName",
            "email",
            "phone",
            "numberOfOrders",
            "amountSpent",
            "createdAt",
        ],
        EntityKind::InventoryItems => &["id", "sku", "tracked", "createdAt", "updatedAt"],
    }
}

/// Render one field as a CSV cell.
///
/// Strings are written as-is, nulls and missing fields as empty cells,
/// and nested values as compact JSON.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn record(kind: EntityKind, entity: &Entity) -> Vec<String> {
    columns(kind)
        .iter()
        .map(|column| cell(entity.get(column)))
        .collect()
}

/// Stream every matching entity into a CSV file at `output`.
pub async fn to_csv(
    client: &AdminClient,
    kind: EntityKind,
    query: ListQuery,
    output: &Path,
) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(columns(kind))?;

    let mut rows = 0usize;
    let mut entities = pin!(client.fetch_list(kind, query));
    while let Some(entity) = entities.try_next().await? {
        writer.write_record(record(kind, &entity))?;
        rows += 1;
    }
    writer.flush()?;

    tracing::info!(kind = %kind, rows, path = %output.display(), "Export complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(value: Value) -> Entity {
        Entity::from_value(value).unwrap()
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell(None), "");
        assert_eq!(cell(Some(&Value::Null)), "");
        assert_eq!(cell(Some(&json!("Smoked Salt"))), "Smoked Salt");
        assert_eq!(cell(Some(&json!(12))), "12");
        assert_eq!(cell(Some(&json!(true))), "true");
        assert_eq!(
            cell(Some(&json!({"amount": "9.50", "currencyCode": "USD"}))),
            r#"{"amount":"9.50","currencyCode":"USD"}"#
        );
    }

    #[test]
    fn test_record_follows_column_order() {
        let item = entity(json!({
            "updatedAt": "2024-02-01T00:00:00Z",
            "id": "gid://shopify/InventoryItem/7",
            "tracked": false,
            "createdAt": "2024-01-01T00:00:00Z"
        }));

        assert_eq!(
            record(EntityKind::InventoryItems, &item),
            vec![
                "gid://shopify/InventoryItem/7",
                "",
                "false",
                "2024-01-01T00:00:00Z",
                "2024-02-01T00:00:00Z",
            ]
        );
    }

    #[test]
    fn test_csv_quotes_cells_with_commas() {
        let customer = entity(json!({
            "id": "gid://shopify/Customer/1",
            "firstName": "Ada",
            "lastName": "Lovelace, Countess",
            "email": null,
            "numberOfOrders": "3",
            "amountSpent": {"amount": "120.00", "currencyCode": "GBP"}
        }));

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(columns(EntityKind::Customers)).unwrap();
        writer
            .write_record(record(EntityKind::Customers, &customer))
            .unwrap();
        let csv = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,firstName,lastName,email,phone,numberOfOrders,amountSpent,createdAt"
        );
        assert_eq!(
            lines.next().unwrap(),
            r#"gid://shopify/Customer/1,Ada,"Lovelace, Countess",,,3,"{""amount"":""120.00"",""currencyCode"":""GBP""}","#
        );
    }

    #[test]
    fn test_every_column_is_selected_by_the_list_query() {
        for kind in EntityKind::ALL {
            let document = kind.document();
            let selected: Vec<&str> = document
                .split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|word| !word.is_empty())
                .collect();
            for column in columns(kind) {
                assert!(
                    selected.contains(column),
                    "{kind} exports `{column}` but its query does not select it"
                );
            }
        }
    }

    #[test]
    fn test_every_kind_exports_id_first() {
        for kind in EntityKind::ALL {
            assert_eq!(columns(kind).first(), Some(&"id"));
        }
    }
}
