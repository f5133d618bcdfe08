//! Inventory mutations.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use agent_helper_core::{ResourceKind, to_gid};

use super::{AdminClient, queries, user_errors_message};
use crate::batch::{BatchItem, BatchOptions, BatchReport, run_batch};
use crate::shopify::AdminShopifyError;

/// Reason recorded on every adjustment.
const ADJUSTMENT_REASON: &str = "correction";
/// Quantity name adjusted.
const QUANTITY_NAME: &str = "available";

/// A relative change to one inventory item's available quantity at a
/// location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAdjustment {
    pub inventory_item_id: String,
    pub location_id: String,
    pub delta: i64,
}

impl BatchItem for InventoryAdjustment {
    fn target_id(&self) -> &str {
        &self.inventory_item_id
    }
}

impl AdminClient {
    /// Adjust available inventory via `inventoryAdjustQuantities`.
    ///
    /// Returns the `inventoryAdjustmentGroup` reported by the mutation.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the mutation reports `userErrors`, or any
    /// executor error.
    #[instrument(skip(self, adjustment), fields(
        inventory_item_id = %adjustment.inventory_item_id,
        location_id = %adjustment.location_id,
        delta = adjustment.delta,
    ))]
    pub async fn adjust_inventory(
        &self,
        adjustment: &InventoryAdjustment,
    ) -> Result<Value, AdminShopifyError> {
        let variables = json!({
            "input": {
                "reason": ADJUSTMENT_REASON,
                "name": QUANTITY_NAME,
                "changes": [{
                    "inventoryItemId": to_gid(ResourceKind::InventoryItem, &adjustment.inventory_item_id),
                    "locationId": to_gid(ResourceKind::Location, &adjustment.location_id),
                    "delta": adjustment.delta,
                }],
            }
        });

        let mut data = self
            .execute(queries::INVENTORY_ADJUST_QUANTITIES, variables)
            .await?;
        let payload = data.remove("inventoryAdjustQuantities").ok_or_else(|| {
            AdminShopifyError::Data("missing inventoryAdjustQuantities payload".to_string())
        })?;

        if let Some(message) = user_errors_message(&payload) {
            return Err(AdminShopifyError::UserError(message));
        }

        Ok(payload
            .get("inventoryAdjustmentGroup")
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Apply many inventory adjustments in paced groups.
    ///
    /// Failures are recorded per item; this never fails as a whole.
    #[instrument(skip(self, adjustments), fields(count = adjustments.len(), batch_size = options.batch_size))]
    pub async fn bulk_adjust_inventory(
        &self,
        adjustments: Vec<InventoryAdjustment>,
        options: BatchOptions,
    ) -> BatchReport<Value> {
        run_batch(adjustments, options, |adjustment| async move {
            self.adjust_inventory(&adjustment).await
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_uses_camel_case_fields() {
        let adjustment: InventoryAdjustment = serde_json::from_str(
            r#"{"inventoryItemId": "111", "locationId": "gid://shopify/Location/9", "delta": -3}"#,
        )
        .unwrap();
        assert_eq!(adjustment.target_id(), "111");
        assert_eq!(adjustment.delta, -3);
    }
}
