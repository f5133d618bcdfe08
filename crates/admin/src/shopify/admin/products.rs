//! Product mutations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::instrument;

use agent_helper_core::{ResourceKind, to_gid};

use super::{AdminClient, queries, user_errors_message};
use crate::batch::{BatchItem, BatchOptions, BatchReport, run_batch};
use crate::shopify::{AdminShopifyError, Entity};

/// One product update: the product to change and the `ProductInput`
/// fields to set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// Product ID, numeric or in `gid://shopify/Product/<id>` form.
    pub id: String,
    /// Fields to set, e.g. `{"title": "New title", "status": "DRAFT"}`.
    #[serde(default)]
    pub input: Map<String, Value>,
}

impl BatchItem for ProductUpdate {
    fn target_id(&self) -> &str {
        &self.id
    }
}

impl AdminClient {
    /// Update a product via `productUpdate`.
    ///
    /// Returns the updated product as reported by the mutation.
    ///
    /// # Errors
    ///
    /// Returns `UserError` if the mutation reports `userErrors`, or any
    /// executor error.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &str,
        input: Map<String, Value>,
    ) -> Result<Entity, AdminShopifyError> {
        let mut input = input;
        input.insert("id".into(), json!(to_gid(ResourceKind::Product, id)));

        let mut data = self
            .execute(queries::PRODUCT_UPDATE, json!({ "input": input }))
            .await?;
        let payload = data
            .remove("productUpdate")
            .ok_or_else(|| AdminShopifyError::Data("missing productUpdate payload".to_string()))?;

        if let Some(message) = user_errors_message(&payload) {
            return Err(AdminShopifyError::UserError(message));
        }

        match payload.get("product") {
            Some(product) if product.is_object() => Entity::from_value(product.clone()),
            _ => Err(AdminShopifyError::NotFound(to_gid(ResourceKind::Product, id))),
        }
    }

    /// Apply many product updates in paced groups.
    ///
    /// Failures are recorded per item; this never fails as a whole.
    #[instrument(skip(self, updates), fields(count = updates.len(), batch_size = options.batch_size))]
    pub async fn bulk_update_products(
        &self,
        updates: Vec<ProductUpdate>,
        options: BatchOptions,
    ) -> BatchReport<Entity> {
        run_batch(updates, options, |update| async move {
            self.update_product(&update.id, update.input).await
        })
        .await
    }
}
