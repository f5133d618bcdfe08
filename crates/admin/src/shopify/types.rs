//! Domain types for the Admin API access layer.
//!
//! Entities are kept as the JSON objects the platform returns. The access
//! layer only interprets the handful of fields it aggregates, so every read
//! goes through an explicit presence check instead of a fixed schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AdminShopifyError;

/// Request body for a GraphQL call.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest<'a> {
    /// Query or mutation document.
    pub query: &'a str,
    /// Variables referenced by the document.
    pub variables: &'a Value,
}

/// A read-only snapshot of a store record (product, order, customer,
/// inventory item) exactly as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    /// Wrap a JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Convert a JSON value into an entity.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Data` if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self, AdminShopifyError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(AdminShopifyError::Data(format!(
                "expected an object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Platform-assigned global ID, if selected.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// Raw field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field value when it is a string.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// All fields.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the entity and return its fields.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::Object(entity.0)
    }
}

/// One page of a GraphQL connection.
#[derive(Debug, Clone)]
pub struct Page {
    /// Nodes in platform order.
    pub nodes: Vec<Entity>,
    /// Whether another page follows.
    pub has_next_page: bool,
    /// Cursor to pass as `after` for the next page.
    pub end_cursor: Option<String>,
}

impl Page {
    /// Extract the connection stored under `field` in a response `data` map.
    ///
    /// Accepts both the `nodes` and the `edges { node }` shapes. A missing
    /// `pageInfo` is read as "no further pages".
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Data` if the connection is absent or its
    /// node list is not an array of objects.
    pub fn from_data(data: &Map<String, Value>, field: &str) -> Result<Self, AdminShopifyError> {
        let connection = data.get(field).filter(|v| v.is_object()).ok_or_else(|| {
            AdminShopifyError::Data(format!("response is missing the `{field}` connection"))
        })?;

        let nodes = connection_nodes(connection)
            .ok_or_else(|| {
                AdminShopifyError::Data(format!("`{field}` connection has no nodes or edges"))
            })?
            .into_iter()
            .cloned()
            .map(Entity::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        let page_info = connection.get("pageInfo");
        let has_next_page = page_info
            .and_then(|p| p.get("hasNextPage"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let end_cursor = page_info
            .and_then(|p| p.get("endCursor"))
            .and_then(Value::as_str)
            .map(String::from);

        Ok(Self {
            nodes,
            has_next_page,
            end_cursor,
        })
    }
}

/// Flatten a nested connection value into its nodes.
///
/// Accepts `{ nodes: [..] }`, `{ edges: [{ node }] }` or a bare array.
/// Returns `None` for any other shape.
#[must_use]
pub fn connection_nodes(value: &Value) -> Option<Vec<&Value>> {
    if let Some(items) = value.as_array() {
        return Some(items.iter().collect());
    }
    if let Some(nodes) = value.get("nodes").and_then(Value::as_array) {
        return Some(nodes.iter().collect());
    }
    value
        .get("edges")
        .and_then(Value::as_array)
        .map(|edges| edges.iter().filter_map(|edge| edge.get("node")).collect())
}

/// Basic information about the connected shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInfo {
    /// Shop name.
    pub name: String,
    /// Storefront URL.
    pub url: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Subscription plan.
    pub plan: Option<ShopPlan>,
    /// Store currency (ISO 4217).
    pub currency_code: Option<String>,
    /// IANA timezone name.
    pub iana_timezone: Option<String>,
}

/// Subscription plan of a shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPlan {
    /// Human-readable plan name.
    pub display_name: String,
}

pub(crate) const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_page_from_nodes_shape() {
        let data = data(json!({
            "products": {
                "nodes": [{"id": "gid://shopify/Product/1"}, {"id": "gid://shopify/Product/2"}],
                "pageInfo": {"hasNextPage": true, "endCursor": "abc"}
            }
        }));

        let page = Page::from_data(&data, "products").unwrap();
        assert_eq!(page.nodes.len(), 2);
        assert_eq!(page.nodes[0].id(), Some("gid://shopify/Product/1"));
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_page_from_edges_shape_without_page_info() {
        let data = data(json!({
            "orders": {"edges": [{"node": {"id": "o1"}}, {"cursor": "x", "node": {"id": "o2"}}]}
        }));

        let page = Page::from_data(&data, "orders").unwrap();
        let ids: Vec<_> = page.nodes.iter().filter_map(Entity::id).collect();
        assert_eq!(ids, vec!["o1", "o2"]);
        assert!(!page.has_next_page);
        assert!(page.end_cursor.is_none());
    }

    #[test]
    fn test_page_missing_connection_is_data_error() {
        let err = Page::from_data(&Map::new(), "customers").unwrap_err();
        assert!(matches!(err, AdminShopifyError::Data(msg) if msg.contains("customers")));
    }

    #[test]
    fn test_page_rejects_scalar_nodes() {
        let data = data(json!({"products": {"nodes": [1, 2]}}));
        assert!(matches!(
            Page::from_data(&data, "products"),
            Err(AdminShopifyError::Data(_))
        ));
    }

    #[test]
    fn test_entity_from_non_object() {
        let err = Entity::from_value(json!("text")).unwrap_err();
        assert_eq!(err.to_string(), "Data error: expected an object, got a string");
    }

    #[test]
    fn test_connection_nodes_bare_array() {
        let value = json!([{"title": "a"}]);
        assert_eq!(connection_nodes(&value).unwrap().len(), 1);
        assert!(connection_nodes(&json!("nope")).is_none());
    }
}
