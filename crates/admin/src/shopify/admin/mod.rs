//! Shopify Admin API client.
//!
//! This module provides the request executor for the Admin API. Every
//! GraphQL and REST call funnels through [`AdminClient::execute`] or
//! [`AdminClient::rest`], which issue exactly one HTTP request and turn the
//! response envelope into either the payload or a structured error. There is
//! no retry at this layer.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::instrument;

use agent_helper_core::ShopDomain;

use crate::config::AdminApiConfig;

use super::{AdminShopifyError, GraphQLError, GraphQLRequest, ShopInfo};

mod analytics;
mod inventory;
pub mod pagination;
mod products;
pub mod queries;

pub use inventory::InventoryAdjustment;
pub use products::ProductUpdate;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Shopify Admin API client.
///
/// Cheap to clone; clones share one connection pool and the credential.
///
/// # Security
///
/// The access token grants full read/write access to store data within the
/// installed scopes. It is never included in `Debug` output or logs.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    store: ShopDomain,
    api_version: String,
    access_token: SecretString,
    /// Scheme and host requests are sent to (`https://{store}` unless overridden).
    base_url: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("store", &self.inner.store)
            .field("api_version", &self.inner.api_version)
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Store domain, access token and API version
    #[must_use]
    pub fn new(config: &AdminApiConfig) -> Self {
        let base_url = format!("https://{}", config.store_domain);
        Self::with_base_url(config, base_url)
    }

    /// Create a client that sends requests to `base_url` instead of the
    /// store domain (mock servers, proxies).
    #[must_use]
    pub fn with_base_url(config: &AdminApiConfig, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                store: config.store_domain.clone(),
                api_version: config.api_version.clone(),
                access_token: config.access_token.clone(),
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &ShopDomain {
        &self.inner.store
    }

    /// Get the API version requests are pinned to.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    fn graphql_endpoint(&self) -> String {
        format!(
            "{}/admin/api/{}/graphql.json",
            self.inner.base_url, self.inner.api_version
        )
    }

    fn rest_endpoint(&self, path: &str) -> String {
        format!(
            "{}/admin/api/{}/{}",
            self.inner.base_url,
            self.inner.api_version,
            path.trim_start_matches('/')
        )
    }

    // =========================================================================
    // Request execution
    // =========================================================================

    /// Execute a GraphQL query or mutation and return its `data` payload.
    ///
    /// # Arguments
    ///
    /// * `query` - GraphQL document
    /// * `variables` - JSON object (or `null`) of variables
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `query` is blank or `variables` is not an object
    /// - `Transport` if no HTTP response was received
    /// - `Http` if the status is not 2xx
    /// - `Parse` if the body is not a GraphQL envelope
    /// - `GraphQL` with the complete error list when the envelope reports
    ///   errors, even if partial data is present, or when `data` is empty
    #[instrument(skip(self, query, variables), fields(operation = operation_name(query)))]
    pub async fn execute(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<Map<String, Value>, AdminShopifyError> {
        if query.trim().is_empty() {
            return Err(AdminShopifyError::InvalidRequest("query text is empty"));
        }
        if !(variables.is_object() || variables.is_null()) {
            return Err(AdminShopifyError::InvalidRequest(
                "variables must be a JSON object",
            ));
        }

        let body = GraphQLRequest {
            query,
            variables: &variables,
        };

        let response = self
            .inner
            .client
            .post(self.graphql_endpoint())
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = AdminShopifyError::Http {
                status: status.as_u16(),
                body: text,
            };
            tracing::warn!(
                status = status.as_u16(),
                throttled = err.is_throttled(),
                "Admin API returned an error status"
            );
            return Err(err);
        }

        let envelope: graphql_client::Response<Map<String, Value>> = serde_json::from_str(&text)?;

        // Check for GraphQL errors
        if let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            let errors: Vec<GraphQLError> = errors.into_iter().map(GraphQLError::from).collect();
            let count = errors.len();
            let err = AdminShopifyError::GraphQL(errors);
            tracing::warn!(count, throttled = err.is_throttled(), "GraphQL response carried errors");
            return Err(err);
        }

        envelope
            .data
            .filter(|data| !data.is_empty())
            .ok_or_else(|| {
                AdminShopifyError::GraphQL(vec![GraphQLError::message("No data in response")])
            })
    }

    /// Issue a REST call against `/admin/api/{version}/{path}`.
    ///
    /// Every request carries `Content-Type: application/json`, with or
    /// without a body. Returns the parsed JSON body (`null` for an empty
    /// body).
    ///
    /// # Errors
    ///
    /// - `Transport` if no HTTP response was received
    /// - `Http` with the status and raw body for any non-2xx response
    /// - `Parse` if a 2xx body is not JSON
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn rest(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, AdminShopifyError> {
        let mut request = self
            .inner
            .client
            .request(method, self.rest_endpoint(path))
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AdminShopifyError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    // =========================================================================
    // Shop
    // =========================================================================

    /// Fetch basic shop information.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no `shop`.
    #[instrument(skip(self))]
    pub async fn shop_info(&self) -> Result<ShopInfo, AdminShopifyError> {
        let mut data = self.execute(queries::SHOP_INFO, Value::Null).await?;
        let shop = data
            .remove("shop")
            .filter(|shop| !shop.is_null())
            .ok_or_else(|| AdminShopifyError::NotFound("shop".to_string()))?;
        Ok(serde_json::from_value(shop)?)
    }
}

/// Collapse `userErrors` from a mutation payload into one message.
///
/// Returns `None` when the list is absent or empty.
fn user_errors_message(payload: &Value) -> Option<String> {
    let errors = payload.get("userErrors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }

    let messages: Vec<String> = errors
        .iter()
        .map(|e| {
            let field = e
                .get("field")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .unwrap_or_default();
            let message = e.get("message").and_then(Value::as_str).unwrap_or("unknown error");
            if field.is_empty() {
                message.to_string()
            } else {
                format!("{field}: {message}")
            }
        })
        .collect();

    Some(messages.join("; "))
}

/// Name of the first operation in a document, for log fields.
fn operation_name(query: &str) -> &str {
    query
        .split_whitespace()
        .skip_while(|word| !matches!(*word, "query" | "mutation"))
        .nth(1)
        .map_or("anonymous", |name| {
            name.split(['(', '{']).next().unwrap_or(name)
        })
}
