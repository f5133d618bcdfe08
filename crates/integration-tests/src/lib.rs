//! Integration tests for Agent Helper.
//!
//! Every test runs the real access layer against a `wiremock` server
//! standing in for one store's Admin API, so no credentials or network
//! access are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p agent-helper-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `admin_executor` - request execution, error mapping, REST calls
//! - `admin_pagination` - cursor paging, item caps, search filters
//! - `admin_bulk` - paced bulk mutations with partial failure
//! - `store_health` - health evaluation through the real client
//! - `oauth_install` - token exchange and the install routes

use agent_helper_admin::config::AdminApiConfig;
use agent_helper_admin::shopify::AdminClient;
use agent_helper_core::ShopDomain;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Store domain every mock client is configured for.
pub const STORE: &str = "test-store.myshopify.com";

/// Access token the mock API expects.
pub const ACCESS_TOKEN: &str = "shpat_integration_token";

/// GraphQL endpoint path for the default API version.
pub const GRAPHQL_PATH: &str = "/admin/api/2024-01/graphql.json";

/// A mock Admin API and a client pointed at it.
pub struct MockStore {
    pub server: MockServer,
    pub client: AdminClient,
}

impl MockStore {
    /// Start a fresh mock server.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let client = AdminClient::with_base_url(&config(), server.uri());
        Self { server, client }
    }

    /// Matcher for an authenticated GraphQL POST.
    pub fn graphql() -> MockBuilder {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(header("X-Shopify-Access-Token", ACCESS_TOKEN))
    }

    /// JSON bodies of every GraphQL request received so far.
    pub async fn graphql_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == GRAPHQL_PATH)
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}

/// Admin API configuration for [`STORE`].
#[must_use]
pub fn config() -> AdminApiConfig {
    let store = ShopDomain::parse(STORE).expect("test store domain is valid");
    AdminApiConfig::new(store, SecretString::from(ACCESS_TOKEN))
}

/// A 200 response carrying `{"data": data}`.
#[must_use]
pub fn data(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

/// A connection under `field` with a `nodes` list and `pageInfo`.
///
/// `next_cursor` doubles as `hasNextPage`.
#[must_use]
pub fn connection(field: &str, nodes: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        field: {
            "nodes": nodes,
            "pageInfo": {
                "hasNextPage": next_cursor.is_some(),
                "endCursor": next_cursor,
            }
        }
    })
}

/// A minimal node with a product gid.
#[must_use]
pub fn product_node(id: u64, title: &str) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{id}"),
        "title": title,
        "status": "ACTIVE",
    })
}
