//! Request execution against a mock Admin API.

use agent_helper_admin::shopify::AdminShopifyError;
use agent_helper_integration_tests::{ACCESS_TOKEN, MockStore, data};
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

// ============================================================================
// GraphQL
// ============================================================================

#[tokio::test]
async fn test_shop_info_sends_token_and_parses_shop() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .and(header("Content-Type", "application/json"))
        .and(body_string_contains("query ShopInfo"))
        .respond_with(data(json!({
            "shop": {
                "name": "World Seasonings",
                "url": "https://worldseasonings.com",
                "email": "ops@worldseasonings.com",
                "plan": {"displayName": "Shopify Plus"},
                "currencyCode": "USD",
                "ianaTimezone": "America/Chicago"
            }
        })))
        .expect(1)
        .mount(&store.server)
        .await;

    let shop = store.client.shop_info().await.expect("shop info");
    assert_eq!(shop.name, "World Seasonings");
    assert_eq!(shop.plan.expect("plan").display_name, "Shopify Plus");
    assert_eq!(shop.currency_code.as_deref(), Some("USD"));
}

#[tokio::test]
async fn test_execute_returns_data_map() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .and(body_string_contains(r#""variables":{"first":1}"#))
        .respond_with(data(json!({"products": {"nodes": []}})))
        .mount(&store.server)
        .await;

    let data = store
        .client
        .execute("query Q($first: Int!) { products(first: $first) { nodes { id } } }", json!({"first": 1}))
        .await
        .expect("execute");
    assert!(data.contains_key("products"));
}

#[tokio::test]
async fn test_non_success_status_is_http_error() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .respond_with(ResponseTemplate::new(401).set_body_string("[API] Invalid API key or access token"))
        .mount(&store.server)
        .await;

    let err = store.client.shop_info().await.expect_err("401");
    match err {
        AdminShopifyError::Http { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn test_graphql_errors_keep_full_list() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"shop": {"name": "partial"}},
            "errors": [
                {"message": "Field 'foo' doesn't exist", "locations": [{"line": 2, "column": 3}]},
                {"message": "Access denied for plan", "path": ["shop", "plan"]}
            ]
        })))
        .mount(&store.server)
        .await;

    let err = store.client.shop_info().await.expect_err("errors");
    let AdminShopifyError::GraphQL(errors) = &err else {
        panic!("expected GraphQL, got {err:?}");
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].locations[0].line, 2);
    assert_eq!(errors[1].path, vec![json!("shop"), json!("plan")]);
    assert_eq!(
        err.to_string(),
        "GraphQL errors: Field 'foo' doesn't exist; Access denied for plan"
    );
}

#[tokio::test]
async fn test_empty_data_is_no_data_error() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&store.server)
        .await;

    let err = store.client.shop_info().await.expect_err("no data");
    let AdminShopifyError::GraphQL(errors) = err else {
        panic!("expected GraphQL");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "No data in response");
}

#[tokio::test]
async fn test_null_data_is_no_data_error() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
        .mount(&store.server)
        .await;

    let err = store.client.shop_info().await.expect_err("no data");
    assert!(err.to_string().contains("No data in response"));
}

#[tokio::test]
async fn test_throttled_errors_are_detected() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Throttled", "extensions": {"code": "THROTTLED"}}]
        })))
        .mount(&store.server)
        .await;

    let err = store.client.shop_info().await.expect_err("throttled");
    assert!(err.is_throttled());
}

#[tokio::test]
async fn test_blank_query_never_hits_the_network() {
    let store = MockStore::start().await;
    MockStore::graphql()
        .respond_with(data(json!({"shop": {"name": "x"}})))
        .expect(0)
        .mount(&store.server)
        .await;

    let err = store.client.execute("  ", json!({})).await.expect_err("blank");
    assert!(matches!(err, AdminShopifyError::InvalidRequest(_)));

    let err = store
        .client
        .execute("query { shop { name } }", json!([1, 2]))
        .await
        .expect_err("array variables");
    assert!(matches!(err, AdminShopifyError::InvalidRequest(_)));
}

// ============================================================================
// REST
// ============================================================================

#[tokio::test]
async fn test_rest_get_returns_json() {
    let store = MockStore::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/locations.json"))
        .and(header("X-Shopify-Access-Token", ACCESS_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locations": [{"id": 9, "name": "Warehouse"}]
        })))
        .mount(&store.server)
        .await;

    let body = store
        .client
        .rest(Method::GET, "/locations.json", None)
        .await
        .expect("rest");
    assert_eq!(body["locations"][0]["name"], "Warehouse");
}

#[tokio::test]
async fn test_rest_post_sends_body_and_maps_errors() {
    let store = MockStore::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/webhooks.json"))
        .and(body_string_contains(r#""topic":"orders/create""#))
        .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"errors":{"address":["is invalid"]}}"#))
        .mount(&store.server)
        .await;

    let err = store
        .client
        .rest(
            Method::POST,
            "webhooks.json",
            Some(&json!({"webhook": {"topic": "orders/create", "address": "nope"}})),
        )
        .await
        .expect_err("422");
    match err {
        AdminShopifyError::Http { status, body } => {
            assert_eq!(status, 422);
            assert!(body.contains("is invalid"));
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rest_empty_body_is_null() {
    let store = MockStore::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/api/2024-01/webhooks/1.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&store.server)
        .await;

    let body = store
        .client
        .rest(Method::DELETE, "webhooks/1.json", None)
        .await
        .expect("delete");
    assert!(body.is_null());
}

#[tokio::test]
async fn test_rest_always_sends_json_content_type() {
    let store = MockStore::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-01/shop.json"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shop": {"id": 1}})))
        .expect(1)
        .mount(&store.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-01/webhooks.json"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&store.server)
        .await;

    let shop = store
        .client
        .rest(Method::GET, "shop.json", None)
        .await
        .expect("get without body");
    assert_eq!(shop["shop"]["id"], 1);

    store
        .client
        .rest(Method::POST, "webhooks.json", Some(&json!({"webhook": {}})))
        .await
        .expect("post with body");
}
