//! OAuth install route handlers.
//!
//! Nothing is persisted: the callback exchanges the code and shows the
//! resulting credentials once so they can be copied into the CLI's `.env`.

use std::collections::BTreeMap;

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use agent_helper_core::ShopDomain;

use super::page;
use crate::error::AppError;
use crate::shopify::oauth::verify_hmac;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/install", get(install))
        .route("/auth/callback", get(callback))
}

#[derive(Debug, Deserialize)]
pub struct InstallParams {
    pub shop: Option<String>,
}

/// Redirect the merchant to the store's authorization page.
///
/// GET /auth/install?shop=store.myshopify.com
#[instrument(skip(state))]
async fn install(
    State(state): State<AppState>,
    Query(params): Query<InstallParams>,
) -> Result<Redirect, AppError> {
    let shop = params.shop.filter(|s| !s.trim().is_empty()).ok_or_else(|| {
        AppError::BadRequest(
            "Missing shop parameter. Usage: /auth/install?shop=your-store.myshopify.com".to_string(),
        )
    })?;
    let shop = ShopDomain::parse(&shop).map_err(|e| {
        AppError::BadRequest(format!(
            "Invalid shop domain ({e}). Must be a .myshopify.com or .myshopify.io domain"
        ))
    })?;

    let nonce = hex::encode(rand::random::<[u8; 16]>());
    let auth_url = state
        .oauth()
        .authorization_url(&shop, &state.config().redirect_uri(), &nonce)?;

    tracing::info!(shop = %shop, "Redirecting to authorization page");
    Ok(Redirect::to(&auth_url))
}

/// Exchange the authorization code and show the credentials.
///
/// GET /auth/callback?shop=..&code=..&hmac=..
///
/// The `hmac` parameter is required.
#[instrument(skip(state, params), fields(shop = params.get("shop").map(String::as_str)))]
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(shop), Some(code)) = (params.get("shop"), params.get("code")) else {
        return Err(AppError::BadRequest("Missing required parameters".to_string()));
    };

    // Unsigned callbacks are rejected before any exchange
    if !verify_hmac(&params, state.oauth().api_secret().expose_secret()) {
        tracing::warn!("Callback with missing or invalid hmac");
        return Err(AppError::InvalidSignature);
    }

    let shop = ShopDomain::parse(shop)
        .map_err(|e| AppError::BadRequest(format!("Invalid shop domain: {e}")))?;

    let token = state.oauth().exchange_code(&shop, code).await?;
    tracing::info!(shop = %token.shop, scope = %token.scope, "App installed");

    Ok(Html(page(
        "Installation successful",
        &format!(
            r#"<h1>Installation successful</h1>
<p><strong>Store:</strong> {shop}</p>
<p><strong>Scopes:</strong> {scope}</p>
<p>Add these lines to the CLI's <code>.env</code> file. The token is shown only once.</p>
<pre class="code">SHOPIFY_STORE_DOMAIN={shop}
SHOPIFY_ACCESS_TOKEN={access_token}</pre>"#,
            shop = token.shop,
            scope = token.scope,
            access_token = token.access_token.expose_secret(),
        ),
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::routes::routes;
    use crate::routes::tests::test_state;

    async fn get(uri: &str) -> axum::response::Response {
        routes()
            .with_state(test_state())
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_install_requires_shop() {
        let response = get("/auth/install").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_install_rejects_foreign_domain() {
        let response = get("/auth/install?shop=evil.example.com").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_install_redirects_with_state() {
        let response = get("/auth/install?shop=my-store.myshopify.com").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
        assert!(location.contains("client_id=app-key"));
        assert!(location.contains("redirect_uri=https%3A%2F%2Finstall.test%2Fauth%2Fcallback"));

        let state = location.split("state=").nth(1).unwrap();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_callback_requires_shop_and_code() {
        let response = get("/auth/callback?shop=my-store.myshopify.com").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_rejects_bad_hmac() {
        let response =
            get("/auth/callback?shop=my-store.myshopify.com&code=abc&hmac=deadbeef").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_callback_rejects_unsigned_request() {
        let response = get("/auth/callback?shop=my-store.myshopify.com&code=abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
