//! HTTP route handlers for the installation server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                - Status page with the install URL
//! GET  /auth/install    - Start OAuth (?shop=store.myshopify.com)
//! GET  /auth/callback   - Finish OAuth and show the CLI credentials
//! GET  /api/test        - JSON liveness check
//! ```

pub mod auth;

use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Name shown on pages and in `/api/test`.
pub const APP_NAME: &str = "Agent Helper";

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/test", get(api_test))
        .merge(auth::router())
}

/// Status page.
///
/// GET /
async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let install_url = format!("{}/auth/install?shop=your-store.myshopify.com", state.config().public_url);
    Html(page(
        APP_NAME,
        &format!(
            r#"<h1>{APP_NAME}</h1>
<p>Command-line tooling for managing store products, orders, customers and inventory.</p>
<h2>Install</h2>
<p>Open the install URL with your store's domain:</p>
<pre class="code">{install_url}</pre>
<p>After approving the app, copy the credentials shown into the CLI's <code>.env</code> file.</p>"#
        ),
    ))
}

#[derive(Debug, Serialize)]
pub struct ApiTestResponse {
    pub status: &'static str,
    pub message: String,
    pub timestamp: String,
    pub app: &'static str,
    pub url: String,
}

/// Liveness check.
///
/// GET /api/test
async fn api_test(State(state): State<AppState>) -> Json<ApiTestResponse> {
    Json(ApiTestResponse {
        status: "success",
        message: format!("{APP_NAME} API is working"),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        app: APP_NAME,
        url: state.config().public_url.clone(),
    })
}

/// Wrap `body` in a minimal HTML document.
pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 720px; margin: 48px auto; padding: 0 16px; }}
.code {{ background: #f4f4f5; padding: 12px; border-radius: 4px; font-family: monospace; white-space: pre-wrap; }}
</style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use crate::config::{OAuthConfig, ServerConfig};

    pub(crate) fn test_state() -> AppState {
        AppState::new(ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            public_url: "https://install.test".to_string(),
            oauth: OAuthConfig {
                api_key: "app-key".to_string(),
                api_secret: SecretString::from("app-secret"),
                scopes: vec!["read_products".to_string()],
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        })
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_index_shows_install_url() {
        let app = routes().with_state(test_state());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("https://install.test/auth/install?shop="));
    }

    #[tokio::test]
    async fn test_api_test_json() {
        let app = routes().with_state(test_state());
        let response = app
            .oneshot(Request::get("/api/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["app"], APP_NAME);
        assert_eq!(json["url"], "https://install.test");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
