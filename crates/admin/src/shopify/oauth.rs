//! OAuth install flow: authorization URL, callback signature check, and
//! code-for-token exchange.
//!
//! The exchange yields an offline access token. Storing it is the caller's
//! job; the installation server only displays it once.

use std::collections::BTreeMap;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use agent_helper_core::{ShopDomain, ShopDomainError};

use crate::config::OAuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors from the install flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid shop domain: {0}")]
    InvalidShop(#[from] ShopDomainError),

    #[error("Token exchange failed ({status}): {body}")]
    Exchange { status: u16, body: String },

    #[error("Token exchange request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Token response did not include an access token")]
    MissingToken,

    #[error("Invalid authorization URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Token returned by a successful exchange.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct OAuthToken {
    pub shop: ShopDomain,
    pub access_token: SecretString,
    pub scope: String,
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    scope: String,
}

/// Client for the app-side half of the OAuth flow.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    client: reqwest::Client,
    config: OAuthConfig,
    /// Replaces `https://{shop}` when set.
    base_url: Option<String>,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self::build(config, None)
    }

    /// Send token exchanges to `base_url` instead of the shop (tests, proxies).
    #[must_use]
    pub fn with_base_url(config: OAuthConfig, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self::build(config, Some(base_url.trim_end_matches('/').to_string()))
    }

    fn build(config: OAuthConfig, base_url: Option<String>) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                client: reqwest::Client::new(),
                config,
                base_url,
            }),
        }
    }

    /// The app secret used to sign callbacks.
    #[must_use]
    pub fn api_secret(&self) -> &SecretString {
        &self.inner.config.api_secret
    }

    /// URL the merchant is sent to in order to approve the install.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError::Url` if the shop domain does not form a valid URL.
    pub fn authorization_url(
        &self,
        shop: &ShopDomain,
        redirect_uri: &str,
        state: &str,
    ) -> Result<String, OAuthError> {
        let scope = self.inner.config.scopes.join(",");
        let url = Url::parse_with_params(
            &format!("https://{shop}/admin/oauth/authorize"),
            &[
                ("client_id", self.inner.config.api_key.as_str()),
                ("scope", scope.as_str()),
                ("redirect_uri", redirect_uri),
                ("state", state),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange an authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// - `Transport` if the request could not be sent
    /// - `Exchange` if the shop answers with a non-2xx status
    /// - `Parse` / `MissingToken` if the body has no usable token
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(&self, shop: &ShopDomain, code: &str) -> Result<OAuthToken, OAuthError> {
        let base = self
            .inner
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"));
        let url = format!("{base}/admin/oauth/access_token");

        let body = serde_json::json!({
            "client_id": self.inner.config.api_key,
            "client_secret": self.inner.config.api_secret.expose_secret(),
            "code": code,
        });

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Token exchange rejected");
            return Err(OAuthError::Exchange {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&text)?;
        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::MissingToken)?;

        tracing::info!(scope = %parsed.scope, "Obtained offline access token");

        Ok(OAuthToken {
            shop: shop.clone(),
            access_token: SecretString::from(access_token),
            scope: parsed.scope,
        })
    }
}

/// Verify the `hmac` parameter of an OAuth callback.
///
/// The signed message is every other parameter (minus `signature`), sorted
/// by key and joined as `key=value` pairs with `&`. Returns `false` when the
/// parameter is missing or not hex.
#[must_use]
pub fn verify_hmac(params: &BTreeMap<String, String>, secret: &str) -> bool {
    let Some(provided) = params.get("hmac") else {
        return false;
    };
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(signed_message(params).as_bytes());

    // Constant-time comparison
    mac.verify_slice(&provided).is_ok()
}

fn signed_message(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "hmac" | "signature"))
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "hush";

    fn config() -> OAuthConfig {
        OAuthConfig {
            api_key: "app-key".to_string(),
            api_secret: SecretString::from(SECRET),
            scopes: vec!["read_products".to_string(), "write_products".to_string()],
        }
    }

    fn sign(params: &BTreeMap<String, String>) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(signed_message(params).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn callback_params() -> BTreeMap<String, String> {
        [
            ("code", "0907a61c0c8d55e99db179b68161bc00"),
            ("shop", "some-shop.myshopify.com"),
            ("state", "0.6784241404160823"),
            ("timestamp", "1337178173"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_signed_message_is_sorted_and_excludes_hmac() {
        let mut params = callback_params();
        params.insert("hmac".to_string(), "abc".to_string());
        assert_eq!(
            signed_message(&params),
            "code=0907a61c0c8d55e99db179b68161bc00&shop=some-shop.myshopify.com&state=0.6784241404160823&timestamp=1337178173"
        );
    }

    #[test]
    fn test_verify_hmac_accepts_valid_signature() {
        let mut params = callback_params();
        let signature = sign(&params);
        params.insert("hmac".to_string(), signature);
        assert!(verify_hmac(&params, SECRET));
    }

    #[test]
    fn test_verify_hmac_rejects_tampering() {
        let mut params = callback_params();
        let signature = sign(&params);
        params.insert("hmac".to_string(), signature);
        params.insert("shop".to_string(), "other-shop.myshopify.com".to_string());
        assert!(!verify_hmac(&params, SECRET));
    }

    #[test]
    fn test_verify_hmac_rejects_missing_or_garbage() {
        let mut params = callback_params();
        assert!(!verify_hmac(&params, SECRET));
        params.insert("hmac".to_string(), "not-hex".to_string());
        assert!(!verify_hmac(&params, SECRET));
    }

    #[test]
    fn test_authorization_url() {
        let client = OAuthClient::new(config());
        let shop = ShopDomain::parse("some-shop.myshopify.com").unwrap();
        let url = client
            .authorization_url(&shop, "https://app.test/auth/callback", "nonce")
            .unwrap();
        assert_eq!(
            url,
            "https://some-shop.myshopify.com/admin/oauth/authorize?client_id=app-key&scope=read_products%2Cwrite_products&redirect_uri=https%3A%2F%2Fapp.test%2Fauth%2Fcallback&state=nonce"
        );
    }

    #[test]
    fn test_token_debug_redacts() {
        let token = OAuthToken {
            shop: ShopDomain::parse("some-shop.myshopify.com").unwrap(),
            access_token: SecretString::from("shpat_very_secret"),
            scope: "read_products".to_string(),
        };
        assert!(!format!("{token:?}").contains("shpat_very_secret"));
    }
}
