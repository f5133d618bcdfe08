//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::shopify::oauth::OAuthClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    oauth: OAuthClient,
}

impl AppState {
    /// Build state with an OAuth client talking to the real shop endpoints.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let oauth = OAuthClient::new(config.oauth.clone());
        Self::with_oauth(config, oauth)
    }

    /// Build state around an existing OAuth client.
    #[must_use]
    pub fn with_oauth(config: ServerConfig, oauth: OAuthClient) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, oauth }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.inner.oauth
    }
}
