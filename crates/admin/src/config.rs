//! Configuration loaded from environment variables.
//!
//! Configuration is read once, at the binary's entry point, into explicit
//! structs that are then passed down. Nothing below this module looks at
//! the environment.
//!
//! # Environment Variables
//!
//! ## Admin API access (`AdminApiConfig`)
//! - `SHOPIFY_STORE_DOMAIN` - Store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Offline Admin API access token (HIGH PRIVILEGE)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//!
//! ## Installation server (`ServerConfig`)
//! - `SHOPIFY_API_KEY` - App client ID
//! - `SHOPIFY_API_SECRET` - App client secret (HIGH PRIVILEGE)
//! - `SHOPIFY_SCOPES` - Comma-separated scopes (default: read/write for
//!   products, orders, customers and inventory)
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `APP_URL` - Public URL of the server; falls back to `https://$VERCEL_URL`,
//!   then `http://localhost:$PORT`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use agent_helper_core::ShopDomain;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2024-01";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";

/// Scopes requested at install time when `SHOPIFY_SCOPES` is unset.
pub const DEFAULT_SCOPES: &[&str] = &[
    "read_products",
    "write_products",
    "read_orders",
    "write_orders",
    "read_customers",
    "write_customers",
    "read_inventory",
    "write_inventory",
];

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "_here",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

// =============================================================================
// Admin API access
// =============================================================================

/// Credential and API version for the Admin API.
///
/// Immutable for the process lifetime. Implements `Debug` manually to redact
/// the HIGH PRIVILEGE access token.
#[derive(Clone)]
pub struct AdminApiConfig {
    /// Store domain (e.g., your-store.myshopify.com)
    pub store_domain: ShopDomain,
    /// Offline access token obtained through the install flow
    pub access_token: SecretString,
    /// Admin API version (e.g., 2024-01)
    pub api_version: String,
}

impl std::fmt::Debug for AdminApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiConfig")
            .field("store_domain", &self.store_domain)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AdminApiConfig {
    /// Build a configuration with the default API version.
    #[must_use]
    pub fn new(store_domain: ShopDomain, access_token: SecretString) -> Self {
        Self {
            store_domain,
            access_token,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the domain or token is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the domain or token is missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let store_domain = env
            .required("SHOPIFY_STORE_DOMAIN")?
            .parse::<ShopDomain>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_STORE_DOMAIN".to_string(), e.to_string()))?;

        let access_token = env.required("SHOPIFY_ACCESS_TOKEN")?;
        reject_placeholder(&access_token, "SHOPIFY_ACCESS_TOKEN")?;

        Ok(Self {
            store_domain,
            access_token: SecretString::from(access_token),
            api_version: env.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
        })
    }
}

// =============================================================================
// Installation server
// =============================================================================

/// OAuth app credentials.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct OAuthConfig {
    /// App client ID
    pub api_key: String,
    /// App client secret (HIGH PRIVILEGE - signs install callbacks)
    pub api_secret: SecretString,
    /// Scopes requested at install time
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Installation server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL used to build the OAuth redirect URI
    pub public_url: String,
    /// OAuth app credentials
    pub oauth: OAuthConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the client secret fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env
            .or_default("HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let public_url = env
            .optional("APP_URL")
            .or_else(|| env.optional("VERCEL_URL").map(|host| format!("https://{host}")))
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let api_secret = env.required("SHOPIFY_API_SECRET")?;
        validate_secret_strength(&api_secret, "SHOPIFY_API_SECRET")?;

        let scopes = env.optional("SHOPIFY_SCOPES").map_or_else(
            || DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            |raw| parse_scopes(&raw),
        );

        let oauth = OAuthConfig {
            api_key: env.required("SHOPIFY_API_KEY")?,
            api_secret: SecretString::from(api_secret),
            scopes,
        };

        Ok(Self {
            host,
            port,
            public_url,
            oauth,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env
                .optional("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: env
                .optional("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.1),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Redirect URI registered for the OAuth callback.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.public_url)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Set and non-blank.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn reject_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    match PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        Some(pattern) => Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        )),
        None => Ok(()),
    }
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    reject_placeholder(secret, var_name)?;

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret from the app dashboard."
            ),
        ));
    }

    Ok(())
}
