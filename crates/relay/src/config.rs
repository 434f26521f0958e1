//! Relay configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_API_KEY` - API key of the Shopify app
//! - `SHOPIFY_API_SECRET` - API secret of the Shopify app
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `HTTPS_PORT` - Additional TLS listen port; requires `TLS_CERT_PATH`
//!   and `TLS_KEY_PATH`
//! - `SHOPIFY_PROXY_SECRET` - App Proxy signing secret (falls back to
//!   `SHOPIFY_API_SECRET` when unset)
//! - `SHOPIFY_REDIRECT_URI` - OAuth callback URL registered with Shopify
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2024-01)
//! - `SHOPIFY_ADMIN_API_BASE` - Overrides the Admin API base URL for all
//!   shops; unset in production, points at a stub server in tests
//! - `CREDIT_CHECK_URL` - Base URL of the credit-scoring service
//! - `DEMO_API_URL` - Base URL of the demo API behind `/proxy/test`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_CREDIT_CHECK_URL: &str = "http://54.148.31.213";
const DEFAULT_DEMO_API_URL: &str = "https://jsonplaceholder.typicode.com";
const DEFAULT_API_VERSION: &str = "2024-01";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Relay application configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Optional TLS listener
    pub tls: Option<TlsConfig>,
    /// Shopify app credentials and API settings
    pub shopify: ShopifyConfig,
    /// Base URL of the credit-scoring service
    pub credit_check_url: String,
    /// Base URL of the demo API behind `/proxy/test`
    pub demo_api_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// TLS listener configuration.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Port for the HTTPS listener
    pub port: u16,
    /// Path to the PEM certificate chain
    pub cert_path: String,
    /// Path to the PEM private key
    pub key_path: String,
}

/// Shopify app configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// API key of the Shopify app (OAuth client id)
    pub api_key: String,
    /// API secret of the Shopify app (OAuth client secret)
    pub api_secret: SecretString,
    /// Secret used to sign App Proxy requests
    pub proxy_secret: SecretString,
    /// OAuth callback URL registered with Shopify
    pub redirect_uri: Option<String>,
    /// Admin API version (e.g. 2024-01)
    pub api_version: String,
    /// Overrides `https://{shop}` as the Admin API base; used by tests
    pub admin_api_base: Option<String>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("proxy_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_version", &self.api_version)
            .field("admin_api_base", &self.admin_api_base)
            .finish()
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            tls: tls_from_env()?,
            shopify: ShopifyConfig::from_env()?,
            credit_check_url: get_env_or_default("CREDIT_CHECK_URL", DEFAULT_CREDIT_CHECK_URL),
            demo_api_url: get_env_or_default("DEMO_API_URL", DEFAULT_DEMO_API_URL),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the plain HTTP listener.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns the socket address for the TLS listener, when configured.
    #[must_use]
    pub fn tls_socket_addr(&self) -> Option<SocketAddr> {
        self.tls
            .as_ref()
            .map(|tls| SocketAddr::new(self.host, tls.port))
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            api_secret: get_required_secret("SHOPIFY_API_SECRET")?,
            proxy_secret: get_proxy_secret()?,
            redirect_uri: get_optional_env("SHOPIFY_REDIRECT_URI"),
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            admin_api_base: get_optional_env("SHOPIFY_ADMIN_API_BASE"),
        })
    }
}

/// Optional TLS listener from `HTTPS_PORT` + certificate paths.
fn tls_from_env() -> Result<Option<TlsConfig>, ConfigError> {
    let Some(port) = get_optional_env("HTTPS_PORT") else {
        return Ok(None);
    };
    let port = port
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar("HTTPS_PORT".to_string(), e.to_string()))?;

    Ok(Some(TlsConfig {
        port,
        cert_path: get_required_env("TLS_CERT_PATH")?,
        key_path: get_required_env("TLS_KEY_PATH")?,
    }))
}

/// Proxy signing secret with fallback to the app's API secret.
fn get_proxy_secret() -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var("SHOPIFY_PROXY_SECRET") {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("SHOPIFY_API_SECRET") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar("SHOPIFY_PROXY_SECRET".to_string()))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
