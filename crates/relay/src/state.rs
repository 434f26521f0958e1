//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RelayConfig;
use crate::services::{CreditClient, DemoClient, ShopifyAdminClient};
use crate::signature::ProxySignature;

/// Timeout applied to every outbound call, so a stalled upstream surfaces as
/// a transport failure instead of hanging the request.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(15);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the signature verifier, and the upstream clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RelayConfig,
    verifier: ProxySignature,
    credit: CreditClient,
    shopify: ShopifyAdminClient,
    demo: DemoClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds a single `reqwest` client with a bounded timeout and shares it
    /// across all upstream clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(OUTBOUND_TIMEOUT)
            .build()?;

        let verifier = ProxySignature::new(config.shopify.proxy_secret.clone());
        let credit = CreditClient::new(client.clone(), &config.credit_check_url);
        let shopify = ShopifyAdminClient::new(client.clone(), &config.shopify);
        let demo = DemoClient::new(client, &config.demo_api_url);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                verifier,
                credit,
                shopify,
                demo,
            }),
        })
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Get a reference to the App Proxy signature verifier.
    #[must_use]
    pub fn verifier(&self) -> &ProxySignature {
        &self.inner.verifier
    }

    /// Get a reference to the credit-scoring service client.
    #[must_use]
    pub fn credit(&self) -> &CreditClient {
        &self.inner.credit
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyAdminClient {
        &self.inner.shopify
    }

    /// Get a reference to the demo API client.
    #[must_use]
    pub fn demo(&self) -> &DemoClient {
        &self.inner.demo
    }
}
