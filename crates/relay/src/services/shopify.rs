//! Shopify Admin REST API client.
//!
//! Covers the small slice of the Admin API the relay needs: price-rule
//! creation (discount codes), discount-code lookup, and the OAuth
//! authorization-code exchange. Every call targets
//! `https://{shop}/admin/api/{version}/...` with the access token supplied
//! per request; the relay never stores tokens.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::instrument;

use crate::config::ShopifyConfig;

/// Errors that can occur when calling the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (connect, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Admin API rejected the call; the message is already classified by
    /// status code.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// OAuth token exchange failed.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

impl ShopifyError {
    /// Classify a non-2xx Admin API response into a caller-facing message.
    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match status.as_u16() {
            401 => "Invalid access token - please check your Shopify app permissions".to_string(),
            403 => "Insufficient permissions - app needs write_discounts scope".to_string(),
            422 => "Invalid discount data - check discount parameters".to_string(),
            code => format!("Shopify API error: {code} - {body}"),
        };

        Self::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// OAuth access token returned by Shopify.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    /// The access token for Admin API calls
    pub access_token: String,
    /// Granted scopes
    pub scope: String,
}

/// Input for creating a price rule with an attached discount code.
#[derive(Debug)]
pub struct PriceRuleInput<'a> {
    /// Internal price-rule title.
    pub title: String,
    /// Customer-facing discount code.
    pub code: &'a str,
    /// Fixed discount amount; sent negated, covering the full cart total.
    pub amount: &'a str,
    /// When the discount becomes active (ISO 8601 datetime).
    pub starts_at: String,
    /// When the discount expires (ISO 8601 datetime).
    pub ends_at: String,
}

/// Created price rule.
#[derive(Debug, Deserialize)]
pub struct PriceRule {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct PriceRuleEnvelope {
    price_rule: PriceRule,
}

/// Shopify Admin REST API client.
#[derive(Clone)]
pub struct ShopifyAdminClient {
    client: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    api_version: String,
    /// Replaces `https://{shop}` for all calls; set by tests.
    base_override: Option<String>,
}

impl ShopifyAdminClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ShopifyConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_version: config.api_version.clone(),
            base_override: config.admin_api_base.clone(),
        }
    }

    fn shop_url(&self, shop: &str, path: &str) -> String {
        match &self.base_override {
            Some(base) => format!("{}{path}", base.trim_end_matches('/')),
            None => format!("https://{shop}{path}"),
        }
    }

    fn admin_url(&self, shop: &str, resource: &str) -> String {
        self.shop_url(shop, &format!("/admin/api/{}/{resource}", self.api_version))
    }

    /// Create a price rule with a single attached discount code.
    ///
    /// The rule is a fixed-amount discount over the whole cart, valid for
    /// 24 hours and usable once.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` on transport failure and a classified
    /// `ShopifyError::Api` when the Admin API rejects the call.
    #[instrument(skip(self, access_token, input), fields(shop = %shop, code = %input.code))]
    pub async fn create_price_rule(
        &self,
        shop: &str,
        access_token: &str,
        input: &PriceRuleInput<'_>,
    ) -> Result<PriceRule, ShopifyError> {
        let url = self.admin_url(shop, "price_rules.json");
        let body = json!({
            "price_rule": {
                "title": input.title,
                "target_type": "line_item",
                "target_selection": "all",
                "allocation_method": "across",
                "value_type": "fixed_amount",
                "value": format!("-{}", input.amount),
                "customer_selection": "all",
                "starts_at": input.starts_at,
                "ends_at": input.ends_at,
                "usage_limit": 1,
                "applies_once": true,
                "discount_codes": [{
                    "code": input.code,
                    "usage_count": 0,
                }],
            }
        });

        let response = self
            .client
            .post(&url)
            .header("X-Shopify-Access-Token", access_token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %text, "Price rule creation failed");
            return Err(ShopifyError::from_status(status, &text));
        }

        let envelope: PriceRuleEnvelope = response.json().await?;
        Ok(envelope.price_rule)
    }

    /// Look up a discount code by its customer-facing code.
    ///
    /// Returns the Admin API's lookup document as-is.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` on transport failure and a classified
    /// `ShopifyError::Api` when the code is unknown or the call is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn lookup_discount_code(
        &self,
        shop: &str,
        access_token: &str,
        code: &str,
    ) -> Result<Value, ShopifyError> {
        let url = self.admin_url(shop, "discount_codes/lookup.json");

        let response = self
            .client
            .get(&url)
            .query(&[("code", code)])
            .header("X-Shopify-Access-Token", access_token)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::from_status(status, &text));
        }

        Ok(response.json().await?)
    }

    // =========================================================================
    // OAuth Flow
    // =========================================================================

    /// Generate the OAuth authorization URL for a shop.
    ///
    /// Redirect the merchant to this URL to begin the install flow.
    #[must_use]
    pub fn authorization_url(&self, shop: &str, scopes: &[&str], redirect_uri: &str) -> String {
        let scope = scopes.join(",");
        format!(
            "https://{shop}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}",
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&scope),
            urlencoding::encode(redirect_uri)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Call this in the OAuth callback handler after the merchant authorizes.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if the exchange is rejected and
    /// `ShopifyError::Http` if the request itself fails.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, shop: &str, code: &str) -> Result<AccessToken, ShopifyError> {
        let url = self.shop_url(shop, "/admin/oauth/access_token");

        let params = [
            ("client_id", self.api_key.as_str()),
            ("client_secret", self.api_secret.expose_secret()),
            ("code", code),
        ];

        let response = self.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::OAuth(format!(
                "Token exchange failed: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}
