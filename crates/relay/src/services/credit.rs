//! Client for the external credit-scoring service.
//!
//! The service exposes a single endpoint, `POST /api/creditCheck/`, and
//! returns an opaque JSON document. The relay forwards it to callers without
//! interpreting its shape beyond the `status`/`credit` fields used by the
//! approval-decision endpoint.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when calling the credit-scoring service.
#[derive(Debug, Error)]
pub enum CreditError {
    /// HTTP request failed (connect, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Credit-scoring service client.
#[derive(Clone)]
pub struct CreditClient {
    client: reqwest::Client,
    base_url: String,
}

impl CreditClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Run a credit check for a customer and purchase order.
    ///
    /// Returns the service's JSON response as-is.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::Http` on transport failure and
    /// `CreditError::Api` when the service responds with a non-2xx status.
    pub async fn check(
        &self,
        customer_id: &str,
        purchase_order: &str,
    ) -> Result<Value, CreditError> {
        let url = format!("{}/api/creditCheck/", self.base_url);
        let body = serde_json::json!({
            "customer_id": customer_id,
            "purchase_order": purchase_order,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CreditError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
