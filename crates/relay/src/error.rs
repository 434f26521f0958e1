//! Unified error handling with Sentry integration.
//!
//! Provides a unified `RelayError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, RelayError>`; this module alone decides status codes and the
//! JSON envelope each failure maps to.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{CreditError, DemoError, ShopifyError};

/// Application-level error type for the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required request field is missing or empty. The message names the
    /// offending fields and is returned to the caller verbatim.
    #[error("{0}")]
    Validation(String),

    /// The App Proxy signature did not verify.
    #[error("Invalid proxy signature")]
    InvalidSignature,

    /// The credit-scoring service call failed.
    #[error("Credit check API call failed: {0}")]
    Credit(#[from] CreditError),

    /// A Shopify Admin API call failed.
    #[error("{context}: {source}")]
    Shopify {
        context: &'static str,
        #[source]
        source: ShopifyError,
    },

    /// The demo API call behind `/proxy/test` failed.
    #[error("Proxy error: {0}")]
    Demo(#[from] DemoError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Wrap a Shopify Admin API failure with a caller-facing context line.
    #[must_use]
    pub const fn shopify(context: &'static str, source: ShopifyError) -> Self {
        Self::Shopify { context, source }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        // Capture upstream and internal failures to Sentry; client mistakes
        // (validation, bad signatures) are expected traffic.
        if matches!(
            self,
            Self::Credit(_) | Self::Shopify { .. } | Self::Demo(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, body) = match &self {
            Self::Validation(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": message }),
            ),
            Self::InvalidSignature => (
                StatusCode::FORBIDDEN,
                json!({ "ok": false, "message": "Invalid proxy signature" }),
            ),
            Self::Credit(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "ok": false,
                    "error": "Credit check API call failed",
                    "details": source.to_string(),
                }),
            ),
            Self::Shopify { context, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "ok": false,
                    "error": context,
                    "details": source.to_string(),
                }),
            ),
            Self::Demo(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "ok": false,
                    "message": "Proxy error",
                    "details": source.to_string(),
                }),
            ),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: RelayError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            get_status(RelayError::Validation(
                "Missing required fields: customer_id and purchase_order".to_string()
            )),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn invalid_signature_maps_to_403() {
        assert_eq!(
            get_status(RelayError::InvalidSignature),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn upstream_failures_map_to_500() {
        let cases = vec![
            RelayError::Credit(CreditError::Api {
                status: 503,
                message: "down".to_string(),
            }),
            RelayError::shopify(
                "Failed to generate discount code",
                ShopifyError::Api {
                    status: 401,
                    message: "Invalid access token".to_string(),
                },
            ),
            RelayError::Demo(DemoError::Api {
                status: 500,
                message: "oops".to_string(),
            }),
            RelayError::Internal("misconfigured".to_string()),
        ];

        for err in cases {
            assert_eq!(get_status(err), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn error_display_includes_context() {
        let err = RelayError::shopify(
            "Failed to generate discount code",
            ShopifyError::Api {
                status: 422,
                message: "Invalid discount data - check discount parameters".to_string(),
            },
        );
        let message = err.to_string();
        assert!(message.contains("Failed to generate discount code"));
        assert!(message.contains("Invalid discount data"));
    }
}
