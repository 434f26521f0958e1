//! App Proxy signature guard for the `/proxy` subtree.
//!
//! Every request forwarded by Shopify through the App Proxy carries a signed
//! query string. This middleware verifies it before any handler runs; a
//! request that fails verification is rejected with 403 and never reaches
//! business logic or an upstream service.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::RelayError;
use crate::state::AppState;

/// Reject requests whose query string does not carry a valid signature.
///
/// The raw query string is percent-decoded with `form_urlencoded` so the
/// verified values match what Shopify signed, not their encoded form.
pub async fn require_proxy_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let query = request.uri().query().unwrap_or_default();
    let params: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    if !state.verifier().verify_query(&params) {
        tracing::warn!(path = %request.uri().path(), "Rejected proxy request: invalid signature");
        return Err(RelayError::InvalidSignature);
    }

    Ok(next.run(request).await)
}
