//! App Proxy subtree.
//!
//! Shopify forwards storefront requests for `/apps/ext/*` to `/proxy/*` with
//! a signed query string. The signature middleware rejects anything that
//! does not verify; handlers here can trust the request came through
//! Shopify.

use axum::{
    Json, Router,
    extract::State,
    http::Uri,
    middleware,
    routing::{any, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::{credit, discounts};
use crate::error::Result;
use crate::middleware::require_proxy_signature;
use crate::state::AppState;

/// Build the `/proxy` router with the signature guard applied to every
/// route, including the fallback.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/creditCheck", post(credit::proxy_credit_check))
        .route("/generate-discount", post(discounts::generate_discount))
        .route("/apply-discount-code", post(discounts::apply_discount_code))
        .route("/test", any(proxy_test))
        .fallback(proxy_fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_proxy_signature,
        ))
}

/// Demo response envelope.
#[derive(Debug, Serialize)]
pub struct ProxyTestResponse {
    pub ok: bool,
    pub banner: String,
    pub when: String,
}

/// `/proxy/test` - demo endpoint that calls a public API and reports what it
/// said, to exercise the full signed round trip from the storefront.
#[instrument(skip(state))]
async fn proxy_test(State(state): State<AppState>) -> Result<Json<ProxyTestResponse>> {
    let todo = state.demo().fetch_todo().await?;

    Ok(Json(ProxyTestResponse {
        ok: true,
        banner: format!("External API says: \"{}\"", todo.title),
        when: Utc::now().to_rfc3339(),
    }))
}

/// Catch-all for signed requests to unrecognized subpaths.
async fn proxy_fallback(uri: Uri) -> Json<Value> {
    Json(serde_json::json!({
        "ok": true,
        "message": format!("Reached proxy at {}", uri.path()),
    }))
}
