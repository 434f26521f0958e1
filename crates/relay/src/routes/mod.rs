//! Route handlers and router composition for the relay.

pub mod credit;
pub mod discounts;
pub mod oauth;
pub mod proxy;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Build the complete relay application.
///
/// The `/proxy` subtree is guarded by the App Proxy signature middleware;
/// everything else is open (the `/api` endpoints authenticate per call with
/// the access token in the request body).
#[must_use]
pub fn app(state: &AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/test/creditCheck", post(credit::test_credit_check))
        .route("/api/credit-check", post(credit::credit_decision))
        .route("/api/generate-discount", post(discounts::generate_discount))
        .route("/api/apply-discount-code", post(discounts::apply_discount_code))
        .route("/auth", get(oauth::authorize))
        .route("/auth/callback", get(oauth::callback))
        .nest("/proxy", proxy::routes(state))
        .layer(cors_layer())
        .with_state(state.clone())
}

/// Liveness endpoint.
///
/// Returns a plain-text banner if the server is running. Does not check
/// upstream dependencies.
async fn root() -> &'static str {
    "ESND credit relay is running"
}

/// A field value counts as present only when it is a non-empty string.
pub(crate) fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}
