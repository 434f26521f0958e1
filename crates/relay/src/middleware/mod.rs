//! HTTP middleware stack for the relay.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing, added in `main`)
//! 3. CORS (permissive, every response)
//! 4. Proxy signature guard (only on the `/proxy` subtree)

pub mod proxy_auth;

use tower_http::cors::{Any, CorsLayer};

pub use proxy_auth::require_proxy_signature;

/// Permissive CORS: the storefront snippet calls the relay cross-origin from
/// the shop domain. `OPTIONS` pre-flights are answered by the layer itself.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
