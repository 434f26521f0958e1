//! Shopify OAuth route handlers for public-app installs.
//!
//! `GET /auth` redirects the merchant to Shopify's authorization page;
//! `GET /auth/callback` exchanges the authorization code for an access
//! token. The relay is sessionless and keeps no token store - the exchange
//! proves the install completed and the token is discarded with the request.

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{RelayError, Result};
use crate::state::AppState;

/// Scopes requested during install: enough to create price rules and look up
/// discount codes.
const AUTH_SCOPES: &[&str] = &["read_price_rules", "write_price_rules", "write_discounts"];

/// Query parameters for `/auth`.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub shop: Option<String>,
}

/// Query parameters from the Shopify OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for a token.
    pub code: Option<String>,
    /// Shop the merchant authorized.
    pub shop: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// GET `/auth` - start the OAuth install flow.
#[instrument(skip(state))]
pub async fn authorize(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> Result<Redirect> {
    let Some(shop) = query.shop.as_deref().filter(|s| !s.is_empty()) else {
        return Err(RelayError::Validation(
            "Missing required fields: shop".to_string(),
        ));
    };

    let Some(redirect_uri) = state.config().shopify.redirect_uri.as_deref() else {
        return Err(RelayError::Internal(
            "SHOPIFY_REDIRECT_URI is not configured".to_string(),
        ));
    };

    let auth_url = state
        .shopify()
        .authorization_url(shop, AUTH_SCOPES, redirect_uri);

    tracing::info!(shop, "Redirecting to Shopify OAuth");
    Ok(Redirect::to(&auth_url))
}

/// GET `/auth/callback` - exchange the authorization code for a token and
/// confirm the install.
#[instrument(skip(state, query))]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<&'static str>> {
    if let Some(error) = &query.error {
        let description = query.error_description.as_deref().unwrap_or_default();
        tracing::warn!(error, description, "Shopify OAuth authorization failed");
        return Err(RelayError::Validation(format!(
            "OAuth authorization failed: {error}"
        )));
    }

    let (Some(code), Some(shop)) = (
        query.code.as_deref().filter(|v| !v.is_empty()),
        query.shop.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Err(RelayError::Validation(
            "Missing required fields: code and shop".to_string(),
        ));
    };

    let token = state
        .shopify()
        .exchange_code(shop, code)
        .await
        .map_err(|e| RelayError::shopify("OAuth token exchange failed", e))?;

    tracing::info!(shop, scope = %token.scope, "App installed");

    Ok(Html(INSTALL_SUCCESS_PAGE))
}

/// Static confirmation page; the shop name is deliberately not interpolated
/// since it arrives from the query string.
const INSTALL_SUCCESS_PAGE: &str = "<!DOCTYPE html>\n\
<html>\n\
<head><title>ESND Credit Relay</title></head>\n\
<body>\n\
  <h1>App installed</h1>\n\
  <p>The ESND credit relay is now connected to your store. You can close this window.</p>\n\
</body>\n\
</html>\n";
