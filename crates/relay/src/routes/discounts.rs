//! Discount-code route handlers.
//!
//! `generate-discount` synthesizes a single-use discount code and creates the
//! backing price rule through the Admin API. `apply-discount-code` verifies
//! an existing code; the storefront applies it at checkout, since the Admin
//! API cannot modify carts directly. Nothing is persisted - Shopify is the
//! system of record for issued codes.

use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::present;
use crate::error::{RelayError, Result};
use crate::services::PriceRuleInput;
use crate::state::AppState;

/// Discount-generation request body.
#[derive(Debug, Deserialize)]
pub struct GenerateDiscountRequest {
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub purchase_order: Option<String>,
    /// Accepted as a JSON number or a numeric string; used verbatim as the
    /// discount amount.
    #[serde(default)]
    pub cart_total: Option<Value>,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Discount-generation response envelope.
#[derive(Debug, Serialize)]
pub struct GenerateDiscountResponse {
    pub success: bool,
    pub discount_code: String,
    pub message: String,
    pub price_rule_id: i64,
}

/// POST `/api/generate-discount` (also mounted under `/proxy`).
///
/// Synthesizes a code, creates the price rule, and hands the code back to
/// the caller for use at checkout.
#[instrument(skip(state, body))]
pub async fn generate_discount(
    State(state): State<AppState>,
    Json(body): Json<GenerateDiscountRequest>,
) -> Result<Json<GenerateDiscountResponse>> {
    let shop = present(body.shop.as_ref());
    let customer_id = present(body.customer_id.as_ref());
    let purchase_order = present(body.purchase_order.as_ref());
    let cart_total = body.cart_total.as_ref().and_then(amount_literal);
    let access_token = present(body.access_token.as_ref());

    let (Some(shop), Some(customer_id), Some(purchase_order), Some(cart_total), Some(access_token)) =
        (shop, customer_id, purchase_order, cart_total, access_token)
    else {
        return Err(RelayError::Validation(
            "Missing required fields: shop, customer_id, purchase_order, cart_total, access_token"
                .to_string(),
        ));
    };

    tracing::info!(shop, customer_id, purchase_order, %cart_total, "Generating discount code");

    let now = Utc::now();
    let timestamp_millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let code = synthesize_discount_code(customer_id, timestamp_millis);

    let input = PriceRuleInput {
        title: format!("Credit Discount - {}", customer_tail(customer_id)),
        code: &code,
        amount: &cart_total,
        starts_at: now.to_rfc3339(),
        ends_at: (now + Duration::hours(24)).to_rfc3339(),
    };

    let price_rule = state
        .shopify()
        .create_price_rule(shop, access_token, &input)
        .await
        .map_err(|e| RelayError::shopify("Failed to generate discount code", e))?;

    tracing::info!(
        code = %code,
        price_rule_id = price_rule.id,
        customer_id,
        purchase_order,
        amount = %cart_total,
        "Discount code created"
    );

    Ok(Json(GenerateDiscountResponse {
        success: true,
        discount_code: code,
        message: "Discount code generated successfully".to_string(),
        price_rule_id: price_rule.id,
    }))
}

/// Discount-verification request body.
#[derive(Debug, Deserialize)]
pub struct ApplyDiscountRequest {
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub cart_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Discount-verification response envelope.
#[derive(Debug, Serialize)]
pub struct ApplyDiscountResponse {
    pub success: bool,
    pub message: String,
    pub discount_code: String,
    /// The Admin API's lookup document, forwarded as-is.
    pub discount_info: Value,
    pub note: String,
}

/// POST `/api/apply-discount-code` (also mounted under `/proxy`).
///
/// Verifies that the code exists. Carts cannot be modified through the Admin
/// API, so the storefront enters the code at checkout.
#[instrument(skip(state, body))]
pub async fn apply_discount_code(
    State(state): State<AppState>,
    Json(body): Json<ApplyDiscountRequest>,
) -> Result<Json<ApplyDiscountResponse>> {
    let shop = present(body.shop.as_ref());
    let discount_code = present(body.discount_code.as_ref());
    let cart_token = present(body.cart_token.as_ref());
    let access_token = present(body.access_token.as_ref());

    let (Some(shop), Some(discount_code), Some(cart_token), Some(access_token)) =
        (shop, discount_code, cart_token, access_token)
    else {
        return Err(RelayError::Validation(
            "Missing required fields: shop, discount_code, cart_token, access_token".to_string(),
        ));
    };

    tracing::info!(shop, discount_code, cart_token, "Verifying discount code");

    let discount_info = state
        .shopify()
        .lookup_discount_code(shop, access_token, discount_code)
        .await
        .map_err(|e| RelayError::shopify("Failed to apply discount code", e))?;

    tracing::info!(discount_code, "Discount code verified");

    Ok(Json(ApplyDiscountResponse {
        success: true,
        message: "Discount code verified successfully".to_string(),
        discount_code: discount_code.to_string(),
        discount_info,
        note: "Discount code is valid and ready to use at checkout".to_string(),
    }))
}

/// Synthesize a discount code from the customer identifier and a timestamp.
///
/// `CREDIT_` + the last 8 characters of the customer id uppercased + `_` +
/// the epoch-millisecond timestamp in uppercase base-36. Millisecond
/// resolution keeps codes unique across calls without a persisted counter;
/// Shopify rejects a duplicate code at creation time anyway.
#[must_use]
pub fn synthesize_discount_code(customer_id: &str, timestamp_millis: u64) -> String {
    format!(
        "CREDIT_{}_{}",
        customer_tail(customer_id).to_uppercase(),
        to_base36_upper(timestamp_millis)
    )
}

/// Last 8 characters of the customer identifier.
fn customer_tail(customer_id: &str) -> String {
    let chars: Vec<char> = customer_id.chars().collect();
    let start = chars.len().saturating_sub(8);
    chars.get(start..).unwrap_or_default().iter().collect()
}

/// Render a number in base-36 with uppercase digits.
fn to_base36_upper(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        let digit = *DIGITS
            .get(usize::try_from(n % 36).unwrap_or_default())
            .expect("digit index is below the radix");
        out.push(digit);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base-36 digits are ASCII")
}

/// Read an amount as the literal string sent to the Admin API.
fn amount_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
