//! Credit-check route handlers.
//!
//! Three callers reach the credit-scoring service through the relay: the
//! open test endpoint, the signed App Proxy endpoint, and the
//! approval-decision endpoint that compares available credit against a cart
//! total.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::present;
use crate::error::{RelayError, Result};
use crate::state::AppState;

/// Credit-check request body.
#[derive(Debug, Deserialize)]
pub struct CreditCheckRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub purchase_order: Option<String>,
    /// Echoed back to the caller; not forwarded upstream.
    #[serde(default)]
    pub check_date: Option<String>,
}

/// Credit-check response envelope.
#[derive(Debug, Serialize)]
pub struct CreditCheckResponse {
    pub ok: bool,
    /// The credit-scoring service's response, forwarded as-is.
    pub credit_check: Value,
    pub request_data: RequestData,
    pub timestamp: String,
}

/// Echo of the validated request fields.
#[derive(Debug, Serialize)]
pub struct RequestData {
    pub customer_id: String,
    pub purchase_order: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_date: Option<String>,
}

/// POST `/test/creditCheck` - direct credit check, no signature required.
#[instrument(skip(state, body))]
pub async fn test_credit_check(
    State(state): State<AppState>,
    Json(body): Json<CreditCheckRequest>,
) -> Result<Json<CreditCheckResponse>> {
    run_credit_check(&state, &body, true).await.map(Json)
}

/// POST `/proxy/creditCheck` - credit check behind the App Proxy signature.
#[instrument(skip(state, body))]
pub async fn proxy_credit_check(
    State(state): State<AppState>,
    Json(body): Json<CreditCheckRequest>,
) -> Result<Json<CreditCheckResponse>> {
    run_credit_check(&state, &body, false).await.map(Json)
}

async fn run_credit_check(
    state: &AppState,
    body: &CreditCheckRequest,
    echo_check_date: bool,
) -> Result<CreditCheckResponse> {
    let (Some(customer_id), Some(purchase_order)) = (
        present(body.customer_id.as_ref()),
        present(body.purchase_order.as_ref()),
    ) else {
        return Err(RelayError::Validation(
            "Missing required fields: customer_id and purchase_order".to_string(),
        ));
    };

    tracing::info!(customer_id, purchase_order, "Running credit check");

    let credit_check = state.credit().check(customer_id, purchase_order).await?;

    Ok(CreditCheckResponse {
        ok: true,
        credit_check,
        request_data: RequestData {
            customer_id: customer_id.to_string(),
            purchase_order: purchase_order.to_string(),
            check_date: if echo_check_date {
                body.check_date.clone()
            } else {
                None
            },
        },
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Approval-decision request body.
#[derive(Debug, Deserialize)]
pub struct CreditDecisionRequest {
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub purchase_order: Option<String>,
    /// Accepted as a JSON number or a numeric string.
    #[serde(default)]
    pub cart_total: Option<Value>,
}

/// Approval decision relative to the cart total.
#[derive(Debug, Serialize)]
pub struct CreditDecisionResponse {
    pub ok: bool,
    pub approved: bool,
    /// Status reported by the credit-scoring service.
    pub status: String,
    /// Credit amount reported by the credit-scoring service.
    pub credit: f64,
    pub cart_total: f64,
    pub message: String,
    pub timestamp: String,
}

/// POST `/api/credit-check` - approve or decline a cart against the
/// customer's available credit.
#[instrument(skip(state, body))]
pub async fn credit_decision(
    State(state): State<AppState>,
    Json(body): Json<CreditDecisionRequest>,
) -> Result<Json<CreditDecisionResponse>> {
    let shop = present(body.shop.as_ref());
    let customer_id = present(body.customer_id.as_ref());
    let purchase_order = present(body.purchase_order.as_ref());
    let cart_total = body.cart_total.as_ref().and_then(numeric_amount);

    let (Some(shop), Some(customer_id), Some(purchase_order), Some(cart_total)) =
        (shop, customer_id, purchase_order, cart_total)
    else {
        return Err(RelayError::Validation(
            "Missing required fields: shop, customer_id, purchase_order, cart_total".to_string(),
        ));
    };

    tracing::info!(shop, customer_id, purchase_order, cart_total, "Deciding credit approval");

    let credit_check = state.credit().check(customer_id, purchase_order).await?;

    let status = credit_check
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let credit = credit_check
        .get("credit")
        .and_then(numeric_amount)
        .unwrap_or(0.0);

    let approved = status == "success" && credit >= cart_total;
    let message = if approved {
        "Credit approved for this order"
    } else if status == "success" {
        "Insufficient credit for this order"
    } else {
        "Credit check was not successful"
    };

    Ok(Json(CreditDecisionResponse {
        ok: true,
        approved,
        status,
        credit,
        cart_total,
        message: message.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// Read an amount that may arrive as a JSON number or a numeric string.
pub(crate) fn numeric_amount(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_amount_reads_numbers_and_numeric_strings() {
        assert_eq!(numeric_amount(&json!(500)), Some(500.0));
        assert_eq!(numeric_amount(&json!(12.5)), Some(12.5));
        assert_eq!(numeric_amount(&json!("500")), Some(500.0));
        assert_eq!(numeric_amount(&json!("12.5")), Some(12.5));
    }

    #[test]
    fn numeric_amount_rejects_non_numbers() {
        assert_eq!(numeric_amount(&json!("")), None);
        assert_eq!(numeric_amount(&json!("abc")), None);
        assert_eq!(numeric_amount(&json!(null)), None);
        assert_eq!(numeric_amount(&json!({"amount": 1})), None);
    }
}
