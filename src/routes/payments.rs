//! Stubbed payment flow. Nothing is charged; every accepted request gets a
//! synthetic acknowledgment.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::carrier::model::{from_json, RequiredFields};
use crate::error::ApiError;
use crate::helpers::time::now_millis;
use crate::routes::json_body;
use crate::server::server::AppState;

fn is_absent(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitRequest {
    pub order_id: Option<Value>,
    pub amount: Option<Value>,
    pub description: Option<String>,
}

impl RequiredFields for PaymentInitRequest {
    fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if is_absent(&self.order_id) {
            missing.push("orderId".to_owned());
        }
        if is_absent(&self.amount) {
            missing.push("amount".to_owned());
        }
        missing
    }
}

#[derive(Default, Deserialize)]
pub struct Card {
    pub number: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProcessRequest {
    pub order_id: Option<Value>,
    pub amount: Option<Value>,
    pub card: Option<Card>,
}

impl RequiredFields for PaymentProcessRequest {
    fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if is_absent(&self.order_id) {
            missing.push("orderId".to_owned());
        }
        if is_absent(&self.amount) {
            missing.push("amount".to_owned());
        }
        match &self.card {
            None => missing.push("card".to_owned()),
            Some(card) => {
                if card.number.as_deref().map(str::trim).map_or(true, str::is_empty) {
                    missing.push("card.number".to_owned());
                }
            }
        }
        missing
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentInitResponse {
    pub success: bool,
    #[serde(rename = "PaymentURL")]
    pub payment_url: Option<String>,
    pub payment_id: String,
    pub message: &'static str,
    pub order_id: Value,
    pub amount: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentProcessResponse {
    pub success: bool,
    pub transaction_id: String,
    pub amount: Value,
    pub message: &'static str,
    pub order_id: Value,
}

pub async fn init(body: Bytes) -> Result<Json<PaymentInitResponse>, ApiError> {
    let request: PaymentInitRequest = from_json(json_body(&body)?)?;
    request.validate()?;
    let response = PaymentInitResponse {
        success: true,
        payment_url: None,
        payment_id: format!("demo-{}", now_millis()),
        message: "Payment initialized (demo mode)",
        order_id: request.order_id.unwrap_or_default(),
        amount: request.amount.unwrap_or_default(),
    };
    info!(
        "payment initialized: order={}, amount={}, payment_id={}",
        response.order_id, response.amount, response.payment_id
    );
    Ok(Json(response))
}

/// Card data is validated for presence only and never logged.
pub async fn process(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PaymentProcessResponse>, ApiError> {
    let request: PaymentProcessRequest = from_json(json_body(&body)?)?;
    request.validate()?;

    let delay = state.settings.payment.process_delay_ms;
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let response = PaymentProcessResponse {
        success: true,
        transaction_id: format!("demo-txn-{}", now_millis()),
        amount: request.amount.unwrap_or_default(),
        message: "Payment processed successfully (demo)",
        order_id: request.order_id.unwrap_or_default(),
    };
    info!(
        "payment processed: order={}, amount={}, transaction_id={}",
        response.order_id, response.amount, response.transaction_id
    );
    Ok(Json(response))
}
