//! Public HTTP API. Every handler validates its input before touching the
//! carrier, so a rejected request never causes an outbound call.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Map, Value};

use crate::carrier::model::CallerToken;
use crate::error::ApiError;
use crate::server::server::AppState;

pub mod health;
pub mod logistics;
pub mod notifications;
pub mod payments;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth", post(logistics::authenticate))
        .route("/locations", get(logistics::list_locations))
        .route("/locations/search", get(logistics::search_locations))
        .route("/pickup-points", get(logistics::pickup_points))
        .route("/delivery/estimate", post(logistics::estimate))
        .route("/orders", post(logistics::create_order))
        .route("/orders/{id}/status", get(logistics::order_status))
        .route("/payment/init", post(payments::init))
        .route("/payment/process", post(payments::process))
        .route("/notify/order", post(notifications::order))
        .route("/notify/payment", post(notifications::payment))
}

pub(crate) fn caller_token(headers: &HeaderMap) -> CallerToken {
    CallerToken::from_authorization(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
}

/// Request body as JSON; an empty body reads as `{}` so required-field
/// checks report what is missing.
pub(crate) fn json_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid("body", format!("request body is not valid JSON: {}", e)))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::invalid("query", rejection.body_text()))
}
