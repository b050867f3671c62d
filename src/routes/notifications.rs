//! Order and payment notifications are only logged; no message is delivered.
//!
//! Fields are read one by one, so a payload with an unexpected shape in one
//! field still yields the others (in particular the order id echoed back).

use axum::body::Bytes;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAck {
    pub success: bool,
    pub message: &'static str,
    pub order_id: Option<Value>,
}

/// Parses the body as JSON; anything unreadable is logged and treated as empty.
fn parse(kind: &str, body: &Bytes) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        warn!("{} notification payload unreadable: {}", kind, e);
        Value::Null
    })
}

fn value_at(payload: &Value, pointer: &str) -> Option<Value> {
    payload.pointer(pointer).filter(|v| !v.is_null()).cloned()
}

fn first_field(payload: &Value, pointers: &[&str]) -> Option<Value> {
    pointers.iter().find_map(|pointer| value_at(payload, pointer))
}

fn or_dash(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_owned(),
    }
}

pub async fn order(body: Bytes) -> Json<NotificationAck> {
    let payload = parse("order", &body);
    let order_id = first_field(&payload, &["/id", "/orderId"]);
    info!(
        "order notification received: order={}, customer={}, total={}, delivery={}",
        or_dash(order_id.as_ref()),
        or_dash(value_at(&payload, "/customer/name").as_ref()),
        or_dash(value_at(&payload, "/total").as_ref()),
        or_dash(value_at(&payload, "/delivery/city/name").as_ref())
    );
    Json(NotificationAck {
        success: true,
        message: "Notification logged",
        order_id,
    })
}

pub async fn payment(body: Bytes) -> Json<NotificationAck> {
    let payload = parse("payment", &body);
    let order_id = first_field(&payload, &["/orderId", "/order_id"]);
    info!(
        "payment notification received: order={}, amount={}, customer={}",
        or_dash(order_id.as_ref()),
        or_dash(value_at(&payload, "/amount").as_ref()),
        or_dash(value_at(&payload, "/customer/name").as_ref())
    );
    Json(NotificationAck {
        success: true,
        message: "Payment notification logged",
        order_id,
    })
}
