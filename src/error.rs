//! Error taxonomy surfaced by the HTTP handlers.

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error as ThisError;
use tracing::{error, warn};

/// The carrier's token endpoint could not produce a credential.
#[derive(Debug, Clone, ThisError)]
#[error("credential exchange failed: {reason}")]
pub struct AuthUnavailable {
    /// HTTP status returned by the token endpoint, when it answered at all.
    pub status: Option<u16>,
    /// Raw body returned alongside a rejection.
    pub body: Option<String>,
    pub reason: String,
}

impl AuthUnavailable {
    pub fn rejected(status: u16, body: String) -> Self {
        Self {
            status: Some(status),
            reason: format!("token endpoint responded with {}", status),
            body: Some(body),
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            body: None,
            reason: format!("token endpoint unreachable: {}", err),
        }
    }

    pub fn malformed(err: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            body: None,
            reason: format!("token endpoint returned malformed body: {}", err),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum ApiError {
    /// Missing or malformed request input, detected before any outbound call.
    #[error("{message}")]
    Validation { message: String, fields: Vec<String> },
    #[error(transparent)]
    AuthUnavailable(#[from] AuthUnavailable),
    /// Carrier answered with a non-success status.
    #[error("carrier responded with {status}")]
    Upstream { status: u16, body: String },
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn missing_fields(fields: Vec<String>) -> Self {
        Self::Validation {
            message: format!("missing required fields: {}", fields.join(", ")),
            fields,
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: vec![field.to_owned()],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::AuthUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation { message, fields } => (
                status,
                Json(json!({ "error": "validation_error", "message": message, "fields": fields })),
            )
                .into_response(),
            ApiError::AuthUnavailable(err) => {
                warn!("carrier authentication unavailable: {}", err);
                (
                    status,
                    Json(json!({
                        "error": "auth_unavailable",
                        "message": "carrier authentication is unavailable",
                        "upstream_status": err.status,
                    })),
                )
                    .into_response()
            }
            ApiError::Upstream { status: code, body } => {
                warn!("carrier responded with {}: {}", code, body);
                if body.trim().is_empty() {
                    return (
                        status,
                        Json(json!({
                            "error": "upstream_error",
                            "message": format!("carrier responded with {}", code),
                        })),
                    )
                        .into_response();
                }
                match serde_json::from_str::<Value>(&body) {
                    Ok(value) => (status, Json(value)).into_response(),
                    Err(_) => (status, [(CONTENT_TYPE, "text/plain; charset=utf-8")], body)
                        .into_response(),
                }
            }
            ApiError::NotFound(message) => (
                status,
                Json(json!({ "error": "not_found", "message": message })),
            )
                .into_response(),
            ApiError::Internal(err) => {
                error!("internal error: {:#}", err);
                (
                    status,
                    Json(json!({ "error": "internal_error", "message": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
