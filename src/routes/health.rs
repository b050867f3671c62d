use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::config::carrier::OperatingMode;
use crate::server::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub cdek_configured: bool,
    pub mode: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mode = state.carrier.mode();
    Json(HealthResponse {
        status: "OK",
        message: "Backend is running",
        cdek_configured: mode == OperatingMode::Live,
        mode: mode.as_str(),
    })
}
