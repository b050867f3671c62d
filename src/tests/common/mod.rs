// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::{json, Value};
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;

use reqwest::Client;

use crate::carrier::demo::DemoCarrier;
use crate::carrier::{build_carrier, CarrierKind};
use crate::config::carrier::CarrierMode;
use crate::config::settings::SettingsConfig;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;
use crate::server::server::{build_router, AppState};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Settings tuned for tests: metrics on, no simulated payment latency.
pub fn test_settings() -> SettingsConfig {
    let mut settings = SettingsConfig::default();
    settings.metrics.is_enabled = true;
    settings.payment.process_delay_ms = 10;
    settings
}

pub async fn spawn_app(settings: SettingsConfig, carrier: CarrierKind) -> (JoinHandle<()>, String) {
    let state = AppState::new(get_metrics().await, carrier, &settings);
    let (handle, addr) = spawn_axum(build_router(state)).await;
    (handle, format!("http://{}{}", addr, settings.server.base_path))
}

pub async fn spawn_demo() -> (JoinHandle<()>, String) {
    spawn_app(test_settings(), CarrierKind::Demo(DemoCarrier::new())).await
}

/// Live-mode app whose carrier API lives at `upstream_base_url`.
pub async fn spawn_live(upstream_base_url: &str, forward_client_token: bool) -> (JoinHandle<()>, String) {
    let mut config = ServiceConfig::default();
    config.settings = test_settings();
    config.carrier.mode = CarrierMode::Live;
    config.carrier.base_url = upstream_base_url.to_owned();
    config.carrier.client_id = Some("test-client".into());
    config.carrier.client_secret = Some("test-secret".into());
    config.carrier.forward_client_token = forward_client_token;
    let carrier = build_carrier(&config).expect("live carrier");
    spawn_app(config.settings, carrier).await
}
