use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::carrier::CarrierKind;
use crate::config::carrier::OperatingMode;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::routes;

#[derive(Clone)]
pub struct AppState {
    pub carrier: Arc<CarrierKind>,
    pub settings: Arc<SettingsConfig>,
    pub metrics_state: MetricsState,
}

impl AppState {
    pub fn new(metrics: &Metrics, carrier: CarrierKind, settings: &SettingsConfig) -> Self {
        Self {
            carrier: Arc::new(carrier),
            settings: Arc::new(settings.clone()),
            metrics_state: MetricsState::new(metrics.registry.clone()),
        }
    }
}

async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let response = next.run(request).await;
    get_metrics()
        .await
        .http_requests
        .with_label_values(&[route.as_str(), response.status().as_str()])
        .inc();
    response
}

/// API routes under the configured base path, plus the metrics endpoint.
pub fn build_router(state: AppState) -> Router {
    let base_path = state.settings.server.base_path.trim_end_matches('/').to_owned();
    let api = if base_path.is_empty() {
        routes::router()
    } else {
        Router::new().nest(&base_path, routes::router())
    };

    let mut app = api
        .merge(state.metrics_state.router(&state.settings.metrics))
        .layer(middleware::from_fn(track_requests));
    if state.settings.server.cors {
        app = app.layer(CorsLayer::permissive());
    }
    app.with_state(state)
}

/// Serve the API until the process receives ctrl-c.
pub async fn start(settings_config: &SettingsConfig, carrier: CarrierKind) -> Result<()> {
    let metrics = get_metrics().await;
    let mode = carrier.mode();
    let state = AppState::new(metrics, carrier, settings_config);
    let app = build_router(state);

    let bind_addr = settings_config.server.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("failed to bind {}: {}", bind_addr, e))?;

    metrics.demo_mode.set(i64::from(mode == OperatingMode::Demo));
    metrics.up.set(1);
    info!(
        "listening on {}{}, carrier mode: {}",
        bind_addr,
        settings_config.server.base_path,
        mode.as_str()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .map_err(|e| anyhow!("server error: {}", e))?;

    metrics.up.set(0);
    Ok(())
}
