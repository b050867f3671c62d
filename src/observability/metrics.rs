use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token cache metrics
    pub token_exchanges: IntCounter,
    pub token_exchange_failures: IntCounterVec,
    pub token_cache_hits: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Upstream carrier metrics
    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_duration: HistogramVec,

    // Inbound API metrics
    pub http_requests: IntCounterVec,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub demo_mode: IntGauge,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("cdekproxy".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token cache
            token_exchanges: IntCounter::new("token_exchanges_total", "Credential exchange attempts").unwrap(),
            token_exchange_failures: IntCounterVec::new(Opts::new("token_exchange_failures_total", "Credential exchange failures by reason"),&["reason"],).unwrap(),
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Requests served from the cached credential").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry timestamp of the cached credential").unwrap(),

            // Upstream
            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total","Calls to the carrier API by endpoint",),&["endpoint", "method"],).unwrap(),
            upstream_failures: IntCounterVec::new(Opts::new("upstream_failures_total", "Carrier API failures by endpoint and reason"),&["endpoint", "reason"],).unwrap(),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_duration_seconds", "Carrier API call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["endpoint"],).unwrap(),

            // Inbound
            http_requests: IntCounterVec::new(Opts::new("http_requests_total", "Handled API requests"),&["route", "status"],).unwrap(),

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            demo_mode: IntGauge::new("demo_mode", "1 if demo data is served instead of the carrier API").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_exchanges.clone())).unwrap();
        reg.register(Box::new(metrics.token_exchange_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_requests.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_failures.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_duration.clone())).unwrap();
        reg.register(Box::new(metrics.http_requests.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.demo_mode.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
