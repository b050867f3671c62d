use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_METRICS_PATH, DEFAULT_PAYMENT_DELAY_MS,
    DEFAULT_PORT, DEFAULT_SAFETY_MARGIN_SECS,
};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    /// Seconds subtracted from a credential's expiry before it is refreshed.
    #[serde(default = "default_safety_margin_seconds")]
    pub safety_margin_seconds: u64,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub logging: Option<LoggingConfig>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            safety_margin_seconds: DEFAULT_SAFETY_MARGIN_SECS,
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            payment: PaymentConfig::default(),
            metrics: MetricsConfig::default(),
            logging: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: String,
    /// prefix for every API route, e.g. "/api"
    #[serde(default)]
    pub base_path: String,
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: String::new(),
            cors: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// applies to credential exchange and resource calls alike
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_HTTP_TIMEOUT_MS }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    /// simulated gateway latency of the demo payment processor
    #[serde(default = "default_payment_delay_ms")]
    pub process_delay_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self { process_delay_ms: DEFAULT_PAYMENT_DELAY_MS }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info".to_owned(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_safety_margin_seconds() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

fn default_port() -> String {
    DEFAULT_PORT.to_owned()
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_payment_delay_ms() -> u64 {
    DEFAULT_PAYMENT_DELAY_MS
}

fn default_metrics_path() -> String {
    DEFAULT_METRICS_PATH.to_string()
}
