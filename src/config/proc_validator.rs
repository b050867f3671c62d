//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Server address, route prefix and metrics path rules
//! - Upstream timeout and carrier URL rules
//! - Demo/live mode consistency with configured credentials

use regex::Regex;
use tracing::{error, info};

use crate::config::carrier::CarrierConfig;
use crate::config::settings::{LoggingConfig, SettingsConfig};
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_carrier(&cfg.carrier, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    let server = &settings.server;
    if server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port number",
            server.port
        ));
    }
    let base_path = server.base_path.as_str();
    if !base_path.is_empty() && (!base_path.starts_with('/') || base_path.ends_with('/')) {
        errors.push(format!(
            "settings.server.base_path '{}' must start with '/' and must not end with '/'",
            base_path
        ));
    }

    if settings.upstream.timeout_ms == 0 {
        errors.push("settings.upstream.timeout_ms must be greater than 0".to_string());
    }

    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        validate_logging(logging, errors);
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' must be one of {:?}",
            logging.level, LOG_LEVELS
        ));
    }
}

fn validate_carrier(carrier: &CarrierConfig, errors: &mut Vec<String>) {
    match Regex::new(r"^https?://[^\s/]+(/\S*)?$") {
        Ok(url_re) if !url_re.is_match(&carrier.base_url) => errors.push(format!(
            "carrier.base_url '{}' must be an absolute http(s) URL",
            carrier.base_url
        )),
        Ok(_) => {}
        Err(e) => errors.push(format!("carrier.base_url check failed: {}", e)),
    }

    if let Err(e) = carrier.operating_mode() {
        errors.push(e.to_string());
    }
}
