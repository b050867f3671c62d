use std::{fs, path::Path};
use crate::config::settings::LoggingConfig;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};
use crate::config::proc_validator;

/// Used when no config file is present; credentials come from the environment.
pub const DEFAULT_CONFIG: &str = r#"
settings:
  safety_margin_seconds: ${CDEK_SAFETY_MARGIN_SECONDS:300}
  server:
    host: ${HOST:0.0.0.0}
    port: "${PORT:3000}"
    base_path: "${BASE_PATH:}"
    cors: true
  upstream:
    timeout_ms: ${CDEK_TIMEOUT_MS:5000}
  payment:
    process_delay_ms: 2000
  metrics:
    is_enabled: true
    path: /metrics
  logging:
    level: ${LOG_LEVEL:info}
    format: ${LOG_FORMAT:compact}
carrier:
  mode: ${CDEK_MODE:auto}
  base_url: ${CDEK_BASE_URL:https://api.edu.cdek.ru}
  client_id: ${CDEK_CLIENT_ID:}
  client_secret: ${CDEK_CLIENT_SECRET:}
  forward_client_token: ${CDEK_FORWARD_CLIENT_TOKEN:false}
"#;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(content).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let expanded = expand_env_vars(&content)?;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&expanded)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }
    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .await
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    Ok(service_config)
}

/// Replace `${VAR}` / `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
