use std::path::Path;

use anyhow::{anyhow, Result};

use crate::config::proc_loader::{file_to_config, parse_config, DEFAULT_CONFIG};
use crate::config::types::ServiceConfig;

/// Where the running configuration came from, for the startup log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(String),
    BuiltIn,
}

/// Load the config file, or the built-in environment-driven document when
/// the file does not exist.
pub async fn run(config_path: &str) -> Result<(ServiceConfig, ConfigOrigin)> {
    let path = Path::new(config_path);
    if !path.exists() {
        let config = parse_config(DEFAULT_CONFIG.to_owned())
            .await
            .map_err(|e| anyhow!("Invalid built-in config: {}", e))?;
        return Ok((config, ConfigOrigin::BuiltIn));
    }
    let config = file_to_config(path)
        .await
        .map_err(|e| anyhow!("Invalid config format: {}", e))?;
    Ok((config, ConfigOrigin::File(config_path.to_owned())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn missing_file_falls_back_to_built_in_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let (config, origin) = run(missing.to_str().unwrap()).await.unwrap();
        assert_eq!(origin, ConfigOrigin::BuiltIn);
        assert!(config.settings.metrics.is_enabled);
        assert_eq!(config.settings.metrics.path, "/metrics");
    }

    #[tokio::test]
    async fn broken_file_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "settings: [not, a, map]").unwrap();
        let err = run(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid config format"));
    }
}
