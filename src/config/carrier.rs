use anyhow::{bail, Result};
use serde::Deserialize;

use crate::utils::constants::DEFAULT_CARRIER_BASE_URL;

/// Requested operating mode as written in the config file.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CarrierMode {
    /// live when both credentials are present, demo otherwise
    #[default]
    Auto,
    Demo,
    Live,
}

/// Mode the process actually runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Demo,
    Live,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Demo => "demo",
            OperatingMode::Live => "live",
        }
    }
}

/// ================================
/// Upstream carrier
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CarrierConfig {
    #[serde(default)]
    pub mode: CarrierMode,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// use a caller-supplied bearer token instead of the shared credential
    #[serde(default)]
    pub forward_client_token: bool,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            mode: CarrierMode::Auto,
            base_url: default_base_url(),
            client_id: None,
            client_secret: None,
            forward_client_token: false,
        }
    }
}

impl CarrierConfig {
    /// Client id and secret, only when both are set and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        let secret = self.client_secret.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        Some((id, secret))
    }

    pub fn operating_mode(&self) -> Result<OperatingMode> {
        match (self.mode, self.credentials()) {
            (CarrierMode::Demo, _) => Ok(OperatingMode::Demo),
            (CarrierMode::Auto, None) => Ok(OperatingMode::Demo),
            (CarrierMode::Auto, Some(_)) | (CarrierMode::Live, Some(_)) => Ok(OperatingMode::Live),
            (CarrierMode::Live, None) => {
                bail!("carrier.mode is 'live' but client_id/client_secret are not configured")
            }
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_CARRIER_BASE_URL.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carrier(mode: CarrierMode, id: Option<&str>, secret: Option<&str>) -> CarrierConfig {
        CarrierConfig {
            mode,
            client_id: id.map(str::to_owned),
            client_secret: secret.map(str::to_owned),
            ..CarrierConfig::default()
        }
    }

    #[test]
    fn auto_mode_follows_credentials() {
        let demo = carrier(CarrierMode::Auto, Some("id"), Some("  "));
        assert_eq!(demo.operating_mode().unwrap(), OperatingMode::Demo);

        let live = carrier(CarrierMode::Auto, Some("id"), Some("secret"));
        assert_eq!(live.operating_mode().unwrap(), OperatingMode::Live);
        assert_eq!(live.credentials(), Some(("id", "secret")));
    }

    #[test]
    fn explicit_live_without_credentials_is_rejected() {
        assert!(carrier(CarrierMode::Live, None, Some("secret")).operating_mode().is_err());
        let forced_demo = carrier(CarrierMode::Demo, Some("id"), Some("secret"));
        assert_eq!(forced_demo.operating_mode().unwrap(), OperatingMode::Demo);
    }
}
