use serde::Deserialize;

use crate::config::{carrier::CarrierConfig, settings::SettingsConfig};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub carrier: CarrierConfig,
}
