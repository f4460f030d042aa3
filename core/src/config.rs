use serde::{Deserialize, Serialize};

/// Start-up settings for an `Engine`. Every field has a default so a partial
/// (or missing) config file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// JSON catalog replacing the built-in factor versions.
    pub catalog_path: Option<String>,
    /// JSON appliance table replacing the built-in one.
    pub appliance_path: Option<String>,
    /// Months projected when a forecast request names no horizon.
    pub default_horizon: u32,
    pub metrics_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            appliance_path: None,
            default_horizon: 3,
            metrics_enabled: true,
        }
    }
}
