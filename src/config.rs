// Configuration utilities for the JukeBox prompt host
//
// The JukeBox section lives in the "services" subtree; a top-level "jukebox"
// key from older config files is still accepted.

use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::logging::LoggingConfig;

/// Name of the JukeBox section in the config file
pub const SERVICE_NAME: &str = "jukebox";

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/jukebox.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Helper function to get service configuration with backward compatibility
///
/// This function first tries to find the service in the "services" structure,
/// then falls back to the old top-level structure.
///
/// # Arguments
/// * `config` - The configuration JSON object
/// * `service_name` - The name of the service to look up (e.g., "jukebox")
///
/// # Returns
/// * `Option<&serde_json::Value>` - The service configuration if found, None otherwise
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use jukebox_prompt::config::get_service_config;
///
/// let config = json!({
///   "services": {
///     "jukebox": { "base_url": "http://roon.local:8000" }
///   }
/// });
///
/// if let Some(jukebox) = get_service_config(&config, "jukebox") {
///     assert_eq!(jukebox["base_url"], "http://roon.local:8000");
/// }
///
/// let old_config = json!({
///   "jukebox": { "timeout_secs": 2 }
/// });
///
/// if let Some(jukebox) = get_service_config(&old_config, "jukebox") {
///     assert_eq!(jukebox["timeout_secs"], 2);
/// }
/// ```
pub fn get_service_config<'a>(config: &'a Value, service_name: &str) -> Option<&'a Value> {
    if let Some(services) = config.get("services") {
        if let Some(service_config) = services.get(service_name) {
            debug!("Found {} configuration in services section", service_name);
            return Some(service_config);
        }
    }

    if let Some(service_config) = config.get(service_name) {
        debug!("Found {} configuration at top level (legacy structure)", service_name);
        return Some(service_config);
    }

    debug!("No {} configuration found in either services section or top level", service_name);
    None
}

/// Settings of the JukeBox service section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JukeBoxConfig {
    /// Server running the roon-lyrics plugin
    pub base_url: String,
    pub timeout_secs: u64,
    /// File holding the extension settings of the local host
    pub settings_file: String,
    /// Values of the `{{user}}` and `{{char}}` macros
    pub user_name: String,
    pub char_name: String,
    pub save_debounce_ms: u64,
}

impl Default for JukeBoxConfig {
    fn default() -> Self {
        JukeBoxConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 5,
            settings_file: "jukebox-settings.json".to_string(),
            user_name: "User".to_string(),
            char_name: "Assistant".to_string(),
            save_debounce_ms: 1000,
        }
    }
}

/// Whole application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub jukebox: JukeBoxConfig,
    pub logging: Option<LoggingConfig>,
}

impl AppConfig {
    /// Load the configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Loading configuration from {:?}", path);
        Self::from_json_str(&content)
    }

    /// Parse the configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let jukebox = match get_service_config(value, SERVICE_NAME) {
            Some(section) => serde_json::from_value(section.clone())
                .map_err(|e| ConfigError::Parse(format!("{} section: {}", SERVICE_NAME, e)))?,
            None => JukeBoxConfig::default(),
        };

        let logging = match value.get("logging") {
            Some(section) => Some(
                serde_json::from_value(section.clone())
                    .map_err(|e| ConfigError::Parse(format!("logging section: {}", e)))?,
            ),
            None => None,
        };

        Ok(AppConfig { jukebox, logging })
    }

    /// Load `path` if given, else the default file if it exists, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No config file at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(AppConfig::default())
                }
            }
        }
    }
}
