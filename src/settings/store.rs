use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use serde_json::{Map, Value};

use super::{Settings, SettingsError, MODULE_NAME};
use crate::host::HostContext;

/// Add every default key missing from `stored`, leaving all other keys alone.
///
/// Returns the keys that were added.
pub fn backfill_defaults(stored: &mut Map<String, Value>) -> Vec<String> {
    let mut added = Vec::new();
    for (key, value) in Settings::defaults_map() {
        if !stored.contains_key(&key) {
            stored.insert(key.clone(), value);
            added.push(key);
        }
    }
    added
}

/// Replace every stored value that does not decode (e.g. a `null` depth or an
/// unknown position code) with its default, leaving all other keys alone.
///
/// Returns the keys that were reset.
pub fn reset_invalid_values(stored: &mut Map<String, Value>) -> Vec<String> {
    let defaults = Settings::defaults_map();
    let mut reset = Vec::new();
    for (key, default) in &defaults {
        let value = match stored.get(key) {
            Some(value) => value.clone(),
            None => continue,
        };
        let mut candidate = defaults.clone();
        candidate.insert(key.clone(), value);
        if serde_json::from_value::<Settings>(Value::Object(candidate)).is_err() {
            stored.insert(key.clone(), default.clone());
            reset.push(key.clone());
        }
    }
    reset
}

/// Shared handle to the extension settings held by the host.
///
/// Cloning the store clones the handle; all clones see the same record.
/// The lock is only held for synchronous reads and edits.
#[derive(Clone)]
pub struct SettingsStore {
    host: Arc<dyn HostContext>,
    settings: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    /// Read the persisted settings from the host, seeding and backfilling defaults
    pub fn load(host: Arc<dyn HostContext>) -> Result<Self, SettingsError> {
        let mut stored = match host.extension_settings(MODULE_NAME) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!("Settings for {} are not an object ({}), using defaults", MODULE_NAME, other);
                Map::new()
            }
            None => {
                info!("No settings for {}, initializing defaults", MODULE_NAME);
                Map::new()
            }
        };

        let added = backfill_defaults(&mut stored);
        if !added.is_empty() {
            debug!("Backfilled settings keys: {:?}", added);
        }

        let reset = reset_invalid_values(&mut stored);
        if !reset.is_empty() {
            warn!("Invalid stored values reset to defaults: {:?}", reset);
        }

        let settings: Settings = serde_json::from_value(Value::Object(stored.clone()))
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;

        host.set_extension_settings(MODULE_NAME, Value::Object(stored));

        Ok(Self {
            host,
            settings: Arc::new(RwLock::new(settings)),
        })
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> Settings {
        match self.settings.read() {
            Ok(settings) => settings.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Edit the settings in place
    pub fn update<R, F>(&self, edit: F) -> Result<R, SettingsError>
    where
        F: FnOnce(&mut Settings) -> R,
    {
        let mut settings = self.settings.write().map_err(|_| SettingsError::Poisoned)?;
        Ok(edit(&mut settings))
    }

    /// Hand the current settings to the host and request a debounced save
    pub fn save(&self) -> Result<(), SettingsError> {
        let value = serde_json::to_value(self.snapshot())
            .map_err(|e| SettingsError::Serialize(e.to_string()))?;
        self.host.set_extension_settings(MODULE_NAME, value);
        self.host.save_settings_debounced();
        Ok(())
    }
}
