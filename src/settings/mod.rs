//! Extension settings: the persisted record, its store and the form bindings

pub mod form;
pub mod store;

pub use form::{SettingEffect, SettingInput, SettingsForm};
pub use store::SettingsStore;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::data::{InjectionPosition, InjectionRole};
use crate::functions::JukeBoxTool;

/// Key of this extension in the host's settings object
pub const MODULE_NAME: &str = "roon-jukebox";

pub const DEFAULT_TEMPLATE: &str =
    "[{{user}} is listening to {{song}} by {{artist}} from {{album}} on Roon in {{zone}}]";

/// Default poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL: u64 = 5000;

/// Errors that can occur while loading or editing settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid stored settings: {0}")]
    Invalid(String),

    #[error("Invalid value '{value}' for {field}")]
    InvalidInput { field: &'static str, value: String },

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    #[error("Settings lock poisoned")]
    Poisoned,
}

/// Persisted extension configuration.
///
/// Keys are stored in camelCase. Keys this version does not know are kept
/// in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Prompt template, placeholders resolved by the host
    pub template: String,
    pub position: InjectionPosition,
    pub role: InjectionRole,
    pub depth: i64,
    /// Let the host's world-info scan see the injected text
    pub scan: bool,
    pub include_lyrics: bool,
    /// Poll interval in milliseconds
    pub poll_interval: u64,
    pub get_current_track: bool,
    pub get_current_lyrics: bool,
    pub search_lyrics: bool,
    pub check_connection: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            template: DEFAULT_TEMPLATE.to_string(),
            position: InjectionPosition::InChat,
            role: InjectionRole::System,
            depth: 1,
            scan: true,
            include_lyrics: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            get_current_track: true,
            get_current_lyrics: true,
            search_lyrics: true,
            check_connection: false,
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Whether the tool should be registered with the host
    pub fn tool_enabled(&self, tool: JukeBoxTool) -> bool {
        match tool {
            JukeBoxTool::GetCurrentTrack => self.get_current_track,
            JukeBoxTool::GetCurrentLyrics => self.get_current_lyrics,
            JukeBoxTool::SearchLyrics => self.search_lyrics,
            JukeBoxTool::CheckConnection => self.check_connection,
        }
    }

    pub fn set_tool_enabled(&mut self, tool: JukeBoxTool, enabled: bool) {
        match tool {
            JukeBoxTool::GetCurrentTrack => self.get_current_track = enabled,
            JukeBoxTool::GetCurrentLyrics => self.get_current_lyrics = enabled,
            JukeBoxTool::SearchLyrics => self.search_lyrics = enabled,
            JukeBoxTool::CheckConnection => self.check_connection = enabled,
        }
    }

    /// True if a cycle would inject anything at all
    pub fn injection_enabled(&self) -> bool {
        self.position.is_enabled() && !self.template.is_empty()
    }

    /// The default record as a JSON object
    pub fn defaults_map() -> Map<String, Value> {
        match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
