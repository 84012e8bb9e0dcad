//! Function tools exposed to the language model

pub mod callbacks;
pub mod registry;
pub mod schema;

pub use registry::ToolRegistry;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;

use crate::jukebox::JukeBoxClient;

/// Outcome of a tool call: a sentence for the model to relay, or the raw payload
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Message(String),
    Payload(Value),
}

impl ToolResult {
    pub fn message<S: Into<String>>(text: S) -> Self {
        ToolResult::Message(text.into())
    }

    pub fn as_message(&self) -> Option<&str> {
        match self {
            ToolResult::Message(text) => Some(text),
            ToolResult::Payload(_) => None,
        }
    }

    /// JSON form handed back to the host
    pub fn into_value(self) -> Value {
        match self {
            ToolResult::Message(text) => Value::String(text),
            ToolResult::Payload(value) => value,
        }
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolResult::Message(text) => write!(f, "{}", text),
            ToolResult::Payload(value) => match serde_json::to_string_pretty(value) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "{}", value),
            },
        }
    }
}

/// A named, schema-described action the model may invoke
#[async_trait]
pub trait FunctionTool: Send + Sync {
    /// Name the model calls the tool by
    fn name(&self) -> &str;

    /// Label shown to the user
    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the call arguments
    fn parameters(&self) -> Value;

    /// Run the tool. Failures are reported as a [`ToolResult::Message`].
    async fn invoke(&self, args: Value) -> ToolResult;

    /// Whether the tool may currently be offered to the model
    async fn should_register(&self) -> bool {
        true
    }
}

/// The four JukeBox tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JukeBoxTool {
    GetCurrentTrack,
    GetCurrentLyrics,
    SearchLyrics,
    CheckConnection,
}

impl JukeBoxTool {
    pub fn all() -> [JukeBoxTool; 4] {
        [
            JukeBoxTool::GetCurrentTrack,
            JukeBoxTool::GetCurrentLyrics,
            JukeBoxTool::SearchLyrics,
            JukeBoxTool::CheckConnection,
        ]
    }

    /// Function name registered with the host
    pub fn name(self) -> &'static str {
        match self {
            JukeBoxTool::GetCurrentTrack => "RoonGetCurrentTrack",
            JukeBoxTool::GetCurrentLyrics => "RoonGetCurrentLyrics",
            JukeBoxTool::SearchLyrics => "RoonSearchLyrics",
            JukeBoxTool::CheckConnection => "RoonCheckConnection",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            JukeBoxTool::GetCurrentTrack => "Roon: Get Current Track",
            JukeBoxTool::GetCurrentLyrics => "Roon: Get Current Lyrics",
            JukeBoxTool::SearchLyrics => "Roon: Search Lyrics",
            JukeBoxTool::CheckConnection => "Roon: Check Connection",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            JukeBoxTool::GetCurrentTrack => "Gets the current track playing on Roon. Call when you need to display the current track information.",
            JukeBoxTool::GetCurrentLyrics => "Gets lyrics for the currently playing track on Roon. Call when you need to display lyrics for the current track.",
            JukeBoxTool::SearchLyrics => "Searches for lyrics of a specific song and artist. Call when you need to find lyrics for a particular track.",
            JukeBoxTool::CheckConnection => "Checks if the Roon plugin is connected and operational. Call when you need to verify Roon connectivity.",
        }
    }

    /// Key of the enable flag in the extension settings
    pub fn settings_key(self) -> &'static str {
        match self {
            JukeBoxTool::GetCurrentTrack => "getCurrentTrack",
            JukeBoxTool::GetCurrentLyrics => "getCurrentLyrics",
            JukeBoxTool::SearchLyrics => "searchLyrics",
            JukeBoxTool::CheckConnection => "checkConnection",
        }
    }

    pub fn parameters(self) -> Value {
        match self {
            JukeBoxTool::SearchLyrics => schema::search_lyrics_parameters(),
            _ => schema::no_parameters(),
        }
    }
}

impl FromStr for JukeBoxTool {
    type Err = String;

    /// Accepts the function name or the settings key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JukeBoxTool::all()
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(s) || tool.settings_key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown JukeBox tool: {}", s))
    }
}

impl fmt::Display for JukeBoxTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A JukeBox tool bound to a client
pub struct JukeBoxFunctionTool {
    tool: JukeBoxTool,
    client: JukeBoxClient,
}

impl JukeBoxFunctionTool {
    pub fn new(tool: JukeBoxTool, client: JukeBoxClient) -> Self {
        Self { tool, client }
    }

    pub fn tool(&self) -> JukeBoxTool {
        self.tool
    }
}

#[async_trait]
impl FunctionTool for JukeBoxFunctionTool {
    fn name(&self) -> &str {
        self.tool.name()
    }

    fn display_name(&self) -> &str {
        self.tool.display_name()
    }

    fn description(&self) -> &str {
        self.tool.description()
    }

    fn parameters(&self) -> Value {
        self.tool.parameters()
    }

    async fn invoke(&self, args: Value) -> ToolResult {
        match self.tool {
            JukeBoxTool::GetCurrentTrack => callbacks::get_current_track(&self.client).await,
            JukeBoxTool::GetCurrentLyrics => callbacks::get_current_lyrics(&self.client).await,
            JukeBoxTool::SearchLyrics => callbacks::search_lyrics(&self.client, args).await,
            JukeBoxTool::CheckConnection => callbacks::check_connection(&self.client).await,
        }
    }
}
