//! Wire formats of the JukeBox plugin endpoints

use serde::{Deserialize, Serialize};

use super::lyrics::Lyrics;
use super::track::{Track, TrackSummary};

/// Status string reported by the probe endpoint when Roon is paired
pub const STATUS_CONNECTED: &str = "connected";

/// Response of `GET /probe`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub has_track: bool,
}

impl ProbeResponse {
    /// Check if the plugin reports an active Roon connection
    pub fn is_connected(&self) -> bool {
        self.status == STATUS_CONNECTED
    }
}

/// Response of `GET /current-track`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentTrackResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<Track>,
    #[serde(default)]
    pub connected: bool,
}

/// Response of `GET /current-lyrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentLyricsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Lyrics>,
}

/// Body of `POST /search-lyrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchLyricsRequest {
    pub song: String,
    pub artist: String,
}

/// Response of `POST /search-lyrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchLyricsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<SearchLyricsRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Lyrics>,
}
