//! Actions behind the JukeBox function tools.
//!
//! Every callback answers with either the plugin payload or a short sentence
//! the model can relay. Nothing is retried.

use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ToolResult;
use crate::helpers::http_client::HttpClientError;
use crate::jukebox::JukeBoxClient;

const NOT_RESPONDING: &str = "JukeBox plugin is not available or not responding.";

/// Arguments of RoonSearchLyrics
#[derive(Debug, Clone, Deserialize)]
pub struct SearchLyricsParameters {
    pub song: String,
    pub artist: String,
}

fn payload<T: Serialize>(value: &T) -> ToolResult {
    match serde_json::to_value(value) {
        Ok(value) => ToolResult::Payload(value),
        Err(e) => {
            error!("Failed to serialize tool payload: {}", e);
            ToolResult::message("Error serializing JukeBox response. See console for details.")
        }
    }
}

/// Map a request failure to the message of the calling tool
fn failure(e: HttpClientError, unavailable: &str, context: &str, generic: &str) -> ToolResult {
    if e.is_server_error() {
        debug!("{}: {}", context, e);
        ToolResult::message(unavailable)
    } else {
        error!("{}: {}", context, e);
        ToolResult::message(generic)
    }
}

/// RoonGetCurrentTrack
pub async fn get_current_track(client: &JukeBoxClient) -> ToolResult {
    match client.request_current_track().await {
        Ok(response) => match response.track {
            Some(track) if response.success => payload(&track),
            _ => ToolResult::message("No track currently playing on Roon."),
        },
        Err(e) => failure(
            e,
            NOT_RESPONDING,
            "Error fetching current track",
            "Error fetching current track. See console for details.",
        ),
    }
}

/// RoonGetCurrentLyrics
pub async fn get_current_lyrics(client: &JukeBoxClient) -> ToolResult {
    match client.request_current_lyrics().await {
        Ok(response) if response.success => payload(&response),
        Ok(_) => ToolResult::message("No lyrics available for the current track."),
        Err(e) => failure(
            e,
            NOT_RESPONDING,
            "Error fetching current lyrics",
            "Error fetching current lyrics. See console for details.",
        ),
    }
}

/// RoonSearchLyrics
pub async fn search_lyrics(client: &JukeBoxClient, args: Value) -> ToolResult {
    let params: SearchLyricsParameters = match serde_json::from_value(args) {
        Ok(params) => params,
        Err(e) => {
            debug!("Invalid RoonSearchLyrics arguments: {}", e);
            return ToolResult::message("Both a song and an artist are required to search lyrics.");
        }
    };
    if params.song.trim().is_empty() || params.artist.trim().is_empty() {
        return ToolResult::message("Both a song and an artist are required to search lyrics.");
    }

    match client.request_search_lyrics(&params.song, &params.artist).await {
        Ok(response) if response.success => payload(&response),
        Ok(_) => ToolResult::Message(format!(
            "No lyrics found for \"{}\" by {}.",
            params.song, params.artist
        )),
        Err(e) => failure(
            e,
            NOT_RESPONDING,
            "Error searching lyrics",
            "Error searching lyrics. See console for details.",
        ),
    }
}

/// RoonCheckConnection
pub async fn check_connection(client: &JukeBoxClient) -> ToolResult {
    match client.request_probe().await {
        Ok(status) => payload(&status),
        Err(e) => failure(
            e,
            "JukeBox plugin is not available.",
            "Error checking connection",
            "Error checking JukeBox connection. See console for details.",
        ),
    }
}
