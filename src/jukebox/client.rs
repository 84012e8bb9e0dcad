use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::data::{
    CurrentLyricsResponse, CurrentTrackResponse, ProbeResponse, SearchLyricsRequest,
    SearchLyricsResponse, Track,
};
use crate::helpers::http_client::{post_json, HttpClient, HttpClientError};
use super::JukeBoxEndpoints;

/// Thin client for the JukeBox plugin endpoints.
///
/// Two layers are offered. The `request_*` methods return the decoded
/// response or the transport error, so callers can word their own messages.
/// The `probe`/`fetch_*`/`search_lyrics` methods degrade every failure
/// (unreachable, non-2xx, malformed, `success: false`) to `None` after
/// logging it. No request is ever retried.
#[derive(Debug, Clone)]
pub struct JukeBoxClient {
    http: Box<dyn HttpClient>,
    endpoints: JukeBoxEndpoints,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, HttpClientError> {
    serde_json::from_value(value).map_err(|e| HttpClientError::ParseError(e.to_string()))
}

impl JukeBoxClient {
    pub fn new(http: Box<dyn HttpClient>, endpoints: JukeBoxEndpoints) -> Self {
        Self { http, endpoints }
    }

    /// `GET /probe`
    pub async fn request_probe(&self) -> Result<ProbeResponse, HttpClientError> {
        let value = self.http.get_json(&self.endpoints.probe).await?;
        decode(value)
    }

    /// `GET /current-track`
    pub async fn request_current_track(&self) -> Result<CurrentTrackResponse, HttpClientError> {
        let value = self.http.get_json(&self.endpoints.current_track).await?;
        decode(value)
    }

    /// `GET /current-lyrics`
    pub async fn request_current_lyrics(&self) -> Result<CurrentLyricsResponse, HttpClientError> {
        let value = self.http.get_json(&self.endpoints.current_lyrics).await?;
        decode(value)
    }

    /// `POST /search-lyrics`; song and artist are sent as given
    pub async fn request_search_lyrics(
        &self,
        song: &str,
        artist: &str,
    ) -> Result<SearchLyricsResponse, HttpClientError> {
        let body = SearchLyricsRequest {
            song: song.to_string(),
            artist: artist.to_string(),
        };
        let value = post_json(self.http.as_ref(), &self.endpoints.search_lyrics, &body).await?;
        decode(value)
    }

    /// Connection status of the plugin, or `None` if it cannot be reached
    pub async fn probe(&self) -> Option<ProbeResponse> {
        match self.request_probe().await {
            Ok(status) => Some(status),
            Err(e) => {
                error!("JukeBox plugin not available: {}", e);
                None
            }
        }
    }

    /// True if the plugin is reachable and connected to Roon
    pub async fn is_available(&self) -> bool {
        match self.probe().await {
            Some(status) if status.is_connected() => true,
            Some(status) => {
                info!("JukeBox plugin reachable but not connected (status: {})", status.status);
                false
            }
            None => false,
        }
    }

    /// The track currently playing, or `None`
    pub async fn fetch_current_track(&self) -> Option<Track> {
        match self.request_current_track().await {
            Ok(response) if response.success => {
                if response.track.is_none() {
                    info!("JukeBox reported success without a track");
                }
                response.track
            }
            Ok(_) => {
                info!("No track currently playing on Roon");
                None
            }
            Err(e) => {
                error!("Error fetching current track: {}", e);
                None
            }
        }
    }

    /// Lyrics for whatever is currently playing, or `None`
    pub async fn fetch_current_lyrics(&self) -> Option<CurrentLyricsResponse> {
        match self.request_current_lyrics().await {
            Ok(response) if response.success => Some(response),
            Ok(_) => {
                info!("No lyrics available for the current track");
                None
            }
            Err(e) => {
                error!("Error fetching lyrics: {}", e);
                None
            }
        }
    }

    /// Lyrics for an arbitrary song, or `None`
    pub async fn search_lyrics(&self, song: &str, artist: &str) -> Option<SearchLyricsResponse> {
        debug!("Searching lyrics for '{}' by '{}'", song, artist);
        match self.request_search_lyrics(song, artist).await {
            Ok(response) if response.success => Some(response),
            Ok(_) => {
                info!("No lyrics found for '{}' by '{}'", song, artist);
                None
            }
            Err(e) => {
                error!("Error searching lyrics: {}", e);
                None
            }
        }
    }
}
