//! Client for the JukeBox server plugin, which bridges Roon and a lyrics database

pub mod client;

pub use client::JukeBoxClient;

use url::Url;

/// Path of the JukeBox plugin API on the chat host's server
pub const JUKEBOX_API_BASE: &str = "/api/plugins/roon-lyrics";

/// Absolute URLs of the four JukeBox endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JukeBoxEndpoints {
    pub probe: String,
    pub current_track: String,
    pub current_lyrics: String,
    pub search_lyrics: String,
}

impl JukeBoxEndpoints {
    /// Build the endpoint URLs relative to the server root of `base_url`
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        let endpoint = |name: &str| -> Result<String, url::ParseError> {
            base.join(&format!("{}/{}", JUKEBOX_API_BASE, name))
                .map(String::from)
        };

        Ok(Self {
            probe: endpoint("probe")?,
            current_track: endpoint("current-track")?,
            current_lyrics: endpoint("current-lyrics")?,
            search_lyrics: endpoint("search-lyrics")?,
        })
    }
}
