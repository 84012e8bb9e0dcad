// Common helpers for integration tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use jukebox_prompt::helpers::http_client::{HttpClient, HttpClientError};
use jukebox_prompt::host::LocalHost;
use jukebox_prompt::jukebox::{JukeBoxClient, JukeBoxEndpoints};
use jukebox_prompt::JukeBoxExtension;

/// Stand-in for the JukeBox plugin: answers by path suffix, records every request
#[derive(Debug, Clone, Default)]
pub struct FakePlugin {
    routes: Arc<Mutex<HashMap<String, Result<Value, u16>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `suffix` with a JSON body
    pub fn route(&self, suffix: &str, body: Value) {
        self.routes.lock().unwrap().insert(suffix.to_string(), Ok(body));
    }

    /// Answer `suffix` with an HTTP error status
    pub fn fail(&self, suffix: &str, status: u16) {
        self.routes.lock().unwrap().insert(suffix.to_string(), Err(status));
    }

    /// Forget a route; requests to it fail as if nothing were listening
    pub fn remove(&self, suffix: &str) {
        self.routes.lock().unwrap().remove(suffix);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Simulate a paired Roon core playing Nightswim in the Office zone
    pub fn playing_nightswim(&self) {
        self.route("/probe", json!({ "status": "connected", "hasTrack": true }));
        self.route(
            "/current-track",
            json!({
                "success": true,
                "connected": true,
                "track": {
                    "song": "Nightswim",
                    "artist": "ODESZA",
                    "album": "In Return",
                    "playbackStatus": "playing",
                    "zoneName": "Office",
                    "length": 222000,
                    "seek": 55000,
                    "lastUpdated": 1717000000000i64
                }
            }),
        );
        self.route(
            "/current-lyrics",
            json!({
                "success": true,
                "track": { "song": "Nightswim", "artist": "ODESZA", "album": "In Return" },
                "lyrics": {
                    "id": 42,
                    "trackName": "Nightswim",
                    "artistName": "ODESZA",
                    "instrumental": false,
                    "plainLyrics": "We could swim"
                }
            }),
        );
    }

    fn answer(&self, method: &str, url: &str) -> Result<Value, HttpClientError> {
        self.requests.lock().unwrap().push(format!("{} {}", method, url));
        let routes = self.routes.lock().unwrap();
        match routes.iter().find(|(suffix, _)| url.ends_with(suffix.as_str())) {
            Some((_, Ok(body))) => Ok(body.clone()),
            Some((_, Err(status))) => Err(HttpClientError::ServerError {
                status: *status,
                message: "fake plugin error".to_string(),
            }),
            None => Err(HttpClientError::RequestError(format!("connection refused: {}", url))),
        }
    }
}

#[async_trait]
impl HttpClient for FakePlugin {
    async fn post_json_value(&self, url: &str, _payload: Value) -> Result<Value, HttpClientError> {
        self.answer("POST", url)
    }

    async fn get_json(&self, url: &str) -> Result<Value, HttpClientError> {
        self.answer("GET", url)
    }

    fn clone_box(&self) -> Box<dyn HttpClient> {
        Box::new(self.clone())
    }
}

/// A local host writing its settings into a temporary directory
pub struct TestHost {
    pub dir: TempDir,
    pub host: Arc<LocalHost>,
}

impl TestHost {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::in_dir(dir)
    }

    pub fn in_dir(dir: TempDir) -> Self {
        let host = LocalHost::new(dir.path().join("settings.json"), Duration::from_millis(50))
            .with_macro("user", "Alex")
            .with_macro("char", "Assistant");
        TestHost { dir, host: Arc::new(host) }
    }

    pub fn extension(&self, plugin: &FakePlugin) -> JukeBoxExtension {
        let client = JukeBoxClient::new(
            Box::new(plugin.clone()),
            JukeBoxEndpoints::new("http://roon.local:8000").unwrap(),
        );
        JukeBoxExtension::new(self.host.clone(), client).unwrap()
    }

    pub fn saved_settings(&self) -> Value {
        let content = std::fs::read_to_string(self.dir.path().join("settings.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}
