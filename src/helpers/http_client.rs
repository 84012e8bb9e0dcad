use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Error types that can occur when interacting with HTTP clients
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The request never produced a response (connection refused, timeout, ...)
    #[error("HTTP request error: {0}")]
    RequestError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The server answered with a non-success status code
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Empty response from server")]
    EmptyResponse,
}

impl HttpClientError {
    /// True if the server answered, but not with a 2xx status
    pub fn is_server_error(&self) -> bool {
        matches!(self, HttpClientError::ServerError { .. })
    }
}

/// A trait for HTTP client implementations
/// This version avoids generic methods to enable dynamic dispatch
#[async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Send a POST request with a JSON payload and parse the JSON response
    async fn post_json_value(&self, url: &str, payload: Value) -> Result<Value, HttpClientError>;

    /// Send a GET request and parse the JSON response
    async fn get_json(&self, url: &str) -> Result<Value, HttpClientError>;

    /// Clone the client as a boxed trait object
    fn clone_box(&self) -> Box<dyn HttpClient>;
}

// Non-generic helper function to serialize and post JSON
pub async fn post_json<T: Serialize + Sync>(
    client: &dyn HttpClient,
    url: &str,
    payload: &T,
) -> Result<Value, HttpClientError> {
    match serde_json::to_value(payload) {
        Ok(value) => client.post_json_value(url, value).await,
        Err(e) => Err(HttpClientError::ParseError(format!("Failed to serialize payload: {}", e))),
    }
}

impl Clone for Box<dyn HttpClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An HTTP client implementation using reqwest
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with the specified timeout
    pub fn new(timeout_secs: u64) -> Self {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value, HttpClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            debug!("Request failed with HTTP status {}", status);
            return Err(HttpClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let response_text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to read response body: {}", e);
                return Err(HttpClientError::RequestError(format!("Failed to read response body: {}", e)));
            }
        };

        if response_text.is_empty() {
            return Err(HttpClientError::EmptyResponse);
        }

        match serde_json::from_str::<Value>(&response_text) {
            Ok(json_value) => Ok(json_value),
            Err(e) => {
                error!("Failed to parse JSON response: {}", e);
                debug!("Response text: {}", response_text);
                Err(HttpClientError::ParseError(e.to_string()))
            }
        }
    }
}

impl Default for ReqwestHttpClient {
    /// HTTP client with default timeout (5 seconds)
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json_value(&self, url: &str, payload: Value) -> Result<Value, HttpClientError> {
        debug!("POST request to {}", url);

        let response = match self.client.post(url).json(&payload).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!("POST request failed: {}", e);
                return Err(HttpClientError::RequestError(e.to_string()));
            }
        };

        self.read_json(response).await
    }

    async fn get_json(&self, url: &str) -> Result<Value, HttpClientError> {
        debug!("GET request to {}", url);

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!("GET request failed: {}", e);
                return Err(HttpClientError::RequestError(e.to_string()));
            }
        };

        self.read_json(response).await
    }

    fn clone_box(&self) -> Box<dyn HttpClient> {
        Box::new(self.clone())
    }
}

/// Create a new HTTP client using the default implementation
pub fn new_http_client(timeout_secs: u64) -> Box<dyn HttpClient> {
    Box::new(ReqwestHttpClient::new(timeout_secs))
}
