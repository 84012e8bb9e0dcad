pub mod debounce;
pub mod http_client;
pub mod json;
pub mod playback_progress;
pub mod sanitize;

pub use debounce::Debouncer;
pub use http_client::{HttpClient, HttpClientError};
pub use playback_progress::{calculate_progress, format_duration};
