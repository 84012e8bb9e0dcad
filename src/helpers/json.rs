use log::debug;
use serde::de::DeserializeOwned;

/// Parse JSON text, returning `None` instead of an error on failure
pub fn safe_json_parse<T: DeserializeOwned>(text: &str) -> Option<T> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Ignoring unparsable JSON: {}", e);
            None
        }
    }
}
