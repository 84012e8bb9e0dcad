//! Parameter schemas of the JukeBox tools (JSON Schema draft-04)

use serde_json::{json, Value};

const SCHEMA_DRAFT: &str = "http://json-schema.org/draft-04/schema#";

/// Schema of a tool that takes no arguments
pub fn no_parameters() -> Value {
    json!({
        "$schema": SCHEMA_DRAFT,
        "type": "object",
        "properties": {},
        "required": []
    })
}

/// Schema of RoonSearchLyrics
pub fn search_lyrics_parameters() -> Value {
    json!({
        "$schema": SCHEMA_DRAFT,
        "type": "object",
        "properties": {
            "song": {
                "type": "string",
                "description": "The name of the song to search for lyrics."
            },
            "artist": {
                "type": "string",
                "description": "The name of the artist."
            }
        },
        "required": ["song", "artist"]
    })
}
