/// Application configuration file
pub mod config;

/// Track, lyrics and injection data types
pub mod data;

/// Host-facing entry point of the extension
pub mod extension;

/// Function tools the language model can call
pub mod functions;

/// Helper utilities for HTTP, JSON and timing
pub mod helpers;

/// Interface to the chat application hosting the extension
pub mod host;

/// Polling and prompt injection
pub mod injection;

/// Client for the JukeBox roon-lyrics plugin
pub mod jukebox;

pub mod logging;

/// Prompt parameters and template substitution
pub mod prompt;

/// Persisted extension settings and the settings form
pub mod settings;

#[cfg(test)]
mod testing;

pub use data::{InjectionPayload, InjectionPosition, InjectionRole, Lyrics, Track};
pub use extension::JukeBoxExtension;
pub use injection::{InjectionController, InjectionState};
pub use jukebox::JukeBoxClient;
