//! Turns a track snapshot into the text injected into the host prompt.
//!
//! The formatter only produces the parameter mapping; the host owns the
//! template syntax. [`substitute_params_extended`] is the `{{name}}`
//! routine used by hosts that do not bring their own.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::data::{Lyrics, Track};

/// String-keyed parameters handed to the host's template substitution
pub type PromptParams = BTreeMap<String, String>;

/// Keys always present in the parameter mapping
pub const TRACK_PARAM_KEYS: [&str; 5] = ["song", "artist", "album", "zone", "status"];

/// Keys present only when lyrics were fetched
pub const LYRICS_PARAM_KEYS: [&str; 3] = ["lyrics", "syncedLyrics", "instrumental"];

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Build the template parameters for a track and optional lyrics.
///
/// Missing fields become empty strings. `instrumental` is `"true"` or `"false"`.
pub fn build_params(track: &Track, lyrics: Option<&Lyrics>) -> PromptParams {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    let mut params = PromptParams::new();
    params.insert("song".to_string(), text(&track.song));
    params.insert("artist".to_string(), text(&track.artist));
    params.insert("album".to_string(), text(&track.album));
    params.insert("zone".to_string(), text(&track.zone_name));
    params.insert("status".to_string(), text(&track.playback_status));

    if let Some(lyrics) = lyrics {
        params.insert("lyrics".to_string(), text(&lyrics.plain_lyrics));
        params.insert("syncedLyrics".to_string(), text(&lyrics.synced_lyrics));
        params.insert(
            "instrumental".to_string(),
            if lyrics.instrumental { "true" } else { "false" }.to_string(),
        );
    }

    params
}

/// Replace every `{{name}}` in `template` with `params[name]`.
///
/// Placeholders without a matching parameter are left as they are, so a
/// host can run its own macro pass afterwards.
pub fn substitute_params_extended(template: &str, params: &PromptParams) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
