use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::helpers::playback_progress::{calculate_progress, format_duration};

/// Snapshot of the track currently playing in a Roon zone.
///
/// Produced by the JukeBox plugin on every poll. The snapshot is never
/// modified locally; the next poll replaces it as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Song title
    #[serde(default)]
    pub song: Option<String>,

    /// Performing artist
    #[serde(default)]
    pub artist: Option<String>,

    /// Album name
    #[serde(default)]
    pub album: Option<String>,

    /// Playback status as reported by Roon ("playing", "paused", ...)
    #[serde(default)]
    pub playback_status: Option<String>,

    /// Name of the zone the track is playing in
    #[serde(default)]
    pub zone_name: Option<String>,

    /// Track length in milliseconds
    #[serde(default)]
    pub length: Option<f64>,

    /// Current seek position in milliseconds; Roon may report fractions
    #[serde(default)]
    pub seek: Option<f64>,

    /// Epoch milliseconds of the last update on the plugin side
    #[serde(default)]
    pub last_updated: Option<f64>,
}

impl Track {
    /// Time of the last plugin-side update, if the plugin reported one
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_updated
            .filter(|ms| ms.is_finite())
            .and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single())
    }

    /// Playback progress in percent (0-100)
    pub fn progress(&self) -> f64 {
        calculate_progress(self.seek.unwrap_or(0.0), self.length.unwrap_or(0.0))
    }

    /// Human readable position, e.g. "1:02 / 3:42 (28%)"
    pub fn position_label(&self) -> Option<String> {
        let length = self.length?;
        let seek = self.seek.unwrap_or(0.0);
        Some(format!(
            "{} / {} ({:.0}%)",
            format_duration(whole_ms(seek)),
            format_duration(whole_ms(length)),
            self.progress()
        ))
    }
}

/// Milliseconds as reported by the plugin, clamped to a whole non-negative count
fn whole_ms(ms: f64) -> u64 {
    if ms.is_finite() && ms > 0.0 {
        ms as u64
    } else {
        0
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {}",
            self.song.as_deref().unwrap_or("Unknown"),
            self.artist.as_deref().unwrap_or("Unknown")
        )?;
        if let Some(album) = self.album.as_deref().filter(|a| !a.is_empty()) {
            write!(f, " from {}", album)?;
        }
        if let Some(zone) = self.zone_name.as_deref().filter(|z| !z.is_empty()) {
            write!(f, " [{}]", zone)?;
        }
        Ok(())
    }
}

/// Short track reference attached to a lyrics response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
}
