use serde::{Deserialize, Deserializer, Serialize};

/// Read `null` as the type's default instead of failing the whole record
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lyrics record as returned by the JukeBox plugin (LRCLIB format)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lyrics {
    /// Identifier in the lyrics database
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub track_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub artist_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,

    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// True if the track has no vocals
    #[serde(default, deserialize_with = "null_as_default")]
    pub instrumental: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_lyrics: Option<String>,

    /// Time-synced lyrics in LRC format, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_lyrics: Option<String>,
}

impl Lyrics {
    /// Check if any lyrics text is present
    pub fn has_text(&self) -> bool {
        self.plain_lyrics.as_deref().map_or(false, |l| !l.trim().is_empty())
            || self.synced_lyrics.as_deref().map_or(false, |l| !l.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_fields_read_as_defaults() {
        let lyrics: Lyrics = serde_json::from_value(json!({
            "id": 12,
            "trackName": "Nightswim",
            "artistName": null,
            "instrumental": null,
            "plainLyrics": "We could swim"
        }))
        .unwrap();
        assert_eq!(lyrics.artist_name, "");
        assert!(!lyrics.instrumental);
        assert!(lyrics.has_text());
    }

    #[test]
    fn test_deserialize_lrclib_record() {
        let lyrics: Lyrics = serde_json::from_value(json!({
            "id": 3396226,
            "trackName": "I Want to Live",
            "artistName": "Borislav Slavov",
            "albumName": "Baldur's Gate 3",
            "duration": 233.0,
            "instrumental": false,
            "plainLyrics": "I feel your breath upon my neck",
            "syncedLyrics": "[00:17.12] I feel your breath upon my neck"
        }))
        .unwrap();

        assert_eq!(lyrics.id, 3396226);
        assert_eq!(lyrics.album_name.as_deref(), Some("Baldur's Gate 3"));
        assert!(lyrics.has_text());
    }

    #[test]
    fn test_instrumental_without_text() {
        let lyrics: Lyrics = serde_json::from_value(json!({
            "id": 1,
            "trackName": "Intro",
            "artistName": "ODESZA",
            "instrumental": true
        }))
        .unwrap();

        assert!(lyrics.instrumental);
        assert!(!lyrics.has_text());
        assert_eq!(lyrics.plain_lyrics, None);
    }
}
