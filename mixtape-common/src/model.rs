//! API-facing model types shared between services
//!
//! Field names follow the public JSON contract (`song_name`, `artist_names`,
//! ...) rather than the storage column names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A song as submitted by a client: everything needed to catalog it.
///
/// Artist names are ordered; the first entry is treated as the primary
/// artist of the song's album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongDescription {
    #[serde(rename = "song_name")]
    pub name: String,
    pub artist_names: Vec<String>,
    pub album_name: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub image_url: String,
    /// International Standard Recording Code, if known
    #[serde(default)]
    pub isrc: Option<String>,
}

/// A cataloged song, reassembled from its relational rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "song_id")]
    pub id: i64,
    #[serde(rename = "song_name")]
    pub name: String,
    /// In original insertion order
    pub artist_names: Vec<String>,
    pub album_name: String,
    pub image_url: String,
    pub duration: i64,
    #[serde(default)]
    pub isrc: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(rename = "playlist_id")]
    pub id: i64,
    #[serde(rename = "playlist_name")]
    pub name: String,
    #[serde(rename = "playlist_description")]
    pub description: String,
    pub user_id: String,
    pub user_name: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlaylist {
    #[serde(rename = "playlist_name")]
    pub name: String,
    #[serde(rename = "playlist_description", default)]
    pub description: String,
    pub user_id: String,
    pub user_name: String,
    /// Cover image reference; upload/storage is handled elsewhere
    #[serde(default)]
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_description_json_field_names() {
        let json = r#"{
            "song_name": "Runaway",
            "artist_names": ["Kanye West", "Pusha T"],
            "album_name": "MBDTF",
            "duration": 548,
            "image_url": "",
            "isrc": "USUM71026087"
        }"#;

        let song: SongDescription = serde_json::from_str(json).unwrap();
        assert_eq!(song.name, "Runaway");
        assert_eq!(song.artist_names, vec!["Kanye West", "Pusha T"]);
        assert_eq!(song.album_name, "MBDTF");
        assert_eq!(song.isrc.as_deref(), Some("USUM71026087"));
    }

    #[test]
    fn song_description_optional_fields_default() {
        let json = r#"{
            "song_name": "Devil In A New Dress",
            "artist_names": ["Kanye West", "Rick Ross"],
            "album_name": "MBDTF"
        }"#;

        let song: SongDescription = serde_json::from_str(json).unwrap();
        assert_eq!(song.duration, 0);
        assert_eq!(song.image_url, "");
        assert!(song.isrc.is_none());
    }
}
