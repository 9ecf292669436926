//! Music-data search proxy
//!
//! Forwards a track/artist/album query to an aggregated music-data API
//! (`POST {endpoint}/public/search`) and maps the hits into the song
//! description shape that `POST /playlists/{id}/songs` accepts, so a found
//! song can be added to a playlist as-is.
//!
//! The upstream endpoint and token come from configuration; when they are
//! absent the service runs with search disabled.

use mixtape_common::model::SongDescription;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default timeout for music-data API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Upstream catalogs the aggregator is asked to search
const SEARCH_SOURCES: [&str; 4] = ["spotify", "appleMusic", "tidal", "amazonMusic"];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct SearchClient {
    http_client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    track: &'a str,
    artist: &'a str,
    album: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    sources: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Vec<SearchTrack>,
}

#[derive(Debug, Deserialize)]
struct SearchTrack {
    data: SearchTrackData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchTrackData {
    name: String,
    #[serde(default)]
    artist_names: Vec<String>,
    #[serde(default)]
    album_name: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    isrc: String,
    #[serde(default)]
    duration: i64,
}

impl SearchClient {
    pub fn new(endpoint: &str, token: &str) -> Self {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Token {}", token))
            .unwrap_or_else(|_| header::HeaderValue::from_static("Token invalid"));
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Search the aggregated catalogs. Every hit comes back as a ready-to-add
    /// song description; an empty ISRC from upstream maps to `None`.
    pub async fn search_songs(
        &self,
        track: &str,
        artist: &str,
        album: &str,
    ) -> Result<Vec<SongDescription>, SearchError> {
        debug!(track = %track, artist = %artist, "music data search");

        let response = self
            .http_client
            .post(format!("{}/public/search", self.base_url))
            .json(&SearchRequest {
                track,
                artist,
                album,
                kind: "track",
                sources: &SEARCH_SOURCES,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(format!("search response: {}", e)))?;

        Ok(search
            .tracks
            .into_iter()
            .map(|track| {
                let data = track.data;
                SongDescription {
                    name: data.name,
                    artist_names: data.artist_names,
                    album_name: data.album_name,
                    image_url: data.image_url,
                    duration: data.duration,
                    isrc: Some(data.isrc).filter(|isrc| !isrc.is_empty()),
                }
            })
            .collect())
    }
}
