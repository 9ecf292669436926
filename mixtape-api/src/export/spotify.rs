//! Spotify Web API client
//!
//! Implements the provider capabilities against the Spotify Web API:
//! - Playlist creation: `GET /me` + `POST /users/{id}/playlists`
//! - Track resolution: `GET /search` with `isrc:` first, then a second
//!   search with `track:`/`artist:`/`album:` terms when the ISRC search
//!   comes back empty (or no ISRC is stored)
//! - Attach: `POST /playlists/{id}/tracks`, at most 100 URIs per call
//!
//! API reference: https://developer.spotify.com/documentation/web-api

use async_trait::async_trait;
use mixtape_common::model::Song;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{ExportError, ProviderClient};

/// Spotify Web API base URL
const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Default timeout for Spotify API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Documented maximum tracks per "add items to playlist" call
const MAX_TRACKS_PER_ATTACH: usize = 100;

pub struct SpotifyClient {
    http_client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyPlaylist {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpotifySearchResponse {
    tracks: Option<SpotifyTracks>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTracks {
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: String,
}

impl SpotifyClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_base_url(access_token, SPOTIFY_API_URL)
    }

    fn with_base_url(access_token: &str, base_url: &str) -> Self {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", access_token))
            .unwrap_or_else(|_| header::HeaderValue::from_static("Bearer invalid"));
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    /// Free-text search query: track name, every artist as its own scoped
    /// term, and album name.
    fn text_query(song: &Song) -> String {
        let mut parts = vec![format!("track:{}", song.name)];
        for artist in &song.artist_names {
            parts.push(format!("artist:{}", artist));
        }
        parts.push(format!("album:{}", song.album_name));
        parts.join(" ")
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ExportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ExportError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn search_track(&self, query: &str) -> Result<Option<String>, ExportError> {
        let response = self
            .http_client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("type", "track"), ("limit", "1")])
            .send()
            .await?;

        // Spotify reports an empty result set as 200 with no items; a 404
        // here would be an API surface change, treat it as no match
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let search: SpotifySearchResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExportError::Decode(format!("track search: {}", e)))?;

        Ok(search
            .tracks
            .and_then(|tracks| tracks.items.into_iter().next())
            .map(|track| track.id))
    }

    async fn current_user_id(&self) -> Result<String, ExportError> {
        let response = self
            .http_client
            .get(format!("{}/me", self.base_url))
            .send()
            .await?;
        let user: SpotifyUser = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExportError::Decode(format!("current user: {}", e)))?;
        Ok(user.id)
    }
}

#[async_trait]
impl ProviderClient for SpotifyClient {
    async fn create_playlist(&self, name: &str) -> Result<String, ExportError> {
        let user_id = self.current_user_id().await?;

        let response = self
            .http_client
            .post(format!("{}/users/{}/playlists", self.base_url, user_id))
            .json(&json!({
                "name": name,
                "description": "",
                "public": false,
            }))
            .send()
            .await?;

        let playlist: SpotifyPlaylist = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExportError::Decode(format!("create playlist: {}", e)))?;

        Ok(playlist.id)
    }

    async fn resolve_track(&self, song: &Song) -> Result<Option<String>, ExportError> {
        if let Some(isrc) = song.isrc.as_deref().filter(|isrc| !isrc.is_empty()) {
            debug!(song = %song.name, isrc = %isrc, "spotify isrc search");
            if let Some(id) = self.search_track(&format!("isrc:{}", isrc)).await? {
                return Ok(Some(id));
            }
        }

        let query = Self::text_query(song);
        debug!(song = %song.name, query = %query, "spotify text search");
        self.search_track(&query).await
    }

    async fn attach_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), ExportError> {
        let uris: Vec<String> = track_ids
            .iter()
            .map(|id| format!("spotify:track:{}", id))
            .collect();

        let response = self
            .http_client
            .post(format!("{}/playlists/{}/tracks", self.base_url, playlist_id))
            .json(&json!({ "uris": uris }))
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    fn max_tracks_per_attach(&self) -> usize {
        MAX_TRACKS_PER_ATTACH
    }
}
