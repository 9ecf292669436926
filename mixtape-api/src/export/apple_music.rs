//! Apple Music API client
//!
//! Implements the provider capabilities against the Apple Music API:
//! - Playlist creation: `POST /me/library/playlists`
//! - Track resolution: ISRC filter lookup on the catalog, storefront text
//!   search as the fallback
//! - Attach: `POST /me/library/playlists/{id}/tracks`
//!
//! Requires two credentials: the developer (bearer) token and the
//! Music-User-Token of the account being written to.
//!
//! API reference: https://developer.apple.com/documentation/applemusicapi

use async_trait::async_trait;
use mixtape_common::model::Song;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{ExportError, ProviderClient};

/// Apple Music API base URL
const APPLE_MUSIC_API_URL: &str = "https://api.music.apple.com/v1";

/// Default timeout for Apple Music API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Apple documents no hard per-call track limit for library playlist
/// inserts; 100 keeps request bodies in the same range as Spotify's cap
const MAX_TRACKS_PER_ATTACH: usize = 100;

pub struct AppleMusicClient {
    http_client: Client,
    base_url: String,
    storefront: String,
}

#[derive(Debug, Deserialize)]
struct AppleDataResponse {
    #[serde(default)]
    data: Vec<AppleResource>,
}

#[derive(Debug, Deserialize)]
struct AppleResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AppleSearchResponse {
    results: AppleSearchResults,
}

#[derive(Debug, Deserialize, Default)]
struct AppleSearchResults {
    #[serde(default)]
    songs: Option<AppleDataResponse>,
}

impl AppleMusicClient {
    pub fn new(developer_token: &str, music_user_token: &str, storefront: &str) -> Self {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", developer_token))
            .unwrap_or_else(|_| header::HeaderValue::from_static("Bearer invalid"));
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        if let Ok(mut user_token) = header::HeaderValue::from_str(music_user_token) {
            user_token.set_sensitive(true);
            headers.insert("Music-User-Token", user_token);
        }

        Self {
            http_client: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: APPLE_MUSIC_API_URL.to_string(),
            storefront: storefront.to_string(),
        }
    }

    /// Free-text search term: track name, artists and album joined; Apple's
    /// search has no field-scoped syntax like Spotify's.
    fn search_term(song: &Song) -> String {
        let artists = song.artist_names.join(" ");
        format!("{} {} {}", song.name, artists, song.album_name)
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

    async fn lookup_by_isrc(&self, isrc: &str) -> Result<Option<String>, ExportError> {
        let response = self
            .http_client
            .get(format!(
                "{}/catalog/{}/songs",
                self.base_url, self.storefront
            ))
            .query(&[("filter[isrc]", isrc)])
            .send()
            .await?;

        let songs: AppleDataResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExportError::Decode(format!("isrc lookup: {}", e)))?;

        Ok(songs.data.into_iter().next().map(|resource| resource.id))
    }

    async fn search_catalog(&self, term: &str) -> Result<Option<String>, ExportError> {
        let response = self
            .http_client
            .get(format!(
                "{}/catalog/{}/search",
                self.base_url, self.storefront
            ))
            .query(&[("term", term), ("types", "songs"), ("limit", "1")])
            .send()
            .await?;

        let search: AppleSearchResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExportError::Decode(format!("catalog search: {}", e)))?;

        Ok(search
            .results
            .songs
            .and_then(|songs| songs.data.into_iter().next())
            .map(|resource| resource.id))
    }
}

#[async_trait]
impl ProviderClient for AppleMusicClient {
    async fn create_playlist(&self, name: &str) -> Result<String, ExportError> {
        let response = self
            .http_client
            .post(format!("{}/me/library/playlists", self.base_url))
            .json(&json!({
                "attributes": {
                    "name": name,
                    "description": "",
                }
            }))
            .send()
            .await?;

        let created: AppleDataResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ExportError::Decode(format!("create playlist: {}", e)))?;

        created
            .data
            .into_iter()
            .next()
            .map(|resource| resource.id)
            .ok_or_else(|| {
                ExportError::Decode("create playlist returned no resource".to_string())
            })
    }

    async fn resolve_track(&self, song: &Song) -> Result<Option<String>, ExportError> {
        if let Some(isrc) = song.isrc.as_deref().filter(|isrc| !isrc.is_empty()) {
            debug!(song = %song.name, isrc = %isrc, "apple music isrc lookup");
            if let Some(id) = self.lookup_by_isrc(isrc).await? {
                return Ok(Some(id));
            }
        }

        let term = Self::search_term(song);
        debug!(song = %song.name, term = %term, "apple music catalog search");
        self.search_catalog(&term).await
    }

    async fn attach_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), ExportError> {
        let data: Vec<_> = track_ids
            .iter()
            .map(|id| json!({ "id": id, "type": "songs" }))
            .collect();

        let response = self
            .http_client
            .post(format!(
                "{}/me/library/playlists/{}/tracks",
                self.base_url, playlist_id
            ))
            .json(&json!({ "data": data }))
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    fn max_tracks_per_attach(&self) -> usize {
        MAX_TRACKS_PER_ATTACH
    }
}
