//! Export of a local playlist to an external streaming provider
//!
//! The pipeline is linear: create a remote playlist, resolve every song to a
//! provider-native track id (exact ISRC match first, weighted text search as
//! fallback), then attach the resolved ids in provider-sized chunks. A song
//! that cannot be resolved is reported, not fatal; a chunk that fails to
//! attach is reported with its index so the caller can retry just that
//! chunk.
//!
//! Exporting is not idempotent: each call creates a fresh remote playlist.
//! Callers wanting reuse must check for an existing playlist themselves.

mod apple_music;
mod spotify;

pub use apple_music::AppleMusicClient;
pub use spotify::SpotifyClient;

use async_trait::async_trait;
use mixtape_common::model::Song;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

/// Credentials for one export call. Passed explicitly; there is no ambient
/// session store.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    /// OAuth access token (Spotify) or developer token (Apple Music)
    pub access_token: String,
    /// Apple Music user token; unused by Spotify
    pub music_user_token: Option<String>,
    /// Apple Music catalog storefront, e.g. "us"; unused by Spotify
    pub storefront: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("missing credential for provider: {0}")]
    MissingCredential(&'static str),

    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Decode(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Capabilities an export target must provide.
///
/// One implementation per provider; selected through [`ProviderRegistry`].
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Create a playlist under the authenticated account, returning the
    /// provider-native playlist id.
    async fn create_playlist(&self, name: &str) -> Result<String, ExportError>;

    /// Resolve one song to a provider-native track id. `Ok(None)` means the
    /// provider has no match (by ISRC or text search).
    async fn resolve_track(&self, song: &Song) -> Result<Option<String>, ExportError>;

    /// Attach up to [`max_tracks_per_attach`](Self::max_tracks_per_attach)
    /// track ids to the remote playlist.
    async fn attach_tracks(&self, playlist_id: &str, track_ids: &[String])
        -> Result<(), ExportError>;

    /// The provider's documented maximum items per attach call.
    fn max_tracks_per_attach(&self) -> usize;
}

type ClientFactory = fn(&ProviderCredentials) -> Result<Box<dyn ProviderClient>, ExportError>;

/// Maps provider identifiers to client factories.
#[derive(Clone)]
pub struct ProviderRegistry {
    factories: HashMap<&'static str, ClientFactory>,
}

impl ProviderRegistry {
    pub fn with_builtin_providers() -> Self {
        let mut factories: HashMap<&'static str, ClientFactory> = HashMap::new();
        factories.insert("spotify", |creds| {
            Ok(Box::new(SpotifyClient::new(&creds.access_token)) as Box<dyn ProviderClient>)
        });
        factories.insert("applemusic", |creds| {
            let music_user_token = creds
                .music_user_token
                .as_deref()
                .ok_or(ExportError::MissingCredential("music_user_token"))?;
            let storefront = creds.storefront.as_deref().unwrap_or("us");
            Ok(Box::new(AppleMusicClient::new(
                &creds.access_token,
                music_user_token,
                storefront,
            )) as Box<dyn ProviderClient>)
        });
        Self { factories }
    }

    pub fn client_for(
        &self,
        provider: &str,
        credentials: &ProviderCredentials,
    ) -> Result<Box<dyn ProviderClient>, ExportError> {
        let factory = self
            .factories
            .get(provider)
            .ok_or_else(|| ExportError::UnknownProvider(provider.to_string()))?;
        factory(credentials)
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// A song the provider could not resolve, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedSong {
    pub song_id: i64,
    pub song_name: String,
    pub reason: String,
}

/// An attach chunk that failed; `index` identifies which chunk so the caller
/// can retry just that one.
#[derive(Debug, Clone, Serialize)]
pub struct FailedChunk {
    pub index: usize,
    pub track_count: usize,
    pub reason: String,
}

/// Outcome of one export call. `unresolved` and `failed_chunks` empty means
/// a complete export; anything else is a partial success.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub remote_playlist_id: String,
    pub attached: usize,
    pub unresolved: Vec<UnresolvedSong>,
    pub failed_chunks: Vec<FailedChunk>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.failed_chunks.is_empty()
    }
}

/// Run the export pipeline against one provider client.
///
/// Only remote playlist creation is fatal; per-song resolve misses and
/// errors, and per-chunk attach failures, are collected into the report.
pub async fn export_playlist(
    client: &dyn ProviderClient,
    playlist_name: &str,
    songs: &[Song],
) -> Result<ExportReport, ExportError> {
    let remote_playlist_id = client.create_playlist(playlist_name).await?;
    info!(%remote_playlist_id, playlist = %playlist_name, "created remote playlist");

    let mut track_ids = Vec::with_capacity(songs.len());
    let mut unresolved = Vec::new();

    for song in songs {
        match client.resolve_track(song).await {
            Ok(Some(track_id)) => track_ids.push(track_id),
            Ok(None) => {
                warn!(song = %song.name, "no provider match for song");
                unresolved.push(UnresolvedSong {
                    song_id: song.id,
                    song_name: song.name.clone(),
                    reason: "no match in provider catalog".to_string(),
                });
            }
            Err(e) => {
                warn!(song = %song.name, error = %e, "resolving song failed");
                unresolved.push(UnresolvedSong {
                    song_id: song.id,
                    song_name: song.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let chunk_size = client.max_tracks_per_attach().max(1);
    let mut attached = 0;
    let mut failed_chunks = Vec::new();

    for (index, chunk) in track_ids.chunks(chunk_size).enumerate() {
        match client.attach_tracks(&remote_playlist_id, chunk).await {
            Ok(()) => attached += chunk.len(),
            Err(e) => {
                warn!(chunk = index, error = %e, "attaching track chunk failed");
                failed_chunks.push(FailedChunk {
                    index,
                    track_count: chunk.len(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        attached,
        unresolved = unresolved.len(),
        failed_chunks = failed_chunks.len(),
        "export finished"
    );

    Ok(ExportReport {
        remote_playlist_id,
        attached,
        unresolved,
        failed_chunks,
    })
}
