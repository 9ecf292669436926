//! Playlist service
//!
//! Owns the multi-step song ingestion write: each submitted song is
//! normalized into album/artist/song rows and linked, all inside one
//! transaction per song, then the resulting ids are attached to the playlist
//! in one batch. A failure on any song aborts the whole add call before any
//! playlist link is written.

use anyhow::{Context, Result};
use mixtape_common::model::{NewPlaylist, Playlist, Song, SongDescription};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::db::playlist_songs::{SongSortKey, SortOrder};
use crate::db::{albums, artist_albums, artist_songs, artists, playlist_songs, playlists, songs};
use crate::export::{self, ExportError, ExportReport, ProviderCredentials, ProviderRegistry};

#[derive(Clone)]
pub struct PlaylistService {
    db: SqlitePool,
    providers: ProviderRegistry,
}

impl PlaylistService {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            providers: ProviderRegistry::with_builtin_providers(),
        }
    }

    pub async fn create_playlist(&self, new_playlist: &NewPlaylist) -> Result<Playlist> {
        let id = playlists::insert(&self.db, new_playlist).await?;
        info!(playlist_id = id, name = %new_playlist.name, "created playlist");

        playlists::select_by_id(&self.db, id)
            .await?
            .context("playlist vanished right after insert")
    }

    pub async fn list_playlists(&self, user_id: Option<&str>) -> Result<Vec<Playlist>> {
        playlists::select_all(&self.db, user_id).await
    }

    pub async fn get_playlist(&self, id: i64) -> Result<Option<Playlist>> {
        playlists::select_by_id(&self.db, id).await
    }

    pub async fn delete_playlist(&self, id: i64) -> Result<()> {
        playlists::delete_by_id(&self.db, id).await?;
        info!(playlist_id = id, "deleted playlist");
        Ok(())
    }

    /// Catalog every submitted song and attach it to the playlist.
    ///
    /// All-or-nothing at the batch level: the playlist links are only
    /// written once every song has been cataloged. Catalog rows written for
    /// earlier songs are shared entities and deliberately survive a later
    /// failure.
    pub async fn add_songs_to_playlist(
        &self,
        playlist_id: i64,
        song_descriptions: &[SongDescription],
    ) -> Result<Vec<i64>> {
        let mut song_ids = Vec::with_capacity(song_descriptions.len());
        for description in song_descriptions {
            let song_id = self
                .upsert_song(description)
                .await
                .with_context(|| format!("catalog song '{}'", description.name))?;
            song_ids.push(song_id);
        }

        playlist_songs::link_all(&self.db, playlist_id, &song_ids).await?;
        info!(
            playlist_id,
            songs = song_ids.len(),
            "added songs to playlist"
        );

        Ok(song_ids)
    }

    /// Normalize one song description into deduplicated relational rows.
    ///
    /// Runs as a single transaction so a song row can never exist without
    /// its artist links. A song with no artists is rejected outright: the
    /// playlist read joins through artist_songs, so an artist-less row
    /// would never come back from any read. Returns the song id whether
    /// the row was created or already existed.
    pub async fn upsert_song(&self, description: &SongDescription) -> Result<i64> {
        if description.artist_names.is_empty() {
            anyhow::bail!("song '{}' has an empty artist list", description.name);
        }

        let mut tx = self
            .db
            .begin()
            .await
            .context("begin song upsert transaction")?;

        let album_id = albums::insert_or_get_id(&mut *tx, &description.album_name).await?;
        let artist_ids = artists::insert_or_get_ids(&mut *tx, &description.artist_names).await?;

        // The first listed artist counts as the album's primary artist
        if let Some(&primary_artist) = artist_ids.first() {
            artist_albums::link(&mut *tx, primary_artist, album_id).await?;
        }

        let song_id = songs::insert_or_get_id(
            &mut *tx,
            &description.name,
            album_id,
            &description.image_url,
            description.duration,
            description.isrc.as_deref(),
        )
        .await?;

        artist_songs::link_all(&mut *tx, song_id, &artist_ids).await?;

        tx.commit().await.context("commit song upsert transaction")?;

        debug!(song_id, name = %description.name, "upserted song");
        Ok(song_id)
    }

    /// Aggregated playlist read: one entry per song, artist list in original
    /// insertion order, default order ascending song id.
    pub async fn songs_in_playlist(
        &self,
        playlist_id: i64,
        sort: Option<(SongSortKey, SortOrder)>,
    ) -> Result<Vec<Song>> {
        let rows = playlist_songs::select_song_rows(&self.db, playlist_id, sort).await?;
        Ok(playlist_songs::group_song_rows(rows))
    }

    pub async fn remove_songs_from_playlist(
        &self,
        playlist_id: i64,
        song_ids: &[i64],
    ) -> Result<u64> {
        playlist_songs::delete_many(&self.db, playlist_id, song_ids).await
    }

    /// Rebuild a playlist on an external provider.
    ///
    /// Not idempotent: every call creates a fresh remote playlist. The
    /// report carries the remote id plus which songs could not be resolved.
    pub async fn export_playlist(
        &self,
        playlist_id: i64,
        provider: &str,
        credentials: &ProviderCredentials,
    ) -> Result<Option<ExportReport>, ExportError> {
        let playlist = playlists::select_by_id(&self.db, playlist_id)
            .await
            .map_err(|e| ExportError::Internal(e.to_string()))?;
        let Some(playlist) = playlist else {
            return Ok(None);
        };

        let rows = playlist_songs::select_song_rows(&self.db, playlist_id, None)
            .await
            .map_err(|e| ExportError::Internal(e.to_string()))?;
        let songs = playlist_songs::group_song_rows(rows);

        let client = self.providers.client_for(provider, credentials)?;
        let report = export::export_playlist(client.as_ref(), &playlist.name, &songs).await?;

        Ok(Some(report))
    }
}
