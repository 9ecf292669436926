//! Playlist/song association and the aggregated playlist read
//!
//! The read path returns one flat row per (song, artist) pair;
//! [`group_song_rows`] folds those back into one object per song with the
//! artist list in stored position order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mixtape_common::model::Song;
use sqlx::{Row, SqlitePool};

/// Sort key for the aggregated playlist read. The default (no key) is
/// ascending song id, which also matches the aggregation's first-seen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongSortKey {
    SongName,
    AlbumName,
    AddedAt,
}

impl SongSortKey {
    /// Parse the public query-parameter value. Anything outside the
    /// whitelist is rejected; sort keys are interpolated into SQL.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "song_name" => Some(Self::SongName),
            "album_name" => Some(Self::AlbumName),
            "added_at" => Some(Self::AddedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::SongName => "s.name",
            Self::AlbumName => "al.name",
            Self::AddedAt => "ps.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" | "ASC" => Some(Self::Asc),
            "desc" | "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One joined row of the playlist read: a single (song, artist) pair.
#[derive(Debug, Clone)]
pub struct SongRow {
    pub song_id: i64,
    pub song_name: String,
    pub album_name: String,
    pub artist_name: String,
    pub image_url: String,
    pub duration: i64,
    pub isrc: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attach songs to a playlist. Existing pairs are skipped, the whole batch
/// is one transaction: either every link lands or none do.
pub async fn link_all(pool: &SqlitePool, playlist_id: i64, song_ids: &[i64]) -> Result<()> {
    let now = Utc::now();

    let mut tx = pool
        .begin()
        .await
        .context("begin transaction linking songs to playlist")?;

    for song_id in song_ids {
        sqlx::query(
            r#"
            INSERT INTO playlist_songs (playlist_id, song_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(playlist_id, song_id) DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(song_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("link song {} to playlist {}", song_id, playlist_id))?;
    }

    tx.commit()
        .await
        .context("commit transaction linking songs to playlist")?;

    Ok(())
}

/// Detach songs from a playlist. Catalog rows are untouched.
pub async fn delete_many(pool: &SqlitePool, playlist_id: i64, song_ids: &[i64]) -> Result<u64> {
    if song_ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; song_ids.len()].join(", ");
    let sql = format!(
        "DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id IN ({})",
        placeholders
    );

    let mut query = sqlx::query(&sql).bind(playlist_id);
    for song_id in song_ids {
        query = query.bind(song_id);
    }

    let result = query
        .execute(pool)
        .await
        .with_context(|| format!("delete songs from playlist {}", playlist_id))?;

    Ok(result.rows_affected())
}

/// Read the flat joined rows for a playlist.
///
/// Rows come back ordered by the requested sort key (default ascending song
/// id), then song id, then artist position — the ordering
/// [`group_song_rows`] assumes.
pub async fn select_song_rows(
    pool: &SqlitePool,
    playlist_id: i64,
    sort: Option<(SongSortKey, SortOrder)>,
) -> Result<Vec<SongRow>> {
    let order_by = match sort {
        Some((key, order)) => format!(
            "ORDER BY {} {}, s.id ASC, asg.position ASC",
            key.column(),
            order.keyword()
        ),
        None => "ORDER BY s.id ASC, asg.position ASC".to_string(),
    };

    let sql = format!(
        r#"
        SELECT s.id AS song_id, s.name AS song_name, al.name AS album_name,
               ar.name AS artist_name, s.image_url, s.duration, s.isrc,
               s.created_at, s.updated_at
        FROM playlist_songs ps
        JOIN songs s ON s.id = ps.song_id
        JOIN albums al ON al.id = s.album_id
        JOIN artist_songs asg ON asg.song_id = s.id
        JOIN artists ar ON ar.id = asg.artist_id
        WHERE ps.playlist_id = ?
        {}
        "#,
        order_by
    );

    let rows = sqlx::query(&sql)
        .bind(playlist_id)
        .fetch_all(pool)
        .await
        .with_context(|| format!("select songs of playlist {}", playlist_id))?;

    rows.iter()
        .map(|row| {
            Ok(SongRow {
                song_id: row.try_get("song_id")?,
                song_name: row.try_get("song_name")?,
                album_name: row.try_get("album_name")?,
                artist_name: row.try_get("artist_name")?,
                image_url: row.try_get("image_url")?,
                duration: row.try_get("duration")?,
                isrc: row.try_get("isrc")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        })
        .collect()
}

/// Fold flat (song, artist) rows into one [`Song`] per song id.
///
/// Single streaming pass: the first row of a song seeds the object, later
/// rows of the same song append the artist name unless it is already in the
/// list (a duplicate join row, not a legitimate repeat). Output order is
/// first-seen order, which the query's ordering makes ascending song id (or
/// the requested sort key).
pub fn group_song_rows(rows: Vec<SongRow>) -> Vec<Song> {
    let mut songs: Vec<Song> = Vec::new();
    let mut index_by_id = std::collections::HashMap::new();

    for row in rows {
        match index_by_id.get(&row.song_id) {
            Some(&i) => {
                let song: &mut Song = &mut songs[i];
                if !song.artist_names.contains(&row.artist_name) {
                    song.artist_names.push(row.artist_name);
                }
            }
            None => {
                index_by_id.insert(row.song_id, songs.len());
                songs.push(Song {
                    id: row.song_id,
                    name: row.song_name,
                    artist_names: vec![row.artist_name],
                    album_name: row.album_name,
                    image_url: row.image_url,
                    duration: row.duration,
                    isrc: row.isrc,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                });
            }
        }
    }

    songs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;
    use crate::db::{albums, artist_songs, artists, playlists, songs};
    use mixtape_common::model::NewPlaylist;

    fn row(song_id: i64, song_name: &str, album: &str, artist: &str) -> SongRow {
        SongRow {
            song_id,
            song_name: song_name.to_string(),
            album_name: album.to_string(),
            artist_name: artist.to_string(),
            image_url: String::new(),
            duration: 0,
            isrc: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_grouping_one_object_per_song() {
        let rows = vec![
            row(1, "Runaway", "MBDTF", "Kanye West"),
            row(1, "Runaway", "MBDTF", "Pusha T"),
            row(2, "Devil In A New Dress", "MBDTF", "Kanye West"),
            row(2, "Devil In A New Dress", "MBDTF", "Rick Ross"),
            row(3, "Power", "MBDTF", "Kanye West"),
        ];

        let songs = group_song_rows(rows);
        assert_eq!(songs.len(), 3);
        assert_eq!(songs[0].artist_names, vec!["Kanye West", "Pusha T"]);
        assert_eq!(songs[1].artist_names, vec!["Kanye West", "Rick Ross"]);
        assert_eq!(songs[2].artist_names, vec!["Kanye West"]);
        assert_eq!(
            songs.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_grouping_skips_duplicate_join_rows() {
        let rows = vec![
            row(1, "Runaway", "MBDTF", "Kanye West"),
            row(1, "Runaway", "MBDTF", "Kanye West"),
            row(1, "Runaway", "MBDTF", "Pusha T"),
        ];

        let songs = group_song_rows(rows);
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].artist_names, vec!["Kanye West", "Pusha T"]);
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        // Rows presorted by the requested key rather than song id
        let rows = vec![
            row(9, "A", "x", "a1"),
            row(3, "B", "x", "b1"),
            row(3, "B", "x", "b2"),
            row(7, "C", "x", "c1"),
        ];

        let songs = group_song_rows(rows);
        assert_eq!(
            songs.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![9, 3, 7]
        );
    }

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let album = albums::insert_or_get_id(&mut conn, "MBDTF").await.unwrap();
        let song = songs::insert_or_get_id(&mut conn, "Runaway", album, "", 0, None)
            .await
            .unwrap();
        drop(conn);

        let playlist = playlists::insert(
            &pool,
            &NewPlaylist {
                name: "p".into(),
                description: String::new(),
                user_id: "u".into(),
                user_name: "u".into(),
                image_url: String::new(),
            },
        )
        .await
        .unwrap();

        link_all(&pool, playlist, &[song]).await.unwrap();
        link_all(&pool, playlist, &[song]).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM playlist_songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_read_rows_follow_artist_position() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let album = albums::insert_or_get_id(&mut conn, "MBDTF").await.unwrap();
        let song = songs::insert_or_get_id(&mut conn, "Runaway", album, "", 0, None)
            .await
            .unwrap();
        let artist_ids = artists::insert_or_get_ids(
            &mut conn,
            &[
                "Kanye West".to_string(),
                "Pusha T".to_string(),
                "Bon Iver".to_string(),
            ],
        )
        .await
        .unwrap();
        artist_songs::link_all(&mut conn, song, &artist_ids).await.unwrap();
        drop(conn);

        let playlist = playlists::insert(
            &pool,
            &NewPlaylist {
                name: "p".into(),
                description: String::new(),
                user_id: "u".into(),
                user_name: "u".into(),
                image_url: String::new(),
            },
        )
        .await
        .unwrap();
        link_all(&pool, playlist, &[song]).await.unwrap();

        let rows = select_song_rows(&pool, playlist, None).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.artist_name.as_str()).collect();
        assert_eq!(names, vec!["Kanye West", "Pusha T", "Bon Iver"]);

        let aggregated = group_song_rows(rows);
        assert_eq!(aggregated.len(), 1);
        assert_eq!(
            aggregated[0].artist_names,
            vec!["Kanye West", "Pusha T", "Bon Iver"]
        );
    }

    #[tokio::test]
    async fn test_delete_many_detaches_only_requested() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let album = albums::insert_or_get_id(&mut conn, "MBDTF").await.unwrap();
        let a = songs::insert_or_get_id(&mut conn, "Runaway", album, "", 0, None)
            .await
            .unwrap();
        let b = songs::insert_or_get_id(&mut conn, "Power", album, "", 0, None)
            .await
            .unwrap();
        drop(conn);

        let playlist = playlists::insert(
            &pool,
            &NewPlaylist {
                name: "p".into(),
                description: String::new(),
                user_id: "u".into(),
                user_name: "u".into(),
                image_url: String::new(),
            },
        )
        .await
        .unwrap();
        link_all(&pool, playlist, &[a, b]).await.unwrap();

        let removed = delete_many(&pool, playlist, &[a]).await.unwrap();
        assert_eq!(removed, 1);

        let (links,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM playlist_songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 1);

        // Detaching does not delete catalog rows
        let (song_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM songs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(song_count, 2);
    }

    #[test]
    fn test_sort_key_whitelist() {
        assert_eq!(SongSortKey::parse("song_name"), Some(SongSortKey::SongName));
        assert_eq!(SongSortKey::parse("album_name"), Some(SongSortKey::AlbumName));
        assert_eq!(SongSortKey::parse("added_at"), Some(SongSortKey::AddedAt));
        assert_eq!(SongSortKey::parse("s.name; DROP TABLE songs"), None);
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("sideways"), None);
    }
}
