//! Artist/song association with list position
//!
//! The `position` column records where each artist sat in the song's
//! original artist list; the playlist read path orders by it so multi-artist
//! songs come back in submission order.

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

/// Link every artist in `artist_ids` to `song_id`, recording the list index
/// as the position. Existing pairs are left untouched, so relinking a song
/// never reorders artists that are already there.
///
/// Runs on the caller's connection; callers wrap it in the per-song
/// transaction so a song row never lands without its artist links.
pub async fn link_all(
    conn: &mut SqliteConnection,
    song_id: i64,
    artist_ids: &[i64],
) -> Result<()> {
    for (position, artist_id) in artist_ids.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO artist_songs (song_id, artist_id, position)
            VALUES (?, ?, ?)
            ON CONFLICT(song_id, artist_id) DO NOTHING
            "#,
        )
        .bind(song_id)
        .bind(artist_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("link artist {} to song {}", artist_id, song_id))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;
    use crate::db::{albums, artists, songs};

    async fn seed_song(conn: &mut sqlx::SqliteConnection) -> (i64, Vec<i64>) {
        let album = albums::insert_or_get_id(conn, "MBDTF").await.unwrap();
        let song = songs::insert_or_get_id(conn, "Runaway", album, "", 548, None)
            .await
            .unwrap();
        let artist_ids = artists::insert_or_get_ids(
            conn,
            &["Kanye West".to_string(), "Pusha T".to_string()],
        )
        .await
        .unwrap();
        (song, artist_ids)
    }

    #[tokio::test]
    async fn test_positions_follow_list_order() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let (song, artist_ids) = seed_song(&mut conn).await;
        link_all(&mut conn, song, &artist_ids).await.unwrap();

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT artist_id, position FROM artist_songs WHERE song_id = ? ORDER BY position",
        )
        .bind(song)
        .fetch_all(&mut *conn)
        .await
        .unwrap();

        assert_eq!(rows, vec![(artist_ids[0], 0), (artist_ids[1], 1)]);
    }

    #[tokio::test]
    async fn test_relink_keeps_original_positions() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let (song, mut artist_ids) = seed_song(&mut conn).await;
        link_all(&mut conn, song, &artist_ids).await.unwrap();

        // Relink in reverse order: existing rows keep their positions
        artist_ids.reverse();
        link_all(&mut conn, song, &artist_ids).await.unwrap();

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT artist_id, position FROM artist_songs WHERE song_id = ? ORDER BY position",
        )
        .bind(song)
        .fetch_all(&mut *conn)
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1, 0);
        assert_eq!(rows[0].0, artist_ids[1]); // original first artist
    }
}
