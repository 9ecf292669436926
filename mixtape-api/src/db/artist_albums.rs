//! Artist/album association

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

/// Link an artist to an album. Relinking an existing pair is a no-op.
pub async fn link(conn: &mut SqliteConnection, artist_id: i64, album_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO artist_albums (artist_id, album_id)
        VALUES (?, ?)
        ON CONFLICT(artist_id, album_id) DO NOTHING
        "#,
    )
    .bind(artist_id)
    .bind(album_id)
    .execute(conn)
    .await
    .with_context(|| format!("link artist {} to album {}", artist_id, album_id))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;
    use crate::db::{albums, artists};

    #[tokio::test]
    async fn test_relink_is_noop() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let artist = artists::insert_or_get_id(&mut conn, "Kanye West").await.unwrap();
        let album = albums::insert_or_get_id(&mut conn, "MBDTF").await.unwrap();

        link(&mut conn, artist, album).await.unwrap();
        link(&mut conn, artist, album).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM artist_albums")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_additional_primary_artists_become_extra_edges() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let kanye = artists::insert_or_get_id(&mut conn, "Kanye West").await.unwrap();
        let pusha = artists::insert_or_get_id(&mut conn, "Pusha T").await.unwrap();
        let album = albums::insert_or_get_id(&mut conn, "MBDTF").await.unwrap();

        link(&mut conn, kanye, album).await.unwrap();
        link(&mut conn, pusha, album).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM artist_albums")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
