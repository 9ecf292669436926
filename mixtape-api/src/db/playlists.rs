//! Playlist database operations

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mixtape_common::model::{NewPlaylist, Playlist};
use sqlx::{Row, SqlitePool};

/// Insert a playlist and return its storage-assigned id.
pub async fn insert(pool: &SqlitePool, playlist: &NewPlaylist) -> Result<i64> {
    let now = Utc::now();

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO playlists (name, description, user_id, user_name, image_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(&playlist.user_id)
    .bind(&playlist.user_name)
    .bind(&playlist.image_url)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .with_context(|| format!("insert playlist '{}'", playlist.name))?;

    Ok(id)
}

/// List playlists, optionally restricted to one owner.
pub async fn select_all(pool: &SqlitePool, user_id: Option<&str>) -> Result<Vec<Playlist>> {
    let rows = match user_id {
        Some(user_id) => {
            sqlx::query("SELECT * FROM playlists WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query("SELECT * FROM playlists ORDER BY id")
                .fetch_all(pool)
                .await
        }
    }
    .context("select playlists")?;

    rows.iter().map(row_to_playlist).collect()
}

pub async fn select_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Playlist>> {
    let row = sqlx::query("SELECT * FROM playlists WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("select playlist {}", id))?;

    row.as_ref().map(row_to_playlist).transpose()
}

/// Delete a playlist. Its playlist_songs rows go with it; songs, artists and
/// albums are shared across playlists and stay.
pub async fn delete_by_id(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("delete playlist {}", id))?;

    Ok(())
}

fn row_to_playlist(row: &sqlx::sqlite::SqliteRow) -> Result<Playlist> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Playlist {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        image_url: row.try_get("image_url")?,
        created_at,
        updated_at,
    })
}
