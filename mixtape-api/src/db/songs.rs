//! Song database operations
//!
//! Songs are deduplicated by the (name, album) natural key.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqliteConnection;

/// Resolve a (name, album) pair to a song id, creating the row if needed.
///
/// Image, duration and ISRC are written on first creation only: a later call
/// with the same natural key but different attributes returns the existing
/// id and leaves the stored attributes untouched. Callers relying on
/// re-upsert to update attributes will be surprised; this mirrors the
/// conflict-tolerant insert (the conflicting row's values simply never make
/// it into the table).
pub async fn insert_or_get_id(
    conn: &mut SqliteConnection,
    name: &str,
    album_id: i64,
    image_url: &str,
    duration: i64,
    isrc: Option<&str>,
) -> Result<i64> {
    let now = Utc::now();

    let inserted: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO songs (name, album_id, image_url, duration, isrc, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(name, album_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(album_id)
    .bind(image_url)
    .bind(duration)
    .bind(isrc)
    .bind(now)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("insert song '{}' (album {})", name, album_id))?;

    if let Some((id,)) = inserted {
        return Ok(id);
    }

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM songs WHERE name = ? AND album_id = ?")
        .bind(name)
        .bind(album_id)
        .fetch_one(conn)
        .await
        .with_context(|| format!("select id of existing song '{}' (album {})", name, album_id))?;

    Ok(id)
}
