//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the catalog schema.
//! All table creation is idempotent (`CREATE TABLE IF NOT EXISTS`), so init
//! is safe to run on every startup.
//!
//! The uniqueness constraints here are load-bearing: the upsert layer relies
//! on `UNIQUE` natural keys plus conflict-tolerant inserts to stay race-safe
//! under concurrent duplicate writes.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Referential integrity between songs, artists, albums and the join tables
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while one request is writing
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_all_tables(&pool).await?;

    Ok(pool)
}

/// Create the full catalog schema. Idempotent.
///
/// Also used by tests to set up in-memory databases.
pub async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    create_playlists_table(pool).await?;
    create_albums_table(pool).await?;
    create_artists_table(pool).await?;
    create_songs_table(pool).await?;

    // Linking tables
    create_artist_songs_table(pool).await?;
    create_artist_albums_table(pool).await?;
    create_playlist_songs_table(pool).await?;

    Ok(())
}

pub async fn create_playlists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            user_id TEXT NOT NULL,
            user_name TEXT NOT NULL,
            image_url TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            album_id INTEGER NOT NULL REFERENCES albums(id),
            image_url TEXT NOT NULL DEFAULT '',
            duration INTEGER NOT NULL DEFAULT 0,
            isrc TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(name, album_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_artist_songs_table(pool: &SqlitePool) -> Result<()> {
    // `position` records the artist's index in the song's original artist
    // list; reads order by it to reconstruct the list.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artist_songs (
            song_id INTEGER NOT NULL REFERENCES songs(id),
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            position INTEGER NOT NULL,
            PRIMARY KEY (song_id, artist_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_artist_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artist_albums (
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            album_id INTEGER NOT NULL REFERENCES albums(id),
            PRIMARY KEY (artist_id, album_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_playlist_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlist_songs (
            playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            song_id INTEGER NOT NULL REFERENCES songs(id),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (playlist_id, song_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
