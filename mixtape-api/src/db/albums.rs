//! Album database operations
//!
//! Albums are deduplicated by name: `insert_or_get_id` is the get-or-create
//! primitive the song upsert path builds on.

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

/// Resolve an album name to its row id, creating the row if needed.
///
/// The insert is conflict-tolerant: when another writer has already created
/// the row (or it existed before the call), the insert returns no id and the
/// fallback select picks up the existing one. With the UNIQUE constraint on
/// `name` this is race-safe without any explicit locking.
pub async fn insert_or_get_id(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let inserted: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO albums (name)
        VALUES (?)
        ON CONFLICT(name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("insert album '{}'", name))?;

    if let Some((id,)) = inserted {
        return Ok(id);
    }

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM albums WHERE name = ?")
        .bind(name)
        .fetch_one(conn)
        .await
        .with_context(|| format!("select id of existing album '{}'", name))?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;

    #[tokio::test]
    async fn test_insert_returns_new_id() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let id = insert_or_get_id(&mut conn, "MBDTF").await.unwrap();
        assert!(id > 0);
    }

    #[tokio::test]
    async fn test_repeated_insert_is_idempotent() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let first = insert_or_get_id(&mut conn, "MBDTF").await.unwrap();
        let second = insert_or_get_id(&mut conn, "MBDTF").await.unwrap();
        assert_eq!(first, second);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM albums")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1, "duplicate upsert must not create a second row");
    }

    #[tokio::test]
    async fn test_concurrent_upserts_of_same_name_share_one_row() {
        // Multi-connection file-backed pool so the two tasks really race;
        // the UNIQUE constraint plus the fallback select must converge them
        // on a single row
        let dir = tempfile::TempDir::new().unwrap();
        let pool = mixtape_common::db::init_database(&dir.path().join("race.db"))
            .await
            .unwrap();

        let first = {
            let pool = pool.clone();
            tokio::spawn(async move {
                let mut conn = pool.acquire().await.unwrap();
                insert_or_get_id(&mut conn, "MBDTF").await.unwrap()
            })
        };
        let second = {
            let pool = pool.clone();
            tokio::spawn(async move {
                let mut conn = pool.acquire().await.unwrap();
                insert_or_get_id(&mut conn, "MBDTF").await.unwrap()
            })
        };

        let (first, second) = (first.await.unwrap(), second.await.unwrap());
        assert_eq!(first, second);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM albums")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_distinct_names_get_distinct_ids() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let a = insert_or_get_id(&mut conn, "MBDTF").await.unwrap();
        let b = insert_or_get_id(&mut conn, "Yeezus").await.unwrap();
        assert_ne!(a, b);
    }
}
