//! Artist database operations
//!
//! Same get-or-create contract as albums, plus a bulk variant that resolves
//! a whole artist list in input order.

use anyhow::{Context, Result};
use sqlx::SqliteConnection;

/// Resolve an artist name to its row id, creating the row if needed.
pub async fn insert_or_get_id(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let inserted: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO artists (name)
        VALUES (?)
        ON CONFLICT(name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("insert artist '{}'", name))?;

    if let Some((id,)) = inserted {
        return Ok(id);
    }

    let (id,): (i64,) = sqlx::query_as("SELECT id FROM artists WHERE name = ?")
        .bind(name)
        .fetch_one(conn)
        .await
        .with_context(|| format!("select id of existing artist '{}'", name))?;

    Ok(id)
}

/// Resolve every name in `names` to an artist id, creating rows as needed.
///
/// Returned ids are in the same order as the input; duplicate names within
/// the list collapse to the same id. Runs on the caller's connection so the
/// whole list resolves inside one transaction.
pub async fn insert_or_get_ids(
    conn: &mut SqliteConnection,
    names: &[String],
) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(insert_or_get_id(conn, name).await?);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util::memory_pool;

    #[tokio::test]
    async fn test_bulk_preserves_input_order() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let names = vec![
            "Kanye West".to_string(),
            "Pusha T".to_string(),
            "Rick Ross".to_string(),
        ];
        let ids = insert_or_get_ids(&mut conn, &names).await.unwrap();
        assert_eq!(ids.len(), 3);

        for (name, id) in names.iter().zip(&ids) {
            let (stored,): (String,) = sqlx::query_as("SELECT name FROM artists WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *conn)
                .await
                .unwrap();
            assert_eq!(&stored, name);
        }
    }

    #[tokio::test]
    async fn test_bulk_collapses_duplicate_names() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let names = vec![
            "Kanye West".to_string(),
            "Pusha T".to_string(),
            "Kanye West".to_string(),
        ];
        let ids = insert_or_get_ids(&mut conn, &names).await.unwrap();
        assert_eq!(ids[0], ids[2]);
        assert_ne!(ids[0], ids[1]);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM artists")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_bulk_reuses_existing_rows() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let first = insert_or_get_id(&mut conn, "Kanye West").await.unwrap();
        let ids = insert_or_get_ids(&mut conn, &["Kanye West".to_string()])
            .await
            .unwrap();
        assert_eq!(ids, vec![first]);
    }
}
