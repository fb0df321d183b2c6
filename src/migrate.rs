//! Schema creation for the SQLite vector store.
//!
//! Each collection owns two tables: `{collection}_chunks` with the chunk
//! text and `{collection}_vectors` with one embedding BLOB per chunk.
//! Every statement is idempotent.

use anyhow::{bail, Result};
use sqlx::SqlitePool;

/// Table names for a collection. Collection names are restricted to
/// ASCII alphanumerics and `_` since they are spliced into SQL.
#[derive(Debug, Clone)]
pub struct CollectionTables {
    pub chunks: String,
    pub vectors: String,
}

impl CollectionTables {
    pub fn for_collection(collection: &str) -> Result<Self> {
        if collection.is_empty()
            || !collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            bail!(
                "Invalid collection name '{}': use ASCII letters, digits and '_'",
                collection
            );
        }
        Ok(Self {
            chunks: format!("{}_chunks", collection),
            vectors: format!("{}_vectors", collection),
        })
    }
}

pub async fn create_tables(pool: &SqlitePool, tables: &CollectionTables) -> Result<()> {
    // Create chunks table
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            text TEXT NOT NULL,
            hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
        tables.chunks
    ))
    .execute(pool)
    .await?;

    // Create vectors table
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            chunk_id TEXT PRIMARY KEY,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            embedding BLOB NOT NULL
        )
        "#,
        tables.vectors
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{0}_document_id ON {0}(document_id)",
        tables.chunks
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn drop_tables(pool: &SqlitePool, tables: &CollectionTables) -> Result<()> {
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", tables.vectors))
        .execute(pool)
        .await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", tables.chunks))
        .execute(pool)
        .await?;
    Ok(())
}
