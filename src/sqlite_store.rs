//! Persistent [`VectorStore`] backed by SQLite.
//!
//! Chunk text lives in `{collection}_chunks`; embeddings are stored as
//! little-endian f32 BLOBs in `{collection}_vectors`. Queries embed the
//! text, then scan every vector and rank by squared L2 distance. Small
//! corpora of quarterly reports make the brute-force scan adequate.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use finrag_core::embedding::{blob_to_vec, squared_l2_distance, vec_to_blob, Embedder};
use finrag_core::store::{StoreEntry, StoreMatch, VectorStore};

use crate::config::Config;
use crate::db;
use crate::migrate::{self, CollectionTables};

pub struct SqliteVectorStore {
    pool: SqlitePool,
    tables: CollectionTables,
    collection: String,
    location: String,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl SqliteVectorStore {
    /// Open (creating if needed) the store described by `config`.
    pub async fn open(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let tables = CollectionTables::for_collection(&config.store.collection)?;
        let pool = db::connect(config).await?;
        migrate::create_tables(&pool, &tables).await?;

        Ok(Self {
            pool,
            tables,
            collection: config.store.collection.clone(),
            location: config.store.path.display().to_string(),
            embedder,
            batch_size: config.embedding.batch_size.max(1),
        })
    }

    /// Drop and recreate the collection's tables.
    pub async fn reset(&self) -> Result<()> {
        migrate::drop_tables(&self.pool, &self.tables).await?;
        migrate::create_tables(&self.pool, &self.tables).await?;
        debug!(collection = %self.collection, "collection reset");
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    async fn upsert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        entry: &StoreEntry,
        vector: &[f32],
        now: i64,
    ) -> Result<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (id, document_id, text, hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                document_id = excluded.document_id,
                text = excluded.text,
                hash = excluded.hash,
                created_at = excluded.created_at
            "#,
            self.tables.chunks
        ))
        .bind(&entry.id)
        .bind(&entry.document_id)
        .bind(&entry.text)
        .bind(&entry.hash)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {} (chunk_id, model, dims, embedding)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(chunk_id) DO UPDATE SET
                model = excluded.model,
                dims = excluded.dims,
                embedding = excluded.embedding
            "#,
            self.tables.vectors
        ))
        .bind(&entry.id)
        .bind(self.embedder.model_name())
        .bind(vector.len() as i64)
        .bind(vec_to_blob(vector))
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn add(&self, entries: &[StoreEntry]) -> Result<usize> {
        // Embed everything before touching the tables so a failing batch
        // leaves the collection unchanged.
        let mut vectors = Vec::with_capacity(entries.len());
        for batch in entries.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|e| e.text.clone()).collect();
            let embedded = self.embedder.embed(&texts).await?;
            if embedded.len() != batch.len() {
                bail!(
                    "embedder returned {} vectors for {} texts",
                    embedded.len(),
                    batch.len()
                );
            }
            vectors.extend(embedded);
            debug!(batch = batch.len(), embedded = vectors.len(), "embedded batch");
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;
        for (entry, vector) in entries.iter().zip(vectors.iter()) {
            self.upsert(&mut tx, entry, vector, now).await?;
        }
        tx.commit().await?;

        Ok(entries.len())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<StoreMatch>> {
        let query_vec = self
            .embedder
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT c.id, c.text, v.embedding
            FROM {} c
            JOIN {} v ON v.chunk_id = c.id
            "#,
            self.tables.chunks, self.tables.vectors
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut matches: Vec<StoreMatch> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let vector = blob_to_vec(&blob);
                StoreMatch {
                    id: row.get("id"),
                    text: row.get("text"),
                    distance: squared_l2_distance(&query_vec, &vector) as f64,
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(k);
        Ok(matches)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {}", self.tables.vectors))
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query(&format!("DELETE FROM {}", self.tables.chunks))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(removed as usize)
    }

    async fn count(&self) -> Result<usize> {
        let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.tables.chunks))
            .fetch_one(&self.pool)
            .await?;
        Ok(n as usize)
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}
