//! In-memory [`VectorStore`] implementation for testing and embedding
//! into other programs.
//!
//! Uses a `Vec` behind `std::sync::RwLock` for thread safety. Query is
//! brute-force squared-L2 distance over all stored vectors.

use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::embedding::{squared_l2_distance, Embedder};

use super::{StoreEntry, StoreMatch, VectorStore};

struct StoredEntry {
    entry: StoreEntry,
    vector: Vec<f32>,
}

/// In-memory vector store.
pub struct InMemoryStore {
    collection: String,
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<StoredEntry>>,
}

impl InMemoryStore {
    pub fn new(collection: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            collection: collection.into(),
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn add(&self, entries: &[StoreEntry]) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != entries.len() {
            anyhow::bail!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                entries.len()
            );
        }

        let mut stored = self.entries.write().map_err(poisoned)?;
        for (entry, vector) in entries.iter().zip(vectors) {
            stored.retain(|s| s.entry.id != entry.id);
            stored.push(StoredEntry {
                entry: entry.clone(),
                vector,
            });
        }
        Ok(entries.len())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<StoreMatch>> {
        let query_vec = self
            .embedder
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty embedding response"))?;

        let stored = self.entries.read().map_err(poisoned)?;
        let mut matches: Vec<StoreMatch> = stored
            .iter()
            .map(|s| StoreMatch {
                id: s.entry.id.clone(),
                text: s.entry.text.clone(),
                distance: squared_l2_distance(&query_vec, &s.vector) as f64,
            })
            .collect();
        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut stored = self.entries.write().map_err(poisoned)?;
        let removed = stored.len();
        stored.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    fn entry(id: &str, text: &str) -> StoreEntry {
        StoreEntry {
            id: id.to_string(),
            document_id: id.to_string(),
            text: text.to_string(),
            hash: String::new(),
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new("test", Arc::new(HashingEmbedder::default()))
    }

    #[tokio::test]
    async fn test_add_count_delete() {
        let s = store();
        assert_eq!(s.count().await.unwrap(), 0);
        let added = s
            .add(&[entry("doc_0", "lucro do banco"), entry("doc_1", "clima ameno")])
            .await
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(s.count().await.unwrap(), 2);
        assert_eq!(s.delete_all().await.unwrap(), 2);
        assert_eq!(s.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_same_id_replaces() {
        let s = store();
        s.add(&[entry("doc_0", "primeira versão")]).await.unwrap();
        s.add(&[entry("doc_0", "segunda versão")]).await.unwrap();
        assert_eq!(s.count().await.unwrap(), 1);
        let hits = s.query("versão", 5).await.unwrap();
        assert_eq!(hits[0].text, "segunda versão");
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let s = store();
        s.add(&[
            entry("doc_0", "chuvas no litoral sul"),
            entry("doc_1", "receita do banco no trimestre"),
            entry("doc_2", "receita do banco"),
        ])
        .await
        .unwrap();
        let hits = s.query("receita do banco", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "doc_2");
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[0].distance < 1e-6);
    }
}
