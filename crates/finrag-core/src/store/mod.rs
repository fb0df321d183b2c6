//! Vector store abstraction.
//!
//! The [`VectorStore`] trait is the only view the retrieval façade has of
//! the storage and embedding engine: add entries, query by text, delete
//! everything, count. Embedding happens behind it, so callers deal in
//! text and distances only.
//!
//! Implementations must be `Send + Sync` to work with async runtimes, and
//! each call is treated as an atomic black-box operation.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// One record to index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// Store key (`doc_3` or `doc_3_chunk_1`).
    pub id: String,
    /// Identifier of the source document.
    pub document_id: String,
    pub text: String,
    /// SHA-256 of `text`.
    pub hash: String,
}

/// A ranked query hit. Lower distance means closer.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreMatch {
    pub id: String,
    pub text: String,
    pub distance: f64,
}

/// Abstract vector store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add`](VectorStore::add) | Embed and store entries |
/// | [`query`](VectorStore::query) | Nearest neighbours of a text, closest first |
/// | [`delete_all`](VectorStore::delete_all) | Remove every entry |
/// | [`count`](VectorStore::count) | Number of stored entries |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store entries, replacing any with the same id. Returns how many
    /// were written.
    async fn add(&self, entries: &[StoreEntry]) -> Result<usize>;

    /// Return up to `k` entries ordered by ascending distance to `text`.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<StoreMatch>>;

    /// Remove every entry. Returns how many were removed.
    async fn delete_all(&self) -> Result<usize>;

    async fn count(&self) -> Result<usize>;

    /// Collection name, for statistics.
    fn collection(&self) -> &str;

    /// Human-readable storage location, for statistics.
    fn location(&self) -> String;
}
