//! # finrag core
//!
//! I/O-free logic for finrag: document segmentation, line-level
//! relevance ranking, confidence grading, the vector store abstraction,
//! and the retrieval façade that ties them together.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or network
//! clients. Concrete stores and embedding providers live in the `finrag`
//! application crate; [`store::memory::InMemoryStore`] and
//! [`embedding::HashingEmbedder`] are provided here for tests and
//! offline use.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Document`, `Chunk`, `ScoredLine`, result records |
//! | [`chunk`] | Overlapping, title-annotated chunker |
//! | [`relevance`] | Heuristic line scoring with a fallback ladder |
//! | [`confidence`] | Similarity → confidence tier |
//! | [`embedding`] | `Embedder` trait, hashing embedder, vector helpers |
//! | [`store`] | `VectorStore` trait and in-memory implementation |
//! | [`retrieve`] | Retrieval façade |
//! | [`error`] | Error taxonomy |

pub mod chunk;
pub mod confidence;
pub mod embedding;
pub mod error;
pub mod models;
pub mod relevance;
pub mod retrieve;
pub mod store;

pub use error::{RagError, Result};
