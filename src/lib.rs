//! # finrag
//!
//! Retrieval over quarterly financial reports.
//!
//! finrag chunks report text, indexes the chunks in a local SQLite vector
//! store, and answers questions with the best-matching chunk, a confidence
//! grade, and the report lines most relevant to the question.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Loader      │──▶│ Chunker     │──▶│ SQLite store │
//! │ .txt / .md  │   │ + Embedder  │   │ text + BLOBs │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │
//!                                            ▼
//!                ┌──────────────────────────────────┐
//!                │ Retriever: rank, grade, refine   │
//!                └──────────────────────────────────┘
//! ```
//!
//! The I/O-free pieces (chunking, relevance, confidence, the retrieval
//! façade) live in `finrag-core`; this crate adds configuration,
//! persistence, embedding backends and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! finrag init
//! finrag samples
//! finrag ask "Qual foi o lucro líquido do Banco Aurora?" --refine
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Collection tables |
//! | [`sqlite_store`] | Persistent vector store |
//! | [`embedding`] | Embedding providers |
//! | [`loader`] | Folder loading |
//! | [`samples`] | Built-in sample reports |
//! | [`index`] | `index`, `samples`, `chunk` commands |
//! | [`ask`] | `ask`, `search`, `extract` commands |
//! | [`stats`] | `stats`, `clear`, `reset` commands |

pub mod ask;
pub mod config;
pub mod db;
pub mod embedding;
pub mod index;
pub mod loader;
pub mod migrate;
pub mod samples;
pub mod sqlite_store;
pub mod stats;
