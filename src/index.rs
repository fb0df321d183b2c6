//! Indexing commands: `index`, `samples` and the `chunk` preview.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use finrag_core::chunk::chunk_document;
use finrag_core::models::IndexReport;
use finrag_core::retrieve::Retriever;

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::loader::{load_file, load_folder};
use crate::samples::sample_reports;
use crate::sqlite_store::SqliteVectorStore;

/// Open the configured store behind a [`Retriever`].
pub async fn open_retriever(config: &Config) -> Result<Retriever<SqliteVectorStore>> {
    let embedder = create_embedder(&config.embedding)?;
    let store = SqliteVectorStore::open(config, embedder).await?;
    Ok(Retriever::new(store, config.retrieval_params())?)
}

/// Index the `.txt`/`.md` files of a folder.
pub async fn run_index(config: &Config, folder: &Path, patterns: &[String]) -> Result<()> {
    let loaded = load_folder(folder, patterns, &config.loader)?;

    for skipped in &loaded.skipped {
        println!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }
    if loaded.documents.is_empty() {
        println!("No supported files to index.");
        return Ok(());
    }

    let retriever = open_retriever(config).await?;
    let report = retriever.index_documents(&loaded.documents).await?;
    print_report(&report);
    Ok(())
}

/// Index the built-in sample reports.
pub async fn run_samples(config: &Config) -> Result<()> {
    let retriever = open_retriever(config).await?;
    let report = retriever.index_documents(&sample_reports()).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &IndexReport) {
    info!(
        documents = report.documents,
        chunks = report.chunks_added,
        "index complete"
    );
    println!(
        "Indexed {} document{} ({} chunk{} added, {} in store).",
        report.documents,
        if report.documents == 1 { "" } else { "s" },
        report.chunks_added,
        if report.chunks_added == 1 { "" } else { "s" },
        report.total_in_store
    );
}

/// Print how a file would be chunked, without touching the store.
pub fn run_chunk(config: &Config, file: &Path, json: bool) -> Result<()> {
    let doc = load_file(file)?;
    let chunks = chunk_document(&doc, &config.chunking_params())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    println!(
        "{}: {} characters, {} chunk{}",
        file.display(),
        doc.char_len(),
        chunks.len(),
        if chunks.len() == 1 { "" } else { "s" }
    );
    for chunk in &chunks {
        let first_line = chunk.text.lines().next().unwrap_or_default();
        println!(
            "  [{}] {}..{} ({} chars) {}",
            chunk.part_index,
            chunk.start_offset,
            chunk.end_offset,
            chunk.text.chars().count(),
            first_line
        );
    }
    Ok(())
}
