//! Store statistics and maintenance commands.
//!
//! `finrag stats` gives a quick summary of what's indexed; `clear` removes
//! every chunk while keeping the tables; `reset` drops and recreates them.

use anyhow::Result;

use finrag_core::models::StoreStats;

use crate::config::Config;
use crate::index::open_retriever;

/// Run the stats command: query the store and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let retriever = open_retriever(config).await?;
    let stats = retriever.stats().await?;

    let db_size = std::fs::metadata(&config.store.path)
        .map(|m| m.len())
        .unwrap_or(0);

    print!("{}", render_stats(&stats, db_size));
    Ok(())
}

fn render_stats(stats: &StoreStats, db_size: u64) -> String {
    let mut out = String::new();
    out.push_str("finrag: Store Stats\n");
    out.push_str("===================\n\n");
    out.push_str(&format!("  Collection:  {}\n", stats.collection));
    out.push_str(&format!("  Location:    {}\n", stats.location));
    out.push_str(&format!("  Size:        {}\n", format_bytes(db_size)));
    out.push_str(&format!("  Chunks:      {}\n", stats.total_chunks));
    out.push_str(&format!("  Status:      {}\n", stats.status()));
    out
}

/// Remove every stored chunk, keeping the collection.
pub async fn run_clear(config: &Config) -> Result<()> {
    let retriever = open_retriever(config).await?;
    let removed = retriever.clear().await?;
    if removed == 0 {
        println!("Collection '{}' was already empty.", config.store.collection);
    } else {
        println!(
            "Removed {} chunk{} from '{}'.",
            removed,
            if removed == 1 { "" } else { "s" },
            config.store.collection
        );
    }
    Ok(())
}

/// Drop and recreate the collection.
pub async fn run_reset(config: &Config) -> Result<()> {
    let retriever = open_retriever(config).await?;
    retriever.store().reset().await?;
    println!("Collection '{}' reset.", config.store.collection);
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_render_stats_reports_status() {
        let stats = StoreStats {
            total_chunks: 0,
            collection: "financial_reports".to_string(),
            location: "./data/finrag.sqlite".to_string(),
        };
        let out = render_stats(&stats, 0);
        assert!(out.contains("Collection:  financial_reports"));
        assert!(out.contains("Status:      empty"));
    }
}
