//! Core data models used throughout finrag.
//!
//! These types represent the documents, chunks, scored lines, and
//! retrieval records that flow through the indexing and query pipeline.
//! Every record has fixed fields; nothing is passed around as an untyped
//! map.

use serde::Serialize;

use crate::confidence::ConfidenceTier;

/// Glyph that marks a document's title line (`"📄 report.txt:"`).
pub const TITLE_MARKER: char = '📄';

/// How many leading lines are searched for a title marker.
const TITLE_SCAN_LINES: usize = 5;

/// A source document: an identifier plus its raw text.
///
/// The title and body are derived views over the raw text; the document
/// itself is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    identifier: String,
    raw: String,
}

impl Document {
    pub fn new(identifier: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            raw: raw.into(),
        }
    }

    /// Build a document the way uploads are labelled: a `📄 {name}:`
    /// header line followed by the file content.
    pub fn from_file(identifier: impl Into<String>, file_name: &str, content: &str) -> Self {
        Self::new(identifier, format!("{} {}:\n{}", TITLE_MARKER, file_name, content))
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The full, unsplit text of the document.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Number of characters (not bytes) in the raw text.
    pub fn char_len(&self) -> usize {
        self.raw.chars().count()
    }

    /// The title line, if one of the first five lines carries the marker.
    pub fn title(&self) -> Option<&str> {
        self.split_title().0
    }

    /// The text after the title line, or the whole text when untitled.
    pub fn body(&self) -> String {
        self.split_title().1
    }

    fn split_title(&self) -> (Option<&str>, String) {
        let lines: Vec<&str> = self.raw.split('\n').collect();
        for (i, line) in lines.iter().take(TITLE_SCAN_LINES).enumerate() {
            if line.contains(TITLE_MARKER) {
                return (Some(line.trim()), lines[i + 1..].join("\n"));
            }
        }
        (None, self.raw.clone())
    }
}

/// A contiguous, title-annotated segment of a document body.
///
/// For split documents, offsets are character offsets into
/// [`Document::body`] and describe the span before overlap trimming and
/// whitespace stripping. A document kept whole yields one chunk spanning
/// [`Document::raw`], title line included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub id: String,
    pub source_document_id: String,
    /// 1-based position in emission order.
    pub part_index: usize,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    /// SHA-256 of `text`, hex encoded.
    pub hash: String,
}

/// A document line paired with its relevance score for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredLine<'a> {
    pub line: &'a str,
    pub score: u32,
}

/// A ranked match returned by a [`VectorStore`](crate::store::VectorStore) query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub text: String,
    pub similarity: f64,
    /// 1-based position among returned candidates.
    pub rank: usize,
}

/// The best match for a query, graded and trimmed for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    /// Full stored text of the rank-1 chunk.
    pub best_chunk_text: String,
    pub similarity: f64,
    pub confidence: ConfidenceTier,
    pub rank: usize,
    /// `best_chunk_text` truncated for presentation.
    pub excerpt: String,
}

/// Per-query retrieval statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalMetrics {
    /// Share of candidates whose similarity exceeds the precision threshold.
    pub semantic_precision: f64,
    pub retrieval_latency_ms: f64,
    pub confidence_distribution: ConfidenceDistribution,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceDistribution {
    pub fn record(&mut self, tier: ConfidenceTier) {
        match tier {
            ConfidenceTier::High => self.high += 1,
            ConfidenceTier::Medium => self.medium += 1,
            ConfidenceTier::Low => self.low += 1,
        }
    }
}

/// Summary of one indexing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks_added: usize,
    pub total_in_store: usize,
}

/// Store-level statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_chunks: usize,
    pub collection: String,
    pub location: String,
}

impl StoreStats {
    pub fn status(&self) -> &'static str {
        if self.total_chunks > 0 {
            "active"
        } else {
            "empty"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_on_first_line() {
        let doc = Document::from_file("d1", "relatorio.txt", "Linha um\nLinha dois");
        assert_eq!(doc.title(), Some("📄 relatorio.txt:"));
        assert_eq!(doc.body(), "Linha um\nLinha dois");
    }

    #[test]
    fn test_title_within_first_five_lines() {
        let doc = Document::new("d1", "\n\n\n  📄 late.txt:  \ncorpo");
        assert_eq!(doc.title(), Some("📄 late.txt:"));
        assert_eq!(doc.body(), "corpo");
    }

    #[test]
    fn test_marker_after_fifth_line_is_not_a_title() {
        let doc = Document::new("d1", "a\nb\nc\nd\ne\n📄 tarde.txt:\nf");
        assert_eq!(doc.title(), None);
        assert_eq!(doc.body(), doc.raw());
    }

    #[test]
    fn test_char_len_counts_characters() {
        let doc = Document::new("d1", "patrimônio");
        assert_eq!(doc.char_len(), 10);
        assert!(doc.raw().len() > 10);
    }

    #[test]
    fn test_store_stats_status() {
        let mut stats = StoreStats {
            total_chunks: 0,
            collection: "c".into(),
            location: "mem".into(),
        };
        assert_eq!(stats.status(), "empty");
        stats.total_chunks = 3;
        assert_eq!(stats.status(), "active");
    }
}
