//! Overlapping, line-snapping document chunker.
//!
//! Splits an oversized document body into [`Chunk`]s of at most
//! `max_chunk_size` characters, each sharing an `overlap`-character window
//! with its predecessor. Documents at or below the oversize threshold are
//! indexed whole.
//!
//! # Algorithm
//!
//! 1. Extract the title: the first of the leading five lines that carries
//!    the `📄` marker. Only the lines after it are chunked.
//! 2. From `start`, propose `end = start + max_chunk_size`.
//! 3. If `end` falls inside the content, walk backward looking for `'\n'`,
//!    no further than `max(start + max_chunk_size / 2, end - 200)`, and
//!    snap `end` to it when found.
//! 4. Trim the span, label it `"{title} (Parte {n}):"`, drop it if empty.
//! 5. Advance to `end - overlap`; stop once a span reaches the end.
//!
//! All sizes and offsets are in characters, not bytes, so multi-byte
//! text (accents, the title glyph) never splits inside a code point.
//!
//! # Example
//!
//! ```rust
//! use finrag_core::chunk::split_into_chunks;
//! use finrag_core::models::Document;
//!
//! let doc = Document::new("doc_0", "a".repeat(5000));
//! let chunks = split_into_chunks(&doc, 2000, 200).unwrap();
//! assert_eq!(chunks.len(), 3);
//! assert!(chunks[0].text.starts_with("Documento (Parte 1):"));
//! ```

use std::ops::Range;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{RagError, Result};
use crate::models::{Chunk, Document};

pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2000;
pub const DEFAULT_OVERLAP: usize = 200;
/// Documents longer than this many characters are chunked.
pub const DEFAULT_OVERSIZE_THRESHOLD: usize = 10_000;

/// Upper bound on how far back a boundary may move to reach a line break.
const SNAP_WINDOW: usize = 200;

/// Label used in place of a missing title.
const UNTITLED_LABEL: &str = "Documento";

/// Chunking tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingParams {
    pub max_chunk_size: usize,
    pub overlap: usize,
    pub oversize_threshold: usize,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            oversize_threshold: DEFAULT_OVERSIZE_THRESHOLD,
        }
    }
}

impl ChunkingParams {
    pub fn validate(&self) -> Result<()> {
        validate_sizes(self.max_chunk_size, self.overlap)
    }
}

fn validate_sizes(max_chunk_size: usize, overlap: usize) -> Result<()> {
    if max_chunk_size == 0 {
        return Err(RagError::configuration("max_chunk_size must be > 0"));
    }
    if overlap >= max_chunk_size {
        return Err(RagError::configuration(format!(
            "overlap ({}) must be smaller than max_chunk_size ({})",
            overlap, max_chunk_size
        )));
    }
    Ok(())
}

/// Segment a document for indexing.
///
/// Returns a single unit carrying the raw, unmodified text when the
/// document is at or below `params.oversize_threshold` characters, and
/// the output of [`split_into_chunks`] otherwise.
///
/// # Errors
///
/// [`RagError::Configuration`] when `max_chunk_size` is zero or
/// `overlap >= max_chunk_size`, even if the document would not be split.
pub fn chunk_document(doc: &Document, params: &ChunkingParams) -> Result<Vec<Chunk>> {
    params.validate()?;

    let len = doc.char_len();
    if len <= params.oversize_threshold {
        return Ok(vec![make_chunk(
            doc.identifier().to_string(),
            doc.identifier(),
            1,
            doc.raw().to_string(),
            0..len,
        )]);
    }

    split_into_chunks(doc, params.max_chunk_size, params.overlap)
}

/// Split a document body into overlapping, title-annotated chunks.
///
/// Unlike [`chunk_document`], this always splits, regardless of length.
///
/// # Guarantees
///
/// - Part numbers are contiguous from 1 in emission order.
/// - The recorded spans cover the body with no gap; consecutive spans
///   share exactly `overlap` characters unless the walk had to advance
///   past a short span.
/// - Whitespace-only spans produce no chunk.
pub fn split_into_chunks(doc: &Document, max_chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    validate_sizes(max_chunk_size, overlap)?;

    let label = doc.title().unwrap_or(UNTITLED_LABEL);
    let content: Vec<char> = doc.body().chars().collect();

    let mut chunks = Vec::new();
    for span in chunk_spans(&content, max_chunk_size, overlap) {
        let slice: String = content[span.clone()].iter().collect();
        let body = slice.trim();
        if body.is_empty() {
            debug!(
                document = doc.identifier(),
                start = span.start,
                end = span.end,
                "dropping whitespace-only span"
            );
            continue;
        }

        let part = chunks.len() + 1;
        let text = format!("{} (Parte {}):\n{}", label, part, body);
        chunks.push(make_chunk(
            format!("{}_chunk_{}", doc.identifier(), part - 1),
            doc.identifier(),
            part,
            text,
            span,
        ));
    }

    debug!(
        document = doc.identifier(),
        chars = content.len(),
        chunks = chunks.len(),
        "split document"
    );

    Ok(chunks)
}

/// Compute chunk spans (character ranges) over `content`.
///
/// Callers must have validated `overlap < max_chunk_size` and
/// `max_chunk_size > 0`. Every iteration strictly advances `start`.
pub fn chunk_spans(content: &[char], max_chunk_size: usize, overlap: usize) -> Vec<Range<usize>> {
    let len = content.len();
    let mut spans = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = (start + max_chunk_size).min(len);

        if end < len {
            let floor = (start + max_chunk_size / 2).max(end.saturating_sub(SNAP_WINDOW));
            if let Some(i) = (floor + 1..=end).rev().find(|&i| content[i] == '\n') {
                end = i;
            }
        }

        spans.push(start..end);

        if end >= len {
            break;
        }

        let next = if end > overlap { end - overlap } else { end };
        start = if next > start { next } else { end };
    }

    spans
}

/// Create a single [`Chunk`] with a SHA-256 content hash.
fn make_chunk(id: String, document_id: &str, part_index: usize, text: String, span: Range<usize>) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id,
        source_document_id: document_id.to_string(),
        part_index,
        text,
        start_offset: span.start,
        end_offset: span.end,
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_lines(n: usize) -> String {
        (0..n)
            .map(|i| format!("Linha {:04}: receita de R$ {} milhões no trimestre.", i, i * 3))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn body_chars(doc: &Document) -> Vec<char> {
        doc.body().chars().collect()
    }

    #[test]
    fn test_small_document_kept_whole() {
        let doc = Document::from_file("doc_0", "a.txt", "Lucro de R$ 5 milhões.\n\n  ");
        let chunks = chunk_document(&doc, &ChunkingParams::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, doc.raw());
        assert_eq!(chunks[0].id, "doc_0");
        assert_eq!(chunks[0].part_index, 1);
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].end_offset, doc.raw().chars().count());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let doc = Document::new("doc_0", "x".repeat(DEFAULT_OVERSIZE_THRESHOLD));
        let chunks = chunk_document(&doc, &ChunkingParams::default()).unwrap();
        assert_eq!(chunks.len(), 1);

        let doc = Document::new("doc_1", "x".repeat(DEFAULT_OVERSIZE_THRESHOLD + 1));
        let chunks = chunk_document(&doc, &ChunkingParams::default()).unwrap();
        assert!(chunks.len() > 1);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_rejected() {
        let doc = Document::new("doc_0", "texto");
        let err = split_into_chunks(&doc, 200, 200).unwrap_err();
        assert!(matches!(err, RagError::Configuration(_)));

        let params = ChunkingParams {
            max_chunk_size: 0,
            overlap: 0,
            oversize_threshold: 10,
        };
        assert!(chunk_document(&doc, &params).is_err());
    }

    #[test]
    fn test_twelve_thousand_chars_scenario() {
        let doc = Document::new("doc_0", "y".repeat(12_000));
        let chunks = chunk_document(&doc, &ChunkingParams::default()).unwrap();
        assert!(chunks.len() >= 6, "got {} chunks", chunks.len());

        let overhead = "Documento (Parte 99):\n".chars().count();
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.part_index, i + 1);
            assert!(c.text.contains(&format!("(Parte {})", i + 1)));
            assert!(c.text.chars().count() <= DEFAULT_MAX_CHUNK_SIZE + overhead);
        }
    }

    #[test]
    fn test_title_annotates_every_chunk() {
        let doc = Document::from_file("doc_3", "itau_3t25.txt", &report_lines(400));
        let chunks = split_into_chunks(&doc, 2000, 200).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.starts_with(&format!("📄 itau_3t25.txt: (Parte {}):\n", c.part_index)));
            assert!(!c.text.contains("📄 itau_3t25.txt:\n"));
            assert_eq!(c.source_document_id, "doc_3");
        }
        assert_eq!(chunks[1].id, "doc_3_chunk_1");
    }

    #[test]
    fn test_spans_cover_content_without_gaps() {
        let doc = Document::new("doc_0", report_lines(500));
        let content = body_chars(&doc);
        for (max, overlap) in [(2000, 200), (500, 0), (333, 100), (50, 49), (1000, 10)] {
            let spans = chunk_spans(&content, max, overlap);
            assert_eq!(spans[0].start, 0);
            assert_eq!(spans.last().unwrap().end, content.len());
            for pair in spans.windows(2) {
                assert!(pair[1].start <= pair[0].end, "gap between {:?} and {:?}", pair[0], pair[1]);
                assert!(pair[1].start > pair[0].start);
            }
        }
    }

    #[test]
    fn test_overlap_window_is_identical() {
        let doc = Document::new("doc_0", report_lines(500));
        let content = body_chars(&doc);
        let overlap = 200;
        let spans = chunk_spans(&content, 2000, overlap);
        for pair in spans.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.len() >= overlap && b.len() >= overlap {
                assert_eq!(&content[a.end - overlap..a.end], &content[b.start..b.start + overlap]);
            }
        }
    }

    #[test]
    fn test_iteration_bound_without_line_breaks() {
        for n in [10_001usize, 12_000, 18_000, 25_555] {
            let content: Vec<char> = "z".repeat(n).chars().collect();
            let spans = chunk_spans(&content, 2000, 200);
            let bound = (n + 1799) / 1800;
            assert!(spans.len() <= bound, "n={} spans={} bound={}", n, spans.len(), bound);
        }
    }

    #[test]
    fn test_boundary_snaps_to_line_break() {
        let mut text = "a".repeat(1900);
        text.push('\n');
        text.push_str(&"b".repeat(3000));
        let doc = Document::new("doc_0", text);
        let content = body_chars(&doc);
        let spans = chunk_spans(&content, 2000, 200);
        assert_eq!(spans[0], 0..1900);
        assert_eq!(spans[1].start, 1700);
    }

    #[test]
    fn test_line_break_outside_window_is_ignored() {
        let mut text = "a".repeat(1500);
        text.push('\n');
        text.push_str(&"b".repeat(3000));
        let content: Vec<char> = text.chars().collect();
        let spans = chunk_spans(&content, 2000, 200);
        assert_eq!(spans[0], 0..2000);
    }

    #[test]
    fn test_whitespace_spans_are_dropped() {
        let mut text = "a".repeat(100);
        text.push_str(&" ".repeat(400));
        text.push_str(&"b".repeat(100));
        let doc = Document::new("doc_0", text);
        let chunks = split_into_chunks(&doc, 100, 0).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.ends_with(&"a".repeat(100)));
        assert!(chunks[1].text.ends_with(&"b".repeat(100)));
        assert_eq!(chunks[1].part_index, 2);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "patrimônio líquido ação ".repeat(700);
        let doc = Document::new("doc_0", text);
        let chunks = split_into_chunks(&doc, 1000, 100).unwrap();
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.end_offset - c.start_offset <= 1000);
        }
    }

    #[test]
    fn test_deterministic() {
        let doc = Document::new("doc_0", report_lines(300));
        let c1 = split_into_chunks(&doc, 700, 70).unwrap();
        let c2 = split_into_chunks(&doc, 700, 70).unwrap();
        assert_eq!(c1, c2);
    }
}
