//! Heuristic line-level relevance ranking.
//!
//! Re-ranks the lines of a single document against a natural-language
//! query, independent of the coarse chunk-level similarity search. The
//! vocabulary (stop words, currency, metric and period markers) targets
//! Portuguese-language financial reports.
//!
//! # Scoring
//!
//! Every trimmed line of at least 10 characters earns:
//!
//! | Signal | Points |
//! |--------|--------|
//! | each distinct query term found in the line | +3 |
//! | any currency/scale marker (`r$`, `milhões`, `bilhões`, `%`) | +2 |
//! | any metric keyword (`lucro`, `receita`, `ebitda`, …) | +2 |
//! | any period marker (`3t25`, `q3`, `trimestre`, …) | +1 |
//!
//! Zero-score lines are discarded; the rest are stable-sorted by score.
//!
//! # Fallback ladder
//!
//! When nothing scores, [`extract_relevant`] falls back to lines with
//! currency markers, then to the leading lines of the document, then to a
//! truncated prefix. Invalid input degrades to an error line plus the
//! prefix; the function never fails.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Document, ScoredLine, TITLE_MARKER};

pub const DEFAULT_TOP_K: usize = 8;

const MIN_LINE_CHARS: usize = 10;
const FALLBACK_LIMIT: usize = 5;
const LEADING_LINE_MIN_CHARS: usize = 20;
const PREFIX_CHARS: usize = 300;

const TERM_PUNCTUATION: &[char] = &['.', ',', '?', '!', '(', ')', ';', ':'];

const STOP_WORDS: &[&str] = &[
    "o", "a", "do", "da", "de", "no", "na", "em", "por", "para", "com", "foi", "ser", "qual",
    "que", "como",
];

const CURRENCY_MARKERS: &[&str] = &["r$", "milhões", "bilhões", "%"];
const METRIC_KEYWORDS: &[&str] = &["lucro", "receita", "ebitda", "roe", "margem", "patrimônio"];
const PERIOD_MARKERS: &[&str] = &["3t25", "q3", "trimestre", "2024", "2025"];
const TITLE_HINTS: &[&str] = &["relatório", "trimestre"];

const TERM_POINTS: u32 = 3;
const CURRENCY_POINTS: u32 = 2;
const METRIC_POINTS: u32 = 2;
const PERIOD_POINTS: u32 = 1;

/// Which rung of the ladder produced the lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Lines ranked by score.
    Scored,
    /// Nothing scored; lines carrying currency/scale markers.
    CurrencyFallback,
    /// Nothing scored or carried markers; leading lines of the document.
    LeadingLinesFallback,
    /// Nothing usable; a truncated prefix of the raw text.
    PrefixFallback,
    /// Extraction could not run; `reason` explains why.
    Degraded { reason: String },
}

/// Lines extracted from a document for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Bold header line, when the document opens with a title.
    pub title: Option<String>,
    pub lines: Vec<String>,
    pub outcome: ExtractionOutcome,
}

impl Extraction {
    /// True when the lines came from scoring rather than a fallback.
    pub fn is_scored(&self) -> bool {
        self.outcome == ExtractionOutcome::Scored
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Degraded { .. })
    }

    /// Render as Markdown: optional bold title, a blank line, then lines.
    pub fn render(&self) -> String {
        if self.is_degraded() {
            return self.lines.join("\n\n");
        }
        let mut parts: Vec<&str> = Vec::new();
        if let Some(title) = &self.title {
            parts.push(title);
            parts.push("");
        }
        parts.extend(self.lines.iter().map(String::as_str));
        parts.join("\n")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("document has no text")]
    EmptyDocument,
    #[error("top_k must be > 0")]
    ZeroTopK,
}

/// Extract the query-relevant lines of a document. Never fails.
///
/// Errors from [`try_extract`] degrade to an error line followed by the
/// first 300 characters of the document.
pub fn extract_relevant(doc: &Document, query: &str, top_k: usize) -> Extraction {
    match try_extract(doc, query, top_k) {
        Ok(extraction) => {
            debug!(
                document = doc.identifier(),
                outcome = ?extraction.outcome,
                lines = extraction.lines.len(),
                "extracted relevant lines"
            );
            extraction
        }
        Err(e) => {
            warn!(document = doc.identifier(), error = %e, "relevance extraction degraded");
            Extraction {
                title: None,
                lines: vec![
                    format!("**Erro na extração:** {}", e),
                    format!("{}...", prefix(doc.raw())),
                ],
                outcome: ExtractionOutcome::Degraded {
                    reason: e.to_string(),
                },
            }
        }
    }
}

/// Run the scoring and fallback ladder, reporting invalid input as an error.
pub fn try_extract(doc: &Document, query: &str, top_k: usize) -> Result<Extraction, ExtractionError> {
    if top_k == 0 {
        return Err(ExtractionError::ZeroTopK);
    }
    if doc.raw().trim().is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }

    let lines: Vec<&str> = doc
        .raw()
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = lines
        .iter()
        .take(3)
        .find(|line| {
            let lower = line.to_lowercase();
            line.contains(TITLE_MARKER) || contains_any(&lower, TITLE_HINTS)
        })
        .map(|line| format!("**{}**", line));

    let terms = query_terms(query);
    let scored = score_lines(&lines, &terms);
    if !scored.is_empty() {
        return Ok(Extraction {
            title,
            lines: scored.iter().take(top_k).map(|s| bullet(s.line)).collect(),
            outcome: ExtractionOutcome::Scored,
        });
    }

    let with_currency: Vec<String> = lines
        .iter()
        .filter(|l| contains_any(&l.to_lowercase(), CURRENCY_MARKERS))
        .take(FALLBACK_LIMIT)
        .map(|l| bullet(l))
        .collect();
    if !with_currency.is_empty() {
        return Ok(Extraction {
            title,
            lines: with_currency,
            outcome: ExtractionOutcome::CurrencyFallback,
        });
    }

    // The first line is treated as the title and skipped.
    let leading: Vec<String> = lines
        .iter()
        .skip(1)
        .take(FALLBACK_LIMIT)
        .filter(|l| l.chars().count() > LEADING_LINE_MIN_CHARS)
        .map(|l| bullet(l))
        .collect();
    if !leading.is_empty() {
        return Ok(Extraction {
            title,
            lines: leading,
            outcome: ExtractionOutcome::LeadingLinesFallback,
        });
    }

    Ok(Extraction {
        title,
        lines: vec![format!("- {}...", prefix(doc.raw()))],
        outcome: ExtractionOutcome::PrefixFallback,
    })
}

/// Normalize a query into its set of search terms.
///
/// Lowercases, splits on whitespace, strips surrounding punctuation, and
/// drops short tokens and stop words.
pub fn query_terms(query: &str) -> BTreeSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(TERM_PUNCTUATION))
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Score a single line against the query terms.
pub fn score_line(line: &str, terms: &BTreeSet<String>) -> u32 {
    let lower = line.to_lowercase();
    let matched = terms.iter().filter(|t| lower.contains(t.as_str())).count() as u32;

    let mut score = matched * TERM_POINTS;
    if contains_any(&lower, CURRENCY_MARKERS) {
        score += CURRENCY_POINTS;
    }
    if contains_any(&lower, METRIC_KEYWORDS) {
        score += METRIC_POINTS;
    }
    if contains_any(&lower, PERIOD_MARKERS) {
        score += PERIOD_POINTS;
    }
    score
}

/// Score eligible lines, drop zero scores, and stable-sort descending.
pub fn score_lines<'a>(lines: &[&'a str], terms: &BTreeSet<String>) -> Vec<ScoredLine<'a>> {
    let mut scored: Vec<ScoredLine<'a>> = lines
        .iter()
        .filter(|l| l.chars().count() >= MIN_LINE_CHARS)
        .map(|&line| ScoredLine {
            line,
            score: score_line(line, terms),
        })
        .filter(|s| s.score > 0)
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn bullet(line: &str) -> String {
    format!("- {}", line)
}

fn prefix(text: &str) -> String {
    text.chars().take(PREFIX_CHARS).collect()
}
