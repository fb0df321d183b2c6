//! Retrieval façade.
//!
//! [`Retriever`] owns an injected [`VectorStore`] handle and composes the
//! chunker (index time), the store (query time), the confidence
//! classifier, and optionally the relevance scorer into one typed answer.
//!
//! # Query flow
//!
//! 1. Empty queries short-circuit to no candidates without a store call.
//! 2. The store returns up to `k` matches; each distance becomes a
//!    similarity `1 / (1 + d)` and a 1-based rank.
//! 3. No candidates → [`RetrievalOutcome::NoResult`] with suggestions.
//! 4. Otherwise rank 1 is graded, its excerpt trimmed for display, and,
//!    when requested, its lines re-ranked against the query.
//!
//! Store failures surface as [`RagError::Upstream`]; nothing is retried.

use std::fmt;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::chunk::{chunk_document, ChunkingParams};
use crate::confidence::ConfidenceThresholds;
use crate::embedding::distance_to_similarity;
use crate::error::{RagError, Result};
use crate::models::{
    Candidate, ConfidenceDistribution, Document, IndexReport, RetrievalMetrics, RetrievalResult,
    StoreStats,
};
use crate::relevance::{extract_relevant, Extraction, DEFAULT_TOP_K};
use crate::store::{StoreEntry, VectorStore};

pub const DEFAULT_K: usize = 3;
pub const DEFAULT_EXCERPT_CHARS: usize = 1500;

/// Similarity above which a candidate counts toward semantic precision.
/// Unrelated to the confidence thresholds.
pub const PRECISION_THRESHOLD: f64 = 0.6;

const ELLIPSIS: &str = "...";

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    /// Default number of candidates per query.
    pub k: usize,
    /// Presentation limit for the best chunk's excerpt, in characters.
    pub excerpt_chars: usize,
    /// How many lines line-level refinement returns.
    pub relevant_lines: usize,
    pub chunking: ChunkingParams,
    pub thresholds: ConfidenceThresholds,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            relevant_lines: DEFAULT_TOP_K,
            chunking: ChunkingParams::default(),
            thresholds: ConfidenceThresholds::default(),
        }
    }
}

impl RetrievalParams {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.k == 0 {
            return Err(RagError::configuration("k must be >= 1"));
        }
        if self.excerpt_chars == 0 {
            return Err(RagError::configuration("excerpt_chars must be > 0"));
        }
        if self.relevant_lines == 0 {
            return Err(RagError::configuration("relevant_lines must be > 0"));
        }
        let t = &self.thresholds;
        if !(0.0 <= t.medium && t.medium < t.high && t.high <= 1.0) {
            return Err(RagError::configuration(format!(
                "confidence thresholds must satisfy 0 <= medium < high <= 1 (got medium={}, high={})",
                t.medium, t.high
            )));
        }
        Ok(())
    }
}

/// Bundles the inputs for a single retrieval.
#[derive(Debug, Clone)]
pub struct RetrieveRequest<'a> {
    pub query: &'a str,
    /// Number of candidates; `None` uses [`RetrievalParams::k`].
    pub k: Option<usize>,
    /// Re-rank the focus document's lines against the query.
    pub refine: bool,
    /// Document that produced the best chunk. When `refine` is set and
    /// this is `None`, the best chunk's own text is used.
    pub focus: Option<&'a Document>,
}

impl<'a> RetrieveRequest<'a> {
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            k: None,
            refine: false,
            focus: None,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn refined(mut self, focus: Option<&'a Document>) -> Self {
        self.refine = true;
        self.focus = focus;
        self
    }
}

/// A graded best match plus everything computed alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query: String,
    pub result: RetrievalResult,
    pub candidates: Vec<Candidate>,
    #[serde(skip)]
    pub relevant: Option<Extraction>,
    pub metrics: RetrievalMetrics,
}

/// Payload returned when the store has nothing for the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoResult {
    pub query: String,
    pub suggestions: Vec<String>,
}

impl NoResult {
    fn for_query(query: &str) -> Self {
        Self {
            query: query.to_string(),
            suggestions: vec![
                "Carregue relatórios financeiros no índice antes de consultar".to_string(),
                "Tente termos como \"lucro\", \"receita\", \"patrimônio\"".to_string(),
                "Verifique se há documentos indexados no sistema".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum RetrievalOutcome {
    Found(Box<Answer>),
    NoResult(NoResult),
}

impl RetrievalOutcome {
    pub fn answer(&self) -> Option<&Answer> {
        match self {
            Self::Found(answer) => Some(answer),
            Self::NoResult(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl fmt::Display for RetrievalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResult(none) => {
                writeln!(f, "**❌ Nenhum resultado encontrado para:** \"{}\"", none.query)?;
                writeln!(f)?;
                write!(f, "**Sugestões:**")?;
                for s in &none.suggestions {
                    write!(f, "\n- {}", s)?;
                }
                Ok(())
            }
            Self::Found(answer) => {
                let r = &answer.result;
                writeln!(f, "**📊 Informação Encontrada**")?;
                writeln!(f)?;
                writeln!(f, "**Similaridade:** {:.1}%", r.similarity * 100.0)?;
                writeln!(
                    f,
                    "**Nível de confiança:** {} ({})",
                    r.confidence.label(),
                    r.confidence.grade()
                )?;
                writeln!(f)?;
                writeln!(f, "---")?;
                writeln!(f)?;
                writeln!(f, "{}", r.excerpt)?;
                if let Some(relevant) = &answer.relevant {
                    writeln!(f)?;
                    writeln!(f, "**Trechos relevantes:**")?;
                    writeln!(f)?;
                    writeln!(f, "{}", relevant.render())?;
                }
                writeln!(f)?;
                writeln!(f, "---")?;
                write!(f, "*Retriever: busca vetorial com embeddings*")
            }
        }
    }
}

/// Truncate to `max_chars` characters, appending `...` when cut.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Retrieval façade over an injected vector store.
pub struct Retriever<S> {
    store: S,
    params: RetrievalParams,
}

impl<S: VectorStore> Retriever<S> {
    /// # Errors
    ///
    /// [`RagError::Configuration`] when `params` fail validation.
    pub fn new(store: S, params: RetrievalParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { store, params })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    /// Chunk and index documents.
    ///
    /// Store keys continue from the current count: `doc_{n}` for a
    /// document kept whole, `doc_{n}_chunk_{j}` (0-based `j`) for the
    /// chunks of an oversized one.
    pub async fn index_documents(&self, docs: &[Document]) -> Result<IndexReport> {
        if docs.is_empty() {
            return Err(RagError::invalid_input("no documents provided"));
        }

        let base = self.store.count().await.map_err(RagError::Upstream)?;
        let mut entries = Vec::new();

        for (i, doc) in docs.iter().enumerate() {
            let key = format!("doc_{}", base + i);
            let oversized = doc.char_len() > self.params.chunking.oversize_threshold;
            for chunk in chunk_document(doc, &self.params.chunking)? {
                let id = if oversized {
                    format!("{}_chunk_{}", key, chunk.part_index - 1)
                } else {
                    key.clone()
                };
                entries.push(StoreEntry {
                    id,
                    document_id: doc.identifier().to_string(),
                    text: chunk.text,
                    hash: chunk.hash,
                });
            }
            debug!(document = doc.identifier(), key = %key, oversized, "prepared document");
        }

        let chunks_added = self.store.add(&entries).await.map_err(RagError::Upstream)?;
        let total_in_store = self.store.count().await.map_err(RagError::Upstream)?;

        info!(
            documents = docs.len(),
            chunks = chunks_added,
            total = total_in_store,
            "indexed documents"
        );

        Ok(IndexReport {
            documents: docs.len(),
            chunks_added,
            total_in_store,
        })
    }

    /// Rank stored chunks against `query`. Empty queries return nothing.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<Candidate>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        if k == 0 {
            return Err(RagError::invalid_input("k must be >= 1"));
        }

        let matches = self.store.query(query, k).await.map_err(RagError::Upstream)?;
        Ok(matches
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, m)| Candidate {
                text: m.text,
                similarity: distance_to_similarity(m.distance),
                rank: i + 1,
            })
            .collect())
    }

    /// Answer a query with the best-matching chunk.
    pub async fn retrieve(&self, req: &RetrieveRequest<'_>) -> Result<RetrievalOutcome> {
        let k = req.k.unwrap_or(self.params.k);
        let started = Instant::now();
        let candidates = self.search(req.query, k).await?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let best = match candidates.first() {
            Some(best) => best.clone(),
            None => {
                info!(query = req.query, "no candidates");
                return Ok(RetrievalOutcome::NoResult(NoResult::for_query(req.query)));
            }
        };

        let thresholds = &self.params.thresholds;
        let confidence = thresholds.classify(best.similarity);

        let relevant = if req.refine {
            let fallback;
            let doc = match req.focus {
                Some(doc) => doc,
                None => {
                    fallback = Document::new("best_chunk", best.text.clone());
                    &fallback
                }
            };
            Some(extract_relevant(doc, req.query, self.params.relevant_lines))
        } else {
            None
        };

        let mut distribution = ConfidenceDistribution::default();
        for c in &candidates {
            distribution.record(thresholds.classify(c.similarity));
        }
        let precise = candidates
            .iter()
            .filter(|c| c.similarity > PRECISION_THRESHOLD)
            .count();

        let metrics = RetrievalMetrics {
            semantic_precision: precise as f64 / candidates.len() as f64,
            retrieval_latency_ms: latency_ms,
            confidence_distribution: distribution,
        };

        info!(
            query = req.query,
            candidates = candidates.len(),
            similarity = best.similarity,
            confidence = %confidence,
            "retrieved best chunk"
        );

        let result = RetrievalResult {
            excerpt: truncate_excerpt(&best.text, self.params.excerpt_chars),
            best_chunk_text: best.text,
            similarity: best.similarity,
            confidence,
            rank: best.rank,
        };

        Ok(RetrievalOutcome::Found(Box::new(Answer {
            query: req.query.to_string(),
            result,
            candidates,
            relevant,
            metrics,
        })))
    }

    pub async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            total_chunks: self.store.count().await.map_err(RagError::Upstream)?,
            collection: self.store.collection().to_string(),
            location: self.store.location(),
        })
    }

    /// Remove every indexed chunk. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize> {
        let removed = self.store.delete_all().await.map_err(RagError::Upstream)?;
        info!(removed, "cleared store");
        Ok(removed)
    }
}
