//! Query commands: `ask`, `search` and `extract`.

use anyhow::Result;
use std::path::Path;

use finrag_core::relevance::extract_relevant;
use finrag_core::retrieve::{RetrievalOutcome, RetrieveRequest};

use crate::config::Config;
use crate::index::open_retriever;
use crate::loader::load_file;

/// Options for [`run_ask`].
#[derive(Debug, Default, Clone)]
pub struct AskOptions<'a> {
    pub k: Option<usize>,
    pub refine: bool,
    /// Source document to refine against instead of the best chunk.
    pub focus: Option<&'a Path>,
    pub json: bool,
}

/// Answer a question from the indexed reports.
pub async fn run_ask(config: &Config, query: &str, opts: &AskOptions<'_>) -> Result<()> {
    let focus = opts.focus.map(load_file).transpose()?;

    let retriever = open_retriever(config).await?;
    let mut req = RetrieveRequest::new(query);
    if let Some(k) = opts.k {
        req = req.with_k(k);
    }
    if opts.refine || focus.is_some() {
        req = req.refined(focus.as_ref());
    }

    let outcome = retriever.retrieve(&req).await?;

    if opts.json {
        let value = match &outcome {
            RetrievalOutcome::Found(answer) => serde_json::json!({
                "status": "found",
                "answer": answer,
                "relevant": answer.relevant.as_ref().map(|r| r.render()),
            }),
            RetrievalOutcome::NoResult(none) => serde_json::json!({
                "status": "no_result",
                "no_result": none,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", outcome);
    if let Some(answer) = outcome.answer() {
        let m = &answer.metrics;
        println!();
        println!(
            "Precision: {:.0}%  Latency: {:.1} ms  Confidence: {} high / {} medium / {} low",
            m.semantic_precision * 100.0,
            m.retrieval_latency_ms,
            m.confidence_distribution.high,
            m.confidence_distribution.medium,
            m.confidence_distribution.low
        );
    }
    Ok(())
}

/// List the ranked candidates for a query.
pub async fn run_search(config: &Config, query: &str, k: Option<usize>, json: bool) -> Result<()> {
    let retriever = open_retriever(config).await?;
    let k = k.unwrap_or(config.retrieval.top_k);
    let candidates = retriever.search(query, k).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let thresholds = &retriever.params().thresholds;
    for c in &candidates {
        let tier = thresholds.classify(c.similarity);
        let preview: String = c.text.chars().take(120).collect();
        println!(
            "{}. [{:.3}] {} ({})",
            c.rank,
            c.similarity,
            tier.label(),
            tier.grade()
        );
        println!("    {}", preview.replace('\n', " "));
    }
    Ok(())
}

/// Print the lines of a file most relevant to a query.
pub fn run_extract(config: &Config, file: &Path, query: &str, top_k: Option<usize>) -> Result<()> {
    let doc = load_file(file)?;
    let top_k = top_k.unwrap_or(config.retrieval.relevant_lines);
    let extraction = extract_relevant(&doc, query, top_k);
    println!("{}", extraction.render());
    Ok(())
}
