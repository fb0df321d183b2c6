//! # finrag CLI
//!
//! ## Usage
//!
//! ```bash
//! finrag --config ./config/finrag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `finrag init` | Create the store and its tables |
//! | `finrag index <folder>` | Index `.txt`/`.md` reports from a folder |
//! | `finrag samples` | Index the built-in sample reports |
//! | `finrag ask "<question>"` | Answer with the best chunk and its confidence |
//! | `finrag search "<query>"` | List ranked candidates |
//! | `finrag extract <file> "<query>"` | Relevant lines of one file |
//! | `finrag chunk <file>` | Preview how a file is chunked |
//! | `finrag stats` | Store summary |
//! | `finrag clear` | Remove every indexed chunk |
//! | `finrag reset` | Drop and recreate the collection |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finrag::ask::{self, AskOptions};
use finrag::{config, index, stats};

/// finrag: retrieval over quarterly financial reports.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Built-in defaults apply when the file does not exist.
#[derive(Parser)]
#[command(
    name = "finrag",
    about = "finrag: retrieval over quarterly financial reports",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/finrag.toml")]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store file and the collection tables. Idempotent.
    Init,

    /// Index the reports in a folder.
    ///
    /// Only `.txt` and `.md` files are read; other matching files are
    /// reported as skipped.
    Index {
        folder: PathBuf,

        /// File pattern, relative to the folder (repeatable). Defaults to
        /// `[loader].include_globs`.
        #[arg(long = "pattern")]
        patterns: Vec<String>,
    },

    /// Index the built-in sample reports.
    Samples,

    /// Answer a question with the best-matching chunk.
    Ask {
        query: String,

        /// Number of candidates to retrieve.
        #[arg(long, short)]
        k: Option<usize>,

        /// Also list the most relevant lines.
        #[arg(long)]
        refine: bool,

        /// Refine against this file instead of the best chunk (implies --refine).
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print JSON instead of Markdown.
        #[arg(long)]
        json: bool,
    },

    /// List the ranked candidates for a query.
    Search {
        query: String,

        #[arg(long, short)]
        k: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Print the lines of a file most relevant to a query.
    Extract {
        file: PathBuf,
        query: String,

        /// Number of lines to keep.
        #[arg(long)]
        top: Option<usize>,
    },

    /// Preview how a file would be chunked.
    Chunk {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Show store statistics.
    Stats,

    /// Remove every indexed chunk, keeping the collection.
    Clear,

    /// Drop and recreate the collection.
    Reset,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "finrag=debug,finrag_core=debug"
    } else {
        "finrag=info,finrag_core=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            index::open_retriever(&cfg).await?;
            println!(
                "Store initialized at {} (collection '{}').",
                cfg.store.path.display(),
                cfg.store.collection
            );
        }
        Commands::Index { folder, patterns } => {
            index::run_index(&cfg, &folder, &patterns).await?;
        }
        Commands::Samples => {
            index::run_samples(&cfg).await?;
        }
        Commands::Ask {
            query,
            k,
            refine,
            file,
            json,
        } => {
            let opts = AskOptions {
                k,
                refine,
                focus: file.as_deref(),
                json,
            };
            ask::run_ask(&cfg, &query, &opts).await?;
        }
        Commands::Search { query, k, json } => {
            ask::run_search(&cfg, &query, k, json).await?;
        }
        Commands::Extract { file, query, top } => {
            ask::run_extract(&cfg, &file, &query, top)?;
        }
        Commands::Chunk { file, json } => {
            index::run_chunk(&cfg, &file, json)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Clear => {
            stats::run_clear(&cfg).await?;
        }
        Commands::Reset => {
            stats::run_reset(&cfg).await?;
        }
    }

    Ok(())
}
