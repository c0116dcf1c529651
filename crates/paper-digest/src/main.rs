//! Paper Digest - Entry Point
//!
//! Serves the HTTP API by default; `digest` and `search` run one lookup and print JSON.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paper_digest::{Aggregator, Config, config::defaults, server};

#[derive(Parser, Debug)]
#[command(name = "paper-digest")]
#[command(about = "Research paper feed backend: arXiv + Semantic Scholar + Gemini summaries")]
#[command(version)]
struct Cli {
    /// Gemini API key, overrides GEMINI_API_KEY (without a key every summary is the canned fallback)
    #[arg(long)]
    gemini_api_key: Option<String>,

    /// Semantic Scholar API key, overrides SEMANTIC_SCHOLAR_API_KEY
    #[arg(long)]
    semantic_scholar_api_key: Option<String>,

    /// Gemini model name, overrides GEMINI_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Per-request timeout in seconds, overrides REQUEST_TIMEOUT_SECS
    #[arg(long)]
    request_timeout: Option<u64>,

    /// HTTP server port
    #[arg(long, default_value_t = defaults::PORT, env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Build the unified record for one paper and print it
    Digest {
        /// Paper identifier (DOI, arXiv id, Semantic Scholar id); defaults to the sample paper
        id: Option<String>,
    },
    /// List arXiv entries for a query and print them
    Search {
        /// Search query; defaults to the sample topic
        query: Option<String>,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout is reserved for `digest` and `search` output.
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    // Environment first, command-line flags on top.
    let mut config = Config::from_env()?;
    if let Some(key) = cli.gemini_api_key {
        config.gemini_api_key = Some(key);
    }
    if let Some(key) = cli.semantic_scholar_api_key {
        config.semantic_scholar_api_key = Some(key);
    }
    if let Some(model) = cli.model {
        config.gemini_model = model;
    }
    if let Some(secs) = cli.request_timeout {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        ?config,
        "Starting paper digest"
    );
    if !config.has_gemini_key() {
        tracing::warn!("GEMINI_API_KEY not set, summaries will use the fallback text");
    }

    let aggregator = Aggregator::new(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            server::run_http(Arc::new(aggregator), cli.port).await?;
        }
        Command::Digest { id } => {
            let record = aggregator.aggregate(id.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Search { query } => {
            let records = aggregator.fetch_records(query.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
