//! Aggregation of paper metadata and generated summaries.
//!
//! One call to [`Aggregator::aggregate`] resolves an identifier, looks the paper
//! up, summarizes it and merges everything into a [`UnifiedResponse`] whose
//! fields are always displayable. Modeled upstream failures are absorbed by the
//! clients; the only errors that reach the caller are an identifier that no
//! source recognizes and internal faults.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::client::{FeedClient, FeedSource, GraphClient, GraphSource, SummaryClient, Summarizer};
use crate::config::Config;
use crate::error::{DigestError, DigestResult};
use crate::models::{
    AbstractRecord, PaperRecord, StructuredSummary, SummaryInput, UnifiedResponse, identifier,
};
use crate::parser;

/// Placeholder values substituted into the unified response.
pub mod placeholders {
    /// Used for all three summary fields when there was nothing to summarize.
    pub const NO_CONTENT: &str = "No content available";

    /// Used when the parsed output has no key points.
    pub const NO_KEY_POINTS: &str = "No key points available";

    /// Used when the parsed output has no keywords.
    pub const NO_KEYWORDS: &str = "No keywords available";

    /// Used when the record has no abstract.
    pub const NO_ABSTRACT: &str = "No abstract available";

    /// Used when the record has no title.
    pub const UNTITLED: &str = "Untitled";
}

/// Orchestrates the source clients, the summarizer and the parser.
#[derive(Clone)]
pub struct Aggregator {
    graph: Arc<dyn GraphSource>,
    feed: Arc<dyn FeedSource>,
    summarizer: Arc<dyn Summarizer>,
}

impl Aggregator {
    /// Create an aggregator backed by the real HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::with_sources(
            Arc::new(GraphClient::new(config)?),
            Arc::new(FeedClient::new(config)?),
            Arc::new(SummaryClient::new(config)?),
        ))
    }

    /// Create an aggregator from arbitrary source implementations.
    #[must_use]
    pub fn with_sources(
        graph: Arc<dyn GraphSource>,
        feed: Arc<dyn FeedSource>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self { graph, feed, summarizer }
    }

    /// Build the unified record for `id`, or for the default paper when `id` is absent.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, id: Option<&str>) -> DigestResult<UnifiedResponse> {
        let id = identifier::resolve(id);
        let record = self.lookup(&id).await?;

        let input = SummaryInput::from(&record);
        let summary = if input.is_empty() {
            debug!(%id, "no abstract or short summary, skipping summarization");
            None
        } else {
            let raw = self.summarizer.summarize(&input).await;
            Some(parser::parse(raw.as_str()))
        };

        Ok(merge(id, record, summary))
    }

    /// List feed entries for `query` (default topic when absent).
    pub async fn fetch_records(&self, query: Option<&str>) -> DigestResult<Vec<PaperRecord>> {
        self.feed.fetch_by_query(query).await
    }

    /// Fetch the abstract of one feed entry.
    pub async fn fetch_abstract(&self, id: &str) -> DigestResult<AbstractRecord> {
        self.feed.fetch_abstract(id).await
    }

    /// Pick the best record among the sources that know `id`.
    ///
    /// The graph source is always consulted. arXiv identifiers are also looked up
    /// in the feed, concurrently; both lookups are awaited before choosing, so the
    /// worst case is the feed's whole retry budget (about nine seconds of delay)
    /// even when the graph record wins.
    async fn lookup(&self, id: &str) -> DigestResult<PaperRecord> {
        let Some(arxiv_id) = identifier::arxiv_id(id) else {
            return self.graph.fetch_by_id(id).await;
        };

        let (graph, feed) =
            tokio::join!(self.graph.fetch_by_id(id), self.feed.fetch_by_id(&arxiv_id));

        match (graph, feed) {
            (Ok(record), _) if !record.is_degraded() => Ok(record),
            (graph, Ok(record)) => {
                info!(%id, graph_ok = graph.is_ok(), "using arXiv record");
                Ok(record)
            }
            (Ok(degraded), Err(e)) => {
                warn!(%id, error = %e, "arXiv lookup failed, keeping degraded record");
                Ok(degraded)
            }
            (Err(DigestError::NotFound { .. }), Err(DigestError::NotFound { .. })) => {
                Err(DigestError::not_found(id))
            }
            (Err(graph_err), Err(feed_err)) => {
                warn!(%id, %graph_err, %feed_err, "no source produced a record");
                Err(match graph_err {
                    DigestError::NotFound { .. } => feed_err,
                    other => other,
                })
            }
        }
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator").finish_non_exhaustive()
    }
}

/// Merge a record and its (optional) summary into a fully populated response.
fn merge(id: String, record: PaperRecord, summary: Option<StructuredSummary>) -> UnifiedResponse {
    let (summary, bullet_points, keywords) = match summary {
        None => (
            placeholders::NO_CONTENT.to_string(),
            vec![placeholders::NO_CONTENT.to_string()],
            vec![placeholders::NO_CONTENT.to_string()],
        ),
        Some(parsed) => (
            parsed.summary,
            or_placeholder(parsed.key_points, placeholders::NO_KEY_POINTS),
            or_placeholder(parsed.keywords, placeholders::NO_KEYWORDS),
        ),
    };

    let title = match record.title.trim() {
        "" => placeholders::UNTITLED.to_string(),
        title => title.to_string(),
    };
    let r#abstract =
        record.abstract_text().unwrap_or(placeholders::NO_ABSTRACT).to_string();

    UnifiedResponse {
        identifier: id,
        source: record.source.label().to_string(),
        title,
        authors: record.authors,
        r#abstract,
        summary,
        bullet_points,
        keywords,
    }
}

fn or_placeholder(items: Vec<String>, placeholder: &str) -> Vec<String> {
    if items.is_empty() { vec![placeholder.to_string()] } else { items }
}
