//! arXiv Atom feed client.
//!
//! Queries `export.arxiv.org/api/query` and decodes the Atom response into
//! [`PaperRecord`]s. Decoding is a pure function, [`parse_feed`], so it can be
//! tested and fuzzed without a network.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tracing::debug;

use super::retry::with_retry;
use super::{FeedSource, handle_response, http_client};
use crate::config::{Config, RetryPolicy, defaults};
use crate::error::{ClientResult, DigestError, DigestResult};
use crate::models::{PaperRecord, SourceName, identifier};

/// Atom feed returned by the arXiv API.
#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

/// One `<entry>` of the feed. Every field may be missing.
#[derive(Debug, Deserialize)]
struct Entry {
    /// Canonical abstract URL, e.g. `http://arxiv.org/abs/2301.07041v1`.
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    /// The abstract.
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

impl Entry {
    /// arXiv reports malformed queries as a single entry under `/api/errors`.
    fn is_error(&self) -> bool {
        self.id.contains("/api/errors")
    }

    fn into_record(self) -> PaperRecord {
        PaperRecord {
            identifier: entry_identifier(&self.id),
            title: collapse_whitespace(&self.title),
            authors: self
                .authors
                .into_iter()
                .map(|a| collapse_whitespace(&a.name))
                .filter(|name| !name.is_empty())
                .collect(),
            r#abstract: Some(collapse_whitespace(&self.summary)),
            short_summary: None,
            publish_date: Some(self.published.trim().to_string()),
            source: SourceName::Feed,
        }
    }
}

/// Decode an arXiv Atom document into paper records, in feed order.
///
/// # Errors
///
/// Returns [`crate::error::ClientError::Xml`] when the document is not a decodable feed.
pub fn parse_feed(xml: &str) -> ClientResult<Vec<PaperRecord>> {
    let feed: Feed = quick_xml::de::from_str(xml)?;
    Ok(feed.entries.into_iter().filter(|e| !e.is_error()).map(Entry::into_record).collect())
}

/// Identifier of an entry: whatever follows the last `/abs/` of its id URL.
#[must_use]
pub fn entry_identifier(raw: &str) -> String {
    let raw = raw.trim();
    raw.rsplit_once("/abs/")
        .or_else(|| raw.rsplit_once('/'))
        .map_or(raw, |(_, id)| id)
        .to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// arXiv API client.
#[derive(Clone)]
pub struct FeedClient {
    /// Pooled HTTP client.
    client: Client,

    /// Query endpoint.
    feed_api_url: String,

    /// Entries requested per query.
    max_results: u32,

    /// Retry budget.
    retry: RetryPolicy,
}

impl FeedClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(config, HeaderMap::new())?,
            feed_api_url: config.feed_api_url.clone(),
            max_results: config.feed_max_results,
            retry: config.feed_retry,
        })
    }

    /// Search the feed. A missing or blank query searches the default topic.
    pub async fn fetch_by_query(&self, query: Option<&str>) -> DigestResult<Vec<PaperRecord>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty()).unwrap_or(defaults::QUERY);
        let params = [
            ("search_query", query.to_string()),
            ("start", "0".to_string()),
            ("max_results", self.max_results.to_string()),
        ];

        let records = self.get_feed(&params).await?;
        debug!(query, count = records.len(), "arXiv query returned");
        Ok(records)
    }

    /// Fetch a single entry by arXiv id.
    ///
    /// A successful response without a matching entry is `NotFound` and is not retried.
    pub async fn fetch_by_id(&self, id: &str) -> DigestResult<PaperRecord> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DigestError::invalid_argument("id", "arXiv identifier is required"));
        }

        let arxiv_id = identifier::arxiv_id(id).unwrap_or_else(|| id.to_string());
        let params = [("id_list", arxiv_id.clone()), ("max_results", "1".to_string())];

        self.get_feed(&params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DigestError::not_found(arxiv_id))
    }

    async fn get_feed(&self, params: &[(&str, String)]) -> DigestResult<Vec<PaperRecord>> {
        with_retry(&self.retry, "arXiv query", |attempt| {
            debug!(url = %self.feed_api_url, ?params, attempt, "querying arXiv");
            self.get_once(params)
        })
        .await
        .map_err(|failure| {
            DigestError::upstream_unavailable(SourceName::Feed.label(), failure.error.to_string())
        })
    }

    async fn get_once(&self, params: &[(&str, String)]) -> ClientResult<Vec<PaperRecord>> {
        let response = self.client.get(&self.feed_api_url).query(params).send().await?;
        let response = handle_response(response).await?;
        let body = response.text().await?;
        parse_feed(&body)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_by_query(&self, query: Option<&str>) -> DigestResult<Vec<PaperRecord>> {
        Self::fetch_by_query(self, query).await
    }

    async fn fetch_by_id(&self, id: &str) -> DigestResult<PaperRecord> {
        Self::fetch_by_id(self, id).await
    }
}

impl std::fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedClient").field("feed_api_url", &self.feed_api_url).finish()
    }
}
