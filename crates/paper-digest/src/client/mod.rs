//! Upstream API clients.
//!
//! Provides async HTTP clients with:
//! - Connection pooling via reqwest
//! - Fixed-delay retry with per-client attempt budgets
//! - Content validation folded into the retry budget
//! - Degraded or fallback values once retries are spent
//!
//! The aggregator reaches each client through a trait so tests can swap in fakes.

pub mod feed;
pub mod graph;
pub mod retry;
pub mod summary;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult, DigestResult};
use crate::models::{AbstractRecord, PaperRecord, RawModelOutput, SummaryInput};

pub use feed::FeedClient;
pub use graph::GraphClient;
pub use summary::SummaryClient;

/// Metadata-graph source: one paper by identifier.
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Fetch a paper record. Exhausted retries yield a degraded record, not an error.
    async fn fetch_by_id(&self, id: &str) -> DigestResult<PaperRecord>;
}

/// Bibliographic feed source: listings by query, single entries by identifier.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the entries matching `query` (or the default topic).
    async fn fetch_by_query(&self, query: Option<&str>) -> DigestResult<Vec<PaperRecord>>;

    /// Fetch one entry.
    async fn fetch_by_id(&self, id: &str) -> DigestResult<PaperRecord>;

    /// Fetch one entry's abstract.
    async fn fetch_abstract(&self, id: &str) -> DigestResult<AbstractRecord> {
        self.fetch_by_id(id).await.map(AbstractRecord::from)
    }
}

/// Generative-language endpoint.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce three-section text for `input`. Never fails.
    async fn summarize(&self, input: &SummaryInput) -> RawModelOutput;
}

/// Build the pooled reqwest client every upstream client wraps.
pub(crate) fn http_client(config: &Config, headers: HeaderMap) -> anyhow::Result<Client> {
    let client = Client::builder()
        .default_headers(headers)
        .user_agent(concat!("paper-digest/", env!("CARGO_PKG_VERSION")))
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(api::MAX_KEEPALIVE)
        .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Map upstream status codes onto [`ClientError`].
pub(crate) async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::not_found(text))
        }
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}
