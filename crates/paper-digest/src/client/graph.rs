//! Semantic Scholar Graph API client.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use tracing::{debug, info};

use super::retry::with_retry;
use super::{GraphSource, handle_response, http_client};
use crate::config::{Config, RetryPolicy, fields};
use crate::error::{ClientError, ClientResult, DigestError, DigestResult};
use crate::models::{GraphPaper, PaperRecord, identifier};

/// Semantic Scholar API client.
#[derive(Clone)]
pub struct GraphClient {
    /// Pooled HTTP client.
    client: Client,

    /// Graph API base URL.
    graph_api_url: String,

    /// Retry budget.
    retry: RetryPolicy,

    /// Whether an API key header is sent.
    has_api_key: bool,
}

impl GraphClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = config.semantic_scholar_api_key {
            headers.insert("x-api-key", key.parse()?);
        }

        Ok(Self {
            client: http_client(config, headers)?,
            graph_api_url: config.graph_api_url.clone(),
            retry: config.graph_retry,
            has_api_key: config.has_semantic_scholar_key(),
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.has_api_key
    }

    /// Fetch a paper by identifier.
    ///
    /// A blank identifier fails with `InvalidArgument` before any request is made.
    /// A 404 fails with `NotFound`. Every other failure, including payloads with
    /// neither abstract nor TLDR on every attempt, yields [`PaperRecord::degraded`].
    pub async fn fetch_by_id(&self, id: &str) -> DigestResult<PaperRecord> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DigestError::invalid_argument("id", "paper identifier is required"));
        }

        let graph_id = identifier::graph_id(id);
        let url = format!("{}/paper/{}", self.graph_api_url, graph_id);
        let params = [("fields", fields::PAPER.join(","))];

        let result = with_retry(&self.retry, "semantic scholar paper lookup", |attempt| {
            debug!(%url, attempt, "fetching paper from Semantic Scholar");
            self.get_paper(&url, &params)
        })
        .await;

        match result {
            Ok(paper) => Ok(paper.into_record(id)),
            Err(failure) => match failure.error {
                ClientError::NotFound { .. } => Err(DigestError::not_found(id)),
                error => {
                    info!(id, attempts = failure.attempts, %error, "returning degraded paper record");
                    Ok(PaperRecord::degraded(id))
                }
            },
        }
    }

    /// One attempt: fetch, decode, and require something to summarize.
    async fn get_paper(&self, url: &str, params: &[(&str, String)]) -> ClientResult<GraphPaper> {
        let response = self.client.get(url).query(params).send().await?;
        let response = handle_response(response).await?;
        let body = response.text().await?;
        let paper: GraphPaper = serde_json::from_str(&body)?;

        if !paper.has_content() {
            return Err(ClientError::insufficient_content("no abstract or tldr in response"));
        }
        Ok(paper)
    }
}

#[async_trait]
impl GraphSource for GraphClient {
    async fn fetch_by_id(&self, id: &str) -> DigestResult<PaperRecord> {
        Self::fetch_by_id(self, id).await
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("graph_api_url", &self.graph_api_url)
            .field("has_api_key", &self.has_api_key)
            .finish()
    }
}
