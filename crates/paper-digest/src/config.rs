//! Configuration for the paper digest service.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// arXiv Atom query endpoint.
    pub const FEED_API: &str = "http://export.arxiv.org/api/query";

    /// Semantic Scholar Graph API endpoint.
    pub const GRAPH_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// Gemini generative language endpoint.
    pub const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default Gemini model.
    pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

    /// Per-request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections per host.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Maximum feed entries returned by a query.
    pub const FEED_MAX_RESULTS: u32 = 10;
}

/// Retry budgets per upstream. Fixed delay, no jitter, no growth.
pub mod retry {
    use std::time::Duration;

    /// arXiv attempts.
    pub const FEED_ATTEMPTS: u32 = 10;

    /// Delay between arXiv attempts.
    pub const FEED_DELAY: Duration = Duration::from_millis(1000);

    /// Semantic Scholar attempts.
    pub const GRAPH_ATTEMPTS: u32 = 3;

    /// Delay between Semantic Scholar attempts.
    pub const GRAPH_DELAY: Duration = Duration::from_millis(1000);

    /// Gemini attempts.
    pub const SUMMARY_ATTEMPTS: u32 = 3;

    /// Delay between Gemini attempts.
    pub const SUMMARY_DELAY: Duration = Duration::from_millis(2000);
}

/// Fallback inputs used when a caller leaves something out.
pub mod defaults {
    /// Feed query used when none is given.
    pub const QUERY: &str = "machine learning";

    /// Paper looked up when no identifier is given ("Attention Is All You Need").
    pub const PAPER_ID: &str = "ARXIV:1706.03762";

    /// HTTP port for the inbound surface.
    pub const PORT: u16 = 5001;
}

/// Graph API field sets.
pub mod fields {
    /// Fields needed to build a paper record.
    pub const PAPER: &[&str] = &["title", "authors", "abstract", "tldr", "publicationDate"];
}

/// Bounded fixed-delay retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a retry policy.
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Attempts actually made; a zero budget still performs one call.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Service configuration.
#[derive(Clone)]
pub struct Config {
    /// Gemini API key, sent as the `key` query parameter.
    pub gemini_api_key: Option<String>,

    /// Semantic Scholar API key (optional, sent as `x-api-key`).
    pub semantic_scholar_api_key: Option<String>,

    /// arXiv query URL (for testing with mock servers).
    pub feed_api_url: String,

    /// Base URL for Graph API (for testing with mock servers).
    pub graph_api_url: String,

    /// Base URL for the Gemini API (for testing with mock servers).
    pub gemini_api_url: String,

    /// Gemini model name.
    pub gemini_model: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Entries requested per feed query.
    pub feed_max_results: u32,

    /// arXiv retry budget.
    pub feed_retry: RetryPolicy,

    /// Semantic Scholar retry budget.
    pub graph_retry: RetryPolicy,

    /// Gemini retry budget.
    pub summary_retry: RetryPolicy,
}

impl Config {
    /// Create a new configuration pointing at the production endpoints.
    #[must_use]
    pub fn new(gemini_api_key: Option<String>, semantic_scholar_api_key: Option<String>) -> Self {
        Self {
            gemini_api_key,
            semantic_scholar_api_key,
            feed_api_url: api::FEED_API.to_string(),
            graph_api_url: api::GRAPH_API.to_string(),
            gemini_api_url: api::GEMINI_API.to_string(),
            gemini_model: api::GEMINI_MODEL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            feed_max_results: api::FEED_MAX_RESULTS,
            feed_retry: RetryPolicy::new(retry::FEED_ATTEMPTS, retry::FEED_DELAY),
            graph_retry: RetryPolicy::new(retry::GRAPH_ATTEMPTS, retry::GRAPH_DELAY),
            summary_retry: RetryPolicy::new(retry::SUMMARY_ATTEMPTS, retry::SUMMARY_DELAY),
        }
    }

    /// Create a test configuration with every upstream on one mock server.
    ///
    /// Attempt counts match production; delays shrink to 10ms.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        let delay = Duration::from_millis(10);
        Self {
            gemini_api_key: Some("test-key".to_string()),
            semantic_scholar_api_key: None,
            feed_api_url: format!("{}/api/query", base_url),
            graph_api_url: format!("{}/graph/v1", base_url),
            gemini_api_url: format!("{}/v1beta", base_url),
            gemini_model: api::GEMINI_MODEL.to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            feed_max_results: api::FEED_MAX_RESULTS,
            feed_retry: RetryPolicy::new(retry::FEED_ATTEMPTS, delay),
            graph_retry: RetryPolicy::new(retry::GRAPH_ATTEMPTS, delay),
            summary_retry: RetryPolicy::new(retry::SUMMARY_ATTEMPTS, delay),
        }
    }

    /// Create configuration from environment variables (a `.env` file is honored).
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup. Blank values count as unset.
    ///
    /// Reads `GEMINI_API_KEY`, `SEMANTIC_SCHOLAR_API_KEY`, `GEMINI_MODEL` and
    /// `REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns error if `REQUEST_TIMEOUT_SECS` is not a whole number of seconds.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(var("GEMINI_API_KEY"), var("SEMANTIC_SCHOLAR_API_KEY"));
        if let Some(model) = var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(secs) = var("REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be whole seconds, got {secs:?}: {e}")
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check if a Gemini key is configured.
    #[must_use]
    pub const fn has_gemini_key(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// Check if a Semantic Scholar key is configured.
    #[must_use]
    pub const fn has_semantic_scholar_key(&self) -> bool {
        self.semantic_scholar_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_gemini_key", &self.has_gemini_key())
            .field("has_semantic_scholar_key", &self.has_semantic_scholar_key())
            .field("feed_api_url", &self.feed_api_url)
            .field("graph_api_url", &self.graph_api_url)
            .field("gemini_api_url", &self.gemini_api_url)
            .field("gemini_model", &self.gemini_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
