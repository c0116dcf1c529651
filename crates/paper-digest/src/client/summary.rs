//! Gemini summary client.
//!
//! Sends a fixed prompt to `models/{model}:generateContent` and returns the
//! model's free text. Responses that still contain template placeholders or
//! lack the `Key Points` section are rejected and retried like transport
//! failures. When nothing usable comes back the client answers with
//! [`fallback_output`] so the parser never needs a special case.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::retry::with_retry;
use super::{Summarizer, handle_response, http_client};
use crate::config::{Config, RetryPolicy};
use crate::error::{ClientError, ClientResult};
use crate::models::{RawModelOutput, SummaryInput};
use crate::parser;

/// Bracketed template tokens such as `[Point 1]`, `[Keyword]` or `[Insert summary here]`.
///
/// Only whole template words (optionally numbered) count, so `[Point cloud]` is content.
pub static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[\s*(?:(?:key\s*)?(?:point|keyword|summary|topic)s?\s*\d*|(?:insert|placeholder)\b[^\]]*)\s*\]",
    )
    .expect("valid placeholder regex")
});

const FALLBACK: &str = "\
Summary:
An automatic summary could not be generated for this paper right now. The abstract above describes its contribution.

Key Points:
- Automatic summarization is temporarily unavailable for this paper.
- The abstract remains the most reliable overview of the work.
- Try again later for a generated summary.

Keywords:
- research paper
- summary unavailable
";

/// Schema-valid stand-in used when the model gives nothing usable.
#[must_use]
pub fn fallback_output() -> RawModelOutput {
    RawModelOutput(FALLBACK.to_string())
}

/// True if `text` contains a template placeholder.
#[must_use]
pub fn has_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Build the prompt sent to the model. Deterministic for a given input.
#[must_use]
pub fn build_prompt(input: &SummaryInput) -> String {
    let mut prompt = String::from(
        "You are summarizing an academic paper for a research feed.\n\
         Using only the paper text below, reply with exactly three sections in this order \
         and with these exact labels:\n\n\
         Summary:\n\
         Two or three plain sentences describing what the paper does and finds.\n\n\
         Key Points:\n\
         - Three to five bullet points, each a specific finding or contribution.\n\n\
         Keywords:\n\
         - Three to six bullet points, each a single keyword or short phrase.\n\n\
         Start every bullet with \"- \". Do not use placeholder text such as [Point 1] or \
         [Keyword 1]; every bullet must contain real content from the paper. Do not add any \
         other sections.\n",
    );

    if let Some(ref text) = input.r#abstract {
        if !text.trim().is_empty() {
            prompt.push_str("\nAbstract:\n");
            prompt.push_str(text.trim());
            prompt.push('\n');
        }
    }
    if let Some(ref text) = input.short_summary {
        if !text.trim().is_empty() {
            prompt.push_str("\nTL;DR:\n");
            prompt.push_str(text.trim());
            prompt.push('\n');
        }
    }

    prompt
}

/// Reject model output the parser could not turn into real content.
fn validate(text: &str) -> ClientResult<()> {
    if text.trim().is_empty() {
        return Err(ClientError::content_invalid("empty model output"));
    }
    if has_placeholder(text) {
        return Err(ClientError::content_invalid("model output contains placeholders"));
    }
    if !parser::has_key_points_label(text) {
        return Err(ClientError::content_invalid("model output has no Key Points section"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }
}

/// Gemini API client.
#[derive(Clone)]
pub struct SummaryClient {
    /// Pooled HTTP client.
    client: Client,

    /// Full `generateContent` URL for the configured model.
    endpoint: String,

    /// API key (sent as the `key` query parameter).
    api_key: Option<String>,

    /// Retry budget.
    retry: RetryPolicy,
}

impl SummaryClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: http_client(config, headers)?,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.gemini_api_url, config.gemini_model
            ),
            api_key: config.gemini_api_key.clone(),
            retry: config.summary_retry,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Summarize `input`, falling back to canned output when the model cannot help.
    pub async fn summarize(&self, input: &SummaryInput) -> RawModelOutput {
        if input.is_empty() {
            debug!("nothing to summarize, using fallback output");
            return fallback_output();
        }
        let Some(ref key) = self.api_key else {
            warn!("no Gemini API key configured, using fallback output");
            return fallback_output();
        };

        let prompt = build_prompt(input);
        let result = with_retry(&self.retry, "gemini generateContent", |attempt| {
            debug!(attempt, prompt_len = prompt.len(), "requesting summary from Gemini");
            self.generate(key, &prompt)
        })
        .await;

        match result {
            Ok(text) => RawModelOutput(text),
            Err(failure) => {
                info!(attempts = failure.attempts, error = %failure.error, "using fallback summary");
                fallback_output()
            }
        }
    }

    /// One attempt: call the endpoint and validate the text.
    async fn generate(&self, key: &str, prompt: &str) -> ClientResult<String> {
        let body = GenerateRequest { contents: [Content { parts: [RequestPart { text: prompt }] }] };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .body(serde_json::to_string(&body)?)
            .send()
            .await?;
        let response = handle_response(response).await?;
        let payload: GenerateResponse = serde_json::from_str(&response.text().await?)?;

        let text = payload.text();
        validate(&text)?;
        Ok(text)
    }
}

#[async_trait]
impl Summarizer for SummaryClient {
    async fn summarize(&self, input: &SummaryInput) -> RawModelOutput {
        Self::summarize(self, input).await
    }
}

impl std::fmt::Debug for SummaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryClient")
            .field("endpoint", &self.endpoint)
            .field("has_api_key", &self.has_api_key())
            .finish()
    }
}
