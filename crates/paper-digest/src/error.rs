//! Error types for the paper digest service.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! [`ClientError`] describes a single failed upstream attempt; [`DigestError`] is what
//! callers of the source clients and the aggregator see once retries are spent.

use std::time::Duration;

use axum::http::StatusCode;

/// Errors from a single HTTP attempt against an upstream.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, body read, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the upstream (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Atom feed decoding error
    #[error("Failed to decode feed: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Well-formed payload that carries neither an abstract nor a short summary
    #[error("Insufficient content: {0}")]
    InsufficientContent(String),

    /// Well-formed payload whose content failed validation
    #[error("Invalid content: {0}")]
    ContentInvalid(String),
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Create an insufficient content error.
    #[must_use]
    pub fn insufficient_content(message: impl Into<String>) -> Self {
        Self::InsufficientContent(message.into())
    }

    /// Create a content validation error.
    #[must_use]
    pub fn content_invalid(message: impl Into<String>) -> Self {
        Self::ContentInvalid(message.into())
    }

    /// Returns true if this error is retryable.
    ///
    /// Transport failures and semantically unusable payloads share one retry budget.
    /// Explicit absence and rejected requests are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder() && !e.is_redirect(),
            Self::RateLimited { .. }
            | Self::Server { .. }
            | Self::Parse(_)
            | Self::Xml(_)
            | Self::InsufficientContent(_)
            | Self::ContentInvalid(_) => true,
            Self::NotFound { .. } | Self::BadRequest { .. } | Self::UnexpectedStatus { .. } => {
                false
            }
        }
    }
}

/// Errors surfaced by source clients and the aggregator.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// Required input was missing
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument {
        /// Name of the offending input
        field: String,
        /// Why it was rejected
        message: String,
    },

    /// The upstream answered, and the entity does not exist
    #[error("Paper not found: {id}")]
    NotFound {
        /// Identifier that was looked up
        id: String,
    },

    /// Retry budget exhausted against an upstream
    #[error("{upstream} unavailable: {message}")]
    UpstreamUnavailable {
        /// Upstream label
        upstream: String,
        /// Last error observed before giving up
        message: String,
    },
}

impl DigestError {
    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument { field: field.into(), message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an upstream unavailable error.
    #[must_use]
    pub fn upstream_unavailable(upstream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable { upstream: upstream.into(), message: message.into() }
    }

    /// HTTP status used when this error reaches the inbound surface.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Convert to a user-friendly error message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::NotFound { id } => {
                format!("Not found: {id}. Please check the ID is correct.")
            }
            Self::InvalidArgument { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            Self::UpstreamUnavailable { upstream, .. } => {
                format!("Error fetching data from {upstream}")
            }
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for service operations.
pub type DigestResult<T> = Result<T, DigestError>;
