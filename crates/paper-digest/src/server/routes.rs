//! HTTP routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;
use crate::error::DigestError;
use crate::models::{PaperRecord, SourceName};

/// Body of `GET /`.
pub const ROOT_MESSAGE: &str = "API is running...";

/// Query string of the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Query string of the single-paper endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    id: Option<String>,
}

/// Listing response: `{ "source": "arXiv", "data": [...] }`.
#[derive(Debug, Serialize)]
pub struct FeedListing {
    pub source: SourceName,
    pub data: Vec<PaperRecord>,
}

/// Error body: `{ "error": "..." }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for DigestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, %status, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        (status, Json(ErrorBody { error: self.to_user_message() })).into_response()
    }
}

/// Create the HTTP router.
pub fn create_router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/arxiv", get(list_feed))
        .route("/api/arxiv-abstract", get(feed_abstract))
        .route("/api/fetchResearchPaperData", get(paper_digest))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(aggregator)
}

async fn root() -> &'static str {
    ROOT_MESSAGE
}

async fn list_feed(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<FeedListing>, DigestError> {
    let data = aggregator.fetch_records(query.q.as_deref()).await?;
    Ok(Json(FeedListing { source: SourceName::Feed, data }))
}

async fn feed_abstract(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<IdQuery>,
) -> Response {
    let Some(id) = query.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
        return DigestError::invalid_argument("id", "arXiv ID is required").into_response();
    };

    match aggregator.fetch_abstract(id).await {
        Ok(record) => Json(record).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn paper_digest(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<IdQuery>,
) -> Response {
    match aggregator.aggregate(query.id.as_deref()).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}
