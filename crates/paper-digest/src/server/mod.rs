//! Inbound HTTP surface.
//!
//! Thin axum layer over [`Aggregator`]: query-string parsing, JSON encoding and
//! the mapping of [`crate::error::DigestError`] onto status codes.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::aggregator::Aggregator;

pub use routes::create_router;

/// Serve the HTTP API on `0.0.0.0:{port}` until ctrl-c.
///
/// # Errors
///
/// Returns error if the port cannot be bound or the server fails.
pub async fn run_http(aggregator: Arc<Aggregator>, port: u16) -> anyhow::Result<()> {
    let router = create_router(aggregator);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c, shutting down"),
    }
}
