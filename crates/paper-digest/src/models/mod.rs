//! Data models for paper records, summaries and upstream payloads.
//!
//! Upstream JSON models use `#[serde(default)]` for optional fields and
//! `#[serde(rename_all = "camelCase")]` to match API naming.

pub mod identifier;
mod paper;
mod summary;

pub use paper::{
    AbstractRecord, AuthorRef, DEGRADED_TITLE, GraphPaper, PaperRecord, SourceName, Tldr,
};
pub use summary::{RawModelOutput, StructuredSummary, SummaryInput, UnifiedResponse};
