//! Summarization inputs and outputs, and the unified response.

use serde::{Deserialize, Serialize};

use super::PaperRecord;

/// Text payload handed to the summarizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryInput {
    /// Paper abstract.
    pub r#abstract: Option<String>,

    /// Upstream short summary.
    pub short_summary: Option<String>,
}

impl SummaryInput {
    /// Create a summary input.
    #[must_use]
    pub fn new(r#abstract: Option<String>, short_summary: Option<String>) -> Self {
        Self { r#abstract, short_summary }
    }

    /// True when neither field carries any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().is_none_or(|t| t.trim().is_empty());
        blank(&self.r#abstract) && blank(&self.short_summary)
    }
}

impl From<&PaperRecord> for SummaryInput {
    fn from(record: &PaperRecord) -> Self {
        Self::new(
            record.abstract_text().map(str::to_string),
            record.short_summary_text().map(str::to_string),
        )
    }
}

/// Literal text returned by the language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelOutput(pub String);

impl RawModelOutput {
    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawModelOutput {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Model output split into its three sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    /// Prose summary.
    pub summary: String,

    /// Key findings, one per bullet.
    pub key_points: Vec<String>,

    /// Keywords, one per bullet.
    pub keywords: Vec<String>,
}

impl StructuredSummary {
    /// Render back into the three-section text convention.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("Summary:\n{}\n\nKey Points:\n", self.summary);
        for point in &self.key_points {
            out.push_str("- ");
            out.push_str(point);
            out.push('\n');
        }
        out.push_str("\nKeywords:\n");
        for keyword in &self.keywords {
            out.push_str("- ");
            out.push_str(keyword);
            out.push('\n');
        }
        out
    }
}

/// Record returned to feed clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedResponse {
    /// Identifier the record was resolved from.
    pub identifier: String,

    /// Provenance label.
    pub source: String,

    /// Paper title.
    pub title: String,

    /// Author names.
    pub authors: Vec<String>,

    /// Paper abstract.
    pub r#abstract: String,

    /// Generated summary.
    pub summary: String,

    /// Generated key points.
    pub bullet_points: Vec<String>,

    /// Generated keywords.
    pub keywords: Vec<String>,
}
