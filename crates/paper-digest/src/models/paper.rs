//! Paper records and the Semantic Scholar wire model they are built from.

use serde::{Deserialize, Serialize};

/// Title carried by a graph record built after the retry budget ran out.
pub const DEGRADED_TITLE: &str = "Error fetching paper details";

/// Upstream a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceName {
    /// arXiv Atom feed.
    #[serde(rename = "arXiv")]
    Feed,
    /// Semantic Scholar Graph API.
    #[serde(rename = "Semantic Scholar")]
    Graph,
}

impl SourceName {
    /// Human-readable provenance label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Feed => "arXiv",
            Self::Graph => "Semantic Scholar",
        }
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Bibliographic fields obtained from one upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    /// Identifier as known to the source.
    pub identifier: String,

    /// Paper title.
    pub title: String,

    /// Author names in publication order.
    pub authors: Vec<String>,

    /// Paper abstract.
    pub r#abstract: Option<String>,

    /// Upstream-provided terse machine summary (Semantic Scholar TLDR).
    pub short_summary: Option<String>,

    /// Publication date as reported by the source.
    pub publish_date: Option<String>,

    /// Provenance.
    #[serde(rename = "sourceName")]
    pub source: SourceName,
}

impl PaperRecord {
    /// Placeholder record returned by the graph client once its retries are spent.
    #[must_use]
    pub fn degraded(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: DEGRADED_TITLE.to_string(),
            authors: Vec::new(),
            r#abstract: None,
            short_summary: None,
            publish_date: None,
            source: SourceName::Graph,
        }
    }

    /// True for the placeholder built by [`PaperRecord::degraded`].
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.title == DEGRADED_TITLE
            && self.authors.is_empty()
            && self.r#abstract.is_none()
            && self.short_summary.is_none()
    }

    /// Abstract text, if it has any non-whitespace content.
    #[must_use]
    pub fn abstract_text(&self) -> Option<&str> {
        non_blank(self.r#abstract.as_deref())
    }

    /// Short summary text, if it has any non-whitespace content.
    #[must_use]
    pub fn short_summary_text(&self) -> Option<&str> {
        non_blank(self.short_summary.as_deref())
    }
}

/// Abstract lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractRecord {
    /// Identifier that was looked up.
    pub identifier: String,

    /// Abstract text (empty when the source has none).
    pub r#abstract: String,
}

impl From<PaperRecord> for AbstractRecord {
    fn from(record: PaperRecord) -> Self {
        Self { identifier: record.identifier, r#abstract: record.r#abstract.unwrap_or_default() }
    }
}

/// A paper as returned by the Semantic Scholar Graph API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPaper {
    /// Paper title.
    #[serde(default)]
    pub title: Option<String>,

    /// Paper abstract.
    #[serde(default)]
    pub r#abstract: Option<String>,

    /// List of authors.
    #[serde(default)]
    pub authors: Vec<AuthorRef>,

    /// Publication date in ISO format (YYYY-MM-DD).
    #[serde(default)]
    pub publication_date: Option<String>,

    /// AI-generated TLDR summary.
    #[serde(default)]
    pub tldr: Option<Tldr>,
}

impl GraphPaper {
    /// Get the TLDR text if available.
    #[must_use]
    pub fn tldr_text(&self) -> Option<&str> {
        non_blank(self.tldr.as_ref()?.text.as_deref())
    }

    /// Get the abstract if available.
    #[must_use]
    pub fn abstract_text(&self) -> Option<&str> {
        non_blank(self.r#abstract.as_deref())
    }

    /// Whether there is anything to summarize.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.abstract_text().is_some() || self.tldr_text().is_some()
    }

    /// Convert into a record, keyed by the identifier the caller asked for.
    #[must_use]
    pub fn into_record(self, identifier: &str) -> PaperRecord {
        let r#abstract = self.abstract_text().map(str::to_string);
        let short_summary = self.tldr_text().map(str::to_string);
        PaperRecord {
            identifier: identifier.to_string(),
            title: self.title.map(|t| t.trim().to_string()).unwrap_or_default(),
            authors: self.authors.into_iter().filter_map(|a| a.name).collect(),
            r#abstract,
            short_summary,
            publish_date: self.publication_date,
            source: SourceName::Graph,
        }
    }
}

/// Author entry embedded in a graph paper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRef {
    /// Author name.
    #[serde(default)]
    pub name: Option<String>,
}

/// AI-generated TLDR summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tldr {
    /// Summary text.
    #[serde(default)]
    pub text: Option<String>,
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}
