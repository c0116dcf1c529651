//! Paper identifier handling.
//!
//! Identifiers stay opaque strings. This module only recognizes the shapes the
//! upstreams care about: DOIs and arXiv ids.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::defaults;

/// New-style arXiv id, e.g. `2301.07041v2`.
static ARXIV_NEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}\.\d{4,5}(?:v\d+)?$").expect("valid arXiv regex"));

/// Old-style arXiv id, e.g. `hep-th/9901001` or `math.AG/0601001`.
static ARXIV_OLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z-]+(?:\.[A-Z]{2})?/\d{7}(?:v\d+)?$").expect("valid arXiv regex")
});

/// Resolve an optional caller-supplied identifier, falling back to the default paper.
#[must_use]
pub fn resolve(id: Option<&str>) -> String {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(defaults::PAPER_ID)
        .to_string()
}

/// Extract an arXiv id from an identifier, if it is one.
///
/// Handles `arXiv:`/`ARXIV:` prefixes, bare new and old style ids, and
/// arXiv DOIs (`10.48550/arXiv.2301.07041`).
#[must_use]
pub fn arxiv_id(id: &str) -> Option<String> {
    let id = id.trim();
    let candidate = strip_prefix_ignore_case(id, "arxiv:")
        .or_else(|| strip_prefix_ignore_case(id, "10.48550/arxiv."))
        .unwrap_or(id);

    if ARXIV_NEW.is_match(candidate) || ARXIV_OLD.is_match(candidate) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// True for bare DOIs such as `10.1017/S0022226797006889`.
#[must_use]
pub fn is_doi(id: &str) -> bool {
    let id = id.trim();
    id.starts_with("10.") && id.contains('/')
}

/// Rewrite an identifier into the form the Graph API accepts.
///
/// Bare DOIs gain a `DOI:` prefix and arXiv ids an `ARXIV:` prefix. DOIs may
/// themselves contain colons, so shape checks run before anything passes through.
/// Anything else (S2 hashes, `CorpusId:`, already prefixed ids) is left as is.
#[must_use]
pub fn graph_id(id: &str) -> String {
    let id = id.trim();
    if let Some(arxiv) = arxiv_id(id) {
        return format!("ARXIV:{arxiv}");
    }
    if is_doi(id) {
        return format!("DOI:{id}");
    }
    id.to_string()
}

fn strip_prefix_ignore_case<'a>(id: &'a str, prefix: &str) -> Option<&'a str> {
    let head = id.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &id[prefix.len()..])
}
