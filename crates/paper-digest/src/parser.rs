//! Parser for three-section model output.
//!
//! Input follows the convention
//!
//! ```text
//! Summary:
//! prose...
//!
//! Key Points:
//! - point
//!
//! Keywords:
//! - keyword
//! ```
//!
//! Labels are matched at line start, case-insensitively, and may carry markdown
//! decoration (`## Summary`, `**Key Points:**`). Each section runs to the next
//! label or the end of the text. Parsing never fails.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::client::summary::has_placeholder;
use crate::models::StructuredSummary;

/// Summary text used when the section is missing or empty.
pub const NO_SUMMARY: &str = "No summary available";

/// Section label at the start of a line.
static SECTION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[\s#*_&&[^\n]]*(?:(summary)|(key[ \t]+points)|(keywords))[\s*_&&[^\n]]*:[\s*_&&[^\n]]*")
        .expect("valid section regex")
});

/// Label directly following another one on the same line (`Summary: Keywords:`).
static CHAINED_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A[\s#*_&&[^\n]]*(?:(summary)|(key[ \t]+points)|(keywords))[\s*_&&[^\n]]*:[\s*_&&[^\n]]*")
        .expect("valid section regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    KeyPoints,
    Keywords,
}

impl Section {
    /// Section named by a label match (groups 1 to 3 of the label regexes).
    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        [Self::Summary, Self::KeyPoints, Self::Keywords]
            .into_iter()
            .zip(1..)
            .find_map(|(section, group)| caps.get(group).map(|_| section))
    }
}

/// Parse model output into a [`StructuredSummary`].
#[must_use]
pub fn parse(text: &str) -> StructuredSummary {
    let text = normalize_newlines(text);

    let labels = find_labels(&text);

    let mut summary = None;
    let mut key_points = None;
    let mut keywords = None;

    for (i, &(section, _, body_start)) in labels.iter().enumerate() {
        let body_end = labels.get(i + 1).map_or(text.len(), |&(_, start, _)| start);
        let body = &text[body_start..body_end];

        match section {
            Section::Summary if summary.is_none() => summary = Some(body.trim().to_string()),
            Section::KeyPoints if key_points.is_none() => key_points = Some(bullets(body)),
            Section::Keywords if keywords.is_none() => keywords = Some(bullets(body)),
            _ => {}
        }
    }

    StructuredSummary {
        summary: summary.filter(|s| !s.is_empty()).unwrap_or_else(|| NO_SUMMARY.to_string()),
        key_points: key_points.unwrap_or_default(),
        keywords: keywords.unwrap_or_default(),
    }
}

/// True if `text` carries a `Key Points` label that [`parse`] would recognize.
#[must_use]
pub fn has_key_points_label(text: &str) -> bool {
    find_labels(&normalize_newlines(text))
        .iter()
        .any(|&(section, _, _)| section == Section::KeyPoints)
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Every label as `(section, start, body_start)`, in text order.
fn find_labels(text: &str) -> Vec<(Section, usize, usize)> {
    let mut labels = Vec::new();
    for caps in SECTION_LABEL.captures_iter(text) {
        let (Some(whole), Some(section)) = (caps.get(0), Section::from_captures(&caps)) else {
            continue;
        };
        labels.push((section, whole.start(), whole.end()));

        let mut end = whole.end();
        while let Some(chained) = CHAINED_LABEL.captures(&text[end..]) {
            let (Some(whole), Some(section)) = (chained.get(0), Section::from_captures(&chained))
            else {
                break;
            };
            labels.push((section, end, end + whole.end()));
            end += whole.end();
        }
    }
    labels
}

/// Bullet lines of a section body, markers stripped.
fn bullets(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| strip_bullet(line.trim_start()))
        .map(str::trim)
        .filter(|item| !item.is_empty() && !has_placeholder(item))
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix('-') {
        return Some(rest);
    }
    ['*', '•']
        .into_iter()
        .find_map(|marker| line.strip_prefix(marker))
        .filter(|rest| rest.starts_with(char::is_whitespace))
}
