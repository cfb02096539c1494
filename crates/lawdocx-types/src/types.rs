use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of characters of surrounding text captured on each side of a hit.
pub const CONTEXT_WINDOW: usize = 100;

/// Maximum number of characters captured from the hit itself.
pub const TARGET_LIMIT: usize = 500;

/// Fixed triage level assigned per finding kind, never computed from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Rank used for threshold filtering: `info < warning < error`.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed vocabulary of finding types. Adding a variant is a breaking
/// schema change for every downstream consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Comment,
    Insertion,
    Deletion,
    MoveFrom,
    MoveTo,
    FormatChange,
    Bracket,
    TodoMarker,
    Boilerplate,
    Footnote,
    Endnote,
    Highlight,
    ManualNumbering,
    HeadingGap,
    TermInconsistency,
    Metadata,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::Comment => "comment",
            FindingKind::Insertion => "insertion",
            FindingKind::Deletion => "deletion",
            FindingKind::MoveFrom => "move_from",
            FindingKind::MoveTo => "move_to",
            FindingKind::FormatChange => "format_change",
            FindingKind::Bracket => "bracket",
            FindingKind::TodoMarker => "todo_marker",
            FindingKind::Boilerplate => "boilerplate",
            FindingKind::Footnote => "footnote",
            FindingKind::Endnote => "endnote",
            FindingKind::Highlight => "highlight",
            FindingKind::ManualNumbering => "manual_numbering",
            FindingKind::HeadingGap => "heading_gap",
            FindingKind::TermInconsistency => "term_inconsistency",
            FindingKind::Metadata => "metadata",
        }
    }
}

/// Where a finding sits inside a document: a story key plus inclusive,
/// 0-based paragraph indices relative to that story only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub story: String,
    pub paragraph_index_start: usize,
    pub paragraph_index_end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anchor_fallback: bool,
}

impl Location {
    pub fn new(story: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            story: story.into(),
            paragraph_index_start: start,
            paragraph_index_end: end,
            comment_id: None,
            anchor_fallback: false,
        }
    }

    pub fn at(story: impl Into<String>, index: usize) -> Self {
        Self::new(story, index, index)
    }
}

/// Text surrounding a hit. `target` is always byte-identical to the source
/// document text at the hit span (clamped to [`TARGET_LIMIT`] characters).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub before: String,
    pub target: String,
    pub after: String,
}

impl Context {
    /// Slice a context window around `start..end` (byte offsets on char
    /// boundaries) out of `text`.
    pub fn around(text: &str, start: usize, end: usize) -> Self {
        let before = take_last_chars(&text[..start], CONTEXT_WINDOW);
        let target = take_first_chars(&text[start..end], TARGET_LIMIT);
        let after = take_first_chars(&text[end..], CONTEXT_WINDOW);
        Self {
            before: before.to_string(),
            target: target.to_string(),
            after: after.to_string(),
        }
    }

    /// A context whose target is the whole of `value`, with nothing around
    /// it. Used by property readers and error findings.
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            before: String::new(),
            target: value.into(),
            after: String::new(),
        }
    }
}

fn take_first_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

fn take_last_chars(text: &str, limit: usize) -> &str {
    let count = text.chars().count();
    if count <= limit {
        return text;
    }
    let skip = count - limit;
    match text.char_indices().nth(skip) {
        Some((offset, _)) => &text[offset..],
        None => text,
    }
}

/// One normalized, located, context-carrying record of a detected artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub severity: Severity,
    pub location: Location,
    pub context: Context,
    pub details: Map<String, Value>,
}

/// Per-input-file scan result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    pub sha256: String,
    pub items: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn severity_ranks_order_thresholds() {
        assert!(Severity::Info.rank() < Severity::Warning.rank());
        assert!(Severity::Warning.rank() < Severity::Error.rank());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("fatal"), None);
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FindingKind::TodoMarker).unwrap(),
            "\"todo_marker\""
        );
        assert_eq!(
            serde_json::to_string(&FindingKind::MoveFrom).unwrap(),
            "\"move_from\""
        );
    }

    #[test]
    fn context_window_clamps_at_text_edges() {
        let text = "abcdef";
        let ctx = Context::around(text, 2, 4);
        assert_eq!(ctx.before, "ab");
        assert_eq!(ctx.target, "cd");
        assert_eq!(ctx.after, "ef");
    }

    #[test]
    fn context_window_counts_chars_not_bytes() {
        let text = "é".repeat(300);
        let start = "é".len() * 150;
        let ctx = Context::around(&text, start, start + "é".len());
        assert_eq!(ctx.before.chars().count(), CONTEXT_WINDOW);
        assert_eq!(ctx.target, "é");
        assert_eq!(ctx.after.chars().count(), CONTEXT_WINDOW);
    }

    #[test]
    fn context_target_clamped_to_limit() {
        let text = "x".repeat(2000);
        let ctx = Context::around(&text, 0, 1000);
        assert_eq!(ctx.target.len(), TARGET_LIMIT);
    }

    #[test]
    fn location_optional_fields_stay_out_of_json() {
        let location = Location::at("body", 3);
        let json = serde_json::to_value(&location).unwrap();
        assert!(json.get("comment_id").is_none());
        assert!(json.get("anchor_fallback").is_none());

        let mut with_comment = Location::at("comment--2", 0);
        with_comment.comment_id = Some("2".into());
        with_comment.anchor_fallback = true;
        let json = serde_json::to_value(&with_comment).unwrap();
        assert_eq!(json["comment_id"], "2");
        assert_eq!(json["anchor_fallback"], true);
    }
}
