//! The pattern detector and its bracket specialization, plus the three
//! pattern tools (boilerplate, todos, brackets).

use lawdocx_docx::{Coverage, DocxError, DocxPackage};
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use regex::Regex;
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;
use crate::catalog::{BOILERPLATE_PATTERNS, TODO_PATTERNS};
use crate::tracker::StoryText;

/// A raw span matched in some text, with the text that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternHit {
    pub start: usize,
    pub end: usize,
    pub matched: String,
    pub pattern: String,
}

/// Non-overlapping matches of every pattern, in span order. Distinct
/// patterns may still produce overlapping hits; those are kept unless
/// they are literally identical, which the finding builder merges.
pub fn scan_patterns(text: &str, patterns: &[Regex]) -> Vec<PatternHit> {
    let mut hits = Vec::new();
    for pattern in patterns {
        for m in pattern.find_iter(text) {
            if m.range().is_empty() {
                continue;
            }
            hits.push(PatternHit {
                start: m.start(),
                end: m.end(),
                matched: m.as_str().to_string(),
                pattern: pattern.as_str().to_string(),
            });
        }
    }
    hits.sort_by_key(|hit| (hit.start, hit.end));
    hits
}

/// Balanced `[` ... `]` spans at any nesting depth, byte offsets
/// inclusive of both brackets, sorted by start.
pub fn balanced_brackets(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut stack = Vec::new();
    for (offset, ch) in text.char_indices() {
        match ch {
            '[' => stack.push(offset),
            ']' => {
                if let Some(start) = stack.pop() {
                    spans.push((start, offset + 1));
                }
            }
            _ => {}
        }
    }
    spans.sort_by_key(|span| span.0);
    spans
}

/// One error finding per unreadable part, keyed to the story it belongs
/// to. The readable stories are still scanned.
fn part_errors(
    builder: &FindingBuilder,
    kind: FindingKind,
    failures: &[(String, DocxError)],
) -> Vec<Finding> {
    failures
        .iter()
        .map(|(story, error)| {
            builder.error(kind, story, format!("failed to read story text: {error}"))
        })
        .collect()
}

/// Boilerplate legends across every text story. Matches are scanned per
/// paragraph; `extra` patterns extend the static catalog.
pub fn collect_boilerplate(
    package: &DocxPackage,
    builder: &mut FindingBuilder,
    extra: &[Regex],
) -> Vec<Finding> {
    let scan = lawdocx_docx::story::text_stories(package, Coverage::Full);
    let mut findings = part_errors(builder, FindingKind::Boilerplate, &scan.failures);
    for story in &scan.stories {
        let key = story.key.to_string();
        for (index, paragraph) in story.paragraphs.iter().enumerate() {
            for hit in scan_patterns(paragraph, &BOILERPLATE_PATTERNS)
                .into_iter()
                .chain(scan_patterns(paragraph, extra))
            {
                let mut details = Map::new();
                details.insert("matched_pattern".into(), Value::String(hit.matched));
                builder.push(
                    &mut findings,
                    FindingKind::Boilerplate,
                    Severity::Warning,
                    Location::at(key.clone(), index),
                    Context::around(paragraph, hit.start, hit.end),
                    details,
                );
            }
        }
    }
    findings
}

/// TODO-style markers in body, headers, and footers.
pub fn collect_todos(
    package: &DocxPackage,
    builder: &mut FindingBuilder,
    extra: &[Regex],
) -> Vec<Finding> {
    let scan = lawdocx_docx::story::text_stories(package, Coverage::BodyHeaderFooter);
    let mut findings = part_errors(builder, FindingKind::TodoMarker, &scan.failures);
    for story in &scan.stories {
        let key = story.key.to_string();
        for (index, paragraph) in story.paragraphs.iter().enumerate() {
            for hit in scan_patterns(paragraph, &TODO_PATTERNS)
                .into_iter()
                .chain(scan_patterns(paragraph, extra))
            {
                let mut details = Map::new();
                details.insert(
                    "matched_pattern".into(),
                    Value::String(hit.matched.clone()),
                );
                details.insert("raw_text".into(), Value::String(hit.matched));
                builder.push(
                    &mut findings,
                    FindingKind::TodoMarker,
                    Severity::Warning,
                    Location::at(key.clone(), index),
                    Context::around(paragraph, hit.start, hit.end),
                    details,
                );
            }
        }
    }
    findings
}

/// Bracketed placeholder spans across every text story. With no user
/// patterns, balanced bracket pairs are detected structurally; user
/// patterns replace the structural scan. Spans may cross paragraph
/// boundaries, widening the recorded paragraph range.
pub fn collect_brackets(
    package: &DocxPackage,
    builder: &mut FindingBuilder,
    extra: &[Regex],
) -> Vec<Finding> {
    let scan = lawdocx_docx::story::text_stories(package, Coverage::Full);
    let mut findings = part_errors(builder, FindingKind::Bracket, &scan.failures);
    for story in &scan.stories {
        if story.paragraphs.is_empty() {
            continue;
        }
        let key = story.key.to_string();
        let tracker = StoryText::new(&story.paragraphs);
        let text = tracker.text();

        let hits: Vec<PatternHit> = if extra.is_empty() {
            balanced_brackets(text)
                .into_iter()
                .map(|(start, end)| PatternHit {
                    start,
                    end,
                    matched: text[start..end].to_string(),
                    pattern: "default_brackets".to_string(),
                })
                .collect()
        } else {
            scan_patterns(text, extra)
        };

        for hit in hits {
            let (para_start, para_end) = tracker.paragraph_range(hit.start, hit.end);
            let mut details = Map::new();
            details.insert("matched_pattern".into(), Value::String(hit.pattern));
            details.insert("raw_text".into(), Value::String(hit.matched));
            builder.push(
                &mut findings,
                FindingKind::Bracket,
                Severity::Warning,
                Location::new(key.clone(), para_start, para_end),
                Context::around(text, hit.start, hit.end),
                details,
            );
        }
    }
    findings
}
