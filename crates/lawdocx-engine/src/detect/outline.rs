//! Outline structure checks on the body: hand-typed numbering prefixes,
//! list numbering without a heading style, and heading level jumps.

use std::collections::HashMap;

use lawdocx_docx::xml::{self, is_w_element, optional_part_str, parse_part, w_attr};
use lawdocx_docx::DocxPackage;
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use lazy_static::lazy_static;
use regex::Regex;
use roxmltree::Node;
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;

const NUMBERING: &[&str] = &[
    r"^\s*\d+\.\s",
    r"^\s*\d+\)\s",
    r"^\s*\d+\.[A-Za-z]\s",
    r"^\s*\([A-Za-z]\)\s",
    r"(?i)^\s*[ivxlcdm]+\)\s",
    r"(?i)^\s*[ivxlcdm]+\.\s",
];

const HEADING_KEYWORDS: &[&str] = &["heading ", "title", "article", "section", "clause", "heading-"];

// Outline contexts quote at most the first 80 characters of the paragraph.
const OUTLINE_TARGET: usize = 80;

lazy_static! {
    static ref NUMBERING_PATTERNS: Vec<Regex> = NUMBERING
        .iter()
        .map(|pattern| Regex::new(pattern).expect("static numbering pattern"))
        .collect();
}

fn is_heading_style(style_name: &str) -> bool {
    if style_name.is_empty() {
        return false;
    }
    let lowered = style_name.to_lowercase();
    HEADING_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

fn heading_level(style_name: &str) -> Option<u32> {
    let trimmed = style_name.trim_end();
    let digits: String = trimmed
        .chars()
        .rev()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

fn has_manual_numbering(text: &str) -> bool {
    NUMBERING_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}

/// Style id to display name, from `word/styles.xml`. Absent part yields
/// an empty map and style ids stand in for names.
fn load_styles(package: &DocxPackage) -> Result<HashMap<String, String>, lawdocx_docx::DocxError> {
    let part = "word/styles.xml";
    let Some(text) = optional_part_str(package, part)? else {
        return Ok(HashMap::new());
    };
    let doc = parse_part(part, text)?;

    let mut styles = HashMap::new();
    for style in doc
        .root_element()
        .descendants()
        .filter(|n| is_w_element(*n, "style"))
    {
        let Some(style_id) = w_attr(style, "styleId") else {
            continue;
        };
        let name = style
            .children()
            .find(|n| is_w_element(*n, "name"))
            .and_then(|n| w_attr(n, "val"));
        if let Some(name) = name {
            styles.insert(style_id.to_string(), name.to_string());
        }
    }
    Ok(styles)
}

fn paragraph_style_id<'a>(paragraph: Node<'a, '_>) -> Option<&'a str> {
    let p_pr = paragraph.children().find(|n| is_w_element(*n, "pPr"))?;
    let p_style = p_pr.children().find(|n| is_w_element(*n, "pStyle"))?;
    w_attr(p_style, "val")
}

fn has_num_pr(paragraph: Node<'_, '_>) -> bool {
    paragraph
        .children()
        .find(|n| is_w_element(*n, "pPr"))
        .map(|p_pr| p_pr.children().any(|n| is_w_element(n, "numPr")))
        .unwrap_or(false)
}

fn outline_context(text: &str) -> Context {
    let end = text
        .char_indices()
        .nth(OUTLINE_TARGET)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len());
    Context::around(text, 0, end)
}

/// Numbering and heading structure issues in the body.
pub fn collect(package: &DocxPackage, builder: &mut FindingBuilder) -> Vec<Finding> {
    let loaded = (|| -> Result<_, lawdocx_docx::DocxError> {
        let styles = load_styles(package)?;
        let body = package.part_str("word/document.xml")?.to_string();
        Ok((styles, body))
    })();
    let (styles, body) = match loaded {
        Ok(loaded) => loaded,
        Err(error) => {
            return vec![builder.error(
                FindingKind::ManualNumbering,
                "body",
                format!("failed to read outline: {error}"),
            )]
        }
    };
    let doc = match parse_part("word/document.xml", &body) {
        Ok(doc) => doc,
        Err(error) => {
            return vec![builder.error(
                FindingKind::ManualNumbering,
                "body",
                format!("failed to read outline: {error}"),
            )]
        }
    };

    let mut findings = Vec::new();
    let mut previous_level: Option<u32> = None;

    for (index, paragraph) in xml::paragraphs(doc.root_element()).iter().enumerate() {
        let text = xml::paragraph_text(*paragraph);
        let style_id = paragraph_style_id(*paragraph).unwrap_or("");
        let style_name = styles
            .get(style_id)
            .map(String::as_str)
            .unwrap_or(style_id);

        if is_heading_style(style_name) {
            let level = heading_level(style_name);
            if let (Some(previous), Some(level)) = (previous_level, level) {
                if level > previous + 1 {
                    let mut details = Map::new();
                    details.insert("category".into(), Value::String("heading_gap".into()));
                    details.insert("style_name".into(), Value::String(style_name.to_string()));
                    details.insert("previous_level".into(), Value::Number(previous.into()));
                    details.insert("level".into(), Value::Number(level.into()));
                    builder.push(
                        &mut findings,
                        FindingKind::HeadingGap,
                        Severity::Warning,
                        Location::at("body", index),
                        outline_context(&text),
                        details,
                    );
                }
            }
            if level.is_some() {
                previous_level = level;
            }
            continue;
        }

        if has_manual_numbering(&text) {
            let mut details = Map::new();
            details.insert("category".into(), Value::String("manual_numbering".into()));
            details.insert("style_name".into(), Value::String(style_name.to_string()));
            builder.push(
                &mut findings,
                FindingKind::ManualNumbering,
                Severity::Error,
                Location::at("body", index),
                outline_context(&text),
                details,
            );
        } else if has_num_pr(*paragraph) {
            let mut details = Map::new();
            details.insert(
                "category".into(),
                Value::String("suspicious_numbering".into()),
            );
            details.insert("style_name".into(), Value::String(style_name.to_string()));
            builder.push(
                &mut findings,
                FindingKind::ManualNumbering,
                Severity::Warning,
                Location::at("body", index),
                outline_context(&text),
                details,
            );
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawdocx_docx::fixture::DocxFixture;
    use pretty_assertions::assert_eq;

    fn scan(bytes: &[u8]) -> Vec<Finding> {
        let package = DocxPackage::open(bytes).unwrap();
        let mut builder = FindingBuilder::new();
        collect(&package, &mut builder)
    }

    #[test]
    fn typed_numbering_on_plain_paragraph_is_an_error() {
        let bytes = DocxFixture::new()
            .body_text("1. Definitions and interpretation")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.kind, FindingKind::ManualNumbering);
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(finding.details["category"], "manual_numbering");
        assert_eq!(finding.context.target, "1. Definitions and interpretation");
    }

    #[test]
    fn roman_and_letter_prefixes_are_detected() {
        let bytes = DocxFixture::new()
            .body_text("(a) first limb")
            .body_text("iv. fourth limb")
            .body_text("plain prose without numbering")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].location.paragraph_index_start, 0);
        assert_eq!(findings[1].location.paragraph_index_start, 1);
    }

    #[test]
    fn heading_styles_are_exempt_from_numbering_checks() {
        let bytes = DocxFixture::new()
            .body_styled_text("Heading1", "1. Background")
            .style("Heading1", "heading 1")
            .build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn auto_numbering_without_heading_style_is_suspicious() {
        let bytes = DocxFixture::new()
            .body_numbered_text("Deliverables are set out below")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].details["category"], "suspicious_numbering");
    }

    #[test]
    fn heading_level_jump_is_flagged() {
        let bytes = DocxFixture::new()
            .body_styled_text("Heading1", "Background")
            .body_styled_text("Heading3", "Sub-sub point")
            .style("Heading1", "heading 1")
            .style("Heading3", "heading 3")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.kind, FindingKind::HeadingGap);
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.details["previous_level"], 1);
        assert_eq!(finding.details["level"], 3);
        assert_eq!(finding.location.paragraph_index_start, 1);
    }

    #[test]
    fn descending_or_stepwise_headings_are_fine() {
        let bytes = DocxFixture::new()
            .body_styled_text("Heading1", "One")
            .body_styled_text("Heading2", "One point one")
            .body_styled_text("Heading1", "Two")
            .style("Heading1", "heading 1")
            .style("Heading2", "heading 2")
            .build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn long_paragraph_context_is_truncated() {
        let long = format!("1. {}", "x".repeat(200));
        let bytes = DocxFixture::new().body_text(&long).build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].context.target.chars().count(), 80);
        assert!(!findings[0].context.after.is_empty());
    }
}
