//! Highlighted-run detection across every text story.

use lawdocx_docx::xml::{self, is_w_element, optional_part_str, parse_part, w_attr};
use lawdocx_docx::{DocxPackage, StoryKey};
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use roxmltree::Node;
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;

fn run_text(run: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in run.descendants() {
        if is_w_element(node, "t") || is_w_element(node, "delText") {
            if let Some(value) = node.text() {
                text.push_str(value);
            }
        }
    }
    text
}

fn highlight_color(run: Node<'_, '_>) -> Option<String> {
    run.descendants()
        .find(|n| is_w_element(*n, "highlight"))
        .map(|n| w_attr(n, "val").unwrap_or("yellow").to_string())
}

fn scan_paragraphs(
    builder: &mut FindingBuilder,
    findings: &mut Vec<Finding>,
    story: &str,
    paragraphs: &[Node<'_, '_>],
) {
    for (index, paragraph) in paragraphs.iter().enumerate() {
        let mut text = String::new();
        let mut hits: Vec<(usize, usize, String)> = Vec::new();
        for node in paragraph.descendants() {
            if !is_w_element(node, "r") {
                continue;
            }
            let start = text.len();
            let fragment = run_text(node);
            text.push_str(&fragment);
            if fragment.is_empty() {
                continue;
            }
            if let Some(color) = highlight_color(node) {
                hits.push((start, text.len(), color));
            }
        }
        for (start, end, color) in hits {
            let mut details = Map::new();
            details.insert("highlight_color".into(), Value::String(color));
            builder.push(
                findings,
                FindingKind::Highlight,
                Severity::Warning,
                Location::at(story, index),
                Context::around(&text, start, end),
                details,
            );
        }
    }
}

fn scan_part(
    package: &DocxPackage,
    builder: &mut FindingBuilder,
    findings: &mut Vec<Finding>,
    story: &str,
    part: &str,
) -> Result<(), lawdocx_docx::DocxError> {
    let Some(text) = optional_part_str(package, part)? else {
        return Ok(());
    };
    let doc = parse_part(part, text)?;
    let paragraphs = xml::paragraphs(doc.root_element());
    scan_paragraphs(builder, findings, story, &paragraphs);
    Ok(())
}

fn scan_notes(
    package: &DocxPackage,
    builder: &mut FindingBuilder,
    findings: &mut Vec<Finding>,
    part: &str,
    tag: &str,
) -> Result<(), lawdocx_docx::DocxError> {
    let Some(text) = optional_part_str(package, part)? else {
        return Ok(());
    };
    let doc = parse_part(part, text)?;
    for node in doc
        .root_element()
        .descendants()
        .filter(|n| is_w_element(*n, tag))
    {
        let Some(id) = xml::note_id(node) else {
            continue;
        };
        if id <= 0 {
            continue;
        }
        let key = if tag == "footnote" {
            StoryKey::Footnote { id }
        } else {
            StoryKey::Endnote { id }
        };
        let paragraphs = xml::paragraphs(node);
        scan_paragraphs(builder, findings, &key.to_string(), &paragraphs);
    }
    Ok(())
}

/// Highlighted runs carrying visible text, with their highlight color.
/// Parts are scanned independently; a malformed part becomes a localized
/// error finding without hiding the rest.
pub fn collect(package: &DocxPackage, builder: &mut FindingBuilder) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut body_failed = false;

    if let Err(error) = scan_part(package, builder, &mut findings, "body", "word/document.xml") {
        body_failed = true;
        findings.push(builder.error(
            FindingKind::Highlight,
            "body",
            format!("failed to read highlights: {error}"),
        ));
    }

    match lawdocx_docx::story::header_footer_parts(package) {
        Ok(parts) => {
            for (key, part) in parts {
                let story = key.to_string();
                if let Err(error) = scan_part(package, builder, &mut findings, &story, &part) {
                    findings.push(builder.error(
                        FindingKind::Highlight,
                        &story,
                        format!("failed to read highlights: {error}"),
                    ));
                }
            }
        }
        Err(error) => {
            if !body_failed {
                findings.push(builder.error(
                    FindingKind::Highlight,
                    "body",
                    format!("failed to read highlights: {error}"),
                ));
            }
        }
    }

    for (part, tag) in [
        ("word/footnotes.xml", "footnote"),
        ("word/endnotes.xml", "endnote"),
    ] {
        if let Err(error) = scan_notes(package, builder, &mut findings, part, tag) {
            findings.push(builder.error(
                FindingKind::Highlight,
                "body",
                format!("failed to read highlights: {error}"),
            ));
        }
    }
    findings
}
