//! Tracked-change extraction: insertions, deletions, moves, and
//! formatting changes, with revision author and date where recorded.

use lawdocx_docx::xml::{self, is_w_element, optional_part_str, parse_part, w_attr};
use lawdocx_docx::{DocxPackage, StoryKey};
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use roxmltree::Node;
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;

struct ChangeSpan {
    kind: FindingKind,
    start: usize,
    end: usize,
    author: Option<String>,
    date: Option<String>,
    change_label: Option<&'static str>,
}

fn tracked_kind(name: &str) -> Option<FindingKind> {
    match name {
        "ins" => Some(FindingKind::Insertion),
        "del" => Some(FindingKind::Deletion),
        "moveFrom" => Some(FindingKind::MoveFrom),
        "moveTo" => Some(FindingKind::MoveTo),
        _ => None,
    }
}

/// Walk one paragraph, rebuilding its flattened text while recording the
/// byte spans covered by tracked-change containers. Text accumulation
/// must agree with `xml::paragraph_text` so offsets line up with story
/// paragraph indices.
fn walk(node: Node<'_, '_>, text: &mut String, spans: &mut Vec<ChangeSpan>) {
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        if is_w_element(child, "pPr") {
            continue;
        }
        if is_w_element(child, "t") || is_w_element(child, "delText") {
            if let Some(value) = child.text() {
                text.push_str(value);
            }
            continue;
        }
        let name = child.tag_name().name();
        if let Some(kind) = tracked_kind(name) {
            if child.tag_name().namespace() == Some(xml::WORD_NS) {
                let start = text.len();
                walk(child, text, spans);
                spans.push(ChangeSpan {
                    kind,
                    start,
                    end: text.len(),
                    author: w_attr(child, "author").map(str::to_string),
                    date: w_attr(child, "date").map(str::to_string),
                    change_label: None,
                });
                continue;
            }
        }
        if is_w_element(child, "r") {
            let run_change = child
                .descendants()
                .find(|n| is_w_element(*n, "rPrChange"));
            let start = text.len();
            walk(child, text, spans);
            if let Some(change) = run_change {
                spans.push(ChangeSpan {
                    kind: FindingKind::FormatChange,
                    start,
                    end: text.len(),
                    author: w_attr(change, "author").map(str::to_string),
                    date: w_attr(change, "date").map(str::to_string),
                    change_label: Some("run_formatting"),
                });
            }
            continue;
        }
        walk(child, text, spans);
    }
}

fn push_span(
    builder: &mut FindingBuilder,
    findings: &mut Vec<Finding>,
    story: &str,
    index: usize,
    paragraph: &str,
    span: &ChangeSpan,
) {
    let mut details = Map::new();
    let changed = paragraph[span.start..span.end].to_string();
    match span.kind {
        FindingKind::Insertion | FindingKind::MoveTo => {
            details.insert("inserted_text".into(), Value::String(changed));
        }
        FindingKind::Deletion | FindingKind::MoveFrom => {
            details.insert("deleted_text".into(), Value::String(changed));
        }
        _ => {
            let label = span.change_label.unwrap_or("run_formatting");
            details.insert("change".into(), Value::String(label.to_string()));
        }
    }
    if let Some(author) = &span.author {
        details.insert("author".into(), Value::String(author.clone()));
    }
    if let Some(date) = &span.date {
        details.insert("date".into(), Value::String(date.clone()));
    }
    builder.push(
        findings,
        span.kind,
        Severity::Warning,
        Location::at(story, index),
        Context::around(paragraph, span.start, span.end),
        details,
    );
}

fn scan_paragraphs(
    builder: &mut FindingBuilder,
    findings: &mut Vec<Finding>,
    story: &str,
    paragraphs: &[Node<'_, '_>],
) {
    for (index, paragraph) in paragraphs.iter().enumerate() {
        let mut text = String::new();
        let mut spans = Vec::new();
        walk(*paragraph, &mut text, &mut spans);

        // Paragraph-mark property changes cover the whole paragraph.
        if let Some(change) = paragraph
            .descendants()
            .find(|n| is_w_element(*n, "pPrChange"))
        {
            spans.push(ChangeSpan {
                kind: FindingKind::FormatChange,
                start: 0,
                end: text.len(),
                author: w_attr(change, "author").map(str::to_string),
                date: w_attr(change, "date").map(str::to_string),
                change_label: Some("paragraph_formatting"),
            });
        }

        spans.sort_by_key(|span| (span.start, span.end));
        for span in &spans {
            push_span(builder, findings, story, index, &text, span);
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

/// Tracked changes across every text story. Each part is scanned
/// independently; a malformed part becomes a localized error finding and
/// the remaining parts still contribute.
pub fn collect(package: &DocxPackage, builder: &mut FindingBuilder) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut body_failed = false;

    if let Err(error) = scan_part(package, builder, &mut findings, "body", "word/document.xml") {
        body_failed = true;
        findings.push(builder.error(
            FindingKind::Insertion,
            "body",
            format!("failed to read tracked changes: {error}"),
        ));
    }

    match lawdocx_docx::story::header_footer_parts(package) {
        Ok(parts) => {
            for (key, part) in parts {
                let story = key.to_string();
                if let Err(error) = scan_part(package, builder, &mut findings, &story, &part) {
                    findings.push(builder.error(
                        FindingKind::Insertion,
                        &story,
                        format!("failed to read tracked changes: {error}"),
                    ));
                }
            }
        }
        // Enumeration reads document.xml; a body failure already covers it.
        Err(error) => {
            if !body_failed {
                findings.push(builder.error(
                    FindingKind::Insertion,
                    "body",
                    format!("failed to read tracked changes: {error}"),
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
                FindingKind::Insertion,
                "body",
                format!("failed to read tracked changes: {error}"),
            ));
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
    fn insertion_records_text_author_and_date() {
        let bytes = DocxFixture::new()
            .body_insertion(
                "The price is ",
                "ten million dollars",
                ".",
                "A. Reviewer",
                "2024-03-01T10:00:00Z",
            )
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.kind, FindingKind::Insertion);
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.details["inserted_text"], "ten million dollars");
        assert_eq!(finding.details["author"], "A. Reviewer");
        assert_eq!(finding.details["date"], "2024-03-01T10:00:00Z");
        assert_eq!(finding.context.before, "The price is ");
        assert_eq!(finding.context.target, "ten million dollars");
        assert_eq!(finding.context.after, ".");
    }

    #[test]
    fn deletion_keeps_deleted_text_in_context() {
        let bytes = DocxFixture::new()
            .body_deletion("Keep this ", "remove this", " too", "B", "2024-01-01T00:00:00Z")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::Deletion);
        assert_eq!(findings[0].details["deleted_text"], "remove this");
        assert_eq!(findings[0].context.target, "remove this");
    }

    #[test]
    fn clean_document_has_no_change_findings() {
        let bytes = DocxFixture::new().body_text("No revisions here.").build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn run_format_change_is_reported() {
        let xml = concat!(
            "<w:p><w:r><w:rPr><w:rPrChange w:id=\"9\" w:author=\"C\" ",
            "w:date=\"2024-02-02T00:00:00Z\"><w:rPr/></w:rPrChange></w:rPr>",
            "<w:t>reformatted words</w:t></w:r></w:p>",
        );
        let bytes = DocxFixture::new().body_paragraph_xml(xml).build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.kind, FindingKind::FormatChange);
        assert_eq!(finding.details["change"], "run_formatting");
        assert_eq!(finding.details["author"], "C");
        assert_eq!(finding.context.target, "reformatted words");
    }

    #[test]
    fn paragraph_format_change_spans_whole_paragraph() {
        let xml = concat!(
            "<w:p><w:pPr><w:pPrChange w:id=\"4\" w:author=\"D\" ",
            "w:date=\"2024-02-03T00:00:00Z\"><w:pPr/></w:pPrChange></w:pPr>",
            "<w:r><w:t>whole paragraph restyled</w:t></w:r></w:p>",
        );
        let bytes = DocxFixture::new().body_paragraph_xml(xml).build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].details["change"], "paragraph_formatting");
        assert_eq!(findings[0].context.target, "whole paragraph restyled");
    }

    #[test]
    fn moves_map_to_move_from_and_move_to() {
        let xml = concat!(
            "<w:p><w:moveFrom w:id=\"1\" w:author=\"E\">",
            "<w:r><w:t>moved clause</w:t></w:r></w:moveFrom></w:p>",
        );
        let xml_to = concat!(
            "<w:p><w:moveTo w:id=\"2\" w:author=\"E\">",
            "<w:r><w:t>moved clause</w:t></w:r></w:moveTo></w:p>",
        );
        let bytes = DocxFixture::new()
            .body_paragraph_xml(xml)
            .body_paragraph_xml(xml_to)
            .build();
        let findings = scan(&bytes);

        let kinds: Vec<FindingKind> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::MoveFrom, FindingKind::MoveTo]);
        assert_eq!(findings[0].details["deleted_text"], "moved clause");
        assert_eq!(findings[1].details["inserted_text"], "moved clause");
    }

    #[test]
    fn malformed_footnotes_keep_body_changes() {
        let bytes = DocxFixture::new()
            .body_insertion("The fee is ", "waived", ".", "G", "2024-04-01T00:00:00Z")
            .part("word/footnotes.xml", b"<w:footnotes broken")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, FindingKind::Insertion);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].details["inserted_text"], "waived");
        assert_eq!(findings[1].severity, Severity::Error);
    }

    #[test]
    fn changes_inside_footnotes_use_the_note_story() {
        let note_xml = concat!(
            "<w:p><w:ins w:id=\"3\" w:author=\"F\">",
            "<w:r><w:t>note edit</w:t></w:r></w:ins></w:p>",
        );
        let bytes = DocxFixture::new()
            .body_text("body")
            .footnote_paragraph_xml(5, note_xml)
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location.story, "footnote--5");
        assert_eq!(findings[0].kind, FindingKind::Insertion);
    }
}
