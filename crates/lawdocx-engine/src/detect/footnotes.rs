//! Footnote and endnote inventory, anchored at the body reference marks.

use std::collections::HashMap;

use lawdocx_docx::story::load_notes;
use lawdocx_docx::xml::{self, is_w_element, optional_part_str, parse_part, w_attr};
use lawdocx_docx::DocxPackage;
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;

struct NoteRef {
    kind: FindingKind,
    note_type: &'static str,
    id: i64,
    start: usize,
    end: usize,
}

/// Note texts by id, degrading a malformed note part into a localized
/// error finding while the body references are still reported.
fn note_texts(
    package: &DocxPackage,
    builder: &FindingBuilder,
    findings: &mut Vec<Finding>,
    part: &str,
    tag: &str,
    kind: FindingKind,
) -> HashMap<i64, String> {
    match load_notes(package, part, tag) {
        Ok(notes) => notes
            .into_iter()
            .map(|note| (note.id, note.text()))
            .collect(),
        Err(error) => {
            findings.push(builder.error(
                kind,
                "body",
                format!("failed to read notes: {error}"),
            ));
            HashMap::new()
        }
    }
}

/// Every footnote and endnote reference in the body, in document order.
/// The body text is rebuilt with a `[FN n]` / `[EN n]` placeholder
/// spliced in at each reference mark so the context shows where the note
/// hangs off the sentence.
pub fn collect(package: &DocxPackage, builder: &mut FindingBuilder) -> Vec<Finding> {
    let mut findings = Vec::new();
    let footnotes = note_texts(
        package,
        builder,
        &mut findings,
        "word/footnotes.xml",
        "footnote",
        FindingKind::Footnote,
    );
    let endnotes = note_texts(
        package,
        builder,
        &mut findings,
        "word/endnotes.xml",
        "endnote",
        FindingKind::Endnote,
    );

    let body = match optional_part_str(package, "word/document.xml") {
        Ok(Some(body)) => body,
        Ok(None) => return findings,
        Err(error) => {
            findings.push(builder.error(
                FindingKind::Footnote,
                "body",
                format!("failed to read notes: {error}"),
            ));
            return findings;
        }
    };
    let doc = match parse_part("word/document.xml", body) {
        Ok(doc) => doc,
        Err(error) => {
            findings.push(builder.error(
                FindingKind::Footnote,
                "body",
                format!("failed to read notes: {error}"),
            ));
            return findings;
        }
    };

    for (index, paragraph) in xml::paragraphs(doc.root_element()).iter().enumerate() {
        let mut text = String::new();
        let mut refs = Vec::new();
        for node in paragraph.descendants() {
            if is_w_element(node, "t") || is_w_element(node, "delText") {
                if let Some(value) = node.text() {
                    text.push_str(value);
                }
                continue;
            }
            let (kind, note_type, tag) = if is_w_element(node, "footnoteReference") {
                (FindingKind::Footnote, "footnote", "FN")
            } else if is_w_element(node, "endnoteReference") {
                (FindingKind::Endnote, "endnote", "EN")
            } else {
                continue;
            };
            let Some(id) = w_attr(node, "id").and_then(|raw| raw.parse::<i64>().ok()) else {
                continue;
            };
            if id <= 0 {
                continue;
            }
            let start = text.len();
            text.push_str(&format!("[{tag} {id}]"));
            refs.push(NoteRef {
                kind,
                note_type,
                id,
                start,
                end: text.len(),
            });
        }

        for reference in refs {
            let note_text = match reference.kind {
                FindingKind::Footnote => footnotes.get(&reference.id),
                _ => endnotes.get(&reference.id),
            }
            .cloned()
            .unwrap_or_default();

            let mut details = Map::new();
            details.insert(
                "note_type".into(),
                Value::String(reference.note_type.to_string()),
            );
            details.insert("note_id".into(), Value::Number(reference.id.into()));
            details.insert("note_text".into(), Value::String(note_text.clone()));
            if note_text.trim().is_empty() {
                details.insert(
                    "status".into(),
                    Value::String("missing note text".to_string()),
                );
            }
            builder.push(
                &mut findings,
                reference.kind,
                Severity::Info,
                Location::at("body", index),
                Context::around(&text, reference.start, reference.end),
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
    fn footnote_reference_is_anchored_in_body_text() {
        let bytes = DocxFixture::new()
            .body_text_with_footnote_ref("As held in Smith v. Jones", 1, ", the rule applies.")
            .footnote(1, "123 F.3d 456 (9th Cir. 1997).")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.kind, FindingKind::Footnote);
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.location.story, "body");
        assert_eq!(finding.context.target, "[FN 1]");
        assert_eq!(finding.context.before, "As held in Smith v. Jones");
        assert_eq!(finding.details["note_type"], "footnote");
        assert_eq!(finding.details["note_id"], 1);
        assert_eq!(finding.details["note_text"], "123 F.3d 456 (9th Cir. 1997).");
        assert!(finding.details.get("status").is_none());
    }

    #[test]
    fn endnote_uses_en_placeholder() {
        let bytes = DocxFixture::new()
            .body_text_with_endnote_ref("See discussion", 2, " below.")
            .endnote(2, "Extended commentary.")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::Endnote);
        assert_eq!(findings[0].context.target, "[EN 2]");
        assert_eq!(findings[0].details["note_type"], "endnote");
    }

    #[test]
    fn dangling_reference_is_flagged_as_missing() {
        let bytes = DocxFixture::new()
            .body_text_with_footnote_ref("Cite", 9, " here.")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].details["note_text"], "");
        assert_eq!(findings[0].details["status"], "missing note text");
    }

    #[test]
    fn separator_references_are_ignored() {
        let bytes = DocxFixture::new()
            .body_text_with_footnote_ref("text", 0, " more")
            .build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn malformed_note_part_still_reports_references() {
        let bytes = DocxFixture::new()
            .body_text_with_footnote_ref("Cite", 3, " here.")
            .part("word/footnotes.xml", b"<w:footnotes broken")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Error);
        let reference = &findings[1];
        assert_eq!(reference.kind, FindingKind::Footnote);
        assert_eq!(reference.context.target, "[FN 3]");
        assert_eq!(reference.details["status"], "missing note text");
    }

    #[test]
    fn note_without_reference_yields_nothing() {
        let bytes = DocxFixture::new()
            .body_text("plain body")
            .footnote(5, "orphan note")
            .build();
        assert!(scan(&bytes).is_empty());
    }
}
