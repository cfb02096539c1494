//! Defined-term consistency: terms introduced as `("Term")` must keep
//! the definition's casing everywhere else in the body.

use lawdocx_docx::story::part_paragraphs;
use lawdocx_docx::DocxPackage;
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;
use crate::tracker::StoryText;

lazy_static! {
    // ("Purchase Price"), (the "Closing Date"), with straight or curly
    // quotes. The captured phrase must start with a capital letter.
    static ref DEFINITION: Regex = Regex::new(
        r#"\((?:the\s+)?["\x{201C}]([A-Z][^"\x{201C}\x{201D}]{0,80})["\x{201D}]\)"#
    )
    .expect("static definition pattern");
}

struct DefinedTerm {
    term: String,
    definition_end: usize,
}

fn defined_terms(text: &str) -> Vec<DefinedTerm> {
    let mut terms = Vec::new();
    for captures in DEFINITION.captures_iter(text) {
        let Some(group) = captures.get(1) else {
            continue;
        };
        let end = captures.get(0).map(|m| m.end()).unwrap_or(group.end());
        if terms
            .iter()
            .any(|existing: &DefinedTerm| existing.term == group.as_str())
        {
            continue;
        }
        terms.push(DefinedTerm {
            term: group.as_str().to_string(),
            definition_end: end,
        });
    }
    terms
}

/// Occurrences of a defined term, after its defining parenthetical,
/// whose casing differs from the definition. Text before the definition
/// is exempt since the term is not yet defined there.
pub fn collect(package: &DocxPackage, builder: &mut FindingBuilder) -> Vec<Finding> {
    let paragraphs = match part_paragraphs(package, "word/document.xml") {
        Ok(paragraphs) => paragraphs,
        Err(error) => {
            return vec![builder.error(
                FindingKind::TermInconsistency,
                "body",
                format!("failed to read body text: {error}"),
            )]
        }
    };

    let tracker = StoryText::new(&paragraphs);
    let text = tracker.text();
    let mut findings = Vec::new();

    for defined in defined_terms(text) {
        let pattern = match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&defined.term))) {
            Ok(pattern) => pattern,
            Err(_) => continue,
        };
        for m in pattern.find_iter(text) {
            if m.start() < defined.definition_end {
                continue;
            }
            if m.as_str() == defined.term {
                continue;
            }
            let (para_start, para_end) = tracker.paragraph_range(m.start(), m.end());
            let mut details = Map::new();
            details.insert("term".into(), Value::String(defined.term.clone()));
            details.insert("variant".into(), Value::String(m.as_str().to_string()));
            builder.push(
                &mut findings,
                FindingKind::TermInconsistency,
                Severity::Info,
                Location::new("body", para_start, para_end),
                Context::around(text, m.start(), m.end()),
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
    fn casing_drift_is_reported() {
        let bytes = DocxFixture::new()
            .body_text("The price payable (the \"Purchase Price\") is fixed.")
            .body_text("Payment of the purchase price falls due at closing.")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.kind, FindingKind::TermInconsistency);
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(finding.details["term"], "Purchase Price");
        assert_eq!(finding.details["variant"], "purchase price");
        assert_eq!(finding.location.paragraph_index_start, 1);
    }

    #[test]
    fn exact_casing_raises_nothing() {
        let bytes = DocxFixture::new()
            .body_text("The closing (the \"Closing\") happens on the Closing Date.")
            .body_text("At the Closing, the parties exchange documents.")
            .build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn defining_parenthetical_is_not_its_own_violation() {
        let bytes = DocxFixture::new()
            .body_text("This deed (the \"Deed\") binds the parties.")
            .build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn curly_quoted_definitions_are_recognized() {
        let bytes = DocxFixture::new()
            .body_text("The seller (\u{201c}Seller\u{201d}) agrees to sell.")
            .body_text("the seller delivers the goods.")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].details["term"], "Seller");
        assert_eq!(findings[0].details["variant"], "seller");
    }

    #[test]
    fn lowercase_parentheticals_are_not_definitions() {
        let bytes = DocxFixture::new()
            .body_text("The goods (\"as described above\") are sold as-is.")
            .body_text("AS DESCRIBED ABOVE, nothing else applies.")
            .build();
        assert!(scan(&bytes).is_empty());
    }
}
