//! Document metadata inventory: core, extended, and custom properties
//! plus any retained revision-log parts, each surfaced as a finding on
//! the synthetic metadata story.

use lawdocx_docx::properties::{
    custom_properties, flat_properties, revision_parts, CORE_PART, EXTENDED_PART,
};
use lawdocx_docx::DocxPackage;
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;

const STORY: &str = "metadata";

fn push_property(
    builder: &mut FindingBuilder,
    findings: &mut Vec<Finding>,
    category: &str,
    name: &str,
    value: &str,
    datatype: Option<&str>,
) {
    let mut details = Map::new();
    details.insert("name".into(), Value::String(name.to_string()));
    details.insert("category".into(), Value::String(category.to_string()));
    details.insert("raw_value".into(), Value::String(value.to_string()));
    if let Some(datatype) = datatype {
        details.insert("datatype".into(), Value::String(datatype.to_string()));
    }
    builder.push(
        findings,
        FindingKind::Metadata,
        Severity::Info,
        Location::at(STORY, 0),
        Context::bare(value),
        details,
    );
}

/// Every document property with a non-empty value. A property part that
/// cannot be parsed degrades into a localized error finding while the
/// remaining parts are still scanned.
pub fn collect(package: &DocxPackage, builder: &mut FindingBuilder) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (category, part) in [("core", CORE_PART), ("extended", EXTENDED_PART)] {
        match flat_properties(package, part) {
            Ok(properties) => {
                for (name, value) in properties {
                    if value.trim().is_empty() {
                        continue;
                    }
                    push_property(builder, &mut findings, category, &name, &value, None);
                }
            }
            Err(error) => findings.push(builder.error(
                FindingKind::Metadata,
                STORY,
                format!("failed to read {part}: {error}"),
            )),
        }
    }

    match custom_properties(package) {
        Ok(properties) => {
            for property in properties {
                if property.value.trim().is_empty() {
                    continue;
                }
                push_property(
                    builder,
                    &mut findings,
                    "custom",
                    &property.name,
                    &property.value,
                    property.datatype.as_deref(),
                );
            }
        }
        Err(error) => findings.push(builder.error(
            FindingKind::Metadata,
            STORY,
            format!("failed to read custom properties: {error}"),
        )),
    }

    for (name, raw) in revision_parts(package) {
        push_property(builder, &mut findings, "revision", &name, &raw, Some("xml"));
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
    fn core_and_extended_properties_become_findings() {
        let bytes = DocxFixture::new()
            .body_text("x")
            .core_property("creator", "A. Lawyer")
            .core_property("lastModifiedBy", "Opposing Counsel")
            .extended_property("Company", "Example LLP")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 3);
        assert!(findings.iter().all(|f| f.kind == FindingKind::Metadata));
        assert!(findings.iter().all(|f| f.severity == Severity::Info));
        assert!(findings.iter().all(|f| f.location.story == "metadata"));

        let creator = findings
            .iter()
            .find(|f| f.details["name"] == "creator")
            .unwrap();
        assert_eq!(creator.details["category"], "core");
        assert_eq!(creator.details["raw_value"], "A. Lawyer");
        assert_eq!(creator.context.target, "A. Lawyer");

        let company = findings
            .iter()
            .find(|f| f.details["name"] == "Company")
            .unwrap();
        assert_eq!(company.details["category"], "extended");
    }

    #[test]
    fn custom_properties_keep_their_datatype() {
        let bytes = DocxFixture::new()
            .body_text("x")
            .custom_property("MatterNumber", "2024-0042", "lpwstr")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].details["category"], "custom");
        assert_eq!(findings[0].details["datatype"], "lpwstr");
    }

    #[test]
    fn empty_values_are_skipped() {
        let bytes = DocxFixture::new()
            .body_text("x")
            .core_property("subject", "")
            .core_property("title", "  ")
            .build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn document_without_properties_is_clean() {
        let bytes = DocxFixture::new().body_text("x").build();
        assert!(scan(&bytes).is_empty());
    }

    #[test]
    fn revision_parts_surface_with_xml_datatype() {
        let bytes = DocxFixture::new()
            .body_text("x")
            .part("word/revisionLog.xml", b"<w:revisions/>")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].details["category"], "revision");
        assert_eq!(findings[0].details["datatype"], "xml");
    }

    #[test]
    fn broken_core_part_degrades_but_custom_still_scans() {
        let bytes = DocxFixture::new()
            .body_text("x")
            .custom_property("MatterNumber", "42", "lpwstr")
            .part("docProps/core.xml", b"<cp:coreProperties truncated")
            .build();
        let findings = scan(&bytes);

        assert_eq!(findings.len(), 2);
        assert!(findings
            .iter()
            .any(|f| f.severity == Severity::Error && f.details["category"] == "error"));
        assert!(findings
            .iter()
            .any(|f| f.details.get("name").is_some_and(|v| v == "MatterNumber")));
    }
}
