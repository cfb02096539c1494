//! The top-level JSON wrapper carrying run metadata and file results.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FileResult, Severity};

/// Per-severity finding counts, used for audit aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityTotals {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
}

impl SeverityTotals {
    pub fn add(&mut self, other: SeverityTotals) {
        self.info += other.info;
        self.warning += other.warning;
        self.error += other.error;
    }

    pub fn count(&mut self, severity: Severity) {
        match severity {
            Severity::Info => self.info += 1,
            Severity::Warning => self.warning += 1,
            Severity::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.info + self.warning + self.error
    }
}

/// Standard lawdocx envelope. Audit runs additionally carry `tools` (one
/// nested envelope per orchestrated tool) and aggregate `totals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub lawdocx_version: String,
    pub tool: String,
    pub generated_at: String,
    pub files: Vec<FileResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Envelope>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<SeverityTotals>,
}

/// ISO 8601 UTC timestamp suitable for envelopes and logs.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Construct a standard envelope for tool outputs.
pub fn build_envelope(
    version: &str,
    tool: &str,
    files: Vec<FileResult>,
    generated_at: Option<String>,
) -> Envelope {
    Envelope {
        lawdocx_version: version.to_string(),
        tool: tool.to_string(),
        generated_at: generated_at.unwrap_or_else(utc_timestamp),
        files,
        tools: None,
        totals: None,
    }
}

/// Return file entries containing only findings at or above `minimum`
/// severity. A pure subset: no finding is altered, file identity is kept
/// even when `items` becomes empty.
pub fn filter_files_by_severity(files: Vec<FileResult>, minimum: Severity) -> Vec<FileResult> {
    let threshold = minimum.rank();
    files
        .into_iter()
        .map(|mut entry| {
            entry.items.retain(|item| item.severity.rank() >= threshold);
            entry
        })
        .collect()
}

/// Count findings by severity across file entries.
pub fn summarize_severities(files: &[FileResult]) -> SeverityTotals {
    let mut totals = SeverityTotals::default();
    for entry in files {
        for item in &entry.items {
            totals.count(item.severity);
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Context, Finding, FindingKind, Location};
    use proptest::prelude::*;
    use serde_json::Map;

    fn finding(severity: Severity) -> Finding {
        Finding {
            id: "deadbeef".into(),
            kind: FindingKind::Boilerplate,
            severity,
            location: Location::at("body", 0),
            context: Context::bare("x"),
            details: Map::new(),
        }
    }

    fn file_with(severities: &[Severity]) -> FileResult {
        FileResult {
            path: "a.docx".into(),
            sha256: "00".into(),
            items: severities.iter().map(|s| finding(*s)).collect(),
        }
    }

    #[test]
    fn filter_keeps_file_identity_when_items_empty() {
        let files = vec![file_with(&[Severity::Info])];
        let filtered = filter_files_by_severity(files, Severity::Error);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, "a.docx");
        assert_eq!(filtered[0].sha256, "00");
        assert!(filtered[0].items.is_empty());
    }

    #[test]
    fn summarize_counts_by_severity() {
        let files = vec![
            file_with(&[Severity::Info, Severity::Warning]),
            file_with(&[Severity::Error, Severity::Warning]),
        ];
        let totals = summarize_severities(&files);
        assert_eq!(totals.info, 1);
        assert_eq!(totals.warning, 2);
        assert_eq!(totals.error, 1);
        assert_eq!(totals.total(), 4);
    }

    #[test]
    fn envelope_omits_audit_fields_when_absent() {
        let envelope = build_envelope("0.2.0", "lawdocx-todos", vec![], None);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("totals").is_none());
        assert_eq!(json["tool"], "lawdocx-todos");
    }

    proptest! {
        #[test]
        fn filter_is_a_pure_subset(
            severities in proptest::collection::vec(
                prop_oneof![
                    Just(Severity::Info),
                    Just(Severity::Warning),
                    Just(Severity::Error)
                ],
                0..20,
            ),
            minimum in prop_oneof![
                Just(Severity::Info),
                Just(Severity::Warning),
                Just(Severity::Error)
            ],
        ) {
            let original = file_with(&severities);
            let filtered =
                filter_files_by_severity(vec![original.clone()], minimum);
            // Every surviving item appears unchanged in the original.
            for item in &filtered[0].items {
                prop_assert!(original.items.contains(item));
            }
            prop_assert!(filtered[0].items.len() <= original.items.len());
        }
    }
}
