//! Canonical finding construction: run-unique ids and per-file
//! deduplication.

use std::collections::HashSet;

use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use serde_json::{Map, Value};
use uuid::Uuid;

type DedupKey = (String, usize, usize, FindingKind, String);

/// Builds findings for one file's scan. The dedup key is
/// `(story, paragraph range, type, target)`: a hit whose key was already
/// emitted for this file is suppressed, never repeated.
#[derive(Default)]
pub struct FindingBuilder {
    seen: HashSet<DedupKey>,
}

impl FindingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short random identifier, unique within a run but carrying no
    /// cross-run meaning.
    fn new_id() -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        id
    }

    /// Emit a finding unless an identical one (by dedup key) was already
    /// emitted for this file.
    pub fn push(
        &mut self,
        findings: &mut Vec<Finding>,
        kind: FindingKind,
        severity: Severity,
        location: Location,
        context: Context,
        details: Map<String, Value>,
    ) {
        let key = (
            location.story.clone(),
            location.paragraph_index_start,
            location.paragraph_index_end,
            kind,
            context.target.clone(),
        );
        if !self.seen.insert(key) {
            return;
        }
        findings.push(Finding {
            id: Self::new_id(),
            kind,
            severity,
            location,
            context,
            details,
        });
    }

    /// An error-severity finding describing a degraded extraction.
    /// Errors are converted faults, not detected artifacts, so they
    /// bypass deduplication.
    pub fn error(&self, kind: FindingKind, story: &str, message: String) -> Finding {
        let mut details = Map::new();
        details.insert("category".into(), Value::String("error".into()));
        details.insert("message".into(), Value::String(message));
        Finding {
            id: Self::new_id(),
            kind,
            severity: Severity::Error,
            location: Location::at(story, 0),
            context: Context::default(),
            details,
        }
    }
}
