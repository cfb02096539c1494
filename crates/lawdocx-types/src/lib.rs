//! Shared data model for lawdocx tool outputs.
//!
//! Every tool produces the same JSON envelope shape regardless of which
//! document substructure or pattern produced a finding, so downstream
//! consumers never have to inspect the original document.

pub mod envelope;
pub mod types;

pub use envelope::{
    build_envelope, filter_files_by_severity, summarize_severities, Envelope, SeverityTotals,
};
pub use types::{Context, FileResult, Finding, FindingKind, Location, Severity};
