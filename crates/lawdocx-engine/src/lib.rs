//! Finding extraction and envelope normalization for DOCX scans.
//!
//! The engine turns one or more buffered documents into envelopes of
//! findings: it enumerates stories, tracks paragraph positions, runs the
//! closed set of detectors, deduplicates findings, and assembles file,
//! run, and audit envelopes with deterministic merge and severity-filter
//! semantics. Extraction failures after configuration time are converted
//! into error-severity findings so JSON output stays the single channel
//! of truth; only usage errors surface as [`EngineError`].

pub mod audit;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod detect;
pub mod envelope;
pub mod error;
pub mod tool;
pub mod tracker;

pub use audit::{audit_finding_count, run_audit};
pub use builder::FindingBuilder;
pub use config::ScanConfig;
pub use detect::Detector;
pub use envelope::{hash_bytes, run_tool, scan_file, InputFile, LAWDOCX_VERSION};
pub use error::EngineError;
pub use tool::{select_tools, Tool};
pub use tracker::StoryText;
