//! File and run envelope assembly: the tool pipelines the CLI calls.

use lawdocx_docx::DocxPackage;
use lawdocx_types::{
    build_envelope, filter_files_by_severity, Envelope, FileResult,
};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::builder::FindingBuilder;
use crate::config::ScanConfig;
use crate::detect::Detector;
use crate::error::EngineError;
use crate::tool::Tool;

/// Schema version stamped into every envelope.
pub const LAWDOCX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One buffered input: the display name used in output plus the raw
/// bytes, read fully before any scan starts.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Scan one file with one tool. The hash is computed over the raw bytes
/// unconditionally; an unreadable container becomes a single error
/// finding on a synthetic `body` story rather than a fault.
pub fn scan_file(tool: Tool, input: &InputFile, extra: &[Regex]) -> FileResult {
    let sha256 = hash_bytes(&input.bytes);
    let mut builder = FindingBuilder::new();

    let items = match DocxPackage::open(&input.bytes) {
        Ok(package) => Detector::for_tool(tool).scan(&package, &mut builder, extra),
        Err(error) => {
            debug!(path = %input.path, %error, "failed to open document");
            vec![builder.error(
                tool.error_kind(),
                "body",
                format!("failed to open document: {error}"),
            )]
        }
    };
    debug!(path = %input.path, tool = tool.name(), findings = items.len(), "scanned");

    FileResult {
        path: input.path.clone(),
        sha256,
        items,
    }
}

/// Run one tool over every input. Yields one envelope per file, or a
/// single envelope carrying every file when `config.merge` is set. The
/// severity filter is applied after assembly as a pure item subset.
pub fn run_tool(
    tool: Tool,
    inputs: &[InputFile],
    config: &ScanConfig,
) -> Result<Vec<Envelope>, EngineError> {
    if inputs.is_empty() {
        return Err(EngineError::NoInputs);
    }
    let extra = config.compile_extra_patterns()?;

    let files: Vec<FileResult> = inputs
        .iter()
        .map(|input| scan_file(tool, input, &extra))
        .collect();
    let files = filter_files_by_severity(files, config.severity);

    let envelopes = if config.merge {
        vec![build_envelope(LAWDOCX_VERSION, tool.tool_id(), files, None)]
    } else {
        files
            .into_iter()
            .map(|file| build_envelope(LAWDOCX_VERSION, tool.tool_id(), vec![file], None))
            .collect()
    };
    Ok(envelopes)
}
