//! The audit orchestrator: every selected tool's pipeline over one input
//! set, nested under a single outer envelope with aggregate totals.

use lawdocx_types::{
    build_envelope, filter_files_by_severity, summarize_severities, Envelope, FileResult,
    SeverityTotals,
};
use tracing::debug;

use crate::config::ScanConfig;
use crate::envelope::{scan_file, InputFile, LAWDOCX_VERSION};
use crate::error::EngineError;
use crate::tool::select_tools;

/// Run the selected tools over every input and nest their envelopes.
/// Each tool scans independently from the same buffered bytes; the outer
/// envelope carries no files of its own, only `tools` in registry order
/// and totals summed after severity filtering.
pub fn run_audit(
    only: &[String],
    exclude: &[String],
    inputs: &[InputFile],
    config: &ScanConfig,
) -> Result<Envelope, EngineError> {
    let tools = select_tools(only, exclude)?;
    if inputs.is_empty() {
        return Err(EngineError::NoInputs);
    }
    let extra = config.compile_extra_patterns()?;

    let mut nested = Vec::with_capacity(tools.len());
    let mut totals = SeverityTotals::default();
    for tool in tools {
        let files: Vec<FileResult> = inputs
            .iter()
            .map(|input| scan_file(tool, input, &extra))
            .collect();
        let files = filter_files_by_severity(files, config.severity);
        totals.add(summarize_severities(&files));
        debug!(tool = tool.name(), files = files.len(), "audit tool finished");
        nested.push(build_envelope(LAWDOCX_VERSION, tool.tool_id(), files, None));
    }

    let mut outer = build_envelope(LAWDOCX_VERSION, "lawdocx-audit", Vec::new(), None);
    outer.tools = Some(nested);
    outer.totals = Some(totals);
    Ok(outer)
}

/// Count of findings at or above the configured threshold, for the
/// fail-on-findings exit decision.
pub fn audit_finding_count(envelope: &Envelope) -> usize {
    envelope.totals.map(|t| t.total()).unwrap_or(0)
}
