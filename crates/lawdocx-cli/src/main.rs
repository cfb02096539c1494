//! lawdocx: scan DOCX documents for review artifacts.
//!
//! Each subcommand runs one tool pipeline and prints one JSON envelope
//! per line; `audit` nests every selected tool under a single envelope.

mod inputs;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lawdocx_engine::{audit_finding_count, run_audit, run_tool, ScanConfig, Tool};
use lawdocx_types::{Envelope, Severity};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lawdocx", version, about = "DOCX review-artifact scanner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Document properties and revision metadata
    Metadata(ScanArgs),
    /// Draft legends, firm footers, and page-number artifacts
    Boilerplate(ScanArgs),
    /// TODO/FIXME/NTD markers and bracketed placeholders
    Todos(ScanArgs),
    /// Footnote and endnote references with their note text
    Footnotes(ScanArgs),
    /// Tracked insertions, deletions, moves, and format changes
    Changes(ScanArgs),
    /// Review comments with threading and resolution state
    Comments(ScanArgs),
    /// Highlighted text runs
    Highlights(ScanArgs),
    /// Bracketed placeholder spans
    Brackets(ScanArgs),
    /// Manual numbering and heading structure issues
    Outline(ScanArgs),
    /// Defined-term casing inconsistencies
    Terms(ScanArgs),
    /// Run every tool (or a subset) and nest the results
    Audit(AuditArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Files, glob patterns, or `-` for stdin
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write envelopes here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit a single envelope carrying every file
    #[arg(long)]
    merge: bool,

    /// Drop findings below this severity
    #[arg(long, value_enum, default_value_t = SeverityArg::Info)]
    severity: SeverityArg,

    /// Exit non-zero when findings remain after filtering
    #[arg(long)]
    fail_on_findings: bool,

    /// Extra regex for the pattern tools (repeatable)
    #[arg(long = "pattern")]
    patterns: Vec<String>,
}

#[derive(Args)]
struct AuditArgs {
    #[command(flatten)]
    scan: ScanArgs,

    /// Run only these tools (comma-separated)
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Skip these tools (comma-separated)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(value: SeverityArg) -> Severity {
        match value {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

impl ScanArgs {
    fn config(&self) -> ScanConfig {
        ScanConfig {
            severity: self.severity.into(),
            merge: self.merge,
            extra_patterns: self.patterns.clone(),
        }
    }
}

fn write_envelopes(output: Option<&PathBuf>, envelopes: &[Envelope]) -> Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    for envelope in envelopes {
        let line = serde_json::to_string(envelope).context("failed to serialize envelope")?;
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

fn finding_count(envelopes: &[Envelope]) -> usize {
    envelopes
        .iter()
        .flat_map(|envelope| &envelope.files)
        .map(|file| file.items.len())
        .sum()
}

fn run_scan(tool: Tool, args: &ScanArgs) -> Result<bool> {
    let inputs = inputs::resolve_inputs(&args.inputs)?;
    let envelopes = run_tool(tool, &inputs, &args.config())?;
    write_envelopes(args.output.as_ref(), &envelopes)?;
    Ok(args.fail_on_findings && finding_count(&envelopes) > 0)
}

fn run_audit_command(args: &AuditArgs) -> Result<bool> {
    let inputs = inputs::resolve_inputs(&args.scan.inputs)?;
    let envelope = run_audit(&args.only, &args.exclude, &inputs, &args.scan.config())?;
    write_envelopes(args.scan.output.as_ref(), std::slice::from_ref(&envelope))?;
    Ok(args.scan.fail_on_findings && audit_finding_count(&envelope) > 0)
}

fn run(cli: Cli) -> Result<bool> {
    match &cli.command {
        Command::Metadata(args) => run_scan(Tool::Metadata, args),
        Command::Boilerplate(args) => run_scan(Tool::Boilerplate, args),
        Command::Todos(args) => run_scan(Tool::Todos, args),
        Command::Footnotes(args) => run_scan(Tool::Footnotes, args),
        Command::Changes(args) => run_scan(Tool::Changes, args),
        Command::Comments(args) => run_scan(Tool::Comments, args),
        Command::Highlights(args) => run_scan(Tool::Highlights, args),
        Command::Brackets(args) => run_scan(Tool::Brackets, args),
        Command::Outline(args) => run_scan(Tool::Outline, args),
        Command::Terms(args) => run_scan(Tool::Terms, args),
        Command::Audit(args) => run_audit_command(args),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::FAILURE,
        Ok(false) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("lawdocx: {error:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawdocx_types::FileResult;
    use pretty_assertions::assert_eq;

    #[test]
    fn severity_argument_maps_onto_the_data_model() {
        assert_eq!(Severity::from(SeverityArg::Warning), Severity::Warning);
        assert_eq!(Severity::from(SeverityArg::Error), Severity::Error);
    }

    #[test]
    fn finding_count_sums_across_envelopes_and_files() {
        let file = |items: usize| FileResult {
            path: "a.docx".into(),
            sha256: "00".into(),
            items: (0..items)
                .map(|_| lawdocx_types::Finding {
                    id: "id".into(),
                    kind: lawdocx_types::FindingKind::TodoMarker,
                    severity: Severity::Warning,
                    location: lawdocx_types::Location::at("body", 0),
                    context: lawdocx_types::Context::bare("x"),
                    details: serde_json::Map::new(),
                })
                .collect(),
        };
        let envelopes = vec![
            lawdocx_types::build_envelope("0.2.0", "lawdocx-todos", vec![file(2)], None),
            lawdocx_types::build_envelope("0.2.0", "lawdocx-todos", vec![file(1)], None),
        ];
        assert_eq!(finding_count(&envelopes), 3);
    }

    #[test]
    fn cli_parses_audit_tool_lists() {
        let cli = Cli::parse_from([
            "lawdocx",
            "audit",
            "--only",
            "comments,brackets",
            "--fail-on-findings",
            "a.docx",
        ]);
        let Command::Audit(args) = cli.command else {
            panic!("expected audit");
        };
        assert_eq!(args.only, vec!["comments", "brackets"]);
        assert!(args.scan.fail_on_findings);
        assert_eq!(args.scan.inputs, vec!["a.docx"]);
    }

    #[test]
    fn scan_writes_one_envelope_line_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("draft.docx");
        std::fs::write(
            &doc,
            lawdocx_docx::fixture::DocxFixture::new()
                .body_text("TODO: confirm the closing date")
                .build(),
        )
        .unwrap();
        let out = dir.path().join("out.jsonl");

        let args = ScanArgs {
            inputs: vec![doc.to_string_lossy().into_owned()],
            output: Some(out.clone()),
            merge: false,
            severity: SeverityArg::Info,
            fail_on_findings: true,
            patterns: Vec::new(),
        };
        let failed = run_scan(Tool::Todos, &args).unwrap();
        assert!(failed);

        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 1);
        let envelope: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(envelope["tool"], "lawdocx-todos");
        assert_eq!(envelope["files"][0]["items"][0]["type"], "todo_marker");
    }

    #[test]
    fn cli_parses_repeated_patterns() {
        let cli = Cli::parse_from([
            "lawdocx",
            "brackets",
            "--pattern",
            r"\{\{[^}]+\}\}",
            "--pattern",
            "<<[^>]+>>",
            "--merge",
            "a.docx",
        ]);
        let Command::Brackets(args) = cli.command else {
            panic!("expected brackets");
        };
        assert_eq!(args.patterns.len(), 2);
        assert!(args.merge);
    }
}
