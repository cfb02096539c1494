use thiserror::Error;

/// Usage-time faults. Everything that happens after configuration is
/// converted into error-severity findings instead, so the JSON output
/// remains the single channel of truth.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("no input files provided")]
    NoInputs,
}
