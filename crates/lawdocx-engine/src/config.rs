use lawdocx_types::Severity;
use regex::Regex;

use crate::error::EngineError;

/// Per-run configuration shared by every tool pipeline.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Minimum severity retained in envelopes.
    pub severity: Severity,
    /// One envelope for all files (true) or one envelope per file (false).
    pub merge: bool,
    /// Extra regex patterns for the pattern tools (brackets, todos,
    /// boilerplate). Validated at configuration time.
    pub extra_patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Info,
            merge: false,
            extra_patterns: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Compile `extra_patterns`, deduplicated in first-seen order. An
    /// invalid pattern is a usage error, surfaced before any scan starts.
    pub fn compile_extra_patterns(&self) -> Result<Vec<Regex>, EngineError> {
        let mut seen = Vec::new();
        let mut compiled = Vec::new();
        for pattern in &self.extra_patterns {
            if seen.contains(pattern) {
                continue;
            }
            seen.push(pattern.clone());
            let regex = Regex::new(pattern).map_err(|source| EngineError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            compiled.push(regex);
        }
        Ok(compiled)
    }
}
