//! Static pattern catalogs for the boilerplate and todo tools.
//!
//! Immutable configuration data injected into pattern detectors at
//! construction; extra user patterns are appended per run, never here.

use lazy_static::lazy_static;
use regex::Regex;

const BOILERPLATE: &[&str] = &[
    // Draft / watermark legends (case-insensitive)
    r"(?i)drafts?.*?(only|purposes|—|$)",
    r"(?i)for discussion.*?(only|purposes)?",
    r"(?i)confidential.*?(draft|discussion)",
    r"(?i)internal.*?(use|only)",
    r"(?i)privileged.*?(confidential|attorney)",
    r"(?i)attorney.*?(work product|client privilege)",
    r"(?i)not for distribution",
    r"(?i)working copy",
    r"(?i)review copy",
    r"(?i)execution.*?(version|copy).*?(draft|missing)",
    r"(?i)draft.*?execution",
    r"(?i)subject to.*?approval",
    // Law-firm footers / legends
    r"©?\s*\d{4}\s+[-&'\w\s]+(?:LLP|PC|LLC|P\.A\.?|L\.L\.P\.?)",
    r"Prepared by\s+[-&\w\s]+(?:LLP|PC|Law)",
    r"Confidential\s*[-–—]\s*[-&\w\s]+(?:LLP|LLC|PC)",
    r"©?\s*All Rights Reserved\s*[-&\w\s]+(?:LLP|PC)",
    r"(?i)privileged and confidential",
    r"(?i)attorney[- ]client privilege",
    // Page numbering artifacts
    r"Page\s+\d+\s+of\s+\d+",
    r"Page\s+\d+\s*/\s*\d+",
    r"\d+\s+of\s+\d+",
    r"‹#›|\{#\}|<Page>|\{ PAGE \}|\{ NUMPAGES \}",
    r"-\s*\d+\s*-",
    r"(?i)page\s*\d+",
    // Placeholder dates
    r"\[\s*Date\s*\]",
    r"\[?\s*_{5,}\s*\]?",
    r"As of\s*_{3,}|As of\s*,?\s*\d{4}",
    r"Dated\s*[:–]?\s*_{3,}",
    r"\d{4}\s*-\s*\d{2}\s*-\s*\d{2}\s*Draft",
    r"(?i)as of\s+<date>",
    // File-path / temporary artifacts
    r"[A-Z]:\\.+\\.docx?",
    r"/Users/.+/",
    r"~\$",
];

const TODO: &[&str] = &[
    r"\bTODO\b",
    r"\bFIXME\b",
    r"\bNTD\b",
    r"\bTBD\b",
    r"\bTBC\b",
    r"\bTBA\b",
    r"\bCHECK\b",
    r"\bREVIEW\b",
    r"\bREVISIT\b",
    r"\bCONFIRM\b",
    r"\bVERIFY\b",
    r"\bINSERT\b",
    r"\bDELETE\b",
    r"\bREPLACE\b",
    r"\bREWORD\b",
    r"\bUPDATE\b",
    r"\[\s*\?\s*\]",
    r"\[\s*NTD\s*\]",
    r"\[\s*TODO\s*\]",
    r"\[\s*TBD\s*\]",
    r"\[\s*CHECK\s*\]",
    r"\[\s*REVIEW\s*\]",
    r"\[\s*DISCUSS\s*\]",
    r"\[\s*to be (confirmed|discussed|updated|inserted|deleted|reviewed)\s*\]",
    r"\[\s*client to confirm\s*\]",
    r"\[\s*confirm with client\s*\]",
    r"\[\s*insert (date|amount|name|governing law)\s*\]",
    r"\[\s*delete if not applicable\s*\]",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).expect("static catalog pattern"))
        .collect()
}

lazy_static! {
    pub static ref BOILERPLATE_PATTERNS: Vec<Regex> = compile(BOILERPLATE);
    pub static ref TODO_PATTERNS: Vec<Regex> = compile(TODO);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_compile() {
        assert_eq!(BOILERPLATE_PATTERNS.len(), BOILERPLATE.len());
        assert_eq!(TODO_PATTERNS.len(), TODO.len());
    }

    #[test]
    fn draft_legend_matches() {
        let text = "DRAFT — Privileged & Confidential";
        assert!(BOILERPLATE_PATTERNS.iter().any(|p| p.is_match(text)));
    }

    #[test]
    fn todo_markers_are_word_bounded() {
        assert!(TODO_PATTERNS.iter().any(|p| p.is_match("TODO: fix dates")));
        assert!(!TODO_PATTERNS.iter().any(|p| p.is_match("mastodont")));
    }
}
