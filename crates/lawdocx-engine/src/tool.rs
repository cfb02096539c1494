//! The closed tool registry and audit tool selection.

use lawdocx_types::FindingKind;

use crate::error::EngineError;

/// One analyzer pipeline. The set is closed and versioned with the
/// output schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Metadata,
    Boilerplate,
    Todos,
    Footnotes,
    Changes,
    Comments,
    Highlights,
    Brackets,
    Outline,
    Terms,
}

impl Tool {
    /// Every tool, in audit execution order.
    pub const ALL: [Tool; 10] = [
        Tool::Metadata,
        Tool::Boilerplate,
        Tool::Todos,
        Tool::Footnotes,
        Tool::Changes,
        Tool::Comments,
        Tool::Highlights,
        Tool::Brackets,
        Tool::Outline,
        Tool::Terms,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Metadata => "metadata",
            Tool::Boilerplate => "boilerplate",
            Tool::Todos => "todos",
            Tool::Footnotes => "footnotes",
            Tool::Changes => "changes",
            Tool::Comments => "comments",
            Tool::Highlights => "highlights",
            Tool::Brackets => "brackets",
            Tool::Outline => "outline",
            Tool::Terms => "terms",
        }
    }

    /// Tool identifier used in envelope JSON, e.g. `lawdocx-comments`.
    pub fn tool_id(self) -> &'static str {
        match self {
            Tool::Metadata => "lawdocx-metadata",
            Tool::Boilerplate => "lawdocx-boilerplate",
            Tool::Todos => "lawdocx-todos",
            Tool::Footnotes => "lawdocx-footnotes",
            Tool::Changes => "lawdocx-changes",
            Tool::Comments => "lawdocx-comments",
            Tool::Highlights => "lawdocx-highlights",
            Tool::Brackets => "lawdocx-brackets",
            Tool::Outline => "lawdocx-outline",
            Tool::Terms => "lawdocx-terms",
        }
    }

    pub fn parse(name: &str) -> Result<Tool, EngineError> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| EngineError::UnknownTool(name.to_string()))
    }

    /// Finding kind used when a whole-file or whole-part failure must be
    /// reported as data.
    pub fn error_kind(self) -> FindingKind {
        match self {
            Tool::Metadata => FindingKind::Metadata,
            Tool::Boilerplate => FindingKind::Boilerplate,
            Tool::Todos => FindingKind::TodoMarker,
            Tool::Footnotes => FindingKind::Footnote,
            Tool::Changes => FindingKind::Insertion,
            Tool::Comments => FindingKind::Comment,
            Tool::Highlights => FindingKind::Highlight,
            Tool::Brackets => FindingKind::Bracket,
            Tool::Outline => FindingKind::ManualNumbering,
            Tool::Terms => FindingKind::TermInconsistency,
        }
    }
}

/// Resolve an audit tool subset from inclusion and exclusion lists.
/// Inclusion wins when a tool appears in both; unknown names are usage
/// errors, never silent no-ops. The result preserves registry order.
pub fn select_tools(only: &[String], exclude: &[String]) -> Result<Vec<Tool>, EngineError> {
    let only: Vec<Tool> = only
        .iter()
        .map(|name| Tool::parse(name))
        .collect::<Result<_, _>>()?;
    let exclude: Vec<Tool> = exclude
        .iter()
        .map(|name| Tool::parse(name))
        .collect::<Result<_, _>>()?;

    let selected = Tool::ALL
        .into_iter()
        .filter(|tool| {
            if !only.is_empty() {
                only.contains(tool)
            } else {
                !exclude.contains(tool)
            }
        })
        .collect();
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unknown_tool() {
        assert!(matches!(
            Tool::parse("linter"),
            Err(EngineError::UnknownTool(_))
        ));
        assert_eq!(Tool::parse("comments").unwrap(), Tool::Comments);
    }

    #[test]
    fn selection_defaults_to_all_in_registry_order() {
        let selected = select_tools(&[], &[]).unwrap();
        assert_eq!(selected, Tool::ALL.to_vec());
    }

    #[test]
    fn only_list_filters_and_keeps_registry_order() {
        let selected =
            select_tools(&["brackets".to_string(), "comments".to_string()], &[]).unwrap();
        assert_eq!(selected, vec![Tool::Comments, Tool::Brackets]);
    }

    #[test]
    fn exclusion_removes_tools() {
        let selected = select_tools(&[], &["metadata".to_string()]).unwrap();
        assert!(!selected.contains(&Tool::Metadata));
        assert_eq!(selected.len(), Tool::ALL.len() - 1);
    }

    #[test]
    fn inclusion_wins_over_exclusion() {
        let selected =
            select_tools(&["metadata".to_string()], &["metadata".to_string()]).unwrap();
        assert_eq!(selected, vec![Tool::Metadata]);
    }

    #[test]
    fn unknown_name_in_exclude_is_an_error() {
        assert!(select_tools(&[], &["nonsense".to_string()]).is_err());
    }
}
