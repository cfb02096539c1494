//! Detector implementations, one module per tool. A part that cannot be
//! read degrades into a localized error finding instead of aborting the
//! file's scan.

use lawdocx_docx::DocxPackage;
use lawdocx_types::Finding;
use regex::Regex;

use crate::builder::FindingBuilder;
use crate::tool::Tool;

pub mod changes;
pub mod comments;
pub mod footnotes;
pub mod highlights;
pub mod metadata;
pub mod outline;
pub mod pattern;
pub mod terms;

/// The closed set of detector variants. The vocabulary is versioned with
/// the output schema, so a sum type rather than an open trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
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

impl Detector {
    pub fn for_tool(tool: Tool) -> Detector {
        match tool {
            Tool::Metadata => Detector::Metadata,
            Tool::Boilerplate => Detector::Boilerplate,
            Tool::Todos => Detector::Todos,
            Tool::Footnotes => Detector::Footnotes,
            Tool::Changes => Detector::Changes,
            Tool::Comments => Detector::Comments,
            Tool::Highlights => Detector::Highlights,
            Tool::Brackets => Detector::Brackets,
            Tool::Outline => Detector::Outline,
            Tool::Terms => Detector::Terms,
        }
    }

    /// Run this detector over one opened document. `extra` regex
    /// patterns only influence the pattern detectors.
    pub fn scan(
        self,
        package: &DocxPackage,
        builder: &mut FindingBuilder,
        extra: &[Regex],
    ) -> Vec<Finding> {
        match self {
            Detector::Metadata => metadata::collect(package, builder),
            Detector::Boilerplate => pattern::collect_boilerplate(package, builder, extra),
            Detector::Todos => pattern::collect_todos(package, builder, extra),
            Detector::Footnotes => footnotes::collect(package, builder),
            Detector::Changes => changes::collect(package, builder),
            Detector::Comments => comments::collect(package, builder),
            Detector::Highlights => highlights::collect(package, builder),
            Detector::Brackets => pattern::collect_brackets(package, builder, extra),
            Detector::Outline => outline::collect(package, builder),
            Detector::Terms => terms::collect(package, builder),
        }
    }
}
