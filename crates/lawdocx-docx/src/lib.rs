//! Read-only access to WordprocessingML documents.
//!
//! DOCX files are ZIP archives of XML parts (`word/document.xml`,
//! `word/header*.xml`, `word/footnotes.xml`, `docProps/core.xml`, ...).
//! This crate parses the container manually with `zip` + `roxmltree`
//! (docx-rs is writer-only) and exposes the query surface the scan engine
//! needs: story enumeration, paragraph text, note and comment records,
//! and document properties. It never writes or mutates a document.

pub mod package;
pub mod properties;
pub mod story;
pub mod xml;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

pub use package::{DocxError, DocxPackage};
pub use story::{Coverage, HfSubtype, Note, Story, StoryKey, StoryScan};
