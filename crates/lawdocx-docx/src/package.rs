//! ZIP container access for DOCX packages.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use thiserror::Error;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a valid DOCX container: {0}")]
    Container(#[from] zip::result::ZipError),
    #[error("failed to read archive entry: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing document part: {0}")]
    MissingPart(String),
    #[error("document part {0} is not valid UTF-8")]
    Encoding(String),
    #[error("malformed XML in {part}: {source}")]
    Xml {
        part: String,
        source: roxmltree::Error,
    },
}

/// An opened DOCX package. All parts are read fully at open time; the
/// package is an immutable in-memory view for the duration of one scan.
pub struct DocxPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

impl DocxPackage {
    pub fn open(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = BTreeMap::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.insert(entry.name().to_string(), data);
        }

        tracing::debug!(parts = parts.len(), "opened docx package");
        Ok(Self { parts })
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// Part contents as UTF-8 text, for XML parsing.
    pub fn part_str(&self, name: &str) -> Result<&str, DocxError> {
        let data = self
            .part(name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        std::str::from_utf8(strip_bom(data)).map_err(|_| DocxError::Encoding(name.to_string()))
    }

    /// All part names, in stable (lexicographic) order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Part names under a prefix with a suffix, e.g. the `word/header*.xml`
    /// family. Stable order.
    pub fn parts_matching(&self, prefix: &str, suffix: &str) -> Vec<String> {
        self.parts
            .keys()
            .filter(|name| name.starts_with(prefix) && name.ends_with(suffix))
            .cloned()
            .collect()
    }
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::DocxFixture;

    #[test]
    fn open_rejects_non_zip_bytes() {
        let result = DocxPackage::open(b"this is not a zip archive");
        assert!(matches!(result, Err(DocxError::Container(_))));
    }

    #[test]
    fn part_lookup_and_matching() {
        let bytes = DocxFixture::new()
            .body_text("Hello")
            .header(crate::HfSubtype::Default, "DRAFT")
            .build();
        let package = DocxPackage::open(&bytes).unwrap();

        assert!(package.has_part("word/document.xml"));
        assert!(package.part("word/nonexistent.xml").is_none());
        assert_eq!(
            package.parts_matching("word/header", ".xml"),
            vec!["word/header1.xml".to_string()]
        );
    }

    #[test]
    fn part_str_reports_missing_part() {
        let bytes = DocxFixture::new().body_text("Hello").build();
        let package = DocxPackage::open(&bytes).unwrap();
        assert!(matches!(
            package.part_str("word/footnotes.xml"),
            Err(DocxError::MissingPart(_))
        ));
    }
}
