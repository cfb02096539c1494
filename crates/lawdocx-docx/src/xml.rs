//! WordprocessingML namespaces and small XML helpers shared by the
//! story, property, and detector code paths.

use roxmltree::{Document, Node};

use crate::package::{DocxError, DocxPackage};

pub const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const W14_NS: &str = "http://schemas.microsoft.com/office/word/2010/wordml";
pub const W15_NS: &str = "http://schemas.microsoft.com/office/word/2012/wordml";
pub const DOC_RELS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const PKG_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Parse a package part as XML, attributing failures to the part name.
pub fn parse_part<'a>(part: &str, text: &'a str) -> Result<Document<'a>, DocxError> {
    Document::parse(text).map_err(|source| DocxError::Xml {
        part: part.to_string(),
        source,
    })
}

/// Read a part's text out of the package; `Ok(None)` when the part does
/// not exist (absent substructures are not errors).
pub fn optional_part_str<'a>(
    package: &'a DocxPackage,
    name: &str,
) -> Result<Option<&'a str>, DocxError> {
    if !package.has_part(name) {
        return Ok(None);
    }
    package.part_str(name).map(Some)
}

/// Attribute in the main WordprocessingML namespace, e.g. `w:id`.
pub fn w_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((WORD_NS, name))
}

pub fn is_w_element(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(WORD_NS)
}

/// Flattened visible text of a paragraph: every `w:t` and `w:delText`
/// descendant, concatenated in document order.
pub fn paragraph_text(paragraph: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in paragraph.descendants() {
        if is_w_element(node, "t") || is_w_element(node, "delText") {
            if let Some(value) = node.text() {
                text.push_str(value);
            }
        }
    }
    text
}

/// All `w:p` elements under `scope`, in document order.
pub fn paragraphs<'a, 'input>(scope: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    scope
        .descendants()
        .filter(|node| is_w_element(*node, "p"))
        .collect()
}

/// Note id, parsed. Separator pseudo-notes carry non-positive ids.
pub fn note_id(node: Node<'_, '_>) -> Option<i64> {
    w_attr(node, "id").and_then(|raw| raw.parse().ok())
}
