//! Document property parts: core, extended, and custom properties, plus
//! raw revision-log parts.

use crate::package::{DocxError, DocxPackage};
use crate::xml::{optional_part_str, parse_part};

pub const CORE_PART: &str = "docProps/core.xml";
pub const EXTENDED_PART: &str = "docProps/app.xml";
pub const CUSTOM_PART: &str = "docProps/custom.xml";

/// A custom document property with its vt datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomProperty {
    pub name: String,
    pub value: String,
    pub datatype: Option<String>,
}

/// `(name, value)` pairs from a flat property part (core or extended).
/// Absent parts yield an empty list.
pub fn flat_properties(
    package: &DocxPackage,
    part: &str,
) -> Result<Vec<(String, String)>, DocxError> {
    let text = match optional_part_str(package, part)? {
        Some(text) => text,
        None => return Ok(Vec::new()),
    };
    let doc = parse_part(part, text)?;

    Ok(doc
        .root_element()
        .children()
        .filter(|node| node.is_element())
        .map(|node| {
            (
                node.tag_name().name().to_string(),
                node.text().unwrap_or_default().to_string(),
            )
        })
        .collect())
}

/// Custom properties from `docProps/custom.xml`. The datatype is the
/// local name of the vt value element (`lpwstr`, `i4`, `bool`, ...).
pub fn custom_properties(package: &DocxPackage) -> Result<Vec<CustomProperty>, DocxError> {
    let text = match optional_part_str(package, CUSTOM_PART)? {
        Some(text) => text,
        None => return Ok(Vec::new()),
    };
    let doc = parse_part(CUSTOM_PART, text)?;

    let mut properties = Vec::new();
    for node in doc.root_element().descendants() {
        if !node.is_element() || node.tag_name().name() != "property" {
            continue;
        }
        let name = node.attribute("name").unwrap_or_default().to_string();
        let value_elem = node.children().find(|child| child.is_element());
        let (value, datatype) = match value_elem {
            Some(elem) => (
                elem.text().unwrap_or_default().to_string(),
                Some(elem.tag_name().name().to_string()),
            ),
            None => (String::new(), None),
        };
        properties.push(CustomProperty {
            name,
            value,
            datatype,
        });
    }
    Ok(properties)
}

/// Raw contents of any part whose name mentions a revision log, decoded
/// lossily. Word keeps save-history in such parts.
pub fn revision_parts(package: &DocxPackage) -> Vec<(String, String)> {
    package
        .part_names()
        .filter(|name| name.to_ascii_lowercase().contains("revision"))
        .map(String::from)
        .collect::<Vec<_>>()
        .into_iter()
        .map(|name| {
            let raw = package.part(&name).unwrap_or_default();
            let text = String::from_utf8_lossy(raw).into_owned();
            (name, text)
        })
        .collect()
}
