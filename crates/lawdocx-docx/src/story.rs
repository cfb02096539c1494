//! Story enumeration: the named, independently addressable text regions
//! of a document (body, each header/footer variant per section, each
//! footnote/endnote, comment bodies, synthetic metadata).

use std::collections::HashMap;
use std::fmt;

use crate::package::{DocxError, DocxPackage};
use crate::xml::{
    self, is_w_element, optional_part_str, parse_part, w_attr, DOC_RELS_NS, PKG_RELS_NS, WORD_NS,
};

/// Header/footer page subtype. Documents that do not distinguish first or
/// even pages only reference `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HfSubtype {
    Default,
    First,
    Even,
}

impl HfSubtype {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("first") => HfSubtype::First,
            Some("even") => HfSubtype::Even,
            _ => HfSubtype::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HfSubtype::Default => "default",
            HfSubtype::First => "first",
            HfSubtype::Even => "even",
        }
    }
}

/// Stable identity of one story. The rendered key string is the location
/// anchor consumers see in finding JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoryKey {
    Body,
    Header { section: usize, subtype: HfSubtype },
    Footer { section: usize, subtype: HfSubtype },
    Footnote { id: i64 },
    Endnote { id: i64 },
    Comment { id: String },
    Metadata,
}

impl fmt::Display for StoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryKey::Body => f.write_str("body"),
            StoryKey::Header { section, subtype } => {
                write!(f, "header--Section{}--{}", section, subtype.as_str())
            }
            StoryKey::Footer { section, subtype } => {
                write!(f, "footer--Section{}--{}", section, subtype.as_str())
            }
            StoryKey::Footnote { id } => write!(f, "footnote--{id}"),
            StoryKey::Endnote { id } => write!(f, "endnote--{id}"),
            StoryKey::Comment { id } => write!(f, "comment--{id}"),
            StoryKey::Metadata => f.write_str("metadata"),
        }
    }
}

/// A story reduced to its paragraph texts, one entry per `w:p` element in
/// document order. This is the paragraph boundary rule every detector
/// shares, so indices are comparable across tools run on the same file.
#[derive(Debug, Clone)]
pub struct Story {
    pub key: StoryKey,
    pub paragraphs: Vec<String>,
}

/// A footnote or endnote with its local paragraph texts.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: i64,
    pub paragraphs: Vec<String>,
}

impl Note {
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Which stories a detector walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    BodyOnly,
    HeaderFooterOnly,
    BodyHeaderFooter,
    Full,
}

/// Resolve every header/footer reference to `(story key, part name)`.
/// Sections are numbered 1-based in document order; missing substructures
/// yield an empty list, not an error.
pub fn header_footer_parts(
    package: &DocxPackage,
) -> Result<Vec<(StoryKey, String)>, DocxError> {
    let text = match optional_part_str(package, "word/document.xml")? {
        Some(text) => text,
        None => return Ok(Vec::new()),
    };
    let doc = parse_part("word/document.xml", text)?;
    let rels = document_rels(package)?;

    let mut headers = Vec::new();
    let mut footers = Vec::new();

    let sect_prs = doc
        .root_element()
        .descendants()
        .filter(|node| is_w_element(*node, "sectPr"));
    for (index, sect_pr) in sect_prs.enumerate() {
        let section = index + 1;
        for reference in sect_pr.children().filter(|n| n.is_element()) {
            let name = reference.tag_name().name();
            if reference.tag_name().namespace() != Some(WORD_NS)
                || (name != "headerReference" && name != "footerReference")
            {
                continue;
            }
            let subtype = HfSubtype::from_attr(w_attr(reference, "type"));
            let Some(rel_id) = reference.attribute((DOC_RELS_NS, "id")) else {
                continue;
            };
            let Some(part) = rels.get(rel_id) else {
                continue;
            };
            if name == "headerReference" {
                headers.push((StoryKey::Header { section, subtype }, part.clone()));
            } else {
                footers.push((StoryKey::Footer { section, subtype }, part.clone()));
            }
        }
    }

    headers.extend(footers);
    Ok(headers)
}

/// Relationship id to part name, from `word/_rels/document.xml.rels`.
fn document_rels(package: &DocxPackage) -> Result<HashMap<String, String>, DocxError> {
    let part = "word/_rels/document.xml.rels";
    let text = match optional_part_str(package, part)? {
        Some(text) => text,
        None => return Ok(HashMap::new()),
    };
    let doc = parse_part(part, text)?;

    let mut rels = HashMap::new();
    for node in doc.root_element().children().filter(|n| n.is_element()) {
        if node.tag_name().name() != "Relationship"
            || node.tag_name().namespace() != Some(PKG_RELS_NS)
        {
            continue;
        }
        let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target")) else {
            continue;
        };
        rels.insert(id.to_string(), resolve_target(target));
    }
    Ok(rels)
}

fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("word/{target}")
    }
}

/// Paragraph texts of one XML story part (a header, footer, or the body).
pub fn part_paragraphs(package: &DocxPackage, part: &str) -> Result<Vec<String>, DocxError> {
    let text = package.part_str(part)?;
    let doc = parse_part(part, text)?;
    Ok(xml::paragraphs(doc.root_element())
        .into_iter()
        .map(xml::paragraph_text)
        .collect())
}

/// Load footnotes or endnotes from their part, skipping the separator
/// pseudo-notes (non-positive ids), sorted by id. An absent part yields
/// an empty list.
pub fn load_notes(
    package: &DocxPackage,
    part: &str,
    tag: &str,
) -> Result<Vec<Note>, DocxError> {
    let text = match optional_part_str(package, part)? {
        Some(text) => text,
        None => return Ok(Vec::new()),
    };
    let doc = parse_part(part, text)?;

    let mut notes = Vec::new();
    for node in doc
        .root_element()
        .descendants()
        .filter(|n| is_w_element(*n, tag))
    {
        let Some(id) = xml::note_id(node) else {
            continue;
        };
        if id <= 0 {
            continue;
        }
        let paragraphs = xml::paragraphs(node)
            .into_iter()
            .map(xml::paragraph_text)
            .collect();
        notes.push(Note { id, paragraphs });
    }
    notes.sort_by_key(|note| note.id);
    Ok(notes)
}

/// The stories that could be read plus the parts that could not, keyed
/// by the story string the failure belongs to. A failed part never hides
/// the stories around it.
#[derive(Debug, Default)]
pub struct StoryScan {
    pub stories: Vec<Story>,
    pub failures: Vec<(String, DocxError)>,
}

/// Enumerate the text stories a detector of the given coverage walks, in
/// deterministic order: body, headers, footers, footnotes, endnotes.
/// Each part is read independently; a malformed part lands in `failures`
/// while the remaining stories are still returned.
pub fn text_stories(package: &DocxPackage, coverage: Coverage) -> StoryScan {
    let mut scan = StoryScan::default();
    let mut body_failed = false;

    if coverage != Coverage::HeaderFooterOnly {
        match part_paragraphs(package, "word/document.xml") {
            Ok(paragraphs) => scan.stories.push(Story {
                key: StoryKey::Body,
                paragraphs,
            }),
            Err(error) => {
                body_failed = true;
                scan.failures.push((StoryKey::Body.to_string(), error));
            }
        }
    }

    if coverage != Coverage::BodyOnly {
        match header_footer_parts(package) {
            Ok(parts) => {
                for (key, part) in parts {
                    match part_paragraphs(package, &part) {
                        Ok(paragraphs) => scan.stories.push(Story { key, paragraphs }),
                        Err(error) => scan.failures.push((key.to_string(), error)),
                    }
                }
            }
            // Enumeration reads document.xml, so a body failure already
            // covers this one.
            Err(error) => {
                if !body_failed {
                    scan.failures.push((StoryKey::Body.to_string(), error));
                }
            }
        }
    }

    if coverage == Coverage::Full {
        for (part, tag) in [
            ("word/footnotes.xml", "footnote"),
            ("word/endnotes.xml", "endnote"),
        ] {
            match load_notes(package, part, tag) {
                Ok(notes) => {
                    for note in notes {
                        let key = if tag == "footnote" {
                            StoryKey::Footnote { id: note.id }
                        } else {
                            StoryKey::Endnote { id: note.id }
                        };
                        scan.stories.push(Story {
                            key,
                            paragraphs: note.paragraphs,
                        });
                    }
                }
                Err(error) => scan.failures.push((StoryKey::Body.to_string(), error)),
            }
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::DocxFixture;
    use pretty_assertions::assert_eq;

    #[test]
    fn story_keys_render_stable_strings() {
        assert_eq!(StoryKey::Body.to_string(), "body");
        assert_eq!(
            StoryKey::Header {
                section: 2,
                subtype: HfSubtype::First
            }
            .to_string(),
            "header--Section2--first"
        );
        assert_eq!(StoryKey::Footnote { id: 7 }.to_string(), "footnote--7");
        assert_eq!(StoryKey::Metadata.to_string(), "metadata");
    }

    #[test]
    fn enumerates_body_headers_footers_and_notes() {
        let bytes = DocxFixture::new()
            .body_text("First paragraph")
            .body_text("Second paragraph")
            .header(HfSubtype::Default, "DRAFT")
            .footer(HfSubtype::Default, "Page 1 of 9")
            .footnote(1, "a footnote")
            .endnote(2, "an endnote")
            .build();
        let package = DocxPackage::open(&bytes).unwrap();

        let scan = text_stories(&package, Coverage::Full);
        assert!(scan.failures.is_empty());
        let stories = scan.stories;
        let keys: Vec<String> = stories.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "body",
                "header--Section1--default",
                "footer--Section1--default",
                "footnote--1",
                "endnote--2",
            ]
        );
        assert_eq!(
            stories[0].paragraphs,
            vec!["First paragraph", "Second paragraph"]
        );
        assert_eq!(stories[1].paragraphs, vec!["DRAFT"]);
    }

    #[test]
    fn missing_substructures_yield_zero_stories() {
        let bytes = DocxFixture::new().body_text("only a body").build();
        let package = DocxPackage::open(&bytes).unwrap();

        let stories = text_stories(&package, Coverage::Full).stories;
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].key, StoryKey::Body);

        let hf = text_stories(&package, Coverage::HeaderFooterOnly);
        assert!(hf.stories.is_empty());
        assert!(hf.failures.is_empty());
    }

    #[test]
    fn malformed_header_part_is_isolated() {
        let bytes = DocxFixture::new()
            .body_text("body text")
            .header(HfSubtype::Default, "fine")
            .footer(HfSubtype::Default, "also fine")
            .part("word/header1.xml", b"<w:hdr not xml")
            .build();
        let package = DocxPackage::open(&bytes).unwrap();

        let scan = text_stories(&package, Coverage::Full);
        let keys: Vec<String> = scan.stories.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(keys, vec!["body", "footer--Section1--default"]);
        assert_eq!(scan.failures.len(), 1);
        assert_eq!(scan.failures[0].0, "header--Section1--default");
    }

    #[test]
    fn separator_notes_are_skipped() {
        let bytes = DocxFixture::new()
            .body_text("body")
            .footnote(-1, "separator")
            .footnote(0, "continuation")
            .footnote(3, "real note")
            .build();
        let package = DocxPackage::open(&bytes).unwrap();

        let notes = load_notes(&package, "word/footnotes.xml", "footnote").unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, 3);
        assert_eq!(notes[0].text(), "real note");
    }
}
