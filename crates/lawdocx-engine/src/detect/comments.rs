//! Comment extraction: author, thread state, resolution, and the body
//! text span each comment anchors to.

use std::collections::HashMap;

use lawdocx_docx::xml::{
    self, is_w_element, optional_part_str, parse_part, w_attr, W14_NS, W15_NS,
};
use lawdocx_docx::{DocxPackage, StoryKey};
use lawdocx_types::{Context, Finding, FindingKind, Location, Severity};
use serde_json::{Map, Value};

use crate::builder::FindingBuilder;

struct CommentRecord {
    id: String,
    author: Option<String>,
    initials: Option<String>,
    date: Option<String>,
    paragraphs: Vec<String>,
    para_id: Option<String>,
}

struct ExtendedRecord {
    done: bool,
    parent_para_id: Option<String>,
}

/// Byte spans in the flattened body text bounded by each comment's
/// `commentRangeStart`/`commentRangeEnd` markers, plus the paragraph
/// start offsets needed to anchor a span to body paragraph indices.
struct BodyAnchors {
    text: String,
    starts: Vec<usize>,
    spans: HashMap<String, (usize, Option<usize>)>,
}

impl BodyAnchors {
    fn paragraph_at(&self, offset: usize) -> usize {
        if self.starts.is_empty() {
            return 0;
        }
        self.starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1)
    }

    fn paragraph_range(&self, start: usize, end: usize) -> (usize, usize) {
        let last = end.saturating_sub(1).max(start);
        (self.paragraph_at(start), self.paragraph_at(last))
    }
}

fn load_comments(package: &DocxPackage) -> Result<Vec<CommentRecord>, lawdocx_docx::DocxError> {
    let part = "word/comments.xml";
    let Some(text) = optional_part_str(package, part)? else {
        return Ok(Vec::new());
    };
    let doc = parse_part(part, text)?;

    let mut records = Vec::new();
    for node in doc
        .root_element()
        .descendants()
        .filter(|n| is_w_element(*n, "comment"))
    {
        let Some(id) = w_attr(node, "id") else {
            continue;
        };
        let paragraphs: Vec<String> = xml::paragraphs(node)
            .into_iter()
            .map(xml::paragraph_text)
            .collect();
        let para_id = xml::paragraphs(node)
            .first()
            .and_then(|p| p.attribute((W14_NS, "paraId")))
            .map(str::to_string);
        records.push(CommentRecord {
            id: id.to_string(),
            author: w_attr(node, "author").map(str::to_string),
            initials: w_attr(node, "initials").map(str::to_string),
            date: w_attr(node, "date").map(str::to_string),
            paragraphs,
            para_id,
        });
    }
    Ok(records)
}

fn load_extended(
    package: &DocxPackage,
) -> Result<HashMap<String, ExtendedRecord>, lawdocx_docx::DocxError> {
    let part = "word/commentsExtended.xml";
    let Some(text) = optional_part_str(package, part)? else {
        return Ok(HashMap::new());
    };
    let doc = parse_part(part, text)?;

    let mut records = HashMap::new();
    for node in doc.root_element().descendants().filter(|n| {
        n.is_element()
            && n.tag_name().name() == "commentEx"
            && n.tag_name().namespace() == Some(W15_NS)
    }) {
        let Some(para_id) = node.attribute((W15_NS, "paraId")) else {
            continue;
        };
        records.insert(
            para_id.to_string(),
            ExtendedRecord {
                // OOXML on/off values admit both forms.
                done: matches!(node.attribute((W15_NS, "done")), Some("1") | Some("true")),
                parent_para_id: node.attribute((W15_NS, "paraIdParent")).map(str::to_string),
            },
        );
    }
    Ok(records)
}

/// Rebuild the flattened body text while recording the span each comment
/// range covers. Text accumulation matches the story paragraph rule
/// (paragraphs joined with a newline).
fn body_anchors(package: &DocxPackage) -> Result<BodyAnchors, lawdocx_docx::DocxError> {
    let part = "word/document.xml";
    let mut anchors = BodyAnchors {
        text: String::new(),
        starts: Vec::new(),
        spans: HashMap::new(),
    };
    let Some(raw) = optional_part_str(package, part)? else {
        return Ok(anchors);
    };
    let doc = parse_part(part, raw)?;

    let paragraphs = xml::paragraphs(doc.root_element());
    for (index, paragraph) in paragraphs.iter().enumerate() {
        if index > 0 {
            anchors.text.push('\n');
        }
        anchors.starts.push(anchors.text.len());
        for node in paragraph.descendants() {
            if is_w_element(node, "t") || is_w_element(node, "delText") {
                if let Some(value) = node.text() {
                    anchors.text.push_str(value);
                }
            } else if is_w_element(node, "commentRangeStart") {
                if let Some(id) = w_attr(node, "id") {
                    anchors
                        .spans
                        .entry(id.to_string())
                        .or_insert((anchors.text.len(), None));
                }
            } else if is_w_element(node, "commentRangeEnd") {
                if let Some(id) = w_attr(node, "id") {
                    if let Some(span) = anchors.spans.get_mut(id) {
                        span.1.get_or_insert(anchors.text.len());
                    }
                }
            }
        }
    }
    Ok(anchors)
}

/// Every comment in the document, resolved state and reply threading
/// included. Comments whose anchor range is missing from the body fall
/// back to their own text as context, flagged `anchor_fallback`.
pub fn collect(package: &DocxPackage, builder: &mut FindingBuilder) -> Vec<Finding> {
    let comments = match load_comments(package) {
        Ok(comments) => comments,
        Err(error) => {
            return vec![builder.error(
                FindingKind::Comment,
                "body",
                format!("failed to read comments: {error}"),
            )]
        }
    };

    let mut findings = Vec::new();
    // The extension and anchor parts degrade independently: without
    // them the comments are still reported, unresolved and anchorless.
    let extended = match load_extended(package) {
        Ok(extended) => extended,
        Err(error) => {
            findings.push(builder.error(
                FindingKind::Comment,
                "body",
                format!("failed to read comment resolution state: {error}"),
            ));
            HashMap::new()
        }
    };
    let anchors = match body_anchors(package) {
        Ok(anchors) => anchors,
        Err(error) => {
            findings.push(builder.error(
                FindingKind::Comment,
                "body",
                format!("failed to read comment anchors: {error}"),
            ));
            BodyAnchors {
                text: String::new(),
                starts: Vec::new(),
                spans: HashMap::new(),
            }
        }
    };

    let id_by_para: HashMap<&str, &str> = comments
        .iter()
        .filter_map(|c| c.para_id.as_deref().map(|p| (p, c.id.as_str())))
        .collect();

    for comment in &comments {
        let comment_text = comment.paragraphs.join("\n");
        let ext = comment.para_id.as_deref().and_then(|p| extended.get(p));
        let resolved = ext.map(|e| e.done).unwrap_or(false);
        let parent_id = ext
            .and_then(|e| e.parent_para_id.as_deref())
            .and_then(|p| id_by_para.get(p))
            .map(|id| id.to_string());

        let anchor = anchors
            .spans
            .get(&comment.id)
            .and_then(|(start, end)| end.map(|end| (*start, end)));
        // Anchored comments locate at the body paragraphs their range
        // covers; unanchored ones keep indices local to the comment text
        // and set the fallback flag.
        let (context, paragraph_span, fallback) = match anchor {
            Some((start, end)) if end >= start => (
                Context::around(&anchors.text, start, end),
                anchors.paragraph_range(start, end),
                false,
            ),
            _ => (
                Context::bare(&comment_text),
                (0, comment.paragraphs.len().saturating_sub(1)),
                true,
            ),
        };

        let mut details = Map::new();
        details.insert("resolved".into(), Value::Bool(resolved));
        details.insert("comment_text".into(), Value::String(comment_text));
        if let Some(author) = &comment.author {
            details.insert("author".into(), Value::String(author.clone()));
        }
        if let Some(initials) = &comment.initials {
            details.insert("initials".into(), Value::String(initials.clone()));
        }
        if let Some(date) = &comment.date {
            details.insert("date".into(), Value::String(date.clone()));
        }
        if let Some(parent) = &parent_id {
            details.insert("parent_comment_id".into(), Value::String(parent.clone()));
        }

        let story = StoryKey::Comment {
            id: comment.id.clone(),
        }
        .to_string();
        let mut location = Location::new(story, paragraph_span.0, paragraph_span.1);
        location.comment_id = Some(comment.id.clone());
        location.anchor_fallback = fallback;

        builder.push(
            &mut findings,
            FindingKind::Comment,
            Severity::Info,
            location,
            context,
            details,
        );
    }
    findings
}
