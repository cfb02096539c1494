//! Synthetic DOCX builder for tests.
//!
//! Assembles a minimal but well-formed WordprocessingML package in memory
//! so engine and CLI tests never depend on binary fixtures checked into
//! the tree. Only available to tests (`fixtures` feature).

use std::io::Write;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::story::HfSubtype;

const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const W14: &str = "http://schemas.microsoft.com/office/word/2010/wordml";
const W15: &str = "http://schemas.microsoft.com/office/word/2012/wordml";
const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

fn esc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn simple_paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", esc(text))
}

struct HfPart {
    section: usize,
    subtype: HfSubtype,
    paragraphs: Vec<String>,
}

struct CommentSpec {
    id: String,
    author: String,
    date: String,
    text: String,
    done: Option<bool>,
    parent: Option<String>,
}

/// Builder for synthetic DOCX bytes.
#[derive(Default)]
pub struct DocxFixture {
    body: Vec<String>,
    headers: Vec<HfPart>,
    footers: Vec<HfPart>,
    footnotes: Vec<(i64, String)>,
    endnotes: Vec<(i64, String)>,
    comments: Vec<CommentSpec>,
    core: Vec<(String, String)>,
    extended: Vec<(String, String)>,
    custom: Vec<(String, String, String)>,
    styles: Vec<(String, String)>,
    extra_parts: Vec<(String, Vec<u8>)>,
}

impl DocxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_text(mut self, text: &str) -> Self {
        self.body.push(simple_paragraph(text));
        self
    }

    /// Push a raw `<w:p>...</w:p>` fragment into the body.
    pub fn body_paragraph_xml(mut self, raw: &str) -> Self {
        self.body.push(raw.to_string());
        self
    }

    pub fn body_styled_text(mut self, style_id: &str, text: &str) -> Self {
        self.body.push(format!(
            "<w:p><w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(style_id),
            esc(text)
        ));
        self
    }

    /// A paragraph carrying Word list numbering (`w:numPr`).
    pub fn body_numbered_text(mut self, text: &str) -> Self {
        self.body.push(format!(
            "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"1\"/></w:numPr></w:pPr>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(text)
        ));
        self
    }

    pub fn body_insertion(
        mut self,
        before: &str,
        inserted: &str,
        after: &str,
        author: &str,
        date: &str,
    ) -> Self {
        self.body.push(format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:ins w:id=\"1\" w:author=\"{}\" w:date=\"{}\">\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:ins>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(before),
            esc(author),
            esc(date),
            esc(inserted),
            esc(after)
        ));
        self
    }

    pub fn body_deletion(
        mut self,
        before: &str,
        deleted: &str,
        after: &str,
        author: &str,
        date: &str,
    ) -> Self {
        self.body.push(format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:del w:id=\"2\" w:author=\"{}\" w:date=\"{}\">\
             <w:r><w:delText xml:space=\"preserve\">{}</w:delText></w:r></w:del>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(before),
            esc(author),
            esc(date),
            esc(deleted),
            esc(after)
        ));
        self
    }

    pub fn body_highlighted_text(
        mut self,
        before: &str,
        highlighted: &str,
        after: &str,
        color: &str,
    ) -> Self {
        self.body.push(format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:r><w:rPr><w:highlight w:val=\"{}\"/></w:rPr>\
             <w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(before),
            esc(color),
            esc(highlighted),
            esc(after)
        ));
        self
    }

    pub fn body_text_with_footnote_ref(mut self, before: &str, note_id: i64, after: &str) -> Self {
        self.body.push(format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:r><w:footnoteReference w:id=\"{note_id}\"/></w:r>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(before),
            esc(after)
        ));
        self
    }

    pub fn body_text_with_endnote_ref(mut self, before: &str, note_id: i64, after: &str) -> Self {
        self.body.push(format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:r><w:endnoteReference w:id=\"{note_id}\"/></w:r>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(before),
            esc(after)
        ));
        self
    }

    pub fn body_text_with_comment_anchor(
        mut self,
        before: &str,
        target: &str,
        after: &str,
        comment_id: &str,
    ) -> Self {
        self.body.push(format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:commentRangeStart w:id=\"{id}\"/>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>\
             <w:commentRangeEnd w:id=\"{id}\"/>\
             <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            esc(before),
            esc(target),
            esc(after),
            id = esc(comment_id),
        ));
        self
    }

    pub fn header(self, subtype: HfSubtype, text: &str) -> Self {
        self.header_in_section(1, subtype, text)
    }

    pub fn header_in_section(mut self, section: usize, subtype: HfSubtype, text: &str) -> Self {
        self.headers.push(HfPart {
            section,
            subtype,
            paragraphs: vec![simple_paragraph(text)],
        });
        self
    }

    pub fn footer(self, subtype: HfSubtype, text: &str) -> Self {
        self.footer_in_section(1, subtype, text)
    }

    pub fn footer_in_section(mut self, section: usize, subtype: HfSubtype, text: &str) -> Self {
        self.footers.push(HfPart {
            section,
            subtype,
            paragraphs: vec![simple_paragraph(text)],
        });
        self
    }

    pub fn footnote(mut self, id: i64, text: &str) -> Self {
        self.footnotes.push((id, simple_paragraph(text)));
        self
    }

    /// Push a raw `<w:p>...</w:p>` fragment as a footnote body.
    pub fn footnote_paragraph_xml(mut self, id: i64, raw: &str) -> Self {
        self.footnotes.push((id, raw.to_string()));
        self
    }

    pub fn endnote(mut self, id: i64, text: &str) -> Self {
        self.endnotes.push((id, simple_paragraph(text)));
        self
    }

    pub fn comment(mut self, id: &str, author: &str, date: &str, text: &str) -> Self {
        self.comments.push(CommentSpec {
            id: id.to_string(),
            author: author.to_string(),
            date: date.to_string(),
            text: text.to_string(),
            done: None,
            parent: None,
        });
        self
    }

    pub fn resolved_comment(mut self, id: &str, author: &str, date: &str, text: &str) -> Self {
        self.comments.push(CommentSpec {
            id: id.to_string(),
            author: author.to_string(),
            date: date.to_string(),
            text: text.to_string(),
            done: Some(true),
            parent: None,
        });
        self
    }

    pub fn reply_comment(
        mut self,
        id: &str,
        parent_id: &str,
        author: &str,
        date: &str,
        text: &str,
    ) -> Self {
        self.comments.push(CommentSpec {
            id: id.to_string(),
            author: author.to_string(),
            date: date.to_string(),
            text: text.to_string(),
            done: None,
            parent: Some(parent_id.to_string()),
        });
        self
    }

    pub fn core_property(mut self, name: &str, value: &str) -> Self {
        self.core.push((name.to_string(), value.to_string()));
        self
    }

    pub fn extended_property(mut self, name: &str, value: &str) -> Self {
        self.extended.push((name.to_string(), value.to_string()));
        self
    }

    pub fn custom_property(mut self, name: &str, value: &str, datatype: &str) -> Self {
        self.custom
            .push((name.to_string(), value.to_string(), datatype.to_string()));
        self
    }

    pub fn style(mut self, style_id: &str, name: &str) -> Self {
        self.styles.push((style_id.to_string(), name.to_string()));
        self
    }

    /// Raw part override, written after the assembled parts.
    pub fn part(mut self, name: &str, content: &[u8]) -> Self {
        self.extra_parts.push((name.to_string(), content.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut parts: Vec<(String, Vec<u8>)> = Vec::new();

        parts.push((
            "[Content_Types].xml".into(),
            CONTENT_TYPES.as_bytes().to_vec(),
        ));
        parts.push(("_rels/.rels".into(), self.root_rels().into_bytes()));
        parts.push(("word/document.xml".into(), self.document_xml().into_bytes()));
        parts.push((
            "word/_rels/document.xml.rels".into(),
            self.document_rels().into_bytes(),
        ));

        for (index, header) in self.headers.iter().enumerate() {
            parts.push((
                format!("word/header{}.xml", index + 1),
                hf_part_xml("w:hdr", &header.paragraphs).into_bytes(),
            ));
        }
        for (index, footer) in self.footers.iter().enumerate() {
            parts.push((
                format!("word/footer{}.xml", index + 1),
                hf_part_xml("w:ftr", &footer.paragraphs).into_bytes(),
            ));
        }

        if !self.footnotes.is_empty() {
            parts.push((
                "word/footnotes.xml".into(),
                notes_xml("w:footnotes", "w:footnote", &self.footnotes).into_bytes(),
            ));
        }
        if !self.endnotes.is_empty() {
            parts.push((
                "word/endnotes.xml".into(),
                notes_xml("w:endnotes", "w:endnote", &self.endnotes).into_bytes(),
            ));
        }

        if !self.comments.is_empty() {
            parts.push(("word/comments.xml".into(), self.comments_xml().into_bytes()));
            if self.comments.iter().any(|c| c.done.is_some() || c.parent.is_some()) {
                parts.push((
                    "word/commentsExtended.xml".into(),
                    self.comments_extended_xml().into_bytes(),
                ));
            }
        }

        if !self.core.is_empty() {
            parts.push((
                "docProps/core.xml".into(),
                flat_props_xml("cp:coreProperties", &self.core).into_bytes(),
            ));
        }
        if !self.extended.is_empty() {
            parts.push((
                "docProps/app.xml".into(),
                flat_props_xml("Properties", &self.extended).into_bytes(),
            ));
        }
        if !self.custom.is_empty() {
            parts.push(("docProps/custom.xml".into(), self.custom_xml().into_bytes()));
        }
        if !self.styles.is_empty() {
            parts.push(("word/styles.xml".into(), self.styles_xml().into_bytes()));
        }

        for (name, content) in &self.extra_parts {
            parts.retain(|(existing, _)| existing != name);
            parts.push((name.clone(), content.clone()));
        }

        write_zip(&parts)
    }

    fn max_section(&self) -> usize {
        self.headers
            .iter()
            .chain(self.footers.iter())
            .map(|part| part.section)
            .max()
            .unwrap_or(1)
    }

    fn sect_pr_refs(&self, section: usize) -> String {
        let mut refs = String::new();
        for (index, header) in self.headers.iter().enumerate() {
            if header.section == section {
                refs.push_str(&format!(
                    "<w:headerReference w:type=\"{}\" r:id=\"rIdH{}\"/>",
                    header.subtype.as_str(),
                    index + 1
                ));
            }
        }
        for (index, footer) in self.footers.iter().enumerate() {
            if footer.section == section {
                refs.push_str(&format!(
                    "<w:footerReference w:type=\"{}\" r:id=\"rIdF{}\"/>",
                    footer.subtype.as_str(),
                    index + 1
                ));
            }
        }
        refs
    }

    fn document_xml(&self) -> String {
        let mut body = self.body.join("");
        let sections = self.max_section();
        // Earlier sections end with a sectPr inside a paragraph's pPr,
        // the last section's sectPr is a direct child of the body.
        for section in 1..sections {
            body.push_str(&format!(
                "<w:p><w:pPr><w:sectPr>{}</w:sectPr></w:pPr></w:p>",
                self.sect_pr_refs(section)
            ));
        }
        body.push_str(&format!("<w:sectPr>{}</w:sectPr>", self.sect_pr_refs(sections)));

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"{W}\" xmlns:w14=\"{W14}\" xmlns:r=\"{R}\">\
             <w:body>{body}</w:body></w:document>"
        )
    }

    fn document_rels(&self) -> String {
        let mut rels = String::new();
        for index in 0..self.headers.len() {
            rels.push_str(&format!(
                "<Relationship Id=\"rIdH{n}\" \
                 Type=\"{R}/header\" Target=\"header{n}.xml\"/>",
                n = index + 1
            ));
        }
        for index in 0..self.footers.len() {
            rels.push_str(&format!(
                "<Relationship Id=\"rIdF{n}\" \
                 Type=\"{R}/footer\" Target=\"footer{n}.xml\"/>",
                n = index + 1
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"{PKG_RELS}\">{rels}</Relationships>"
        )
    }

    fn root_rels(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"{PKG_RELS}\">\
             <Relationship Id=\"rId1\" Type=\"{R}/officeDocument\" \
             Target=\"word/document.xml\"/></Relationships>"
        )
    }

    fn comments_xml(&self) -> String {
        let mut entries = String::new();
        for (index, comment) in self.comments.iter().enumerate() {
            entries.push_str(&format!(
                "<w:comment w:id=\"{}\" w:author=\"{}\" w:date=\"{}\" w:initials=\"{}\">\
                 <w:p w14:paraId=\"{}\"><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>\
                 </w:comment>",
                esc(&comment.id),
                esc(&comment.author),
                esc(&comment.date),
                esc(&initials_of(&comment.author)),
                para_id_for(index),
                esc(&comment.text),
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:comments xmlns:w=\"{W}\" xmlns:w14=\"{W14}\">{entries}</w:comments>"
        )
    }

    fn comments_extended_xml(&self) -> String {
        let mut entries = String::new();
        for (index, comment) in self.comments.iter().enumerate() {
            let mut attrs = format!(" w15:paraId=\"{}\"", para_id_for(index));
            if let Some(done) = comment.done {
                attrs.push_str(&format!(" w15:done=\"{}\"", if done { "1" } else { "0" }));
            }
            if let Some(parent_id) = &comment.parent {
                if let Some(parent_index) =
                    self.comments.iter().position(|c| &c.id == parent_id)
                {
                    attrs.push_str(&format!(
                        " w15:paraIdParent=\"{}\"",
                        para_id_for(parent_index)
                    ));
                }
            }
            entries.push_str(&format!("<w15:commentEx{attrs}/>"));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w15:commentsEx xmlns:w15=\"{W15}\">{entries}</w15:commentsEx>"
        )
    }

    fn custom_xml(&self) -> String {
        let mut entries = String::new();
        for (index, (name, value, datatype)) in self.custom.iter().enumerate() {
            entries.push_str(&format!(
                "<property fmtid=\"{{D5CDD505-2E9C-101B-9397-08002B2CF9AE}}\" \
                 pid=\"{}\" name=\"{}\"><vt:{dt}>{}</vt:{dt}></property>",
                index + 2,
                esc(name),
                esc(value),
                dt = datatype,
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/custom-properties\" \
             xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">\
             {entries}</Properties>"
        )
    }

    fn styles_xml(&self) -> String {
        let mut entries = String::new();
        for (style_id, name) in &self.styles {
            entries.push_str(&format!(
                "<w:style w:type=\"paragraph\" w:styleId=\"{}\">\
                 <w:name w:val=\"{}\"/></w:style>",
                esc(style_id),
                esc(name)
            ));
        }
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:styles xmlns:w=\"{W}\">{entries}</w:styles>"
        )
    }
}

fn para_id_for(index: usize) -> String {
    format!("{:08X}", 0x1000 + index)
}

fn initials_of(author: &str) -> String {
    author
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

fn hf_part_xml(root: &str, paragraphs: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <{root} xmlns:w=\"{W}\">{}</{root}>",
        paragraphs.join("")
    )
}

fn flat_props_xml(root: &str, props: &[(String, String)]) -> String {
    // Core properties keep the cp prefix, extended properties a default
    // namespace; the reader only looks at local names.
    let (ns, prefix) = match root {
        "cp:coreProperties" => (
            " xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\"",
            "cp:",
        ),
        _ => (
            " xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\"",
            "",
        ),
    };
    let mut entries = String::new();
    for (name, value) in props {
        entries.push_str(&format!("<{prefix}{name}>{}</{prefix}{name}>", esc(value)));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <{root}{ns}>{entries}</{root}>"
    )
}

fn notes_xml(root: &str, tag: &str, notes: &[(i64, String)]) -> String {
    let mut entries = String::new();
    for (id, paragraph_xml) in notes {
        entries.push_str(&format!("<{tag} w:id=\"{id}\">{paragraph_xml}</{tag}>"));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <{root} xmlns:w=\"{W}\">{entries}</{root}>"
    )
}

const CONTENT_TYPES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ",
    "ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "</Types>",
);

fn write_zip(parts: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in parts {
        writer
            .start_file(name.clone(), options)
            .expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}
