//! Paragraph position tracking for pattern detectors.
//!
//! The paragraph boundary rule: one 0-based index per `w:p` element in
//! the story, applied uniformly across stories and detectors. A story is
//! flattened by joining paragraph texts with `\n`; the tracker maps any
//! byte offset in the flattened text back to its paragraph index.

/// Flattened story text plus the byte offset where each paragraph starts.
pub struct StoryText {
    text: String,
    starts: Vec<usize>,
}

impl StoryText {
    pub fn new(paragraphs: &[String]) -> Self {
        let mut text = String::new();
        let mut starts = Vec::with_capacity(paragraphs.len());
        for (index, paragraph) in paragraphs.iter().enumerate() {
            starts.push(text.len());
            text.push_str(paragraph);
            if index + 1 != paragraphs.len() {
                text.push('\n');
            }
        }
        Self { text, starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn paragraph_count(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Paragraph index owning the given byte offset, clamped to the
    /// story's bounds.
    pub fn paragraph_at(&self, offset: usize) -> usize {
        if self.starts.is_empty() {
            return 0;
        }
        let index = self.starts.partition_point(|start| *start <= offset);
        index.saturating_sub(1)
    }

    /// Inclusive paragraph range covering `start..end`. A span touching a
    /// single paragraph yields `start == end`.
    pub fn paragraph_range(&self, start: usize, end: usize) -> (usize, usize) {
        let last = end.saturating_sub(1).max(start);
        (self.paragraph_at(start), self.paragraph_at(last))
    }
}
