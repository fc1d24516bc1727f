/// Source transcript addressed by code-point offsets.
///
/// The recognizer reports character offsets, not byte offsets, so every
/// slice goes through the byte table built here.
pub struct SourceText<'a> {
    text: &'a str,
    /// Byte offset of every char, plus one trailing entry for `text.len()`.
    boundaries: Vec<usize>,
}

impl<'a> SourceText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Substring between two char offsets, clamped to the text.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.len());
        let start = start.min(end);
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }

    /// Span text as the pipeline stores it: trimmed, sub-word markers removed.
    pub fn span_text(&self, start: usize, end: usize) -> String {
        clean_fragment(self.slice(start, end))
    }
}

/// Strip surrounding whitespace and WordPiece continuation markers.
pub fn clean_fragment(fragment: &str) -> String {
    fragment.trim().replace("##", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_by_char_offsets() {
        let source = SourceText::new("I’m fine, neck pain");
        assert_eq!(source.len(), 19);
        assert_eq!(source.slice(0, 3), "I’m");
        assert_eq!(source.slice(10, 14), "neck");
    }

    #[test]
    fn test_slice_clamps_out_of_range() {
        let source = SourceText::new("pain");
        assert_eq!(source.slice(2, 40), "in");
        assert_eq!(source.slice(9, 12), "");
    }

    #[test]
    fn test_span_text_cleans_fragments() {
        let source = SourceText::new("a  ##ache ");
        assert_eq!(source.span_text(1, 10), "ache");
        assert_eq!(clean_fragment(" back##ache "), "backache");
    }
}
