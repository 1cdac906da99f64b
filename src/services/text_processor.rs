// Text Processing Helpers
// Char-offset addressing over UTF-8 documents

/// Byte offset of every char boundary in a text, including the final `text.len()`.
///
/// Spans from the report service count chars, not bytes; slicing through this
/// index keeps multi-byte text from being cut mid-codepoint.
#[derive(Debug, Clone)]
pub struct CharIndex {
    offsets: Vec<usize>,
}

impl CharIndex {
    pub fn new(text: &str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { offsets }
    }

    /// Number of chars in the indexed text.
    pub fn len_chars(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Byte offset for a char position, clamped to the end of the text.
    pub fn byte_at(&self, char_pos: usize) -> usize {
        let pos = char_pos.min(self.len_chars());
        self.offsets[pos]
    }

    /// Slice `[start, end)` in chars; out-of-range bounds are clamped.
    pub fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        let s = self.byte_at(start);
        let e = self.byte_at(end.max(start));
        text.get(s..e).unwrap_or("")
    }
}

/// Shorten text to `max_chars` for one-line display.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}
