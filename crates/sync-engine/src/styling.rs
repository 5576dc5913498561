//! Styled paragraph construction
//!
//! Splits the paragraph into contiguous ranges, marking the active chunk's
//! text so the presentation layer can render it differently.

use readalong_core::ChunkTable;
use serde::Serialize;

/// How a range of the paragraph should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeStyle {
    Normal,
    Active,
}

/// A contiguous slice of the paragraph
///
/// `start` and `end` are byte offsets into the paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledRange {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub style: RangeStyle,
}

impl StyledRange {
    pub fn is_active(&self) -> bool {
        self.style == RangeStyle::Active
    }
}

/// The paragraph split into styled ranges that cover it without gaps
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StyledParagraph {
    ranges: Vec<StyledRange>,
}

impl StyledParagraph {
    /// Builds the ranges for `paragraph` with chunk `active` highlighted
    ///
    /// Chunks are located with a single forward cursor, so repeated words
    /// resolve to successive occurrences. A chunk whose trimmed text is empty
    /// or not found after the cursor is skipped and leaves the cursor where
    /// it was. Pure: the same inputs always give the same ranges.
    pub fn build(paragraph: &str, table: &ChunkTable, active: Option<usize>) -> Self {
        let mut builder = RangeBuilder::new(paragraph);
        let mut cursor = 0;

        for (index, chunk) in table.iter().enumerate() {
            let needle = chunk.trimmed_text();
            if needle.is_empty() {
                log::debug!("Chunk {} has no text, skipping", index);
                continue;
            }

            let Some(offset) = paragraph[cursor..].find(needle) else {
                log::debug!(
                    "Chunk {} ('{}') not found after byte {}, skipping",
                    index,
                    needle,
                    cursor
                );
                continue;
            };

            let found = cursor + offset;
            builder.push(cursor, found, RangeStyle::Normal);

            let style = if active == Some(index) {
                RangeStyle::Active
            } else {
                RangeStyle::Normal
            };
            cursor = found + needle.len();
            builder.push(found, cursor, style);
        }

        builder.push(cursor, paragraph.len(), RangeStyle::Normal);
        builder.finish()
    }

    /// Paragraph with nothing highlighted
    pub fn plain(paragraph: &str) -> Self {
        let mut builder = RangeBuilder::new(paragraph);
        builder.push(0, paragraph.len(), RangeStyle::Normal);
        builder.finish()
    }

    pub fn ranges(&self) -> &[StyledRange] {
        &self.ranges
    }

    pub fn into_ranges(self) -> Vec<StyledRange> {
        self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StyledRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Concatenation of every range; equals the source paragraph
    pub fn plain_text(&self) -> String {
        self.ranges.iter().map(|r| r.text.as_str()).collect()
    }

    /// Text of the highlighted range, if any
    pub fn active_text(&self) -> Option<&str> {
        self.ranges
            .iter()
            .find(|r| r.is_active())
            .map(|r| r.text.as_str())
    }
}

impl<'a> IntoIterator for &'a StyledParagraph {
    type Item = &'a StyledRange;
    type IntoIter = std::slice::Iter<'a, StyledRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

/// Appends ranges, dropping empty ones and merging adjacent normal text
struct RangeBuilder<'a> {
    paragraph: &'a str,
    ranges: Vec<StyledRange>,
}

impl<'a> RangeBuilder<'a> {
    fn new(paragraph: &'a str) -> Self {
        Self {
            paragraph,
            ranges: Vec::new(),
        }
    }

    fn push(&mut self, start: usize, end: usize, style: RangeStyle) {
        if start >= end {
            return;
        }

        if style == RangeStyle::Normal {
            if let Some(last) = self.ranges.last_mut() {
                if last.style == RangeStyle::Normal && last.end == start {
                    last.end = end;
                    last.text.push_str(&self.paragraph[start..end]);
                    return;
                }
            }
        }

        self.ranges.push(StyledRange {
            start,
            end,
            text: self.paragraph[start..end].to_string(),
            style,
        });
    }

    fn finish(self) -> StyledParagraph {
        StyledParagraph {
            ranges: self.ranges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readalong_core::TextChunk;

    fn assert_covers(styled: &StyledParagraph, paragraph: &str) {
        assert_eq!(styled.plain_text(), paragraph);
        let mut expected_start = 0;
        for range in styled {
            assert_eq!(range.start, expected_start);
            assert!(range.end > range.start);
            assert_eq!(&paragraph[range.start..range.end], range.text);
            expected_start = range.end;
        }
        assert_eq!(expected_start, paragraph.len());
    }

    #[test]
    fn test_hello_world_active_first() {
        let table = ChunkTable::new(vec![
            TextChunk::new("Hello", 0.0, 1.0),
            TextChunk::new(" world", 1.0, 2.5).with_effect("🎉"),
        ]);

        let styled = StyledParagraph::build("Hello world", &table, Some(0));
        assert_eq!(styled.len(), 2);
        assert_eq!(styled.ranges()[0].text, "Hello");
        assert_eq!(styled.ranges()[0].style, RangeStyle::Active);
        assert_eq!(styled.ranges()[1].text, " world");
        assert_eq!(styled.ranges()[1].style, RangeStyle::Normal);
    }

    #[test]
    fn test_hello_world_active_second() {
        let table = ChunkTable::new(vec![
            TextChunk::new("Hello", 0.0, 1.0),
            TextChunk::new(" world", 1.0, 2.5),
        ]);

        let styled = StyledParagraph::build("Hello world", &table, Some(1));
        let parts: Vec<(&str, RangeStyle)> = styled
            .iter()
            .map(|r| (r.text.as_str(), r.style))
            .collect();
        assert_eq!(
            parts,
            vec![("Hello ", RangeStyle::Normal), ("world", RangeStyle::Active)]
        );
        assert_eq!(styled.active_text(), Some("world"));
    }

    #[test]
    fn test_duplicate_words_resolve_in_order() {
        let paragraph = "cat sat cat ran";
        let table = ChunkTable::new(vec![
            TextChunk::new("cat", 0.0, 1.0),
            TextChunk::new("sat", 1.0, 2.0),
            TextChunk::new("cat", 2.0, 3.0),
            TextChunk::new("ran", 3.0, 4.0),
        ]);

        let styled = StyledParagraph::build(paragraph, &table, Some(2));
        let active = styled.iter().find(|r| r.is_active()).unwrap();
        assert_eq!(active.start, 8);
        assert_eq!(active.end, 11);
        assert_covers(&styled, paragraph);
    }

    #[test]
    fn test_missing_chunk_is_skipped() {
        let paragraph = "The fox jumped";
        let table = ChunkTable::new(vec![
            TextChunk::new("The", 0.0, 1.0),
            TextChunk::new("dog", 1.0, 2.0),
            TextChunk::new("jumped", 2.0, 3.0),
        ]);

        let styled = StyledParagraph::build(paragraph, &table, Some(2));
        assert_eq!(styled.active_text(), Some("jumped"));
        assert_covers(&styled, paragraph);

        let skipped = StyledParagraph::build(paragraph, &table, Some(1));
        assert_eq!(skipped.active_text(), None);
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn test_no_active_chunk_is_single_normal_range() {
        let table = ChunkTable::new(vec![TextChunk::new("Hi", 0.0, 1.0)]);
        let styled = StyledParagraph::build("Hi there", &table, None);
        assert_eq!(styled, StyledParagraph::plain("Hi there"));
        assert_eq!(styled.len(), 1);
    }

    #[test]
    fn test_whitespace_padded_chunks_and_multibyte_text() {
        let paragraph = "Ready? 🚀 Go!";
        let table = ChunkTable::new(vec![
            TextChunk::new("  Ready? ", 0.0, 1.0),
            TextChunk::new(" 🚀 ", 1.0, 2.0),
            TextChunk::new("Go!", 2.0, 3.0),
        ]);

        for active in [None, Some(0), Some(1), Some(2), Some(9)] {
            assert_covers(&StyledParagraph::build(paragraph, &table, active), paragraph);
        }
        assert_eq!(
            StyledParagraph::build(paragraph, &table, Some(1)).active_text(),
            Some("🚀")
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let table = ChunkTable::new(vec![
            TextChunk::new("a", 0.0, 1.0),
            TextChunk::new("b", 1.0, 2.0),
        ]);
        let first = StyledParagraph::build("a b c", &table, Some(1));
        let second = StyledParagraph::build("a b c", &table, Some(1));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_paragraph() {
        let table = ChunkTable::new(vec![TextChunk::new("x", 0.0, 1.0)]);
        let styled = StyledParagraph::build("", &table, Some(0));
        assert!(styled.is_empty());
        assert_eq!(styled.plain_text(), "");
    }
}
