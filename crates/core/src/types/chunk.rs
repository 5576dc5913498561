//! Timed narration chunks and the chunk timing table

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::error::AppError;
use crate::types::Validator;

/// Symbolic cue for a reactive effect (usually an emoji such as "😠")
///
/// Tags are always stored trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EffectTag(String);

impl EffectTag {
    /// Parses a raw tag, trimming whitespace. Blank input means "no effect".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn deserialize_effect_tag<'de, D>(deserializer: D) -> Result<Option<EffectTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(EffectTag::parse))
}

/// One timed segment of narration
///
/// The active window is half-open: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Exact (possibly whitespace-padded) paragraph text this chunk covers
    pub text: String,
    /// Inclusive start of the active window, in seconds
    pub start: f64,
    /// Exclusive end of the active window, in seconds
    pub end: f64,
    /// Effect to run while this chunk is active
    #[serde(
        rename = "emoji",
        default,
        deserialize_with = "deserialize_effect_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub effect_tag: Option<EffectTag>,
}

impl TextChunk {
    /// Creates a chunk without an effect
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            effect_tag: None,
        }
    }

    /// Attaches an effect tag; blank tags are ignored
    pub fn with_effect(mut self, tag: &str) -> Self {
        self.effect_tag = EffectTag::parse(tag);
        self
    }

    /// Returns the chunk text without surrounding whitespace
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Checks whether `time` falls inside `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Window length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when the window is usable by the resolver
    pub fn has_valid_window(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start >= 0.0 && self.start < self.end
    }
}

impl Validator for TextChunk {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.trimmed_text().is_empty() {
            errors.push("text must not be empty".to_string());
        }
        if !self.start.is_finite() || self.start < 0.0 {
            errors.push(format!("start must be a non-negative number, got {}", self.start));
        }
        if !self.end.is_finite() || self.start >= self.end {
            errors.push(format!(
                "end must be greater than start, got [{}, {})",
                self.start, self.end
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A problem found in a timing table
///
/// None of these are fatal: the offending chunk is skipped and the rest of
/// the table is still used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingIssue {
    /// Chunk text is blank after trimming
    #[error("chunk {index}: text is empty")]
    EmptyText { index: usize },

    /// Window is negative, non-finite, or has `start >= end`
    #[error("chunk {index}: invalid window [{start}, {end})")]
    InvalidWindow { index: usize, start: f64, end: f64 },

    /// Window starts before the previous chunk ended
    #[error("chunk {index}: starts at {start} before previous chunk ends at {previous_end}")]
    Overlap {
        index: usize,
        start: f64,
        previous_end: f64,
    },

    /// Trimmed text was not found after the previous match
    #[error("chunk {index}: text '{text}' not found in paragraph")]
    TextNotFound { index: usize, text: String },
}

impl TimingIssue {
    /// Index of the chunk the issue refers to
    pub fn index(&self) -> usize {
        match self {
            Self::EmptyText { index }
            | Self::InvalidWindow { index, .. }
            | Self::Overlap { index, .. }
            | Self::TextNotFound { index, .. } => *index,
        }
    }

    /// True when the chunk is removed from the table before playback
    pub fn drops_chunk(&self) -> bool {
        matches!(self, Self::InvalidWindow { .. } | Self::Overlap { .. })
    }
}

/// Ordered, immutable list of chunks for one story/voice pairing
///
/// Cloning is cheap; the chunks are shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TextChunk>", into = "Vec<TextChunk>")]
pub struct ChunkTable {
    chunks: Arc<[TextChunk]>,
}

impl ChunkTable {
    /// Creates a table from chunks in narration order
    pub fn new(chunks: Vec<TextChunk>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    /// Creates a table with no chunks
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TextChunk> {
        self.chunks.get(index)
    }

    pub fn chunks(&self) -> &[TextChunk] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TextChunk> {
        self.chunks.iter()
    }

    /// End of the last chunk, or zero for an empty table
    pub fn narration_end(&self) -> f64 {
        self.chunks.last().map(|c| c.end).unwrap_or(0.0)
    }

    /// Checks the window invariants: valid windows, sorted, non-overlapping
    ///
    /// Text placement is checked separately against the paragraph.
    pub fn window_issues(&self) -> Vec<TimingIssue> {
        let mut issues = Vec::new();
        let mut previous_end: Option<f64> = None;

        for (index, chunk) in self.chunks.iter().enumerate() {
            if chunk.trimmed_text().is_empty() {
                issues.push(TimingIssue::EmptyText { index });
            }

            if !chunk.has_valid_window() {
                issues.push(TimingIssue::InvalidWindow {
                    index,
                    start: chunk.start,
                    end: chunk.end,
                });
                continue;
            }

            if let Some(prev) = previous_end {
                if chunk.start < prev {
                    issues.push(TimingIssue::Overlap {
                        index,
                        start: chunk.start,
                        previous_end: prev,
                    });
                    continue;
                }
            }
            previous_end = Some(chunk.end);
        }

        issues
    }

    /// Reports every problem with this table against `paragraph`
    ///
    /// Window issues come first, followed by chunks whose trimmed text can't
    /// be found at or after the end of the previous match. Chunks that
    /// [`sanitized`](Self::sanitized) would drop take no part in the text
    /// search. Never fails.
    pub fn validate(&self, paragraph: &str) -> Vec<TimingIssue> {
        let mut issues = self.window_issues();
        let dropped = Self::dropped_indices(&issues);
        let mut cursor = 0;

        for (index, chunk) in self.chunks.iter().enumerate() {
            if dropped.contains(&index) {
                continue;
            }
            let needle = chunk.trimmed_text();
            if needle.is_empty() {
                continue;
            }
            match paragraph[cursor..].find(needle) {
                Some(offset) => cursor += offset + needle.len(),
                None => issues.push(TimingIssue::TextNotFound {
                    index,
                    text: needle.to_string(),
                }),
            }
        }

        issues
    }

    /// Returns a table holding only chunks with usable, ordered windows
    ///
    /// Chunks with a degenerate window or one that overlaps the last kept
    /// chunk are dropped and logged. The result satisfies the sorted,
    /// non-overlapping invariant the resolver relies on.
    pub fn sanitized(&self) -> Self {
        let issues = self.window_issues();
        let dropped = Self::dropped_indices(&issues);
        if dropped.is_empty() {
            return self.clone();
        }

        for issue in issues.into_iter().filter(TimingIssue::drops_chunk) {
            log::warn!("Skipping {}", AppError::from(issue));
        }

        let kept: Vec<TextChunk> = self
            .chunks
            .iter()
            .enumerate()
            .filter(|(index, _)| !dropped.contains(index))
            .map(|(_, chunk)| chunk.clone())
            .collect();
        Self::new(kept)
    }

    fn dropped_indices(issues: &[TimingIssue]) -> Vec<usize> {
        issues
            .iter()
            .filter(|issue| issue.drops_chunk())
            .map(TimingIssue::index)
            .collect()
    }
}

impl Default for ChunkTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<TextChunk>> for ChunkTable {
    fn from(chunks: Vec<TextChunk>) -> Self {
        Self::new(chunks)
    }
}

impl From<ChunkTable> for Vec<TextChunk> {
    fn from(table: ChunkTable) -> Self {
        table.chunks.to_vec()
    }
}

impl<'a> IntoIterator for &'a ChunkTable {
    type Item = &'a TextChunk;
    type IntoIter = std::slice::Iter<'a, TextChunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> ChunkTable {
        ChunkTable::new(vec![
            TextChunk::new("Hello", 0.0, 1.0),
            TextChunk::new(" world", 1.0, 2.5).with_effect("🎉"),
        ])
    }

    #[test]
    fn test_effect_tag_trims_whitespace() {
        assert_eq!(EffectTag::parse(" 💪").unwrap().as_str(), "💪");
        assert!(EffectTag::parse("   ").is_none());
        assert!(EffectTag::parse("").is_none());
    }

    #[test]
    fn test_chunk_contains_is_half_open() {
        let chunk = TextChunk::new("cat", 1.0, 2.0);
        assert!(chunk.contains(1.0));
        assert!(chunk.contains(1.999));
        assert!(!chunk.contains(2.0));
        assert!(!chunk.contains(0.999));
    }

    #[test]
    fn test_chunk_validation() {
        assert!(TextChunk::new("ok", 0.0, 1.0).is_valid());

        let errors = TextChunk::new("  ", 2.0, 1.0).validate().unwrap_err();
        assert_eq!(errors.len(), 2);

        let negative = TextChunk::new("x", -1.0, 1.0);
        assert!(!negative.is_valid());
        assert!(!negative.has_valid_window());
    }

    #[test]
    fn test_deserialize_from_bundled_shape() {
        let json = r#"[
            {"text": "Hello", "start": 0.0, "end": 1.0, "emoji": ""},
            {"text": " world", "start": 1.0, "end": 2.5, "emoji": " 🎉"},
            {"text": "again", "start": 3.0, "end": 4.0},
            {"text": "bye", "start": 4.0, "end": 5.0, "emoji": null}
        ]"#;

        let table: ChunkTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.get(0).unwrap().effect_tag.is_none());
        assert_eq!(
            table.get(1).unwrap().effect_tag.as_ref().map(EffectTag::as_str),
            Some("🎉")
        );
        assert!(table.get(2).unwrap().effect_tag.is_none());
        assert!(table.get(3).unwrap().effect_tag.is_none());
    }

    #[test]
    fn test_serialize_uses_emoji_field() {
        let json = serde_json::to_string(&sample_table()).unwrap();
        assert!(json.contains("\"emoji\":\"🎉\""));
        assert!(!json.contains("effect_tag"));
    }

    #[test]
    fn test_narration_end() {
        assert_eq!(sample_table().narration_end(), 2.5);
        assert_eq!(ChunkTable::empty().narration_end(), 0.0);
    }

    #[test]
    fn test_window_issues_clean_table() {
        assert!(sample_table().window_issues().is_empty());
    }

    #[test]
    fn test_window_issues_detects_problems() {
        let table = ChunkTable::new(vec![
            TextChunk::new("a", 0.0, 2.0),
            TextChunk::new("b", 1.5, 3.0),
            TextChunk::new("c", 4.0, 4.0),
            TextChunk::new(" ", 5.0, 6.0),
        ]);

        let issues = table.window_issues();
        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[0], TimingIssue::Overlap { index: 1, .. }));
        assert!(matches!(issues[1], TimingIssue::InvalidWindow { index: 2, .. }));
        assert!(matches!(issues[2], TimingIssue::EmptyText { index: 3 }));
    }

    #[test]
    fn test_validate_against_paragraph() {
        let table = ChunkTable::new(vec![
            TextChunk::new("cat", 0.0, 1.0),
            TextChunk::new("dog", 1.0, 2.0),
            TextChunk::new(" cat ", 2.0, 3.0),
        ]);

        assert!(table.validate("cat sat cat ran").len() == 1);
        assert!(matches!(
            table.validate("cat sat cat ran")[0],
            TimingIssue::TextNotFound { index: 1, .. }
        ));
        assert!(sample_table().validate("Hello world 🎉").is_empty());
    }

    #[test]
    fn test_validate_searches_forward_only() {
        let table = ChunkTable::new(vec![
            TextChunk::new("ran", 0.0, 1.0),
            TextChunk::new("cat", 1.0, 2.0),
        ]);

        let issues = table.validate("cat ran");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].index(), 1);
    }

    #[test]
    fn test_sanitized_drops_bad_windows() {
        let table = ChunkTable::new(vec![
            TextChunk::new("a", 0.0, 2.0),
            TextChunk::new("b", 1.5, 3.0),
            TextChunk::new("c", 4.0, 3.0),
            TextChunk::new("d", 4.0, 5.0),
        ]);

        let clean = table.sanitized();
        let texts: Vec<&str> = clean.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "d"]);
        assert!(clean.window_issues().is_empty());
    }

    #[test]
    fn test_validate_ignores_dropped_chunks() {
        let table = ChunkTable::new(vec![
            TextChunk::new("cat", 0.0, 1.0),
            TextChunk::new("cat", 3.0, 2.0),
            TextChunk::new("cat", 0.5, 1.5),
            TextChunk::new("cat", 2.0, 3.0),
        ]);
        let paragraph = "cat sat cat ran";

        let issues = table.validate(paragraph);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(TimingIssue::drops_chunk));

        let clean = table.sanitized();
        assert_eq!(clean.len(), 2);
        assert!(clean.validate(paragraph).is_empty());
    }

    #[test]
    fn test_sanitized_keeps_clean_table() {
        let table = sample_table();
        assert_eq!(table.sanitized(), table);
    }

    #[test]
    fn test_issue_index() {
        let issue = TimingIssue::TextNotFound {
            index: 7,
            text: "cat".to_string(),
        };
        assert_eq!(issue.index(), 7);
        assert!(issue.to_string().contains("cat"));
    }
}
