//! Story and timing data providers
//!
//! A provider turns a [`StoryKey`] into the paragraph, chunk table and audio
//! locator for that selection. Missing parts are reported as `None` so the
//! session can degrade instead of failing outright.

use crate::error::{EngineError, EngineResult};
use readalong_core::{ChunkTable, StoryContent, StoryKey};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Audio file extensions probed, in order
pub const AUDIO_EXTENSIONS: [&str; 2] = ["mp3", "m4a"];

/// Everything known about one story/voice selection
#[derive(Debug, Clone, PartialEq)]
pub struct StoryData {
    pub key: StoryKey,
    pub paragraph: Option<String>,
    pub table: Option<ChunkTable>,
    /// Locator handed to the playback clock
    pub audio: Option<String>,
}

impl StoryData {
    /// Complete data set
    pub fn new(
        key: StoryKey,
        paragraph: impl Into<String>,
        table: ChunkTable,
        audio: impl Into<String>,
    ) -> Self {
        Self {
            key,
            paragraph: Some(paragraph.into()),
            table: Some(table),
            audio: Some(audio.into()),
        }
    }

    /// True when both paragraph and timing table are present
    pub fn has_text(&self) -> bool {
        self.paragraph.is_some() && self.table.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Source of story data
pub trait StoryDataProvider: Send + Sync {
    /// Loads whatever exists for `key`
    ///
    /// Fails with [`EngineError::ResourceMissing`] when nothing at all is
    /// available for the selection.
    fn load(&self, key: &StoryKey) -> EngineResult<StoryData>;
}

/// Reads the bundled data layout from a directory
///
/// ```text
/// <root>/stories.json                 [{"id": 1, "fullText": "..."}]
/// <root>/chunks/<voice>_story<id>.json
/// <root>/audio/<voice>_story<id>.mp3  (or .m4a)
/// ```
#[derive(Debug, Clone)]
pub struct JsonStoryProvider {
    root: PathBuf,
}

impl JsonStoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stories_path(&self) -> PathBuf {
        self.root.join("stories.json")
    }

    pub fn chunks_path(&self, key: &StoryKey) -> PathBuf {
        self.root
            .join("chunks")
            .join(format!("{}.json", key.resource_name()))
    }

    /// First existing audio file for `key`
    pub fn audio_path(&self, key: &StoryKey) -> Option<PathBuf> {
        let dir = self.root.join("audio");
        AUDIO_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", key.resource_name(), ext)))
            .find(|path| path.is_file())
    }

    /// Reads the story catalogue
    pub fn stories(&self) -> EngineResult<Vec<StoryContent>> {
        read_json(&self.stories_path())
    }

    /// Reads the raw chunk table without sanitizing it
    pub fn chunk_table(&self, key: &StoryKey) -> EngineResult<ChunkTable> {
        read_json(&self.chunks_path(key))
    }

    fn paragraph(&self, story_id: u32) -> EngineResult<Option<String>> {
        match self.stories() {
            Ok(stories) => Ok(stories
                .into_iter()
                .find(|s| s.id == story_id)
                .map(|s| s.full_text)),
            Err(EngineError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No story catalogue at {}", self.stories_path().display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl StoryDataProvider for JsonStoryProvider {
    fn load(&self, key: &StoryKey) -> EngineResult<StoryData> {
        let paragraph = match self.paragraph(key.story_id) {
            Ok(paragraph) => paragraph,
            Err(e) => {
                log::warn!("Story catalogue unreadable: {}", e);
                None
            }
        };

        let table = match self.chunk_table(key) {
            Ok(table) => Some(table),
            Err(e) => {
                log::warn!("No usable timing data for {}: {}", key, e);
                None
            }
        };

        let audio = self
            .audio_path(key)
            .map(|path| path.to_string_lossy().into_owned());
        if audio.is_none() {
            log::warn!("No audio for {} in {}", key, self.root.display());
        }

        if paragraph.is_none() && audio.is_none() {
            return Err(EngineError::ResourceMissing(key.resource_name()));
        }

        Ok(StoryData {
            key: key.clone(),
            paragraph,
            table,
            audio,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| EngineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Provider backed by a map, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    stories: HashMap<StoryKey, StoryData>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data: StoryData) {
        self.stories.insert(data.key.clone(), data);
    }

    pub fn with(mut self, data: StoryData) -> Self {
        self.insert(data);
        self
    }
}

impl StoryDataProvider for InMemoryProvider {
    fn load(&self, key: &StoryKey) -> EngineResult<StoryData> {
        self.stories
            .get(key)
            .cloned()
            .ok_or(EngineError::StoryNotFound(key.story_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readalong_core::TextChunk;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "stories.json",
            r#"[{"id": 1, "fullText": "Hello world"}, {"id": 2, "fullText": "Second"}]"#,
        );
        write(
            dir.path(),
            "chunks/elsa_story1.json",
            r#"[{"text": "Hello", "start": 0.0, "end": 1.0, "emoji": ""},
                {"text": " world", "start": 1.0, "end": 2.5, "emoji": "🎉"}]"#,
        );
        write(dir.path(), "audio/elsa_story1.m4a", "");
        dir
    }

    #[test]
    fn test_loads_complete_selection() {
        let dir = data_dir();
        let provider = JsonStoryProvider::new(dir.path());
        let data = provider.load(&StoryKey::new(1, "elsa")).unwrap();

        assert_eq!(data.paragraph.as_deref(), Some("Hello world"));
        assert_eq!(data.table.as_ref().map(ChunkTable::len), Some(2));
        assert!(data.audio.unwrap().ends_with("elsa_story1.m4a"));
    }

    #[test]
    fn test_prefers_mp3() {
        let dir = data_dir();
        write(dir.path(), "audio/elsa_story1.mp3", "");
        let provider = JsonStoryProvider::new(dir.path());
        let path = provider.audio_path(&StoryKey::new(1, "elsa")).unwrap();
        assert_eq!(path.extension().unwrap(), "mp3");
    }

    #[test]
    fn test_text_without_audio() {
        let dir = data_dir();
        let provider = JsonStoryProvider::new(dir.path());
        let data = provider.load(&StoryKey::new(1, "hulk")).unwrap();

        assert!(data.paragraph.is_some());
        assert!(data.table.is_none());
        assert!(!data.has_audio());
        assert!(!data.has_text());
    }

    #[test]
    fn test_nothing_available() {
        let dir = data_dir();
        let provider = JsonStoryProvider::new(dir.path());
        let err = provider.load(&StoryKey::new(9, "hulk")).unwrap_err();
        assert!(err.is_resource_missing());
    }

    #[test]
    fn test_malformed_chunks_degrade_to_no_table() {
        let dir = data_dir();
        write(dir.path(), "chunks/elsa_story1.json", "{ not json");
        let provider = JsonStoryProvider::new(dir.path());

        assert!(matches!(
            provider.chunk_table(&StoryKey::new(1, "elsa")),
            Err(EngineError::Parse { .. })
        ));
        let data = provider.load(&StoryKey::new(1, "elsa")).unwrap();
        assert!(data.table.is_none());
        assert!(data.has_audio());
    }

    #[test]
    fn test_missing_catalogue() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "audio/elsa_story1.mp3", "");
        let provider = JsonStoryProvider::new(dir.path());

        assert!(provider.stories().is_err());
        let data = provider.load(&StoryKey::new(1, "elsa")).unwrap();
        assert!(data.paragraph.is_none());
        assert!(data.has_audio());
    }

    #[test]
    fn test_in_memory_provider() {
        let key = StoryKey::new(1, "elsa");
        let provider = InMemoryProvider::new().with(StoryData::new(
            key.clone(),
            "Hi",
            ChunkTable::new(vec![TextChunk::new("Hi", 0.0, 1.0)]),
            "elsa_story1",
        ));

        assert!(provider.load(&key).unwrap().has_text());
        assert!(matches!(
            provider.load(&StoryKey::new(2, "elsa")),
            Err(EngineError::StoryNotFound(2))
        ));
    }
}
