//! Story, character and selection key types

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the bundled `stories.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryContent {
    pub id: u32,
    #[serde(rename = "fullText")]
    pub full_text: String,
}

/// Selectable narrator characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Elsa,
    Spiderman,
    Blossom,
    Hulk,
}

impl Character {
    pub const ALL: [Character; 4] = [
        Character::Elsa,
        Character::Spiderman,
        Character::Blossom,
        Character::Hulk,
    ];

    /// Voice key used to name the character's audio and timing resources
    pub fn voice(&self) -> &'static str {
        match self {
            Character::Elsa => "elsa",
            Character::Spiderman => "spiderman",
            Character::Blossom => "blossom",
            Character::Hulk => "hulk",
        }
    }

    pub fn from_voice(voice: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.voice().eq_ignore_ascii_case(voice.trim()))
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.voice())
    }
}

/// Identifies one (story, character voice) selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryKey {
    pub story_id: u32,
    pub voice: String,
}

impl StoryKey {
    pub fn new(story_id: u32, voice: impl Into<String>) -> Self {
        Self {
            story_id,
            voice: voice.into(),
        }
    }

    pub fn for_character(story_id: u32, character: Character) -> Self {
        Self::new(story_id, character.voice())
    }

    /// Base name shared by the audio and timing files, e.g. `girl_story3`
    pub fn resource_name(&self) -> String {
        format!("{}_story{}", self.voice, self.story_id)
    }
}

impl fmt::Display for StoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "story {} ({})", self.story_id, self.voice)
    }
}
