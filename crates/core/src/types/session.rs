//! Sync session identity and lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a sync session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a SessionId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a sync session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Finished,
    Error,
}

impl SessionState {
    /// True while the audio clock should be advancing
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// States in which play/pause controls are meaningful
    pub fn accepts_playback_controls(&self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// What the highlight does while the clock sits in a gap between chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Clear the highlight until the next chunk starts
    ExplicitClear,
    /// Keep the previous chunk highlighted until the next chunk starts
    StaleHold,
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self::ExplicitClear
    }
}

impl fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitClear => f.write_str("explicit_clear"),
            Self::StaleHold => f.write_str("stale_hold"),
        }
    }
}

impl std::str::FromStr for GapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "explicit_clear" | "clear" => Ok(Self::ExplicitClear),
            "stale_hold" | "hold" => Ok(Self::StaleHold),
            other => Err(format!("unknown gap policy '{}'", other)),
        }
    }
}
