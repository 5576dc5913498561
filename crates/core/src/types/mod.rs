//! Domain types for ReadAlong
//!
//! This module contains all domain models organized by responsibility:
//! - `chunk`: Timed narration chunks and the timing table
//! - `story`: Stories, characters and selection keys
//! - `session`: Session identity and lifecycle state
//! - `common`: Shared traits and utilities

mod chunk;
mod common;
mod session;
mod story;

// Re-export all public types
pub use chunk::{ChunkTable, EffectTag, TextChunk, TimingIssue};
pub use common::{ClockTime, Validator};
pub use session::{GapPolicy, SessionId, SessionState};
pub use story::{Character, StoryContent, StoryKey};
