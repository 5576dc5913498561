//! Core domain types and error handling for ReadAlong
//!
//! Shared by the sync engine, configuration and CLI crates.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    Character, ChunkTable, ClockTime, EffectTag, GapPolicy, SessionId, SessionState, StoryContent, StoryKey,
    TextChunk, TimingIssue, Validator,
};
