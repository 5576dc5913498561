//! Error types for sync sessions

use readalong_core::{AppError, SessionState};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while loading or driving a session
#[derive(Debug, Error)]
pub enum EngineError {
    /// Audio, timing table or paragraph could not be found
    #[error("Resource missing: {0}")]
    ResourceMissing(String),

    /// Story id is not present in the story catalogue
    #[error("Story {0} not found")]
    StoryNotFound(u32),

    /// Requested action isn't allowed from the current state
    #[error("Cannot {action} while session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },

    /// Tick driver period must be non-zero
    #[error("Invalid tick period: {0:?}")]
    InvalidTickPeriod(Duration),

    /// Audio clock failed
    #[error("Clock error: {0}")]
    Clock(String),

    /// Data file could not be parsed
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl EngineError {
    pub(crate) fn invalid_transition(action: &'static str, state: SessionState) -> Self {
        Self::InvalidTransition { action, state }
    }

    pub(crate) fn lock_poisoned() -> Self {
        Self::Custom("Lock poisoned".to_string())
    }

    /// True for errors that put a session into the fallback screen
    pub fn is_resource_missing(&self) -> bool {
        matches!(self, Self::ResourceMissing(_) | Self::StoryNotFound(_))
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ResourceMissing(resource) => AppError::AudioMissing { resource },
            EngineError::StoryNotFound(story_id) => AppError::StoryNotFound { story_id },
            EngineError::InvalidTransition { action, state } => AppError::InvalidTransition {
                action: action.to_string(),
                state: state.to_string(),
            },
            EngineError::InvalidTickPeriod(period) => AppError::InvalidConfiguration {
                setting: "playback.tick_interval_ms".to_string(),
                value: period.as_millis().to_string(),
                reason: "must be greater than zero".to_string(),
            },
            EngineError::Clock(message) => AppError::AudioPlaybackError {
                message,
                source: None,
            },
            EngineError::Parse { path, source } => AppError::DataParseError {
                path,
                reason: source.to_string(),
            },
            EngineError::Serialization(e) => AppError::DataParseError {
                path: PathBuf::from("unknown"),
                reason: e.to_string(),
            },
            EngineError::Io(e) => AppError::from(e),
            EngineError::Custom(message) => AppError::InternalError { message },
        }
    }
}
