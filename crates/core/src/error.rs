//! Error types and recovery strategies for ReadAlong
//!
//! Errors are classified in three severity tiers:
//! - **Recoverable**: handled in place without the user noticing (a rejected control)
//! - **Degraded**: a feature is switched off but the story keeps going
//!   (missing timing data, one malformed chunk, missing audio)
//! - **Fatal**: the session cannot continue (corrupted configuration)
//!
//! Each error carries a recovery action so callers can react uniformly.

use crate::types::TimingIssue;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Skip the offending item and keep using the rest
    SkipItem,
    /// Disable the failing feature and continue (e.g. highlighting)
    DisableFeature,
    /// Show the static fallback screen
    ShowFallback,
    /// Reset settings to defaults
    ResetToDefaults,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkipItem => write!(f, "Skipping item"),
            Self::DisableFeature => write!(f, "Disabling feature"),
            Self::ShowFallback => write!(f, "Showing fallback"),
            Self::ResetToDefaults => write!(f, "Resetting to defaults"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error is handled in place
    Recoverable,
    /// Feature degraded but the story continues
    Degraded,
    /// Session cannot continue
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for ReadAlong
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Missing resources =====
    /// Story text not present in the catalog
    #[error("Story not found: {story_id}")]
    StoryNotFound { story_id: u32 },

    /// Narration audio file is missing
    #[error("Audio resource missing: {resource}")]
    AudioMissing { resource: String },

    /// Timing table file is missing
    #[error("Timing data missing: {resource}")]
    TimingDataMissing { resource: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ===== Data errors =====
    /// One chunk in a timing table is unusable
    #[error("Malformed timing data at chunk {index}: {reason}")]
    MalformedTimingData { index: usize, reason: String },

    /// Bundled data file could not be parsed
    #[error("Failed to parse {path}: {reason}")]
    DataParseError { path: PathBuf, reason: String },

    // ===== Playback errors =====
    /// Platform audio primitive failed
    #[error("Audio playback error: {message}")]
    AudioPlaybackError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Control issued in a state that does not accept it
    #[error("Cannot {action} while session is {state}")]
    InvalidTransition { action: String, state: String },

    // ===== Configuration errors =====
    /// Invalid configuration
    #[error("Invalid configuration: {setting} = '{value}' ({reason})")]
    InvalidConfiguration {
        setting: String,
        value: String,
        reason: String,
    },

    /// Configuration file corrupted
    #[error("Configuration corrupted: {path}")]
    ConfigurationCorrupted { path: PathBuf },

    // ===== Generic errors =====
    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidTransition { .. } => ErrorSeverity::Recoverable,

            Self::StoryNotFound { .. }
            | Self::AudioMissing { .. }
            | Self::TimingDataMissing { .. }
            | Self::FileNotFound { .. }
            | Self::MalformedTimingData { .. }
            | Self::DataParseError { .. }
            | Self::AudioPlaybackError { .. } => ErrorSeverity::Degraded,

            Self::ConfigurationCorrupted { .. } | Self::InternalError { .. } => {
                ErrorSeverity::Fatal
            }

            _ => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::MalformedTimingData { .. } => RecoveryAction::SkipItem,
            Self::TimingDataMissing { .. } | Self::AudioPlaybackError { .. } => {
                RecoveryAction::DisableFeature
            }
            Self::StoryNotFound { .. }
            | Self::AudioMissing { .. }
            | Self::FileNotFound { .. }
            | Self::DataParseError { .. } => RecoveryAction::ShowFallback,
            Self::InvalidConfiguration { .. } | Self::ConfigurationCorrupted { .. } => {
                RecoveryAction::ResetToDefaults
            }
            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a short message suitable for the child-facing fallback screen
    pub fn user_message(&self) -> String {
        match self {
            Self::StoryNotFound { .. } => "We couldn't find this story. Let's pick another one!".to_string(),
            Self::AudioMissing { .. } | Self::AudioPlaybackError { .. } => {
                "The storyteller lost their voice. You can still read along!".to_string()
            }
            Self::TimingDataMissing { .. } | Self::MalformedTimingData { .. } => {
                "Listen along! The words won't light up this time.".to_string()
            }
            Self::FileNotFound { .. } | Self::DataParseError { .. } | Self::IoError { .. } => {
                "Something went wrong loading the story.".to_string()
            }
            Self::InvalidTransition { .. } => "Please wait a moment.".to_string(),
            Self::InvalidConfiguration { setting, .. } => {
                format!("Invalid setting: {}. Using the default.", setting)
            }
            Self::ConfigurationCorrupted { .. } => {
                "App settings are corrupted. Resetting to defaults...".to_string()
            }
            Self::InternalError { .. } => "Oops! Something unexpected happened.".to_string(),
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns true if only a feature is lost and the session continues
    pub fn is_degrading(&self) -> bool {
        self.severity() == ErrorSeverity::Degraded
    }

    /// Helper to create an audio playback error from any error type
    pub fn audio_playback<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::AudioPlaybackError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::from("unknown"),
            },
            _ => Self::IoError {
                message: err.to_string(),
                source: err,
            },
        }
    }
}

impl From<TimingIssue> for AppError {
    fn from(issue: TimingIssue) -> Self {
        let index = issue.index();
        let reason = match issue {
            TimingIssue::EmptyText { .. } => "text is empty".to_string(),
            TimingIssue::InvalidWindow { start, end, .. } => {
                format!("invalid window [{}, {})", start, end)
            }
            TimingIssue::Overlap {
                start,
                previous_end,
                ..
            } => format!("starts at {} before previous chunk ends at {}", start, previous_end),
            TimingIssue::TextNotFound { text, .. } => {
                format!("text '{}' not found in paragraph", text)
            }
        };
        Self::MalformedTimingData { index, reason }
    }
}
