//! Playback and highlighting configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use readalong_core::GapPolicy;
use serde::{Deserialize, Serialize};

/// Shortest accepted clock sampling interval, in milliseconds
pub const MIN_TICK_INTERVAL_MS: u64 = 16;

/// Longest accepted clock sampling interval, in milliseconds
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

/// How the sync session samples the clock and reacts to narration gaps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Clock sampling interval in milliseconds
    pub tick_interval_ms: u64,

    /// Highlight behaviour between chunks
    pub gap_policy: GapPolicy,

    /// How long the "story complete" banner stays up, in milliseconds
    pub completion_dismiss_ms: u64,

    /// Start playing as soon as the story is loaded
    pub auto_play: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            gap_policy: GapPolicy::ExplicitClear,
            completion_dismiss_ms: 3000,
            auto_play: false,
        }
    }
}

impl ConfigSection for PlaybackConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.tick_interval_ms,
                MIN_TICK_INTERVAL_MS,
                MAX_TICK_INTERVAL_MS,
                "playback.tick_interval_ms",
            ),
            Validator::in_range(
                self.completion_dismiss_ms,
                500,
                30_000,
                "playback.completion_dismiss_ms",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.tick_interval_ms = other.tick_interval_ms;
        self.gap_policy = other.gap_policy;
        self.completion_dismiss_ms = other.completion_dismiss_ms;
        self.auto_play = other.auto_play;
    }

    fn section_name(&self) -> &'static str {
        "playback"
    }
}
