//! Notifications and published state for the presentation layer

use crate::effects::StopReason;
use crate::styling::StyledParagraph;
use readalong_core::{EffectTag, SessionState};
use serde::Serialize;

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    ActiveChunkChanged {
        previous: Option<usize>,
        current: Option<usize>,
    },
    EffectStarted(EffectTag),
    EffectStopped {
        tag: EffectTag,
        reason: StopReason,
    },
    /// Narration reached its end; show the completion banner
    StoryComplete,
    /// The completion banner timed out
    CompletionDismissed,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub position: f64,
    pub active_index: Option<usize>,
    pub styled: StyledParagraph,
    pub highlighting_enabled: bool,
    pub effect: Option<EffectTag>,
    pub emitting: bool,
    pub birth_rate: f32,
    pub completion_visible: bool,
    /// Reason shown on the fallback screen when the session is in `Error`
    pub failure: Option<String>,
}

impl SessionSnapshot {
    pub fn active_text(&self) -> Option<&str> {
        self.styled.active_text()
    }
}
