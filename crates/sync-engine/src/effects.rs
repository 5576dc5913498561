//! Reactive effect triggering
//!
//! [`decide`] and [`is_emitting`] are the pure gate: what effect, if any,
//! the current state calls for. [`EffectController`] turns the gate's
//! per-tick answer into start/stop edges for the renderer and enforces the
//! safety auto-stop.

use readalong_core::{ChunkTable, EffectTag};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Returns the effect the active chunk asks for, if playback is running
pub fn decide(active: Option<usize>, table: &ChunkTable, is_playing: bool) -> Option<EffectTag> {
    if !is_playing {
        return None;
    }
    active
        .and_then(|index| table.get(index))
        .and_then(|chunk| chunk.effect_tag.clone())
}

/// True exactly when [`decide`] returns a tag
pub fn is_emitting(active: Option<usize>, table: &ChunkTable, is_playing: bool) -> bool {
    is_playing
        && active
            .and_then(|index| table.get(index))
            .is_some_and(|chunk| chunk.effect_tag.is_some())
}

/// Effect settings used by the controller and passed on to renderers
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSettings {
    pub enabled: bool,
    /// Emission is stopped after this long even if the chunk is still active
    pub max_emit_duration: Duration,
    /// Particles per second for the renderer
    pub birth_rate: f32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_emit_duration: Duration::from_millis(2300),
            birth_rate: 4.0,
        }
    }
}

/// Why an emission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The gate no longer asks for an effect
    Cleared,
    /// The emission ran for the maximum duration
    TimedOut,
    /// The session was stopped or torn down
    Reset,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cleared => f.write_str("cleared"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Reset => f.write_str("reset"),
        }
    }
}

/// An edge in the emitting state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectTransition {
    Started(EffectTag),
    Stopped { tag: EffectTag, reason: StopReason },
}

#[derive(Debug, Clone)]
struct Emission {
    chunk: usize,
    tag: EffectTag,
    started_at: Duration,
}

/// Edge-triggered effect state
#[derive(Debug)]
pub struct EffectController {
    settings: EffectSettings,
    current: Option<Emission>,
    /// Chunk whose emission hit the time limit; it won't restart
    exhausted: Option<usize>,
}

impl EffectController {
    pub fn new(settings: EffectSettings) -> Self {
        Self {
            settings,
            current: None,
            exhausted: None,
        }
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    /// Tag currently being emitted
    pub fn current(&self) -> Option<&EffectTag> {
        self.current.as_ref().map(|e| &e.tag)
    }

    pub fn is_emitting(&self) -> bool {
        self.current.is_some()
    }

    /// Feeds the gate's answer for this tick
    ///
    /// `desired` is the active chunk index and the tag the gate returned for
    /// it. `now` is a monotonic timestamp. Returns a transition only when
    /// the emitting state or the emitted tag changes.
    pub fn update(
        &mut self,
        desired: Option<(usize, EffectTag)>,
        now: Duration,
    ) -> Option<EffectTransition> {
        let desired = desired.filter(|_| self.settings.enabled);

        let Some((chunk, tag)) = desired else {
            self.exhausted = None;
            return self.current.take().map(|e| EffectTransition::Stopped {
                tag: e.tag,
                reason: StopReason::Cleared,
            });
        };

        if let Some(emission) = self.current.as_mut() {
            if emission.tag != tag {
                emission.chunk = chunk;
                emission.tag = tag.clone();
                emission.started_at = now;
                return Some(EffectTransition::Started(tag));
            }

            emission.chunk = chunk;
            if now.saturating_sub(emission.started_at) >= self.settings.max_emit_duration {
                log::debug!("Effect {} reached its time limit", emission.tag);
                self.exhausted = Some(chunk);
                return self.current.take().map(|e| EffectTransition::Stopped {
                    tag: e.tag,
                    reason: StopReason::TimedOut,
                });
            }
            return None;
        }

        if self.exhausted == Some(chunk) {
            return None;
        }

        self.exhausted = None;
        self.current = Some(Emission {
            chunk,
            tag: tag.clone(),
            started_at: now,
        });
        Some(EffectTransition::Started(tag))
    }

    /// Stops any emission and forgets the time-limit memory
    pub fn reset(&mut self) -> Option<EffectTransition> {
        self.exhausted = None;
        self.current.take().map(|e| EffectTransition::Stopped {
            tag: e.tag,
            reason: StopReason::Reset,
        })
    }
}

impl Default for EffectController {
    fn default() -> Self {
        Self::new(EffectSettings::default())
    }
}
