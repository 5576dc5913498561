//! Sync session coordinator
//!
//! A [`SyncSession`] owns everything for one playback screen: the clock,
//! the paragraph and timing table, the active chunk and the effect state.
//! It is advanced by calling [`SyncSession::tick`] on a fixed interval; each
//! tick runs to completion and is safe to skip or repeat.

use crate::clock::{PlaybackClock, SystemTimeSource, TimeSource};
use crate::effects::{self, EffectController, EffectSettings, EffectTransition};
use crate::error::{EngineError, EngineResult};
use crate::events::{SessionEvent, SessionSnapshot};
use crate::provider::{StoryData, StoryDataProvider};
use crate::resolver;
use crate::styling::StyledParagraph;
use readalong_core::{ChunkTable, EffectTag, GapPolicy, SessionId, SessionState, StoryKey};
use std::sync::Arc;
use std::time::Duration;

/// Session behaviour settings
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Period of the recurring tick
    pub tick_interval: Duration,
    pub gap_policy: GapPolicy,
    /// How long the completion banner stays up
    pub completion_dismiss: Duration,
    /// Start playing as soon as loading succeeds
    pub auto_play: bool,
    pub effects: EffectSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            gap_policy: GapPolicy::ExplicitClear,
            completion_dismiss: Duration::from_millis(3000),
            auto_play: false,
            effects: EffectSettings::default(),
        }
    }
}

/// Coordinator for one story playback
pub struct SyncSession {
    id: SessionId,
    config: SessionConfig,
    clock: Box<dyn PlaybackClock>,
    time: Arc<dyn TimeSource>,
    state: SessionState,
    generation: u64,
    key: Option<StoryKey>,
    paragraph: Option<String>,
    table: ChunkTable,
    highlighting: bool,
    active_index: Option<usize>,
    last_sampled_time: Option<f64>,
    styled: StyledParagraph,
    effects: EffectController,
    completion_shown_at: Option<Duration>,
    failure: Option<String>,
    events: Vec<SessionEvent>,
}

impl SyncSession {
    /// Creates an idle session reading wall time
    pub fn new(clock: Box<dyn PlaybackClock>, config: SessionConfig) -> Self {
        Self::with_time_source(clock, config, Arc::new(SystemTimeSource::new()))
    }

    /// Creates an idle session with an explicit time source for timers
    pub fn with_time_source(
        clock: Box<dyn PlaybackClock>,
        config: SessionConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let effects = EffectController::new(config.effects.clone());
        Self {
            id: SessionId::new(),
            config,
            clock,
            time,
            state: SessionState::Idle,
            generation: 0,
            key: None,
            paragraph: None,
            table: ChunkTable::empty(),
            highlighting: false,
            active_index: None,
            last_sampled_time: None,
            styled: StyledParagraph::default(),
            effects,
            completion_shown_at: None,
            failure: None,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn key(&self) -> Option<&StoryKey> {
        self.key.as_ref()
    }

    pub fn paragraph(&self) -> Option<&str> {
        self.paragraph.as_deref()
    }

    pub fn table(&self) -> &ChunkTable {
        &self.table
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn last_sampled_time(&self) -> Option<f64> {
        self.last_sampled_time
    }

    pub fn styled(&self) -> &StyledParagraph {
        &self.styled
    }

    /// False when the timing data or paragraph is unavailable
    pub fn highlighting_enabled(&self) -> bool {
        self.highlighting
    }

    pub fn effect(&self) -> Option<&EffectTag> {
        self.effects.current()
    }

    pub fn is_emitting(&self) -> bool {
        self.effects.is_emitting()
    }

    pub fn completion_visible(&self) -> bool {
        self.completion_shown_at.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn position(&self) -> f64 {
        self.clock.current_position()
    }

    /// Clock length in seconds, if the clock knows it
    pub fn duration(&self) -> Option<f64> {
        self.clock.duration()
    }

    /// Incremented on every teardown
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while the session hasn't been torn down since `generation`
    pub fn is_live(&self, generation: u64) -> bool {
        self.generation == generation && self.state != SessionState::Idle
    }

    /// Starts loading `key`
    pub fn select(&mut self, key: StoryKey) -> EngineResult<()> {
        if self.state != SessionState::Idle {
            return Err(EngineError::invalid_transition("select a story", self.state));
        }
        log::info!("Session {}: loading {}", self.id, key);
        self.key = Some(key);
        self.transition_to(SessionState::Loading);
        Ok(())
    }

    /// Applies the provider's answer for the selection being loaded
    ///
    /// Missing audio leaves the session in `Error` with the paragraph still
    /// published unhighlighted. Missing text leaves it `Ready` with
    /// highlighting disabled.
    pub fn finish_loading(&mut self, result: EngineResult<StoryData>) -> EngineResult<()> {
        if self.state != SessionState::Loading {
            return Err(EngineError::invalid_transition("finish loading", self.state));
        }

        let data = match result {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Session {}: load failed: {}", self.id, e);
                self.fail(e.to_string());
                return Ok(());
            }
        };

        self.install_text(&data);

        let audio_loaded = match data.audio.as_deref() {
            Some(resource) => match self.clock.load(resource) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Session {}: audio {} unusable: {}", self.id, resource, e);
                    false
                }
            },
            None => false,
        };

        if !audio_loaded {
            self.highlighting = false;
            self.rebuild_styled();
            let resource = data.key.resource_name();
            self.fail(EngineError::ResourceMissing(format!("audio for {}", resource)).to_string());
            return Ok(());
        }

        if !self.highlighting {
            log::warn!(
                "Session {}: no timing data for {}, highlighting disabled",
                self.id,
                data.key
            );
        }

        self.transition_to(SessionState::Ready);
        if self.config.auto_play {
            self.play()?;
        }
        Ok(())
    }

    /// Selects `key` and loads it from `provider`
    pub fn load(&mut self, key: StoryKey, provider: &dyn StoryDataProvider) -> EngineResult<()> {
        self.select(key.clone())?;
        let result = provider.load(&key);
        self.finish_loading(result)
    }

    pub fn play(&mut self) -> EngineResult<()> {
        if !matches!(self.state, SessionState::Ready | SessionState::Paused) {
            return Err(EngineError::invalid_transition("play", self.state));
        }
        self.clock.play()?;
        self.transition_to(SessionState::Playing);
        self.tick();
        Ok(())
    }

    pub fn pause(&mut self) -> EngineResult<()> {
        if self.state != SessionState::Playing {
            return Err(EngineError::invalid_transition("pause", self.state));
        }
        self.clock.pause();
        self.transition_to(SessionState::Paused);
        self.update_effects();
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) -> EngineResult<()> {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Ready | SessionState::Paused => self.play(),
            state => Err(EngineError::invalid_transition("toggle playback", state)),
        }
    }

    /// Rewinds to the beginning and returns to `Ready`
    pub fn stop(&mut self) -> EngineResult<()> {
        if !matches!(
            self.state,
            SessionState::Ready | SessionState::Playing | SessionState::Paused | SessionState::Finished
        ) {
            return Err(EngineError::invalid_transition("stop", self.state));
        }
        self.rewind();
        self.transition_to(SessionState::Ready);
        Ok(())
    }

    /// Re-arms a finished session
    pub fn restart(&mut self) -> EngineResult<()> {
        if self.state != SessionState::Finished {
            return Err(EngineError::invalid_transition("restart", self.state));
        }
        self.rewind();
        self.transition_to(SessionState::Ready);
        Ok(())
    }

    /// Tears the session down: stops the clock, clears all story state and
    /// returns to `Idle`. Ticks scheduled before this are ignored.
    pub fn dismiss(&mut self) {
        self.clock.stop();
        let stopped = self.effects.reset();
        self.push_effect(stopped);
        self.generation += 1;
        self.key = None;
        self.paragraph = None;
        self.table = ChunkTable::empty();
        self.highlighting = false;
        self.set_active(None);
        self.styled = StyledParagraph::default();
        self.last_sampled_time = None;
        self.completion_shown_at = None;
        self.failure = None;
        if self.state != SessionState::Idle {
            log::info!("Session {}: dismissed", self.id);
            self.transition_to(SessionState::Idle);
        }
    }

    /// Samples the clock and republishes what changed
    ///
    /// Returns true when the published state changed. Outside `Playing`
    /// the only work done is timing out the completion banner.
    pub fn tick(&mut self) -> bool {
        let events_before = self.events.len();

        match self.state {
            SessionState::Playing => self.tick_playing(),
            SessionState::Finished => self.expire_completion(),
            _ => {}
        }

        self.events.len() != events_before
    }

    /// Takes the events queued since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            position: self.clock.current_position(),
            active_index: self.active_index,
            styled: self.styled.clone(),
            highlighting_enabled: self.highlighting,
            effect: self.effects.current().cloned(),
            emitting: self.effects.is_emitting(),
            birth_rate: self.config.effects.birth_rate,
            completion_visible: self.completion_visible(),
            failure: self.failure.clone(),
        }
    }

    fn tick_playing(&mut self) {
        if self.clock.take_completion() {
            self.complete();
            return;
        }

        let time = self.clock.current_position();
        let mut hint = self.active_index;
        if let Some(previous) = self.last_sampled_time {
            if time < previous {
                log::debug!(
                    "Session {}: clock went back from {:.3}s to {:.3}s",
                    self.id,
                    previous,
                    time
                );
                hint = None;
            }
        }
        self.last_sampled_time = Some(time);

        let resolved = if self.highlighting {
            resolver::resolve_with_policy(time, &self.table, hint, self.config.gap_policy)
        } else {
            None
        };
        log::trace!("Session {}: t={:.3}s -> {:?}", self.id, time, resolved);

        self.set_active(resolved);
        self.update_effects();
    }

    fn complete(&mut self) {
        log::info!("Session {}: story complete", self.id);
        self.set_active(None);
        self.last_sampled_time = Some(self.clock.current_position());
        self.transition_to(SessionState::Finished);
        self.update_effects();
        self.completion_shown_at = Some(self.time.now());
        self.events.push(SessionEvent::StoryComplete);
    }

    fn expire_completion(&mut self) {
        let Some(shown_at) = self.completion_shown_at else {
            return;
        };
        if self.time.now().saturating_sub(shown_at) >= self.config.completion_dismiss {
            self.completion_shown_at = None;
            self.events.push(SessionEvent::CompletionDismissed);
        }
    }

    fn rewind(&mut self) {
        self.clock.stop();
        let stopped = self.effects.reset();
        self.push_effect(stopped);
        self.set_active(None);
        self.last_sampled_time = None;
        self.completion_shown_at = None;
    }

    fn fail(&mut self, reason: String) {
        self.failure = Some(reason);
        self.transition_to(SessionState::Error);
    }

    fn install_text(&mut self, data: &StoryData) {
        self.paragraph = data.paragraph.clone();
        self.table = ChunkTable::empty();
        self.highlighting = false;

        if let (Some(paragraph), Some(table)) = (data.paragraph.as_deref(), data.table.as_ref()) {
            for issue in table.validate(paragraph) {
                log::warn!("{}: {}", data.key, issue);
            }
            self.table = table.sanitized();
            self.highlighting = !self.table.is_empty();
        }

        self.rebuild_styled();
    }

    fn set_active(&mut self, index: Option<usize>) {
        if index == self.active_index {
            return;
        }
        let previous = std::mem::replace(&mut self.active_index, index);
        self.rebuild_styled();
        self.events.push(SessionEvent::ActiveChunkChanged {
            previous,
            current: index,
        });
    }

    fn rebuild_styled(&mut self) {
        self.styled = match self.paragraph.as_deref() {
            Some(paragraph) if self.highlighting => {
                StyledParagraph::build(paragraph, &self.table, self.active_index)
            }
            Some(paragraph) => StyledParagraph::plain(paragraph),
            None => StyledParagraph::default(),
        };
    }

    fn update_effects(&mut self) {
        let desired = if self.highlighting {
            effects::decide(self.active_index, &self.table, self.state.is_playing())
                .and_then(|tag| self.active_index.map(|index| (index, tag)))
        } else {
            None
        };
        let transition = self.effects.update(desired, self.time.now());
        self.push_effect(transition);
    }

    fn push_effect(&mut self, transition: Option<EffectTransition>) {
        match transition {
            Some(EffectTransition::Started(tag)) => {
                log::debug!("Session {}: effect {} started", self.id, tag);
                self.events.push(SessionEvent::EffectStarted(tag));
            }
            Some(EffectTransition::Stopped { tag, reason }) => {
                log::debug!("Session {}: effect {} stopped ({})", self.id, tag, reason);
                self.events.push(SessionEvent::EffectStopped { tag, reason });
            }
            None => {}
        }
    }

    fn transition_to(&mut self, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        log::info!("Session {}: {} -> {}", self.id, from, to);
        self.state = to;
        self.events.push(SessionEvent::StateChanged { from, to });
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("key", &self.key)
            .field("active_index", &self.active_index)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
