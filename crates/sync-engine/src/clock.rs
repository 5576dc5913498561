//! Playback clock abstraction
//!
//! The session reads narration time from a [`PlaybackClock`]. Real audio
//! backends implement it on top of the platform player; [`SimulatedClock`]
//! advances with a [`TimeSource`] and is used by the terminal player and
//! the tests.

use crate::error::{EngineError, EngineResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Audio player as seen by the session
pub trait PlaybackClock: Send {
    /// Prepares the named audio resource; resets position to zero
    fn load(&mut self, resource: &str) -> EngineResult<()>;

    fn play(&mut self) -> EngineResult<()>;

    fn pause(&mut self);

    /// Pauses and rewinds to zero
    fn stop(&mut self);

    /// Current position in seconds
    fn current_position(&self) -> f64;

    fn is_playing(&self) -> bool;

    /// Returns true once when playback reaches the end of the audio
    fn take_completion(&mut self) -> bool;

    /// Total length in seconds, if known
    fn duration(&self) -> Option<f64> {
        None
    }
}

/// Monotonic time since an arbitrary origin
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock time source
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced time source; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    nanos: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos
            .fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.nanos.store(to.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Clock that plays a virtual track of known length
pub struct SimulatedClock {
    time: Arc<dyn TimeSource>,
    duration: f64,
    speed: f64,
    loaded: Option<String>,
    /// Position at the moment playback last started or paused
    base_position: f64,
    playing_since: Option<Duration>,
    completion_reported: bool,
}

impl SimulatedClock {
    pub fn new(duration: f64, time: Arc<dyn TimeSource>) -> Self {
        Self {
            time,
            duration: duration.max(0.0),
            speed: 1.0,
            loaded: None,
            base_position: 0.0,
            playing_since: None,
            completion_reported: false,
        }
    }

    /// Clock running against wall time
    pub fn realtime(duration: f64) -> Self {
        Self::new(duration, Arc::new(SystemTimeSource::new()))
    }

    /// Playback rate; non-positive or non-finite values are ignored
    pub fn with_speed(mut self, speed: f64) -> Self {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed;
        }
        self
    }

    pub fn loaded_resource(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    /// Jumps to `position`, clamped to the track
    pub fn seek(&mut self, position: f64) {
        let position = if position.is_finite() {
            position.clamp(0.0, self.duration)
        } else {
            0.0
        };
        self.base_position = position;
        if self.playing_since.is_some() {
            self.playing_since = Some(self.time.now());
        }
        self.completion_reported = false;
    }

    fn raw_position(&self) -> f64 {
        match self.playing_since {
            Some(since) => {
                let elapsed = self.time.now().saturating_sub(since).as_secs_f64();
                self.base_position + elapsed * self.speed
            }
            None => self.base_position,
        }
    }
}

impl PlaybackClock for SimulatedClock {
    fn load(&mut self, resource: &str) -> EngineResult<()> {
        self.loaded = Some(resource.to_string());
        self.base_position = 0.0;
        self.playing_since = None;
        self.completion_reported = false;
        Ok(())
    }

    fn play(&mut self) -> EngineResult<()> {
        if self.loaded.is_none() {
            return Err(EngineError::Clock("no audio loaded".to_string()));
        }
        if self.playing_since.is_some() {
            return Ok(());
        }
        if self.base_position >= self.duration {
            self.base_position = 0.0;
            self.completion_reported = false;
        }
        self.playing_since = Some(self.time.now());
        Ok(())
    }

    fn pause(&mut self) {
        if self.playing_since.is_some() {
            self.base_position = self.current_position();
            self.playing_since = None;
        }
    }

    fn stop(&mut self) {
        self.playing_since = None;
        self.base_position = 0.0;
        self.completion_reported = false;
    }

    fn current_position(&self) -> f64 {
        self.raw_position().min(self.duration)
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some() && self.raw_position() < self.duration
    }

    fn take_completion(&mut self) -> bool {
        if self.completion_reported || self.loaded.is_none() {
            return false;
        }
        if self.playing_since.is_some() && self.raw_position() >= self.duration {
            self.base_position = self.duration;
            self.playing_since = None;
            self.completion_reported = true;
            return true;
        }
        false
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }
}
