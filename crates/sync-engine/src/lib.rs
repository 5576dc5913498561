//! Audio-synchronized text highlighting engine
//!
//! This crate keeps a story paragraph in step with its narration:
//! - Resolving the clock position to the active chunk
//! - Building styled ranges with the active chunk highlighted
//! - Edge-triggering reactive effects tagged on chunks
//! - Coordinating the playback session lifecycle
//!
//! # Example
//!
//! ```rust
//! use readalong_core::{ChunkTable, StoryKey, TextChunk};
//! use readalong_sync_engine::{
//!     InMemoryProvider, ManualTimeSource, SessionConfig, SimulatedClock, StoryData, SyncSession,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let key = StoryKey::new(1, "elsa");
//! let provider = InMemoryProvider::new().with(StoryData::new(
//!     key.clone(),
//!     "Hello world",
//!     ChunkTable::new(vec![
//!         TextChunk::new("Hello", 0.0, 1.0),
//!         TextChunk::new(" world", 1.0, 2.5),
//!     ]),
//!     "elsa_story1",
//! ));
//!
//! let time = ManualTimeSource::new();
//! let clock = SimulatedClock::new(3.0, Arc::new(time.clone()));
//! let mut session =
//!     SyncSession::with_time_source(Box::new(clock), SessionConfig::default(), Arc::new(time.clone()));
//!
//! session.load(key, &provider).unwrap();
//! session.play().unwrap();
//! assert_eq!(session.styled().active_text(), Some("Hello"));
//!
//! time.advance(Duration::from_millis(1200));
//! session.tick();
//! assert_eq!(session.styled().active_text(), Some("world"));
//! ```

pub mod clock;
pub mod effects;
mod error;
mod events;
pub mod provider;
pub mod resolver;
mod session;
pub mod styling;
mod ticker;

pub use clock::{ManualTimeSource, PlaybackClock, SimulatedClock, SystemTimeSource, TimeSource};
pub use effects::{EffectController, EffectSettings, EffectTransition, StopReason};
pub use error::{EngineError, EngineResult};
pub use events::{SessionEvent, SessionSnapshot};
pub use provider::{InMemoryProvider, JsonStoryProvider, StoryData, StoryDataProvider};
pub use resolver::{resolve, resolve_with_policy};
pub use session::{SessionConfig, SyncSession};
pub use styling::{RangeStyle, StyledParagraph, StyledRange};
pub use ticker::{shared, SharedSession, TickDriver};
