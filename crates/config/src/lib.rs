//! ReadAlong Configuration System
//!
//! Layered TOML configuration for the read-along player.
//!
//! - **Trait-based**: each section implements `ConfigSection`
//! - **Graceful degradation**: invalid or missing files fall back to defaults with warnings
//! - **Atomic writes**: config files are never left half-written
//!
//! # Example
//!
//! ```rust,no_run
//! use readalong_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load_or_default();
//! println!("Tick interval: {}ms", config.playback.tick_interval_ms);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
mod app_config;
mod effects_config;
mod playback_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use effects_config::EffectsConfig;
pub use playback_config::{PlaybackConfig, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Clock sampling and highlighting
    pub playback: PlaybackConfig,

    /// Particle effects
    pub effects: EffectsConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.playback.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.effects.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Override chain: defaults < file < env vars < CLI args
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.playback.merge(other.playback);
        self.effects.merge(other.effects);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            playback: PlaybackConfig::default(),
            effects: EffectsConfig::default(),
        }
    }
}
