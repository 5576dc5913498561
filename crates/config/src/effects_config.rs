//! Particle effect configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Settings for emotion-cue particle effects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    /// Master switch for particle effects
    pub enabled: bool,

    /// Safety auto-stop for a running effect, in milliseconds
    pub max_emit_duration_ms: u64,

    /// Particles per second handed to the renderer while emitting
    pub birth_rate: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_emit_duration_ms: 2300,
            birth_rate: 4.0,
        }
    }
}

impl ConfigSection for EffectsConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.max_emit_duration_ms,
                100,
                60_000,
                "effects.max_emit_duration_ms",
            ),
            Validator::in_range(self.birth_rate, 0.1, 50.0, "effects.birth_rate"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.enabled = other.enabled;
        self.max_emit_duration_ms = other.max_emit_duration_ms;
        self.birth_rate = other.birth_rate;
    }

    fn section_name(&self) -> &'static str {
        "effects"
    }
}
