//! Common types and utilities shared across domain models

use std::fmt;

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Playback clock position in seconds
///
/// Non-finite or negative inputs are clamped to zero when displayed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ClockTime(f64);

impl ClockTime {
    pub const ZERO: Self = Self(0.0);

    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    /// True when the value can be fed to the resolver
    pub fn is_usable(&self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    /// Formats as M:SS.t (tenths of a second)
    pub fn as_clock(&self) -> String {
        let secs = if self.is_usable() { self.0 } else { 0.0 };
        let tenths = (secs * 10.0).floor() as u64;
        let minutes = tenths / 600;
        let seconds = (tenths % 600) / 10;
        format!("{}:{:02}.{}", minutes, seconds, tenths % 10)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_clock())
    }
}

impl From<std::time::Duration> for ClockTime {
    fn from(d: std::time::Duration) -> Self {
        Self(d.as_secs_f64())
    }
}
