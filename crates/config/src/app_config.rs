//! Application-level configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use readalong_core::Character;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log level for application logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter string understood by `env_logger`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `stories.json`, `chunks/` and `audio/`
    pub data_dir: PathBuf,

    /// Log level for application output
    pub log_level: LogLevel,

    /// Voice used when none is chosen explicitly
    pub default_voice: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_level: LogLevel::Info,
            default_voice: Character::Elsa.voice().to_string(),
        }
    }
}

impl ConfigSection for AppConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            results.push(Err(ValidationError::new("app.data_dir", "must not be empty")));
        }

        let voices: Vec<&str> = Character::ALL.iter().map(|c| c.voice()).collect();
        results.push(Validator::one_of(
            &self.default_voice.as_str(),
            &voices,
            "app.default_voice",
        ));

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.data_dir = other.data_dir;
        self.log_level = other.log_level;
        self.default_voice = other.default_voice;
    }

    fn section_name(&self) -> &'static str {
        "app"
    }
}
