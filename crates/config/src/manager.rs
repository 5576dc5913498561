//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use readalong_core::GapPolicy;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Main configuration manager
///
/// Owns the config file location and routes loads/saves through
/// [`ConfigPersistence`].
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the platform config directory
    ///
    /// - Linux: `~/.config/readalong/`
    /// - macOS: `~/Library/Application Support/readalong/`
    /// - Windows: `%APPDATA%\readalong\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let persistence = ConfigPersistence::new(config_dir.join(CONFIG_FILE_NAME));

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "readalong")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Loads the configuration from file
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates and atomically saves the configuration
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, applies `update_fn`, and saves atomically
    ///
    /// ```rust,no_run
    /// # use readalong_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.effects.enabled = false;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if none exists
    ///
    /// Returns `Ok(true)` if a new file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        log::info!("Generated default config at {}", self.config_path().display());
        Ok(true)
    }

    /// Overwrites the config file with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Returns all validation errors in the current config file
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config and applies `READALONG_SECTION_FIELD` overrides
    ///
    /// Unparsable override values are ignored with a warning.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

/// Applies overrides looked up through `lookup`
fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("READALONG_PLAYBACK_TICK_INTERVAL_MS") {
        match value.parse::<u64>() {
            Ok(ms) => config.playback.tick_interval_ms = ms,
            Err(_) => log::warn!("Ignoring invalid READALONG_PLAYBACK_TICK_INTERVAL_MS={}", value),
        }
    }

    if let Some(value) = lookup("READALONG_PLAYBACK_GAP_POLICY") {
        match value.parse::<GapPolicy>() {
            Ok(policy) => config.playback.gap_policy = policy,
            Err(e) => log::warn!("Ignoring READALONG_PLAYBACK_GAP_POLICY: {}", e),
        }
    }

    if let Some(value) = lookup("READALONG_APP_LOG_LEVEL") {
        match value.parse() {
            Ok(level) => config.app.log_level = level,
            Err(e) => log::warn!("Ignoring READALONG_APP_LOG_LEVEL: {}", e),
        }
    }

    if let Some(value) = lookup("READALONG_APP_DATA_DIR") {
        config.app.data_dir = PathBuf::from(value);
    }

    if let Some(value) = lookup("READALONG_EFFECTS_ENABLED") {
        match value.parse::<bool>() {
            Ok(enabled) => config.effects.enabled = enabled,
            Err(_) => log::warn!("Ignoring invalid READALONG_EFFECTS_ENABLED={}", value),
        }
    }
}
