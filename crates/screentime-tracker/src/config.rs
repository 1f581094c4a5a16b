//! Tracker configuration loaded from TOML.
//!
//! Lookup order:
//! 1. `$SCREENTIME_CONFIG` (must exist if set)
//! 2. `<config dir>/screentime/config.toml` (optional)
//! 3. Built-in defaults
//!
//! ```toml
//! tick_interval_ms = 1000
//! state_dir = "/var/lib/screentime"
//!
//! [thresholds]
//! children_minutes = 60
//! teenage_minutes = 180
//! adult_minutes = 360
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use screentime_core::{BreakPolicy, BreakThresholds, DomainError};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SCREENTIME_CONFIG";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] DomainError),

    #[error("invalid config: tick_interval_ms must be greater than zero")]
    ZeroTickInterval,
}

/// Break thresholds in whole minutes, per age bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdsConfig {
    pub children_minutes: u64,
    pub teenage_minutes: u64,
    pub adult_minutes: u64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            children_minutes: 60,
            teenage_minutes: 180,
            adult_minutes: 360,
        }
    }
}

impl ThresholdsConfig {
    /// Converts to validated thresholds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidThreshold` if any value is zero.
    pub fn to_thresholds(&self) -> Result<BreakThresholds, DomainError> {
        BreakThresholds::new(
            minutes(self.children_minutes),
            minutes(self.teenage_minutes),
            minutes(self.adult_minutes),
        )
    }
}

/// Top-level tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Period of the display tick. Purely cosmetic; elapsed time is always
    /// derived from timestamps.
    pub tick_interval_ms: u64,

    /// Where session files are written. Defaults to the platform state dir.
    pub state_dir: Option<PathBuf>,

    pub thresholds: ThresholdsConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            state_dir: None,
            thresholds: ThresholdsConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown keys, and
    /// `ConfigError::Invalid`/`ZeroTickInterval` for unusable values.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file exists but cannot be read, or
    /// any error from [`TrackerConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::from_toml_str(&contents)?;
                info!(path = %path.display(), "Loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Loads from `$SCREENTIME_CONFIG`, else the default location.
    ///
    /// # Errors
    ///
    /// An explicitly named file that does not exist is an error; the
    /// default location is optional.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from) {
            return Self::load_required(&path);
        }
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads a file that must exist (e.g. passed on the command line).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// `<config dir>/screentime/config.toml`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("screentime").join("config.toml"))
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        self.thresholds.to_thresholds()?;
        Ok(())
    }

    /// Builds the break policy from the configured thresholds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a threshold is zero.
    pub fn policy(&self) -> Result<BreakPolicy, ConfigError> {
        Ok(BreakPolicy::new(self.thresholds.to_thresholds()?))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Directory for persisted sessions.
    ///
    /// Uses `state_dir` if configured, else `<state dir>/screentime/sessions`
    /// (falling back to the local data dir on platforms without a state dir).
    pub fn sessions_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.state_dir {
            return Some(dir.clone());
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("screentime").join("sessions"))
    }
}

fn minutes(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use screentime_core::AgeBracket;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.state_dir, None);

        let policy = config.policy().unwrap();
        assert_eq!(
            policy.threshold_for(AgeBracket::Children),
            Duration::from_secs(3600)
        );
        assert_eq!(
            policy.threshold_for(AgeBracket::Adult),
            Duration::from_secs(6 * 3600)
        );
    }

    #[test]
    fn test_parse_full_document() {
        let config = TrackerConfig::from_toml_str(
            r#"
            tick_interval_ms = 250
            state_dir = "/tmp/screentime-test"

            [thresholds]
            children_minutes = 1
            teenage_minutes = 3
            adult_minutes = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(
            config.sessions_dir(),
            Some(PathBuf::from("/tmp/screentime-test"))
        );
        let policy = config.policy().unwrap();
        assert_eq!(
            policy.threshold_for(AgeBracket::Teenage),
            Duration::from_secs(180)
        );
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = TrackerConfig::from_toml_str("[thresholds]\nadult_minutes = 90\n").unwrap();
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.thresholds.children_minutes, 60);
        assert_eq!(config.thresholds.adult_minutes, 90);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = TrackerConfig::from_toml_str("[thresholds]\nchildren_minutes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let err = TrackerConfig::from_toml_str("tick_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTickInterval));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = TrackerConfig::from_toml_str("tick_interval = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_required_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrackerConfig::load_required(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "tick_interval_ms = 500").unwrap();

        let config = TrackerConfig::load(&path).unwrap();
        assert_eq!(config.tick_interval_ms, 500);
    }
}
