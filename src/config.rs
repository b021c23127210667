//! Collector configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default proc filesystem root.
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Error in a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was empty.
    Empty(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Empty(key) => write!(f, "config value '{}' must not be empty", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for a [`CpuCollector`](crate::collector::CpuCollector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Root of the proc filesystem; counters are read from `<proc_path>/stat`.
    pub proc_path: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            proc_path: DEFAULT_PROC_PATH.to_string(),
        }
    }
}

impl CollectorConfig {
    pub const PROC_PATH_KEY: &'static str = "proc_path";

    pub fn new(proc_path: impl Into<String>) -> Self {
        Self {
            proc_path: proc_path.into(),
        }
    }

    /// Builds a config from host-supplied key/value pairs.
    ///
    /// Missing keys keep their defaults; unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                Self::PROC_PATH_KEY => config.proc_path = value.into(),
                other => warn!("ignoring unknown config key '{}'", other),
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proc_path.trim().is_empty() {
            return Err(ConfigError::Empty(Self::PROC_PATH_KEY));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reads_host_proc() {
        let config = CollectorConfig::default();
        assert_eq!(config.proc_path, "/proc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_pairs_overrides_proc_path() {
        let config = CollectorConfig::from_pairs([("proc_path", "/host/proc")]).unwrap();
        assert_eq!(config.proc_path, "/host/proc");
    }

    #[test]
    fn from_pairs_ignores_unknown_keys() {
        let config = CollectorConfig::from_pairs([("interval", "10s")]).unwrap();
        assert_eq!(config, CollectorConfig::default());
    }

    #[test]
    fn from_pairs_rejects_empty_proc_path() {
        assert_eq!(
            CollectorConfig::from_pairs([("proc_path", " ")]),
            Err(ConfigError::Empty("proc_path"))
        );
    }
}
