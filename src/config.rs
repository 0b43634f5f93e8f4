use crate::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Server settings, read from a JSON file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wall-clock length of one pulse.
    pub pulse_millis: u64,
    /// Stop after this many pulses. Runs forever if unset.
    pub max_pulses: Option<u64>,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Wheel buckets. Only affects how long bucket lists get, never ordering.
    pub buckets: usize,
    /// Callbacks one pulse may run before it is declared stuck.
    pub max_fires_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // 10 pulses per second
            pulse_millis: 100,
            max_pulses: None,
            scheduler: SchedulerConfig::default(),
        }
    }
}
impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            buckets: 256,
            max_fires_per_tick: 100_000,
        }
    }
}

impl Config {
    pub fn from_path(p: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(p)?;
        Self::from_json(&text)
    }
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse_millis == 0 {
            return Err(ConfigError::Invalid("pulse_millis must be positive"));
        }
        if self.scheduler.buckets == 0 {
            return Err(ConfigError::Invalid("scheduler.buckets must be positive"));
        }
        if self.scheduler.max_fires_per_tick == 0 {
            return Err(ConfigError::Invalid("scheduler.max_fires_per_tick must be positive"));
        }
        Ok(())
    }
    pub fn pulse(&self) -> time::Duration {
        time::Duration::from_millis(self.pulse_millis)
    }
}
