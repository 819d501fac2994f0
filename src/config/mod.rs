//! Engine configuration and its on-disk persistence.

use std::{env, path::PathBuf};

use dirs::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::persistence::{read_json_if_exists, write_json_atomic, JsonFileError};

const DEFAULT_DIR_NAME: &str = ".obligation_core";
const HOME_ENV: &str = "OBLIGATION_CORE_HOME";
const CONFIG_FILE: &str = "config.json";

/// Business rule: recurring series are generated twelve occurrences ahead.
pub const DEFAULT_RECURRING_OCCURRENCES: u32 = 12;
pub const DEFAULT_DUE_SOON_DAYS: i64 = 7;
/// Upper bound on the rows one series may expand to (fifty years of months).
pub const MAX_SERIES_OCCURRENCES: u32 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] JsonFileError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Where the cents left over by an uneven installment split are placed.
pub enum RemainderPolicy {
    #[default]
    LastInstallment,
    Spread,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Number of occurrences generated for `mensal|trimestral|semestral|anual`.
    #[serde(default = "EngineConfig::default_recurring_occurrences")]
    pub recurring_occurrences: u32,
    #[serde(default)]
    pub remainder_policy: RemainderPolicy,
    /// Pending rows due within this many days are reported as due soon.
    #[serde(default = "EngineConfig::default_due_soon_days")]
    pub due_soon_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recurring_occurrences: Self::default_recurring_occurrences(),
            remainder_policy: RemainderPolicy::default(),
            due_soon_days: Self::default_due_soon_days(),
        }
    }
}

impl EngineConfig {
    pub fn default_recurring_occurrences() -> u32 {
        DEFAULT_RECURRING_OCCURRENCES
    }

    pub fn default_due_soon_days() -> i64 {
        DEFAULT_DUE_SOON_DAYS
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recurring_occurrences == 0 {
            return Err(ConfigError::Invalid(
                "recurring_occurrences must be at least 1".into(),
            ));
        }
        if self.recurring_occurrences > MAX_SERIES_OCCURRENCES {
            return Err(ConfigError::Invalid(format!(
                "recurring_occurrences must not exceed {}, got {}",
                MAX_SERIES_OCCURRENCES, self.recurring_occurrences
            )));
        }
        if self.due_soon_days < 0 {
            return Err(ConfigError::Invalid(
                "due_soon_days must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and stores the engine configuration file.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses `$OBLIGATION_CORE_HOME`, falling back to `~/.obligation_core`.
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            path: base.join(CONFIG_FILE),
        }
    }

    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        let config = read_json_if_exists::<EngineConfig>(&self.path)?.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        write_json_atomic(&self.path, config)?;
        Ok(())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
