use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::application::DEFAULT_QUEUE_KEY;
use crate::domain::BudgetThresholds;

/// Settings file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "spendsync.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite file backing the local store
    pub database: String,
    /// Store key of the offline queue document
    pub queue_key: String,
    pub thresholds: BudgetThresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: "spendsync.db".to_string(),
            queue_key: DEFAULT_QUEUE_KEY.to_string(),
            thresholds: BudgetThresholds::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Attempting to load configuration from: {:?}", path);

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No configuration at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config file {:?}", path));
            }
        };

        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents).context("Failed to parse TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.queue_key.trim().is_empty() {
            bail!("queue_key cannot be empty");
        }

        let t = &self.thresholds;
        if t.almost_exhausted_ratio < 0.0 || t.running_low_ratio < 0.0 || t.alert_percentage < 0.0 {
            bail!("thresholds cannot be negative");
        }
        if t.running_low_ratio < t.almost_exhausted_ratio {
            bail!(
                "running_low_ratio ({}) must not be below almost_exhausted_ratio ({})",
                t.running_low_ratio,
                t.almost_exhausted_ratio
            );
        }
        Ok(())
    }
}
