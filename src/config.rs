//! Engine configuration
//!
//! Settings are layered: built-in defaults, then an optional file (TOML or
//! JSON, picked by extension), then `DIARY_*` environment variables.

use crate::aggregator::DEFAULT_WINDOW_DAYS;
use crate::error::MetricsError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix (`DIARY_WINDOW_DAYS`, ...)
pub const ENV_PREFIX: &str = "DIARY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of the current and previous windows in days
    pub window_days: u32,
    /// First day of the fixed baseline window, if the patient has one
    pub baseline_start: Option<NaiveDate>,
    /// Fill unrecorded measures from diary timestamps before aggregating
    pub derive_missing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            baseline_start: None,
            derive_missing: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, MetricsError> {
        let mut builder = ::config::Config::builder()
            .set_default("window_days", i64::from(DEFAULT_WINDOW_DAYS))?
            .set_default("derive_missing", false)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MetricsError> {
        if self.window_days == 0 {
            return Err(MetricsError::InvalidWindow(
                "window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, MetricsError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
