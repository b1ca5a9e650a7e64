//! Explicit runtime configuration.
//!
//! Everything the delivery gateway and the scan scheduler need is carried in
//! this struct and handed into constructors; nothing reads ambient process
//! state at call sites. Environment variables only feed
//! [`AppConfig::apply_env_overrides`].

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Locale;
use crate::notify::DeliveryConfig;

const API_KEY_VAR: &str = "FINTRACK_API_KEY";
const APP_ID_VAR: &str = "FINTRACK_APP_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("scan hour {0} is out of range (0-23)")]
    InvalidHour(u32),
}

/// Cadence settings for the notification scan, hours in UTC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanConfig {
    pub daily_hour: u32,
    pub monthly_hour: u32,
}

impl ScanConfig {
    pub fn new(daily_hour: u32, monthly_hour: u32) -> Result<Self, ConfigError> {
        let config = Self {
            daily_hour,
            monthly_hour,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects hours outside 0-23 so a misconfigured cadence fails loudly
    /// instead of firing at a shifted time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for hour in [self.daily_hour, self.monthly_hour] {
            if hour > 23 {
                return Err(ConfigError::InvalidHour(hour));
            }
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            daily_hour: 8,
            monthly_hour: 8,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

impl AppConfig {
    /// Loads from `path`, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let data = fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&data)?;
            config.scan.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves atomically by staging to a temporary file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    /// Overlays delivery credentials from the process environment.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(key) = env::var(API_KEY_VAR) {
            self.delivery.api_key = key;
        }
        if let Ok(app) = env::var(APP_ID_VAR) {
            self.delivery.app_id = app;
        }
        self
    }
}
