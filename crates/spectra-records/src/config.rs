//! Settings for record resolution and synchronization.
//!
//! Read from `~/.local/share/Spectra/config.json` when present, then
//! overridden by `SPECTRA_HOME`, `SPECTRA_SYNC_RETRIES` and
//! `SPECTRA_ZENODO_API`.

use crate::errors::ConfigError;
use crate::paths::{config_path, datasets_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ZENODO_API: &str = "https://zenodo.org/api";

/// Delay growth between sync attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backoff {
    pub initial_ms: u64,
    pub factor: f64,
    pub max_ms: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_ms: 500,
            factor: 2.0,
            max_ms: 10_000,
        }
    }
}

impl Backoff {
    /// No waiting at all; handy for tests.
    pub fn none() -> Self {
        Self {
            initial_ms: 0,
            factor: 1.0,
            max_ms: 0,
        }
    }

    /// Delay to sleep after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        let ms = self.initial_ms as f64 * self.factor.powi(exp);
        let ms = if ms.is_finite() { ms } else { f64::MAX };
        Duration::from_millis(ms.min(self.max_ms as f64) as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum number of fetch attempts per sync (0 behaves like 1).
    pub retries: u32,
    pub backoff: Backoff,
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Backoff::default(),
            timeout_secs: 600,
        }
    }
}

impl SyncConfig {
    pub fn max_attempts(&self) -> u32 {
        self.retries.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root holding one repository directory per dataset.
    pub home: Option<PathBuf>,
    pub zenodo_api: String,
    pub sync: SyncConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home: None,
            zenodo_api: DEFAULT_ZENODO_API.to_string(),
            sync: SyncConfig::default(),
        }
    }
}

impl Settings {
    /// Config file (if any) plus environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        let mut settings = if path.is_file() {
            Self::from_path(&path)?
        } else {
            Self::default()
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let txt = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&txt)?)
    }

    /// Apply `SPECTRA_*` overrides from any key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(home) = lookup("SPECTRA_HOME").filter(|s| !s.is_empty()) {
            self.home = Some(PathBuf::from(home));
        }
        if let Some(api) = lookup("SPECTRA_ZENODO_API").filter(|s| !s.is_empty()) {
            self.zenodo_api = api.trim_end_matches('/').to_string();
        }
        if let Some(retries) = lookup("SPECTRA_SYNC_RETRIES") {
            self.sync.retries = retries.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("SPECTRA_SYNC_RETRIES={retries:?} is not a count"))
            })?;
        }
        Ok(())
    }

    pub fn home_dir(&self) -> PathBuf {
        self.home.clone().unwrap_or_else(datasets_dir)
    }
}
