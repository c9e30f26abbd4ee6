//! Persisted settings.
//!
//! Settings live in `~/.scurve/settings.json`. A missing file means defaults;
//! command-line flags override individual values for a single run.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curve::{CurveSettings, DEFAULT_BUFFER_DAYS, DEFAULT_DECIMALS, MAX_DECIMALS};
use crate::error::{AppError, AppResult};

/// Fallback task export when neither `--data` nor the settings name one.
pub const DEFAULT_DATA_FILE: &str = "tasks.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Task export used when `--data` is not given.
    pub data_path: Option<PathBuf>,
    /// Project used when `--project` is not given.
    pub default_project: Option<String>,
    pub buffer_days: u32,
    pub decimals: u32,
    pub include_start_dates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_path: None,
            default_project: None,
            buffer_days: DEFAULT_BUFFER_DAYS,
            decimals: DEFAULT_DECIMALS,
            include_start_dates: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        let buf = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&buf)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to JSON using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.decimals > MAX_DECIMALS {
            return Err(AppError::config(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        Ok(())
    }

    /// Curve settings with per-run overrides applied.
    pub fn curve_settings(
        &self,
        buffer_days: Option<u32>,
        decimals: Option<u32>,
        include_start_dates: bool,
    ) -> AppResult<CurveSettings> {
        let resolved = Settings {
            buffer_days: buffer_days.unwrap_or(self.buffer_days),
            decimals: decimals.unwrap_or(self.decimals),
            include_start_dates: include_start_dates || self.include_start_dates,
            ..self.clone()
        };
        resolved.validate()?;
        Ok(CurveSettings {
            buffer_days: resolved.buffer_days,
            decimals: resolved.decimals,
            include_start_dates: resolved.include_start_dates,
        })
    }

    /// The task export to read: explicit flag, then settings, then `./tasks.json`.
    pub fn data_path(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.data_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
    }

    /// The project to chart: explicit flag, then settings.
    pub fn project(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string).or_else(|| self.default_project.clone())
    }
}

/// `~/.scurve`, or `./.scurve` when `$HOME` is unset.
pub fn config_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".scurve")
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}
