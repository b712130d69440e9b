//! Application settings and on-disk layout.
//!
//! # Responsibility
//! - Load optional `settings.json` from the application folder.
//! - Resolve database and log locations relative to that folder.
//!
//! # Invariants
//! - A missing settings file yields defaults.
//! - Missing keys take their default; unknown keys are ignored.
//! - Delays are strictly positive.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_DB_FILE_NAME: &str = "database.db";
pub const LOG_DIR_NAME: &str = "logs";

const DEFAULT_CONTENT_SAVE_DELAY_MS: u64 = 500;
const DEFAULT_SAVED_NOTICE_MS: u64 = 1000;

/// Errors from settings loading.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read settings: {err}"),
            Self::Parse(err) => write!(f, "malformed settings: {err}"),
            Self::Invalid(message) => write!(f, "invalid settings: {message}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// User-tunable settings read from `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub log_level: String,
    /// Quiet period after the last content edit before it is written.
    pub content_save_delay_ms: u64,
    /// How long the "Saved!" notice stays visible.
    pub saved_notice_ms: u64,
    pub db_file_name: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            content_save_delay_ms: DEFAULT_CONTENT_SAVE_DELAY_MS,
            saved_notice_ms: DEFAULT_SAVED_NOTICE_MS,
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
        }
    }
}

impl PlannerSettings {
    /// Loads `settings.json` from `app_dir`, falling back to defaults when absent.
    pub fn load(app_dir: &Path) -> Result<Self, SettingsError> {
        let path = app_dir.join(SETTINGS_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        Self::from_json(&raw)
    }

    /// Parses and validates settings text.
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        normalize_level(&self.log_level)
            .map_err(|err| SettingsError::Invalid(err.to_string()))?;
        if self.content_save_delay_ms == 0 {
            return Err(SettingsError::Invalid(
                "content_save_delay_ms must be greater than zero".to_string(),
            ));
        }
        if self.saved_notice_ms == 0 {
            return Err(SettingsError::Invalid(
                "saved_notice_ms must be greater than zero".to_string(),
            ));
        }
        let file_name = self.db_file_name.trim();
        if file_name.is_empty() || Path::new(file_name).components().count() != 1 {
            return Err(SettingsError::Invalid(format!(
                "db_file_name must be a plain file name, got `{}`",
                self.db_file_name
            )));
        }
        Ok(())
    }

    pub fn content_save_delay(&self) -> Duration {
        Duration::from_millis(self.content_save_delay_ms)
    }

    pub fn saved_notice_duration(&self) -> Duration {
        Duration::from_millis(self.saved_notice_ms)
    }
}

/// Folder that holds the running executable, and with it the database,
/// settings and logs.
pub fn app_folder() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Database location for `settings` inside `app_dir`.
pub fn db_path(app_dir: &Path, settings: &PlannerSettings) -> PathBuf {
    app_dir.join(settings.db_file_name.trim())
}

pub fn log_dir(app_dir: &Path) -> PathBuf {
    app_dir.join(LOG_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{db_path, PlannerSettings, SettingsError, SETTINGS_FILE_NAME};
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PlannerSettings::load(dir.path()).unwrap();
        assert_eq!(settings, PlannerSettings::default());
        assert_eq!(settings.content_save_delay(), Duration::from_millis(500));
        assert_eq!(settings.saved_notice_duration(), Duration::from_millis(1000));
    }

    #[test]
    fn partial_json_fills_defaults_and_ignores_unknown_keys() {
        let settings =
            PlannerSettings::from_json(r#"{"content_save_delay_ms": 250, "theme": "dark"}"#)
                .unwrap();
        assert_eq!(settings.content_save_delay_ms, 250);
        assert_eq!(settings.saved_notice_ms, 1000);
        assert_eq!(settings.db_file_name, "database.db");
    }

    #[test]
    fn load_reads_file_from_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            r#"{"log_level": "warn", "db_file_name": "planner.db"}"#,
        )
        .unwrap();

        let settings = PlannerSettings::load(dir.path()).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(db_path(dir.path(), &settings), dir.path().join("planner.db"));
    }

    #[test]
    fn rejects_zero_delays_and_bad_values() {
        let zero = PlannerSettings::from_json(r#"{"content_save_delay_ms": 0}"#).unwrap_err();
        assert!(matches!(zero, SettingsError::Invalid(_)));

        let level = PlannerSettings::from_json(r#"{"log_level": "chatty"}"#).unwrap_err();
        assert!(matches!(level, SettingsError::Invalid(_)));

        let nested = PlannerSettings::from_json(r#"{"db_file_name": "../escape.db"}"#).unwrap_err();
        assert!(matches!(nested, SettingsError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PlannerSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn db_path_joins_trimmed_name() {
        let settings = PlannerSettings {
            db_file_name: " notes.db ".to_string(),
            ..PlannerSettings::default()
        };
        assert_eq!(
            db_path(Path::new("/opt/planner"), &settings),
            Path::new("/opt/planner/notes.db")
        );
    }
}
