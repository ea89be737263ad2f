//! Settings persistence
//!
//! One JSON record under the data directory, replaced wholesale on every save.
//! Saves go through a temporary file that is renamed over the previous record,
//! so an interrupted write leaves the last good settings in place.

use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::settings::Settings;

pub const SETTINGS_FILE: &str = "settings.json";

/// Owns the application-private data directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    data_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    /// Load settings, defaulting on a missing or unreadable record.
    pub fn load(&self) -> Settings {
        let path = self.settings_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to read settings {}: {}", path.display(), e);
                }
                return Settings::default();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Settings::from_json_value(&value),
            Err(e) => {
                warn!("Ignoring corrupt settings {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    /// Persist settings, replacing the previous record.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| SettingsError::Persistence {
            path: self.data_dir.clone(),
            source,
        })?;

        let encoded = serde_json::to_string_pretty(settings)?;
        let final_path = self.settings_path();
        let temp_path = final_path.with_extension("json.tmp");

        if let Err(source) = fs::write(&temp_path, encoded) {
            let _ = fs::remove_file(&temp_path);
            return Err(SettingsError::Persistence {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(SettingsError::Persistence {
                path: final_path,
                source,
            });
        }

        debug!("Saved settings to {}", final_path.display());
        Ok(())
    }

    /// Remove every piece of persisted application state. Best-effort.
    pub fn reset(&self) {
        match fs::remove_dir_all(&self.data_dir) {
            Ok(()) => info!("Cleared application data at {}", self.data_dir.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to clear application data at {}: {}",
                self.data_dir.display(),
                e
            ),
        }
    }
}
