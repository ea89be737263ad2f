//! Configuration management for the RAX sandbox browser
//!
//! Startup configuration is read once from an optional `config.toml` in the
//! working directory, with `RAX_SANDBOX_*` environment overrides. Nothing here
//! is updatable at runtime; the consent flag and the root directory live in the
//! settings store instead.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "rax-sandbox-browser";

/// Upper bound for the in-memory live-event window.
pub const MAX_LIVE_WINDOW: usize = 500;

const ENV_PREFIX: &str = "RAX_SANDBOX";

/// Startup configuration (restart required for any change)
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    // ═══ STORAGE (Environment Override Supported) ═══
    /// Application-private directory holding `settings.json` and `audit.jsonl`
    /// Environment: RAX_SANDBOX_DATA_DIR
    pub data_dir: String,

    // ═══ PLATFORM CAPABILITIES ═══
    /// Compare confined paths case-insensitively
    /// Environment: RAX_SANDBOX_CASE_INSENSITIVE_PATHS
    pub case_insensitive_paths: bool,

    /// Canonicalise existing targets through the OS and reject symlinked escapes
    pub reject_symlink_escapes: bool,

    // ═══ LIVE AUDIT VIEW ═══
    /// Number of live events kept for the `LIVE` view
    pub live_window: usize,
}

impl AppConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::builder_with_defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults only, rooted at an explicit data directory (tests, embedding)
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_string_lossy().into_owned(),
            case_insensitive_paths: cfg!(windows),
            reject_symlink_escapes: true,
            live_window: 100,
        }
    }

    fn builder_with_defaults()
    -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("data_dir", default_data_dir().to_string_lossy().into_owned())?
            .set_default("case_insensitive_paths", cfg!(windows))?
            .set_default("reject_symlink_escapes", true)?
            .set_default("live_window", 100_i64)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Message("data_dir cannot be empty".into()));
        }

        Ok(())
    }

    /// Get the data directory as PathBuf
    pub fn data_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Live window size clamped to [1, MAX_LIVE_WINDOW]
    pub fn live_window_size(&self) -> usize {
        self.live_window.clamp(1, MAX_LIVE_WINDOW)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR_NAME}")))
}
