//! Error types
//!
//! Defines domain-specific error types for each component of the sandbox browser.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Path confinement errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Path is outside selected root directory: {rel_path}")]
    PathEscape { rel_path: String },

    #[error("Path leaves selected root directory through a symbolic link: {rel_path}")]
    SymlinkEscape { rel_path: String },
}

impl ResolveError {
    pub fn rel_path(&self) -> &str {
        match self {
            ResolveError::PathEscape { rel_path } | ResolveError::SymlinkEscape { rel_path } => {
                rel_path
            }
        }
    }
}

/// Settings store errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to persist settings to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Sandboxed file operation errors
#[derive(Debug, Error)]
pub enum FsOpError {
    #[error("Consent is required before performing this action")]
    ConsentRequired,

    #[error("Select a root folder first")]
    RootNotSelected,

    #[error("Invalid root directory: {0}")]
    InvalidRoot(String),

    #[error(transparent)]
    PathEscape(#[from] ResolveError),

    #[error("File too large to read in-app: {rel_path} is {size} bytes (max {limit} bytes)")]
    FileTooLarge { rel_path: String, size: u64, limit: u64 },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Destination already exists: {rel_path}")]
    DestinationExists { rel_path: String },

    #[error("Failed to move {rel_path} to trash: {reason}")]
    Trash { rel_path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Top-level error covering every component
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    FsOp(#[from] FsOpError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<ResolveError> for AppError {
    fn from(error: ResolveError) -> Self {
        AppError::FsOp(FsOpError::PathEscape(error))
    }
}
