//! Settings model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::FsOpError;

/// Persisted user choices.
///
/// `root_dir`, when present, is an absolute path; whether it still exists is
/// checked by each operation, never cached here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub consent_accepted: bool,
    pub root_dir: Option<PathBuf>,
}

impl Settings {
    /// Build settings from a loosely-typed JSON record.
    ///
    /// Fields of the wrong type fall back to their defaults individually. A
    /// `rootDir` that is not absolute counts as no root selected.
    pub fn from_json_value(value: &Value) -> Self {
        Self {
            consent_accepted: value
                .get("consentAccepted")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            root_dir: value
                .get("rootDir")
                .and_then(Value::as_str)
                .filter(|s| Path::new(s).is_absolute())
                .map(PathBuf::from),
        }
    }

    /// Gate for every file operation: consent first, then a selected root.
    pub fn require_consent(&self) -> Result<&Path, FsOpError> {
        if !self.consent_accepted {
            return Err(FsOpError::ConsentRequired);
        }
        self.root_dir.as_deref().ok_or(FsOpError::RootNotSelected)
    }
}
