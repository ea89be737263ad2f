//! Audit event model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type AuditDetails = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
}

/// Recorded action kinds.
///
/// Lifecycle actions may carry details; file operations always do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    AppStart,
    ConsentSet,
    RootSet,
    ListDir,
    ReadText,
    TrashItem,
    RenameItem,
    CopyItem,
}

impl AuditAction {
    pub fn is_file_op(self) -> bool {
        matches!(
            self,
            AuditAction::ListDir
                | AuditAction::ReadText
                | AuditAction::TrashItem
                | AuditAction::RenameItem
                | AuditAction::CopyItem
        )
    }
}

/// One immutable audit record. `ts` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub ts: i64,
    pub level: AuditLevel,
    pub action: AuditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<AuditDetails>,
}

impl AuditEvent {
    /// Lifecycle/config event stamped with the current time.
    pub fn lifecycle(action: AuditAction, details: Option<AuditDetails>) -> Self {
        Self {
            ts: now_millis(),
            level: AuditLevel::Info,
            action,
            details,
        }
    }

    /// File-operation event stamped with the current time.
    pub fn file_op(level: AuditLevel, action: AuditAction, details: AuditDetails) -> Self {
        Self {
            ts: now_millis(),
            level,
            action,
            details: Some(details),
        }
    }

    /// File-operation records read back from disk must carry details.
    pub fn is_well_formed(&self) -> bool {
        !self.action.is_file_op() || self.details.is_some()
    }
}

/// Turn a `json!({...})` object into details; anything else yields an empty map.
pub fn details(value: Value) -> AuditDetails {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
