//! Application context
//!
//! Owns the settings, the audit trail and the sandboxed filesystem, and
//! exposes the request/response operations a front end calls. State is held
//! here and passed into each operation explicitly; nothing is global.

use log::info;
use serde_json::json;
use std::path::Path;

use crate::audit::{
    AuditAction, AuditEvent, AuditFeed, AuditLog, AuditSubscription, AuditSubscriptionHandle,
    details,
};
use crate::config::AppConfig;
use crate::error::{AppError, FsOpError};
use crate::paths::{PathResolver, normalize_path};
use crate::settings::{Settings, SettingsStore};
use crate::storage::{ListResult, ReadResult, SandboxedFs, SystemTrash, TrashBin};

pub struct AppContext {
    store: SettingsStore,
    settings: Settings,
    audit: AuditLog,
    fs: SandboxedFs,
}

impl AppContext {
    /// Build the context, loading persisted settings from the data directory.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_trash(config, Box::new(SystemTrash))
    }

    pub fn with_trash(config: &AppConfig, trash: Box<dyn TrashBin>) -> Self {
        let data_dir = config.data_dir_path();
        let store = SettingsStore::new(&data_dir);
        let settings = store.load();
        let audit = AuditLog::new(&data_dir, AuditFeed::new());
        let fs = SandboxedFs::with_trash(
            PathResolver::new(config.case_insensitive_paths),
            config.reject_symlink_escapes,
            trash,
        );

        info!(
            "Data directory: {} (consent: {}, root: {:?})",
            data_dir.display(),
            settings.consent_accepted,
            settings.root_dir
        );

        Self {
            store,
            settings,
            audit,
            fs,
        }
    }

    /// Record the application start.
    pub fn start(&self) {
        self.audit
            .append(AuditEvent::lifecycle(AuditAction::AppStart, None));
    }

    pub fn get_settings(&self) -> Settings {
        self.settings.clone()
    }

    /// Update and persist the consent flag. The root is left as is.
    pub fn set_consent(&mut self, accepted: bool) -> Result<Settings, AppError> {
        let next = Settings {
            consent_accepted: accepted,
            ..self.settings.clone()
        };
        self.store.save(&next)?;
        self.settings = next;

        self.audit.append(AuditEvent::lifecycle(
            AuditAction::ConsentSet,
            Some(details(json!({"accepted": accepted}))),
        ));
        info!("Consent set to {}", accepted);

        Ok(self.get_settings())
    }

    /// Select a new root. `None` means the picker was dismissed.
    ///
    /// Requires consent; the path must be absolute and an existing directory.
    pub fn pick_root(&mut self, new_root: Option<&Path>) -> Result<Settings, AppError> {
        if !self.settings.consent_accepted {
            return Err(FsOpError::ConsentRequired.into());
        }
        let Some(new_root) = new_root else {
            return Ok(self.get_settings());
        };

        if !new_root.is_absolute() {
            return Err(FsOpError::InvalidRoot(format!(
                "{} is not an absolute path",
                new_root.display()
            ))
            .into());
        }
        if !new_root.is_dir() {
            return Err(FsOpError::InvalidRoot(format!(
                "{} is not an existing directory",
                new_root.display()
            ))
            .into());
        }

        let root = normalize_path(new_root);
        let next = Settings {
            root_dir: Some(root.clone()),
            ..self.settings.clone()
        };
        self.store.save(&next)?;
        self.settings = next;

        self.audit.append(AuditEvent::lifecycle(
            AuditAction::RootSet,
            Some(details(json!({"rootDir": root.to_string_lossy()}))),
        ));
        info!("Root directory set to {}", root.display());

        Ok(self.get_settings())
    }

    /// Delete all persisted state and fall back to default settings.
    pub fn reset_all_data(&mut self) {
        self.store.reset();
        self.settings = Settings::default();
    }

    pub fn list_dir(&self, rel_path: Option<&str>) -> Result<ListResult, AppError> {
        Ok(self.fs.list_dir(&self.settings, &self.audit, rel_path)?)
    }

    pub fn read_text(&self, rel_path: &str) -> Result<ReadResult, AppError> {
        Ok(self.fs.read_text(&self.settings, &self.audit, rel_path)?)
    }

    pub fn trash(&self, rel_path: &str) -> Result<(), AppError> {
        Ok(self.fs.trash_item(&self.settings, &self.audit, rel_path)?)
    }

    pub fn rename(&self, old_rel_path: &str, new_name: &str) -> Result<(), AppError> {
        Ok(self
            .fs
            .rename_item(&self.settings, &self.audit, old_rel_path, new_name)?)
    }

    pub fn copy(&self, src_rel_path: &str, dest_rel_path: &str) -> Result<(), AppError> {
        Ok(self
            .fs
            .copy_item(&self.settings, &self.audit, src_rel_path, dest_rel_path)?)
    }

    /// Recent audit events, oldest first. Needs no consent.
    pub fn recent_audit(&self, limit: Option<i64>) -> Vec<AuditEvent> {
        self.audit.recent(limit)
    }

    pub fn subscribe_audit(&self) -> AuditSubscription {
        self.audit.subscribe()
    }

    /// Callback-style subscription; requires a tokio runtime.
    pub fn subscribe_audit_with<F>(&self, callback: F) -> AuditSubscriptionHandle
    where
        F: FnMut(AuditEvent) + Send + 'static,
    {
        self.audit.subscribe_with(callback)
    }

    pub fn audit_feed(&self) -> &AuditFeed {
        self.audit.feed()
    }
}
