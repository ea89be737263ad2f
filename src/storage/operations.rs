//! Storage operations
//!
//! Every operation follows the same order: consent and root check, path
//! resolution, the filesystem call, then the audit record. Nothing touches the
//! filesystem or the audit trail before the checks pass.

use log::{error, info};
use serde_json::json;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::audit::{AuditAction, AuditEvent, AuditLevel, AuditLog, details};
use crate::error::{FsOpError, ResolveError};
use crate::paths::{PathResolver, normalize_path, normalize_separators};
use crate::settings::Settings;
use crate::storage::filesystem::{copy_recursive, entry_exists};
use crate::storage::results::{DirEntry, EntryKind, ListResult, ReadResult};
use crate::storage::trash::{SystemTrash, TrashBin};
use crate::storage::validation::Containment;

/// Fixed ceiling for in-app text reads (1 MiB).
pub const MAX_TEXT_BYTES: u64 = 1024 * 1024;

/// File operations confined to the selected root.
pub struct SandboxedFs {
    pub(crate) resolver: PathResolver,
    pub(crate) reject_symlink_escapes: bool,
    trash: Box<dyn TrashBin>,
}

impl SandboxedFs {
    pub fn new(resolver: PathResolver, reject_symlink_escapes: bool) -> Self {
        Self::with_trash(resolver, reject_symlink_escapes, Box::new(SystemTrash))
    }

    pub fn with_trash(
        resolver: PathResolver,
        reject_symlink_escapes: bool,
        trash: Box<dyn TrashBin>,
    ) -> Self {
        Self {
            resolver,
            reject_symlink_escapes,
            trash,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Lists the direct children of a directory, directories first.
    ///
    /// Symlinks and special files are left out. A file whose size cannot be
    /// read is still listed, just without a size.
    pub fn list_dir(
        &self,
        settings: &Settings,
        audit: &AuditLog,
        rel_path: Option<&str>,
    ) -> Result<ListResult, FsOpError> {
        let root = self.checked_root(settings)?;
        let rel_path = rel_path.filter(|p| !p.is_empty()).unwrap_or(".");
        let target = self.resolve_and_validate(root, rel_path, Containment::Target)?;

        let mut entries = Vec::new();
        let dir = fs::read_dir(&target.full).inspect_err(|e| {
            error!(
                "Failed to list directory {} (real: {}): {}",
                target.rel,
                target.full.display(),
                e
            )
        })?;

        for entry in dir {
            let entry = entry?;
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();

            if file_type.is_dir() {
                entries.push(DirEntry {
                    name,
                    kind: EntryKind::Dir,
                    size: None,
                });
            } else if file_type.is_file() {
                let size = entry.metadata().ok().map(|m| m.len());
                entries.push(DirEntry {
                    name,
                    kind: EntryKind::File,
                    size,
                });
            }
        }

        entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));

        audit.append(AuditEvent::file_op(
            AuditLevel::Info,
            AuditAction::ListDir,
            details(json!({"relPath": target.rel, "count": entries.len()})),
        ));

        info!(
            "Listed directory {} (real: {}) - {} entries",
            target.rel,
            target.full.display(),
            entries.len()
        );

        Ok(ListResult {
            rel_path: target.rel,
            entries,
        })
    }

    /// Reads a file of at most `MAX_TEXT_BYTES` as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn read_text(
        &self,
        settings: &Settings,
        audit: &AuditLog,
        rel_path: &str,
    ) -> Result<ReadResult, FsOpError> {
        let root = self.checked_root(settings)?;
        let target = self.resolve_and_validate(root, rel_path, Containment::Target)?;

        let size = fs::metadata(&target.full)?.len();
        if size > MAX_TEXT_BYTES {
            return Err(FsOpError::FileTooLarge {
                rel_path: target.rel,
                size,
                limit: MAX_TEXT_BYTES,
            });
        }

        // Stop one byte past the limit in case the file grew since the stat.
        let mut buf = Vec::with_capacity(size as usize);
        File::open(&target.full)?
            .take(MAX_TEXT_BYTES + 1)
            .read_to_end(&mut buf)?;
        if buf.len() as u64 > MAX_TEXT_BYTES {
            return Err(FsOpError::FileTooLarge {
                rel_path: target.rel,
                size: buf.len() as u64,
                limit: MAX_TEXT_BYTES,
            });
        }

        let bytes = buf.len();
        let text = String::from_utf8_lossy(&buf).into_owned();

        audit.append(AuditEvent::file_op(
            AuditLevel::Info,
            AuditAction::ReadText,
            details(json!({"relPath": target.rel, "bytes": bytes})),
        ));

        info!(
            "Read {} bytes from {} (real: {})",
            bytes,
            target.rel,
            target.full.display()
        );

        Ok(ReadResult {
            rel_path: target.rel,
            text,
        })
    }

    /// Moves an item to the OS trash. Never deletes permanently.
    pub fn trash_item(
        &self,
        settings: &Settings,
        audit: &AuditLog,
        rel_path: &str,
    ) -> Result<(), FsOpError> {
        let root = self.checked_root(settings)?;
        let target = self.resolve_and_validate(root, rel_path, Containment::Parent)?;

        if target.rel == "." {
            return Err(FsOpError::InvalidRoot(
                "the root directory itself cannot be trashed".into(),
            ));
        }

        fs::symlink_metadata(&target.full)?;
        self.trash
            .move_to_trash(&target.full)
            .map_err(|e| FsOpError::Trash {
                rel_path: target.rel.clone(),
                reason: e.to_string(),
            })?;

        audit.append(AuditEvent::file_op(
            AuditLevel::Warn,
            AuditAction::TrashItem,
            details(json!({"relPath": target.rel})),
        ));

        info!(
            "Trashed {} (real: {})",
            target.rel,
            target.full.display()
        );

        Ok(())
    }

    /// Renames an item within its own directory.
    ///
    /// `new_name` must stay in the same parent; traversal out of the root is a
    /// path escape, any other move is an invalid name. An existing item at the
    /// new name is never overwritten.
    pub fn rename_item(
        &self,
        settings: &Settings,
        audit: &AuditLog,
        old_rel_path: &str,
        new_name: &str,
    ) -> Result<(), FsOpError> {
        let root = self.checked_root(settings)?;
        let old = self.resolve_and_validate(root, old_rel_path, Containment::Parent)?;

        let parent = old.full.parent().unwrap_or(&old.full).to_path_buf();
        let safe_name = normalize_separators(new_name);
        let new_full = normalize_path(&parent.join(&safe_name));

        if !self.resolver.is_within_root(root, &new_full) {
            return Err(ResolveError::PathEscape { rel_path: safe_name }.into());
        }
        if new_full.parent() != Some(parent.as_path()) {
            return Err(FsOpError::InvalidName {
                name: new_name.to_string(),
                reason: "a rename must stay in the same directory".into(),
            });
        }
        let new_rel = self
            .resolver
            .to_relative(root, &new_full)
            .unwrap_or_else(|| safe_name.clone());
        self.confirm_physical(root, &new_full, &new_rel, Containment::Parent)?;

        fs::symlink_metadata(&old.full)?;
        if entry_exists(&new_full) && !self.same_entry_name(&old.full, &new_full) {
            return Err(FsOpError::DestinationExists { rel_path: new_rel });
        }

        fs::rename(&old.full, &new_full).inspect_err(|e| {
            error!(
                "Failed to rename {} to {} (real: {}): {}",
                old.rel,
                new_name,
                old.full.display(),
                e
            )
        })?;

        audit.append(AuditEvent::file_op(
            AuditLevel::Warn,
            AuditAction::RenameItem,
            details(json!({"oldRelPath": old.rel, "newName": new_name})),
        ));

        info!(
            "Renamed {} to {} (real: {} -> {})",
            old.rel,
            new_rel,
            old.full.display(),
            new_full.display()
        );

        Ok(())
    }

    /// Copies a file or directory tree; an existing destination is an error.
    pub fn copy_item(
        &self,
        settings: &Settings,
        audit: &AuditLog,
        src_rel_path: &str,
        dest_rel_path: &str,
    ) -> Result<(), FsOpError> {
        let root = self.checked_root(settings)?;
        let src = self.resolve_and_validate(root, src_rel_path, Containment::Target)?;
        let dest = self.resolve_and_validate(root, dest_rel_path, Containment::Target)?;

        fs::metadata(&src.full)?;
        if entry_exists(&dest.full) {
            return Err(FsOpError::DestinationExists { rel_path: dest.rel });
        }
        if self.resolver.is_within_root(&src.full, &dest.full) {
            return Err(FsOpError::InvalidName {
                name: dest.rel,
                reason: format!("cannot copy {} into itself", src.rel),
            });
        }

        if let Some(parent) = dest.full.parent() {
            fs::create_dir_all(parent)?;
        }

        copy_recursive(&src.full, &dest.full).inspect_err(|e| {
            error!(
                "Failed to copy {} to {} (real: {}): {}",
                src.rel,
                dest.rel,
                src.full.display(),
                e
            )
        })?;

        audit.append(AuditEvent::file_op(
            AuditLevel::Warn,
            AuditAction::CopyItem,
            details(json!({"srcRelPath": src.rel, "destRelPath": dest.rel})),
        ));

        info!(
            "Copied {} to {} (real: {} -> {})",
            src.rel,
            dest.rel,
            src.full.display(),
            dest.full.display()
        );

        Ok(())
    }

    /// Case-only renames on case-insensitive filesystems see the old entry at the new name.
    fn same_entry_name(&self, old: &Path, new: &Path) -> bool {
        self.resolver.is_case_insensitive()
            && old.to_string_lossy().to_lowercase() == new.to_string_lossy().to_lowercase()
    }
}
