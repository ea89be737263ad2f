//! Path validation for storage operations
//!
//! Combines lexical confinement with the optional symlink check and the
//! per-operation root availability check.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::FsOpError;
use crate::paths::{confirm_physical_containment, normalize_separators};
use crate::settings::Settings;
use crate::storage::SandboxedFs;

/// A confined target: absolute path plus its normalized relative form.
#[derive(Debug, Clone)]
pub struct Target {
    pub full: PathBuf,
    pub rel: String,
}

/// Which part of a target must physically lie inside the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// The target itself, following a final symlink (reads, copy sources)
    Target,
    /// Only the directory holding the target (trash, rename)
    Parent,
}

impl SandboxedFs {
    /// Consent, selected root, and the root still being a directory.
    pub(crate) fn checked_root<'a>(&self, settings: &'a Settings) -> Result<&'a Path, FsOpError> {
        let root = settings.require_consent()?;
        if !root.is_dir() {
            return Err(FsOpError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Root directory is no longer available: {}", root.display()),
            )));
        }
        Ok(root)
    }

    /// Resolve `rel_path` under `root` and enforce containment.
    pub(crate) fn resolve_and_validate(
        &self,
        root: &Path,
        rel_path: &str,
        containment: Containment,
    ) -> Result<Target, FsOpError> {
        let full = self.resolver.resolve(root, rel_path)?;
        let rel = self
            .resolver
            .to_relative(root, &full)
            .unwrap_or_else(|| normalize_separators(rel_path));

        self.confirm_physical(root, &full, &rel, containment)?;
        Ok(Target { full, rel })
    }

    pub(crate) fn confirm_physical(
        &self,
        root: &Path,
        full: &Path,
        rel: &str,
        containment: Containment,
    ) -> Result<(), FsOpError> {
        if !self.reject_symlink_escapes {
            return Ok(());
        }

        let checked = match containment {
            Containment::Target => full,
            Containment::Parent if rel != "." => full.parent().unwrap_or(full),
            Containment::Parent => full,
        };
        confirm_physical_containment(&self.resolver, root, checked, rel)?;
        Ok(())
    }
}
