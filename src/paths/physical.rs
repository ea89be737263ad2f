//! Physical containment check
//!
//! Lexical resolution cannot see symbolic links. This walks up from a target to
//! its deepest existing ancestor, canonicalises it through the OS and checks the
//! result against the canonicalised root.

use std::path::Path;

use log::warn;

use crate::error::ResolveError;
use crate::paths::PathResolver;

/// Reject `target` when its existing part resolves, through symlinks, outside `root`.
///
/// Missing roots and dangling links pass here; the filesystem call that
/// follows reports them as ordinary I/O errors.
pub fn confirm_physical_containment(
    resolver: &PathResolver,
    root: &Path,
    target: &Path,
    rel_path: &str,
) -> Result<(), ResolveError> {
    let Ok(real_root) = root.canonicalize() else {
        return Ok(());
    };

    let mut existing = target.to_path_buf();
    while existing.symlink_metadata().is_err() {
        if !existing.pop() {
            return Ok(());
        }
    }

    let Ok(real_target) = existing.canonicalize() else {
        return Ok(());
    };

    if resolver.is_within_root(&real_root, &real_target) {
        Ok(())
    } else {
        warn!(
            "Symlinked path {} resolves to {} outside {}",
            rel_path,
            real_target.display(),
            real_root.display()
        );
        Err(ResolveError::SymlinkEscape {
            rel_path: rel_path.to_string(),
        })
    }
}
