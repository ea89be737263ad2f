//! File system helpers
//!
//! Low-level helpers used by the storage operations.

use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Whether anything (including a dangling symlink) exists at `path`.
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Copy a file or directory tree to a destination that must not exist yet.
///
/// Symbolic links and special files below `src` are skipped. If the copy
/// fails midway, whatever was created at `dest` is removed again.
pub fn copy_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    if entry_exists(dest) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        ));
    }

    let result = copy_entry(src, dest, true);
    if result.is_err() && entry_exists(dest) {
        let _ = if dest.is_dir() {
            fs::remove_dir_all(dest)
        } else {
            fs::remove_file(dest)
        };
    }
    result
}

fn copy_entry(src: &Path, dest: &Path, top_level: bool) -> io::Result<()> {
    // The top-level source was already checked for escapes, so following it is safe.
    let metadata = if top_level {
        fs::metadata(src)?
    } else {
        fs::symlink_metadata(src)?
    };
    let file_type = metadata.file_type();

    if file_type.is_dir() {
        fs::create_dir(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_entry(&entry.path(), &dest.join(entry.file_name()), false)?;
        }
        fs::set_permissions(dest, metadata.permissions())?;
    } else if file_type.is_file() {
        let mut reader = File::open(src)?;
        let mut writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)?;
        io::copy(&mut reader, &mut writer)?;
        fs::set_permissions(dest, metadata.permissions())?;
    } else {
        debug!("Skipping non-regular entry {}", src.display());
    }

    Ok(())
}
