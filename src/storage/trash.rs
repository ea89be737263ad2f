//! OS trash integration
//!
//! Destructive actions always go through the platform's recoverable trash;
//! nothing in this crate deletes user files permanently.

use std::io;
use std::path::Path;

/// Moves an item to a recoverable trash.
pub trait TrashBin: Send + Sync {
    fn move_to_trash(&self, path: &Path) -> io::Result<()>;
}

/// The platform recycle bin / trash can.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl TrashBin for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> io::Result<()> {
        trash::delete(path).map_err(|e| io::Error::other(e.to_string()))
    }
}
