//! Sandboxed file operations
//!
//! List, read, rename, copy and trash, each gated on consent and a selected
//! root, confined to that root, and recorded in the audit trail.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod trash;
pub mod validation;

pub use operations::{MAX_TEXT_BYTES, SandboxedFs};
pub use results::{DirEntry, EntryKind, ListResult, ReadResult};
pub use trash::{SystemTrash, TrashBin};
