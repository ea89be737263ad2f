//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    // Declaration order is the listing order: directories first.
    Dir,
    File,
}

/// One direct child of a listed directory. Recomputed on every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Byte size for files whose stat succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Result of a directory listing operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub rel_path: String,
    pub entries: Vec<DirEntry>,
}

/// Result of a text read operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    pub rel_path: String,
    pub text: String,
}
