//! Response handling
//!
//! Defines response codes and formatting.

use crate::audit::AuditEvent;
use crate::settings::Settings;
use crate::storage::{DirEntry, EntryKind};

pub const OK: u16 = 200;
pub const READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const HELP: u16 = 214;
pub const SYNTAX_ERROR: u16 = 500;
pub const BAD_ARGUMENTS: u16 = 501;

/// Format a single status line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\n", code, message)
}

/// Status line followed by payload lines
pub fn format_with_payload(code: u16, message: &str, payload: &[String]) -> String {
    let mut out = format_response(code, message);
    for line in payload {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn format_settings(settings: &Settings) -> String {
    let root = settings
        .root_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());
    format!("consent={} root={}", settings.consent_accepted, root)
}

/// `d name` for directories, `f name size` for files (`-` when unknown)
pub fn format_entry(entry: &DirEntry) -> String {
    match entry.kind {
        EntryKind::Dir => format!("d {}", entry.name),
        EntryKind::File => match entry.size {
            Some(size) => format!("f {} {}", entry.name, size),
            None => format!("f {} -", entry.name),
        },
    }
}

pub fn format_event(event: &AuditEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|_| format!("{:?}", event))
}

pub fn help_lines() -> Vec<String> {
    [
        "SETTINGS                 show consent and root",
        "CONSENT <yes|no>         grant or withdraw consent",
        "ROOT [absolute-path]     select the root directory",
        "RESET                    delete all application data",
        "LIST [path]              list a directory",
        "READ <path>              show a text file (max 1 MiB)",
        "TRASH <path>             move an item to the OS trash",
        "RENAME <path> <name>     rename within the same directory",
        "COPY <src> <dest>        copy a file or directory",
        "AUDIT [limit]            show recent audit events",
        "LIVE [count]             show events seen live this session",
        "QUIT                     exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
