//! Durable audit journal
//!
//! One compact JSON record per line in `audit.jsonl`. Write failures are
//! logged and swallowed; the live feed still receives the event.

use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::audit::{AuditEvent, AuditFeed, AuditSubscription, AuditSubscriptionHandle};

pub const AUDIT_FILE: &str = "audit.jsonl";
pub const DEFAULT_RECENT_LIMIT: usize = 100;
pub const MAX_RECENT_LIMIT: usize = 500;

/// Clamp a caller-supplied limit to `[1, MAX_RECENT_LIMIT]`, defaulting when absent.
pub fn clamp_limit(limit: Option<i64>) -> usize {
    match limit {
        None => DEFAULT_RECENT_LIMIT,
        Some(n) => n.clamp(1, MAX_RECENT_LIMIT as i64) as usize,
    }
}

/// Owns the audit file and the live feed.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    feed: AuditFeed,
    // Keeps file order and delivery order identical.
    write_lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(data_dir: &Path, feed: AuditFeed) -> Self {
        Self {
            path: data_dir.join(AUDIT_FILE),
            feed,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn feed(&self) -> &AuditFeed {
        &self.feed
    }

    /// Record an event durably (best-effort) and broadcast it.
    pub fn append(&self, event: AuditEvent) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Err(e) = self.write_line(&event) {
            warn!(
                "Audit write to {} failed for {:?}: {}",
                self.path.display(),
                event.action,
                e
            );
        }

        self.feed.publish(event);
    }

    fn write_line(&self, event: &AuditEvent) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(event).map_err(io::Error::other)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    /// Last `limit` valid records, oldest first.
    ///
    /// Malformed lines are skipped before the window is taken, so they never
    /// crowd out valid events. A missing or unreadable file yields nothing.
    pub fn recent(&self, limit: Option<i64>) -> Vec<AuditEvent> {
        let limit = clamp_limit(limit);

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to read audit log {}: {}", self.path.display(), e);
                }
                return Vec::new();
            }
        };

        let mut events: Vec<AuditEvent> = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<AuditEvent>(line) {
                Ok(event) if event.is_well_formed() => Some(event),
                _ => {
                    debug!("Skipping malformed audit line");
                    None
                }
            })
            .collect();

        let start = events.len().saturating_sub(limit);
        events.drain(..start);
        events
    }

    pub fn subscribe(&self) -> AuditSubscription {
        self.feed.subscribe()
    }

    pub fn subscribe_with<F>(&self, callback: F) -> AuditSubscriptionHandle
    where
        F: FnMut(AuditEvent) + Send + 'static,
    {
        self.feed.subscribe_with(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, AuditLevel, details};
    use serde_json::json;
    use tempfile::TempDir;

    fn test_log() -> (TempDir, AuditLog) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let log = AuditLog::new(&dir.path().join("data"), AuditFeed::new());
        (dir, log)
    }

    fn list_event(n: i64) -> AuditEvent {
        AuditEvent {
            ts: n,
            level: AuditLevel::Info,
            action: AuditAction::ListDir,
            details: Some(details(json!({"relPath": ".", "count": n}))),
        }
    }

    #[test]
    fn clamp_limit_bounds() {
        assert_eq!(clamp_limit(None), 100);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-7)), 1);
        assert_eq!(clamp_limit(Some(42)), 42);
        assert_eq!(clamp_limit(Some(10_000)), 500);
    }

    #[test]
    fn recent_on_fresh_store_is_empty() {
        let (_dir, log) = test_log();
        assert!(log.recent(None).is_empty());
    }

    #[test]
    fn append_then_recent_preserves_values_and_order() {
        let (_dir, log) = test_log();
        for n in 1..=3 {
            log.append(list_event(n));
        }

        let events = log.recent(Some(10));
        assert_eq!(events, vec![list_event(1), list_event(2), list_event(3)]);

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn recent_returns_last_window_oldest_first() {
        let (_dir, log) = test_log();
        for n in 1..=5 {
            log.append(list_event(n));
        }
        let ts: Vec<i64> = log.recent(Some(2)).iter().map(|e| e.ts).collect();
        assert_eq!(ts, vec![4, 5]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let (_dir, log) = test_log();
        log.append(list_event(1));
        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        writeln!(file, "{{broken").unwrap();
        writeln!(file, r#"{{"ts":2,"level":"info","action":"launch_rockets"}}"#).unwrap();
        writeln!(file, r#"{{"ts":3,"level":"warn","action":"trash_item"}}"#).unwrap();
        drop(file);
        log.append(list_event(4));

        let ts: Vec<i64> = log.recent(Some(1)).iter().map(|e| e.ts).collect();
        assert_eq!(ts, vec![4]);
        let ts: Vec<i64> = log.recent(None).iter().map(|e| e.ts).collect();
        assert_eq!(ts, vec![1, 4]);
    }

    #[test]
    fn write_failure_still_reaches_live_observers() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("data");
        fs::write(&blocker, "not a directory").unwrap();
        let log = AuditLog::new(&blocker, AuditFeed::new());
        let mut subscription = log.subscribe();

        log.append(list_event(9));

        assert_eq!(subscription.try_recv(), Some(list_event(9)));
        assert!(log.recent(None).is_empty());
    }

    #[test]
    fn live_observer_receives_every_appended_event() {
        let (_dir, log) = test_log();
        let mut subscription = log.subscribe();
        for n in 0..300 {
            log.append(list_event(n));
        }

        let mut seen = Vec::new();
        while let Some(event) = subscription.try_recv() {
            seen.push(event.ts);
        }
        assert_eq!(seen, (0..300).collect::<Vec<_>>());
        assert_eq!(log.recent(Some(500)).len(), 300);
    }
}
