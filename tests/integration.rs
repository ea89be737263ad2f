use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rax_sandbox_browser::AppContext;
use rax_sandbox_browser::audit::{AuditAction, AuditLevel, LiveWindow};
use rax_sandbox_browser::config::AppConfig;
use rax_sandbox_browser::error::{AppError, FsOpError};
use rax_sandbox_browser::server::Dispatcher;
use rax_sandbox_browser::settings::Settings;
use rax_sandbox_browser::storage::TrashBin;
use tempfile::TempDir;

// Stands in for the OS trash so tests never touch the real one.
#[derive(Clone, Default)]
struct FakeTrash {
    trashed: Arc<Mutex<Vec<PathBuf>>>,
}

impl TrashBin for FakeTrash {
    fn move_to_trash(&self, path: &Path) -> io::Result<()> {
        self.trashed.lock().unwrap().push(path.to_path_buf());
        if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    }
}

struct Harness {
    data: TempDir,
    root: TempDir,
    trash: FakeTrash,
    ctx: AppContext,
}

fn harness() -> Harness {
    let data = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let trash = FakeTrash::default();
    let ctx = AppContext::with_trash(
        &AppConfig::with_data_dir(data.path()),
        Box::new(trash.clone()),
    );
    Harness {
        data,
        root,
        trash,
        ctx,
    }
}

impl Harness {
    fn ready(mut self) -> Self {
        self.ctx.set_consent(true).unwrap();
        self.ctx.pick_root(Some(self.root.path())).unwrap();
        self
    }

    fn write(&self, rel: &str, contents: &str) {
        let path = self.root.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn reload(&self) -> AppContext {
        AppContext::with_trash(
            &AppConfig::with_data_dir(self.data.path()),
            Box::new(self.trash.clone()),
        )
    }
}

#[test]
fn fresh_store_has_defaults_and_no_audit() {
    let h = harness();
    assert_eq!(h.ctx.get_settings(), Settings::default());
    assert!(h.ctx.recent_audit(None).is_empty());
}

#[test]
fn file_operations_require_consent_then_a_root() {
    let mut h = harness();
    h.write("a.txt", "a");

    assert!(matches!(
        h.ctx.list_dir(None),
        Err(AppError::FsOp(FsOpError::ConsentRequired))
    ));
    assert!(matches!(
        h.ctx.pick_root(Some(h.root.path())),
        Err(AppError::FsOp(FsOpError::ConsentRequired))
    ));

    h.ctx.set_consent(true).unwrap();
    assert!(matches!(
        h.ctx.read_text("a.txt"),
        Err(AppError::FsOp(FsOpError::RootNotSelected))
    ));

    h.ctx.pick_root(Some(h.root.path())).unwrap();
    assert_eq!(h.ctx.read_text("a.txt").unwrap().text, "a");
}

#[test]
fn withdrawing_consent_keeps_root_but_blocks_operations() {
    let mut h = harness().ready();
    h.ctx.set_consent(false).unwrap();

    let settings = h.ctx.get_settings();
    assert!(!settings.consent_accepted);
    assert!(settings.root_dir.is_some());
    assert!(matches!(
        h.ctx.list_dir(None),
        Err(AppError::FsOp(FsOpError::ConsentRequired))
    ));
}

#[test]
fn without_consent_no_operation_mutates_or_audits() {
    let mut h = harness().ready();
    h.write("docs/report.txt", "r");
    h.ctx.set_consent(false).unwrap();
    let before = h.ctx.recent_audit(None).len();

    for result in [
        h.ctx.read_text("docs/report.txt").map(|_| ()),
        h.ctx.trash("docs/report.txt"),
        h.ctx.rename("docs/report.txt", "final.txt"),
        h.ctx.copy("docs/report.txt", "copy.txt"),
    ] {
        assert!(matches!(
            result,
            Err(AppError::FsOp(FsOpError::ConsentRequired))
        ));
    }

    assert!(h.trash.trashed.lock().unwrap().is_empty());
    assert_eq!(
        fs::read_to_string(h.root.path().join("docs/report.txt")).unwrap(),
        "r"
    );
    assert!(!h.root.path().join("docs/final.txt").exists());
    assert!(!h.root.path().join("copy.txt").exists());
    assert_eq!(h.ctx.recent_audit(None).len(), before);
}

#[test]
fn copy_creates_missing_parent_directories() {
    let h = harness().ready();
    h.write("a.txt", "a");

    h.ctx.copy("a.txt", "backup/2024/a.txt").unwrap();
    assert_eq!(
        fs::read_to_string(h.root.path().join("backup/2024/a.txt")).unwrap(),
        "a"
    );
}

#[test]
fn pick_root_validates_and_cancel_keeps_settings() {
    let mut h = harness();
    h.ctx.set_consent(true).unwrap();

    let before = h.ctx.get_settings();
    assert_eq!(h.ctx.pick_root(None).unwrap(), before);

    assert!(matches!(
        h.ctx.pick_root(Some(Path::new("relative/dir"))),
        Err(AppError::FsOp(FsOpError::InvalidRoot(_)))
    ));
    assert!(matches!(
        h.ctx.pick_root(Some(&h.root.path().join("missing"))),
        Err(AppError::FsOp(FsOpError::InvalidRoot(_)))
    ));
    assert_eq!(h.ctx.get_settings(), before);

    let settings = h.ctx.pick_root(Some(h.root.path())).unwrap();
    assert!(settings.root_dir.is_some());
}

#[test]
fn settings_survive_a_reload() {
    let h = harness().ready();
    let reloaded = h.reload();
    assert_eq!(reloaded.get_settings(), h.ctx.get_settings());
    assert!(reloaded.get_settings().consent_accepted);
}

#[test]
fn copy_onto_itself_leaves_file_and_audit_untouched() {
    let h = harness().ready();
    h.write("a.txt", "original");
    let before = h.ctx.recent_audit(None).len();

    let err = h.ctx.copy("a.txt", "a.txt").unwrap_err();
    assert!(matches!(err, AppError::FsOp(FsOpError::DestinationExists { .. })));
    assert_eq!(
        fs::read_to_string(h.root.path().join("a.txt")).unwrap(),
        "original"
    );
    assert_eq!(h.ctx.recent_audit(None).len(), before);
}

#[test]
fn rename_out_of_the_root_is_a_path_escape() {
    let h = harness().ready();
    h.write("docs/report.txt", "r");

    let err = h.ctx.rename("docs/report.txt", "../../evil.txt").unwrap_err();
    assert!(matches!(err, AppError::FsOp(FsOpError::PathEscape(_))));
    assert!(h.root.path().join("docs/report.txt").exists());
}

#[test]
fn oversized_reads_are_refused() {
    let h = harness().ready();
    let file = File::create(h.root.path().join("big.log")).unwrap();
    file.set_len(2 * 1024 * 1024).unwrap();

    let err = h.ctx.read_text("big.log").unwrap_err();
    assert!(matches!(err, AppError::FsOp(FsOpError::FileTooLarge { .. })));
}

#[test]
fn listing_twice_gives_the_same_result() {
    let h = harness().ready();
    h.write("b.txt", "b");
    h.write("sub/c.txt", "c");

    let first = h.ctx.list_dir(None).unwrap();
    let second = h.ctx.list_dir(Some(".")).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.entries.len(), 2);
}

#[test]
fn audit_records_operations_in_order() {
    let mut h = harness();
    h.ctx.start();
    h.ctx.set_consent(true).unwrap();
    h.ctx.pick_root(Some(h.root.path())).unwrap();
    h.write("a.txt", "hello");

    h.ctx.list_dir(None).unwrap();
    h.ctx.read_text("a.txt").unwrap();
    h.ctx.copy("a.txt", "b.txt").unwrap();
    h.ctx.rename("b.txt", "c.txt").unwrap();
    h.ctx.trash("c.txt").unwrap();

    let actions: Vec<AuditAction> = h.ctx.recent_audit(None).iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::AppStart,
            AuditAction::ConsentSet,
            AuditAction::RootSet,
            AuditAction::ListDir,
            AuditAction::ReadText,
            AuditAction::CopyItem,
            AuditAction::RenameItem,
            AuditAction::TrashItem,
        ]
    );

    let events = h.ctx.recent_audit(Some(3));
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].action, AuditAction::TrashItem);
    assert_eq!(events[2].level, AuditLevel::Warn);
    assert_eq!(h.trash.trashed.lock().unwrap().len(), 1);

    // Limits outside the accepted range are clamped.
    assert_eq!(h.ctx.recent_audit(Some(0)).len(), 1);
    assert_eq!(h.ctx.recent_audit(Some(100_000)).len(), 8);
}

#[test]
fn reset_clears_settings_and_history() {
    let mut h = harness().ready();
    h.write("a.txt", "a");
    h.ctx.list_dir(None).unwrap();

    h.ctx.reset_all_data();

    assert_eq!(h.ctx.get_settings(), Settings::default());
    assert!(h.ctx.recent_audit(None).is_empty());
    assert_eq!(h.reload().get_settings(), Settings::default());
    // Files under the root are never part of application data.
    assert!(h.root.path().join("a.txt").exists());
}

#[tokio::test]
async fn live_subscribers_see_events_in_append_order() {
    let mut h = harness();
    let mut subscription = h.ctx.subscribe_audit();

    h.ctx.set_consent(true).unwrap();
    h.ctx.pick_root(Some(h.root.path())).unwrap();
    h.ctx.list_dir(None).unwrap();

    let mut seen = Vec::new();
    while let Some(event) = subscription.try_recv() {
        seen.push(event.action);
    }
    assert_eq!(
        seen,
        vec![
            AuditAction::ConsentSet,
            AuditAction::RootSet,
            AuditAction::ListDir
        ]
    );
}

#[tokio::test]
async fn dispatcher_runs_a_full_session() {
    let h = harness();
    h.write("notes/todo.txt", "buy milk");
    let input = format!(
        "CONSENT yes\nROOT \"{}\"\nLIST notes\nREAD notes/todo.txt\nREAD ../outside\nQUIT\n",
        h.root.path().display()
    );

    let mut dispatcher = Dispatcher::new(h.reload(), Arc::new(Mutex::new(LiveWindow::new(20))));
    let mut out = Vec::new();
    dispatcher.run(input.as_bytes(), &mut out).await.unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("200 notes (1 entries)\nf todo.txt 8\n"));
    assert!(out.contains("buy milk\n"));
    assert!(out.contains("553 "));
    assert!(out.ends_with("221 Goodbye\n"));
}
