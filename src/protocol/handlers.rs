//! Request handlers for the sandbox browser.
//!
//! Each handler calls one `AppContext` operation and turns the outcome into a
//! status-coded response. Errors are logged and reported with their message.

use log::info;
use std::path::Path;
use std::sync::Mutex;

use crate::app::AppContext;
use crate::audit::LiveWindow;
use crate::error::AppError;
use crate::error::handlers::{error_to_status, handle_error};
use crate::protocol::responses::{
    BAD_ARGUMENTS, GOODBYE, HELP, OK, SYNTAX_ERROR, format_entry, format_event, format_response,
    format_settings, format_with_payload, help_lines,
};
use crate::protocol::{Request, RequestResult, RequestStatus};

/// Dispatches a parsed request to its handler.
///
/// # Arguments
///
/// * `ctx` - The application context owning settings, audit trail and filesystem.
/// * `live` - Window of audit events delivered live during this session.
/// * `request` - The parsed request.
pub fn handle_request(
    ctx: &mut AppContext,
    live: &Mutex<LiveWindow>,
    request: &Request,
) -> RequestResult {
    match request {
        Request::SETTINGS => success(format_response(OK, &format_settings(&ctx.get_settings()))),
        Request::CONSENT(accepted) => handle_consent(ctx, *accepted),
        Request::ROOT(path) => handle_root(ctx, path.as_deref()),
        Request::RESET => handle_reset(ctx, live),
        Request::LIST(path) => handle_list(ctx, path.as_deref()),
        Request::READ(path) => handle_read(ctx, path),
        Request::TRASH(path) => outcome(ctx.trash(path), &format!("Moved {} to trash", path)),
        Request::RENAME(old, new_name) => outcome(
            ctx.rename(old, new_name),
            &format!("Renamed {} to {}", old, new_name),
        ),
        Request::COPY(src, dest) => {
            outcome(ctx.copy(src, dest), &format!("Copied {} to {}", src, dest))
        }
        Request::AUDIT(limit) => handle_audit(ctx, *limit),
        Request::LIVE(count) => handle_live(live, *count),
        Request::HELP => success(format_with_payload(HELP, "Requests:", &help_lines())),
        Request::QUIT => RequestResult {
            status: RequestStatus::CloseConnection,
            message: Some(format_response(GOODBYE, "Goodbye")),
        },
        Request::INVALID(usage) => RequestResult {
            status: RequestStatus::Failure(usage.clone()),
            message: Some(format_response(BAD_ARGUMENTS, usage)),
        },
        Request::UNKNOWN => RequestResult {
            status: RequestStatus::Failure("Unknown request".into()),
            message: Some(format_response(SYNTAX_ERROR, "Unknown request, try HELP")),
        },
    }
}

fn handle_consent(ctx: &mut AppContext, accepted: bool) -> RequestResult {
    match ctx.set_consent(accepted) {
        Ok(settings) => success(format_response(OK, &format_settings(&settings))),
        Err(e) => failure(&e),
    }
}

fn handle_root(ctx: &mut AppContext, path: Option<&str>) -> RequestResult {
    match ctx.pick_root(path.map(Path::new)) {
        Ok(settings) => success(format_response(OK, &format_settings(&settings))),
        Err(e) => failure(&e),
    }
}

fn handle_reset(ctx: &mut AppContext, live: &Mutex<LiveWindow>) -> RequestResult {
    ctx.reset_all_data();
    live
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clear();
    info!("Application data reset by request");
    success(format_response(OK, "All application data cleared"))
}

fn handle_list(ctx: &AppContext, path: Option<&str>) -> RequestResult {
    match ctx.list_dir(path) {
        Ok(listing) => {
            let lines: Vec<String> = listing.entries.iter().map(format_entry).collect();
            success(format_with_payload(
                OK,
                &format!("{} ({} entries)", listing.rel_path, listing.entries.len()),
                &lines,
            ))
        }
        Err(e) => failure(&e),
    }
}

fn handle_read(ctx: &AppContext, path: &str) -> RequestResult {
    match ctx.read_text(path) {
        Ok(read) => {
            let lines: Vec<String> = read.text.lines().map(str::to_string).collect();
            success(format_with_payload(
                OK,
                &format!("{} ({} lines)", read.rel_path, lines.len()),
                &lines,
            ))
        }
        Err(e) => failure(&e),
    }
}

fn handle_audit(ctx: &AppContext, limit: Option<i64>) -> RequestResult {
    let events = ctx.recent_audit(limit);
    let lines: Vec<String> = events.iter().map(format_event).collect();
    success(format_with_payload(
        OK,
        &format!("{} audit events", lines.len()),
        &lines,
    ))
}

fn handle_live(live: &Mutex<LiveWindow>, count: Option<usize>) -> RequestResult {
    let window = live.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let events = window.latest(count.unwrap_or(window.capacity()));
    let lines: Vec<String> = events.iter().map(format_event).collect();
    success(format_with_payload(
        OK,
        &format!("{} live events", lines.len()),
        &lines,
    ))
}

fn outcome(result: Result<(), AppError>, done: &str) -> RequestResult {
    match result {
        Ok(()) => success(format_response(OK, done)),
        Err(e) => failure(&e),
    }
}

fn success(message: String) -> RequestResult {
    RequestResult {
        status: RequestStatus::Success,
        message: Some(message),
    }
}

fn failure(err: &AppError) -> RequestResult {
    handle_error(err);
    RequestResult {
        status: RequestStatus::Failure(err.to_string()),
        message: Some(format_response(error_to_status(err), &err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditAction, AuditEvent};
    use crate::config::AppConfig;
    use crate::protocol::parse_request;
    use crate::storage::TrashBin;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    struct NoTrash;

    impl TrashBin for NoTrash {
        fn move_to_trash(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::other("trash unavailable"))
        }
    }

    fn run(ctx: &mut AppContext, live: &Mutex<LiveWindow>, line: &str) -> RequestResult {
        handle_request(ctx, live, &parse_request(line))
    }

    fn setup() -> (TempDir, TempDir, AppContext, Mutex<LiveWindow>) {
        let data = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let ctx = AppContext::with_trash(&AppConfig::with_data_dir(data.path()), Box::new(NoTrash));
        (data, root, ctx, Mutex::new(LiveWindow::new(10)))
    }

    #[test]
    fn file_requests_need_consent_first() {
        let (_data, _root, mut ctx, live) = setup();
        let result = run(&mut ctx, &live, "LIST");
        assert!(matches!(result.status, RequestStatus::Failure(_)));
        assert!(result.message.unwrap().starts_with("530 "));
    }

    #[test]
    fn consent_root_and_list_flow() {
        let (_data, root, mut ctx, live) = setup();
        fs::write(root.path().join("a.txt"), "abc").unwrap();
        fs::create_dir(root.path().join("docs")).unwrap();

        assert_eq!(run(&mut ctx, &live, "CONSENT yes").status, RequestStatus::Success);
        let line = format!("ROOT \"{}\"", root.path().display());
        assert_eq!(run(&mut ctx, &live, &line).status, RequestStatus::Success);

        let message = run(&mut ctx, &live, "LIST").message.unwrap();
        assert_eq!(message, "200 . (2 entries)\nd docs\nf a.txt 3\n");
    }

    #[test]
    fn escape_attempt_reports_553() {
        let (_data, root, mut ctx, live) = setup();
        run(&mut ctx, &live, "CONSENT yes");
        run(&mut ctx, &live, &format!("ROOT \"{}\"", root.path().display()));

        let message = run(&mut ctx, &live, "READ ../../etc/passwd").message.unwrap();
        assert!(message.starts_with("553 "), "{message}");
    }

    #[test]
    fn trash_failure_is_reported_not_swallowed() {
        let (_data, root, mut ctx, live) = setup();
        fs::write(root.path().join("a.txt"), "abc").unwrap();
        run(&mut ctx, &live, "CONSENT yes");
        run(&mut ctx, &live, &format!("ROOT \"{}\"", root.path().display()));

        let message = run(&mut ctx, &live, "TRASH a.txt").message.unwrap();
        assert!(message.starts_with("450 "), "{message}");
        assert!(root.path().join("a.txt").exists());
    }

    #[test]
    fn audit_on_fresh_store_is_empty() {
        let (_data, _root, mut ctx, live) = setup();
        assert_eq!(run(&mut ctx, &live, "AUDIT").message.unwrap(), "200 0 audit events\n");
    }

    #[test]
    fn reset_clears_the_live_window() {
        let (_data, _root, mut ctx, live) = setup();
        live.lock()
            .unwrap()
            .push(AuditEvent::lifecycle(AuditAction::AppStart, None));

        assert_eq!(run(&mut ctx, &live, "RESET").status, RequestStatus::Success);
        assert!(live.lock().unwrap().is_empty());
        assert_eq!(run(&mut ctx, &live, "LIVE").message.unwrap(), "200 0 live events\n");
    }

    #[test]
    fn quit_closes() {
        let (_data, _root, mut ctx, live) = setup();
        assert_eq!(run(&mut ctx, &live, "QUIT").status, RequestStatus::CloseConnection);
    }
}
