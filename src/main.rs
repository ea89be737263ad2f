//! RAX Sandbox Browser - Entry Point
//!
//! A consent-gated file browser confined to one user-selected root, driven
//! line by line from standard input.

use log::{error, info};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tokio::io::BufReader;

use rax_sandbox_browser::audit::LiveWindow;
use rax_sandbox_browser::config::AppConfig;
use rax_sandbox_browser::protocol::responses::format_event;
use rax_sandbox_browser::{AppContext, Dispatcher};

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG controls verbosity; logs go to stderr so they never mix with responses.
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching sandbox browser...");

    let ctx = AppContext::new(&config);
    let live = Arc::new(Mutex::new(LiveWindow::new(config.live_window_size())));

    let window = Arc::clone(&live);
    let _live_feed = ctx.subscribe_audit_with(move |event| {
        println!("* {}", format_event(&event));
        window
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    });

    ctx.start();

    let mut dispatcher = Dispatcher::new(ctx, live);
    let mut stdout = tokio::io::stdout();
    if let Err(e) = dispatcher.run(BufReader::new(tokio::io::stdin()), &mut stdout).await {
        error!("Dispatcher stopped: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Sandbox browser exiting");
    ExitCode::SUCCESS
}
