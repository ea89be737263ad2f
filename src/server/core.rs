use log::{info, warn};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::app::AppContext;
use crate::audit::LiveWindow;
use crate::protocol::responses::{READY, SYNTAX_ERROR, format_response};
use crate::protocol::{RequestStatus, handle_request, parse_request};

/// Paths may be long, but a single request line is still bounded.
pub const MAX_REQUEST_LENGTH: usize = 8192;

/// Serializes requests against one `AppContext`.
///
/// Only one request is in flight at a time, so operations never race each
/// other on settings or the audit file.
pub struct Dispatcher {
    ctx: AppContext,
    live: Arc<Mutex<LiveWindow>>,
}

impl Dispatcher {
    pub fn new(ctx: AppContext, live: Arc<Mutex<LiveWindow>>) -> Self {
        Self { ctx, live }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Runs until QUIT or end of input.
    pub async fn run<R, W>(&mut self, mut reader: R, writer: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer
            .write_all(format_response(READY, "Sandbox browser ready, type HELP").as_bytes())
            .await?;
        writer.flush().await?;

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                info!("Input closed");
                break;
            }

            if line.len() > MAX_REQUEST_LENGTH {
                warn!("Dropped request of {} bytes", line.len());
                writer
                    .write_all(format_response(SYNTAX_ERROR, "Request too long").as_bytes())
                    .await?;
                writer.flush().await?;
                continue;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.trim().is_empty() {
                continue;
            }

            let request = parse_request(trimmed);
            info!("Received: {:?}", &request);

            let result = handle_request(&mut self.ctx, &self.live, &request);
            if let Some(msg) = &result.message {
                writer.write_all(msg.as_bytes()).await?;
                writer.flush().await?;
            }

            match result.status {
                RequestStatus::CloseConnection => {
                    info!("Quit requested");
                    break;
                }
                RequestStatus::Failure(reason) => warn!("Request failed: {}", reason),
                RequestStatus::Success => {}
            }
        }

        Ok(())
    }
}
