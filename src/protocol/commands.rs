//! Module `commands`
//!
//! Defines the requests understood by the dispatcher, their status, and the
//! result structure returned to the caller.

/// A request parsed from one input line.
///
/// Requests that take arguments store them as `String` values; optional
/// arguments are `None` when omitted.
#[derive(Debug, PartialEq)]
pub enum Request {
    SETTINGS,
    CONSENT(bool),
    ROOT(Option<String>), // Select root; no argument means the picker was dismissed
    RESET,
    LIST(Option<String>),
    READ(String),
    TRASH(String),
    RENAME(String, String), // Old relative path, new name
    COPY(String, String),   // Source, destination
    AUDIT(Option<i64>),
    LIVE(Option<usize>),
    HELP,
    QUIT,
    INVALID(String), // Known verb used incorrectly
    UNKNOWN,
}

/// Represents the outcome status of handling a request.
#[derive(Debug, PartialEq)]
pub enum RequestStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Struct encapsulating the full result of a request.
#[derive(Debug)]
pub struct RequestResult {
    pub status: RequestStatus,
    pub message: Option<String>,
}
