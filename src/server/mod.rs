//! Request dispatcher
//!
//! Reads one request per line, runs it against the application context and
//! writes the status-coded response back.

pub mod core;

pub use self::core::{Dispatcher, MAX_REQUEST_LENGTH};
