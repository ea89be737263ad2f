//! Request protocol
//!
//! A line-oriented front end over `AppContext`: requests are parsed from text,
//! dispatched, and answered with status-coded lines.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Request, RequestResult, RequestStatus};
pub use handlers::handle_request;
pub use parser::parse_request;
