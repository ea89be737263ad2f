//! Error handling
//!
//! Defines error types for each component and their mapping to response codes.

pub mod handlers;
pub mod types;

pub use types::*;
