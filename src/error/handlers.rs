//! Error handlers
//!
//! Provides error logging and the mapping from errors to response codes.

use crate::error::types::{AppError, FsOpError};
use log::{error, warn};
use std::io;

/// Log an error surfaced to the caller
pub fn handle_error(err: &AppError) {
    match err {
        AppError::FsOp(FsOpError::PathEscape(_)) => warn!("Rejected escape attempt: {}", err),
        _ => error!("Request failed: {}", err),
    }
}

/// Convert error to a three-digit response code
pub fn error_to_status(err: &AppError) -> u16 {
    match err {
        AppError::Config(_) => 451,
        AppError::Settings(_) => 451,
        AppError::FsOp(op) => fs_op_status(op),
        AppError::Io(e) => io_status(e),
    }
}

fn fs_op_status(err: &FsOpError) -> u16 {
    match err {
        FsOpError::ConsentRequired => 530,
        FsOpError::RootNotSelected => 530,
        FsOpError::InvalidRoot(_) => 501,
        FsOpError::PathEscape(_) => 553,
        FsOpError::InvalidName { .. } => 553,
        FsOpError::FileTooLarge { .. } => 552,
        FsOpError::DestinationExists { .. } => 550,
        FsOpError::Trash { .. } => 450,
        FsOpError::Io(e) => io_status(e),
    }
}

fn io_status(err: &io::Error) -> u16 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => 550,
        io::ErrorKind::NotFound => 550,
        _ => 451,
    }
}
