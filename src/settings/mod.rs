//! User settings
//!
//! The consent flag and the selected root directory, plus the store that
//! persists them.

pub mod model;
pub mod store;

pub use model::Settings;
pub use store::{SETTINGS_FILE, SettingsStore};
