//! Path confinement
//!
//! Resolves caller-supplied relative paths against the selected root and
//! rejects anything that would land outside it.

pub mod physical;
pub mod resolver;

pub use physical::confirm_physical_containment;
pub use resolver::{PathResolver, normalize_path, normalize_separators};
