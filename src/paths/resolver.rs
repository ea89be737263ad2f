//! Lexical path confinement
//!
//! Pure string/component manipulation: nothing in this file touches the
//! filesystem. Symlink handling lives in `physical`.

use std::path::{Component, Path, PathBuf};

use crate::error::ResolveError;

/// Maps `(root, relative path)` to an absolute path inside the root.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver {
    case_insensitive: bool,
}

impl PathResolver {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// Resolver using the host platform's default case rule.
    pub fn for_platform() -> Self {
        Self::new(cfg!(windows))
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Resolve `rel_path` under `root`.
    ///
    /// Backslashes are treated as separators and an empty path means the root
    /// itself. The containment check runs on the normalized candidate, so `..`
    /// segments cannot slip past it.
    pub fn resolve(&self, root: &Path, rel_path: &str) -> Result<PathBuf, ResolveError> {
        let safe_rel = normalize_separators(rel_path);
        let safe_rel = if safe_rel.is_empty() { ".".to_string() } else { safe_rel };

        let candidate = normalize_path(&root.join(&safe_rel));
        if !self.is_within_root(root, &candidate) {
            return Err(ResolveError::PathEscape { rel_path: safe_rel });
        }

        Ok(candidate)
    }

    /// Whether `candidate` equals `root` or lies below it.
    ///
    /// Both sides are normalized first; the comparison is a string prefix test
    /// against the root plus a trailing separator.
    pub fn is_within_root(&self, root: &Path, candidate: &Path) -> bool {
        let root = normalize_path(root).to_string_lossy().into_owned();
        let candidate = normalize_path(candidate).to_string_lossy().into_owned();

        let (root, candidate) = if self.case_insensitive {
            (root.to_lowercase(), candidate.to_lowercase())
        } else {
            (root, candidate)
        };

        if candidate == root {
            return true;
        }

        let root_with_sep = if root.ends_with(std::path::MAIN_SEPARATOR) {
            root
        } else {
            format!("{root}{}", std::path::MAIN_SEPARATOR)
        };

        candidate.starts_with(&root_with_sep)
    }

    /// Express an absolute path inside `root` as a slash-delimited relative path.
    ///
    /// Returns `"."` for the root itself.
    pub fn to_relative(&self, root: &Path, full: &Path) -> Option<String> {
        let root = normalize_path(root);
        let full = normalize_path(full);
        if !self.is_within_root(&root, &full) {
            return None;
        }

        let root_len = root.components().count();
        let parts: Vec<String> = full
            .components()
            .skip(root_len)
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        if parts.is_empty() {
            Some(".".to_string())
        } else {
            Some(parts.join("/"))
        }
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::for_platform()
    }
}

/// Replace every backslash with a forward slash.
pub fn normalize_separators(rel_path: &str) -> String {
    rel_path.replace('\\', "/")
}

/// Resolve `.` and `..` components logically, without filesystem access.
///
/// `..` at the filesystem root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = match components.peek() {
        Some(Component::Prefix(prefix)) => {
            let buf = PathBuf::from(prefix.as_os_str());
            components.next();
            buf
        }
        _ => PathBuf::new(),
    };

    for component in components {
        match component {
            Component::Prefix(..) => {}
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if ret.parent().is_some() {
                    ret.pop();
                }
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}
