//! Path helpers for user-supplied values

use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR`, and `${VAR}` in a user-supplied path.
///
/// Unset variables are left in place rather than erroring; the workflow
/// engine gets the literal text in that case.
pub fn expand_user_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(raw.as_ref()) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

/// Expand an optional user-supplied path.
pub fn expand_opt(path: Option<&Path>) -> Option<PathBuf> {
    path.map(expand_user_path)
}
