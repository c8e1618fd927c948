//! Path normalization utilities
//!
//! Every path that leaves the walker is relative to the root and uses '/' as
//! separator, so ordering and priority matching behave the same on every
//! platform.

use std::path::Path;

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Check if a file or directory name is hidden (starts with '.')
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Number of directories between the root and a relative path.
///
/// `main.py` is depth 0, `src/lib/util.py` is depth 2.
pub fn depth(relative: &str) -> usize {
    relative.matches('/').count()
}

/// Last component of a relative path
pub fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Lowercased extension including the leading dot, or "" when there is none.
///
/// Dotfiles like `.bashrc` have no extension.
pub fn extension(relative: &str) -> String {
    let name = file_name(relative);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => name[idx..].to_lowercase(),
    }
}

/// Clean a user-supplied path fragment: '/' separators, no leading `./`,
/// no leading or trailing slashes.
pub fn normalize_fragment(fragment: &str) -> String {
    let mut s = fragment.trim().replace('\\', "/");
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    s.trim_matches('/').to_string()
}

/// Component-aligned suffix match: `src/main.py` matches `main.py` and
/// `src/main.py` but not `ain.py`.
pub fn ends_with_fragment(relative: &str, fragment: &str) -> bool {
    if fragment.is_empty() {
        return false;
    }
    if relative == fragment {
        return true;
    }
    relative
        .strip_suffix(fragment)
        .is_some_and(|head| head.ends_with('/'))
}
