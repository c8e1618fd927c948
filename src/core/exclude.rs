//! Exclusion rules
//!
//! Static deny-lists for dependency/build/VCS directories, lockfiles and
//! binary formats, plus per-run additions (user globs, hidden allow-list, the
//! output file). Built once per run and never mutated.
//!
//! The hidden allow-list only opens the exact path of a hidden priority
//! fragment and its directories; siblings under the same hidden directory
//! stay excluded.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;

use crate::core::error::{ContextError, Result};
use crate::core::paths::{ends_with_fragment, extension, file_name, is_hidden_name};

/// Directory names that are never descended into
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "venv",
    "env",
    ".env",
    "__pycache__",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    "target",
    "bin",
    "obj",
    ".idea",
    ".vscode",
    "coverage",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    "vendor",
    "bower_components",
];

/// Directory name suffixes treated like [`SKIP_DIRS`] (`project_venv`, ...)
pub const SKIP_DIR_SUFFIXES: &[&str] = &["_venv"];

/// File names that are never selected
pub const SKIP_FILES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    ".gitignore",
    ".dockerignore",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "poetry.lock",
    "Pipfile.lock",
    "Cargo.lock",
    "composer.lock",
];

/// Binary and media extensions, excluded whatever the extension filter says
pub const BINARY_EXTENSIONS: &[&str] = &[
    // images
    ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".webp", ".tiff", ".psd",
    // audio / video
    ".mp3", ".wav", ".ogg", ".flac", ".mp4", ".mov", ".avi", ".mkv", ".webm",
    // archives
    ".zip", ".tar", ".gz", ".tgz", ".bz2", ".xz", ".7z", ".rar", ".jar", ".war",
    // compiled
    ".exe", ".dll", ".so", ".dylib", ".a", ".lib", ".o", ".obj", ".class", ".pyc",
    ".pyo", ".wasm", ".rlib", ".bin",
    // fonts / documents / data blobs
    ".ttf", ".otf", ".woff", ".woff2", ".eot", ".pdf", ".doc", ".docx", ".xls",
    ".xlsx", ".ppt", ".pptx", ".sqlite", ".db",
];

/// Immutable set of exclusion rules for one run
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    include_hidden: bool,
    /// Directory parts of hidden priority fragments
    hidden_dirs: BTreeSet<String>,
    /// Hidden priority fragments themselves
    hidden_files: BTreeSet<String>,
    skip_paths: BTreeSet<String>,
    user_globs: GlobSet,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            include_hidden: false,
            hidden_dirs: BTreeSet::new(),
            hidden_files: BTreeSet::new(),
            skip_paths: BTreeSet::new(),
            user_globs: GlobSet::empty(),
        }
    }
}

impl ExclusionRules {
    pub fn builder() -> ExclusionRulesBuilder {
        ExclusionRulesBuilder::default()
    }

    /// Decide whether a root-relative path should be skipped.
    ///
    /// Applies to the last component for name rules, but any denied directory
    /// anywhere in the path excludes it too, so callers that do not prune can
    /// still rely on the answer.
    pub fn should_exclude(&self, relative: &str, is_dir: bool) -> bool {
        if relative.is_empty() {
            return false;
        }

        let components: Vec<&str> = relative.split('/').collect();
        let (last, parents) = match components.split_last() {
            Some(split) => split,
            None => return false,
        };

        if parents.iter().any(|dir| is_denied_dir(dir)) {
            return true;
        }

        if self.is_blocked_hidden(relative, is_dir) {
            return true;
        }

        if is_dir {
            if is_denied_dir(last) {
                return true;
            }
        } else {
            if SKIP_FILES.contains(last) {
                return true;
            }
            if is_binary_extension(&extension(relative)) {
                return true;
            }
            if self.skip_paths.contains(relative) {
                return true;
            }
        }

        self.user_globs.is_match(relative) || self.user_globs.is_match(file_name(relative))
    }

    /// A path with hidden components passes only when it ends with an allowed
    /// fragment (directory part for directories, whole fragment for files) and
    /// every hidden component lies inside that matched suffix.
    fn is_blocked_hidden(&self, relative: &str, is_dir: bool) -> bool {
        if self.include_hidden || !relative.split('/').any(is_hidden_name) {
            return false;
        }

        let allowed = if is_dir {
            &self.hidden_dirs
        } else {
            &self.hidden_files
        };

        !allowed.iter().any(|fragment| {
            ends_with_fragment(relative, fragment)
                && !relative[..relative.len() - fragment.len()]
                    .split('/')
                    .any(is_hidden_name)
        })
    }
}

fn is_denied_dir(name: &str) -> bool {
    SKIP_DIRS.contains(&name)
        || SKIP_DIR_SUFFIXES
            .iter()
            .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
}

/// Check an extension (with leading dot, lowercase) against the binary list
pub fn is_binary_extension(ext: &str) -> bool {
    !ext.is_empty() && BINARY_EXTENSIONS.contains(&ext)
}

/// Builder for [`ExclusionRules`]
#[derive(Debug, Default)]
pub struct ExclusionRulesBuilder {
    include_hidden: bool,
    hidden_dirs: BTreeSet<String>,
    hidden_files: BTreeSet<String>,
    skip_paths: BTreeSet<String>,
    patterns: Vec<String>,
}

impl ExclusionRulesBuilder {
    /// Let every hidden entry through (denied names still apply)
    pub fn include_hidden(mut self, yes: bool) -> Self {
        self.include_hidden = yes;
        self
    }

    /// Let a hidden priority fragment through, together with the directories
    /// leading to it: `.github/workflows/ci.yml` opens `.github`,
    /// `.github/workflows` and that one file.
    pub fn allow_hidden_from(mut self, fragment: &str) -> Self {
        let components: Vec<&str> = fragment.split('/').filter(|c| !c.is_empty()).collect();
        if !components.iter().any(|c| is_hidden_name(c)) {
            return self;
        }

        for end in 1..components.len() {
            self.hidden_dirs.insert(components[..end].join("/"));
        }
        self.hidden_files.insert(components.join("/"));
        self
    }

    /// Skip one exact relative file path
    pub fn skip_path(mut self, relative: impl Into<String>) -> Self {
        self.skip_paths.insert(relative.into());
        self
    }

    /// Add user exclusion globs
    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<ExclusionRules> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.patterns {
            let glob = Glob::new(pattern).map_err(|source| ContextError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let user_globs = builder
            .build()
            .map_err(|source| ContextError::InvalidGlob {
                pattern: self.patterns.join(" "),
                source,
            })?;

        Ok(ExclusionRules {
            include_hidden: self.include_hidden,
            hidden_dirs: self.hidden_dirs,
            hidden_files: self.hidden_files,
            skip_paths: self.skip_paths,
            user_globs,
        })
    }
}
