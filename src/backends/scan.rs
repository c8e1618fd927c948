//! File walking backend
//!
//! Uses the ignore crate's walker with our own exclusion rules installed as an
//! entry filter, so denied directories are pruned before they are read.

use ignore::{Walk, WalkBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::exclude::ExclusionRules;
use crate::core::model::CandidateFile;
use crate::core::paths::make_relative;

/// One entry produced by the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to root, using '/' as separator
    pub relative: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Directories between root and entry; a top-level entry is 0
    pub depth: usize,
}

/// Lazy, pull-based walk over a directory tree.
///
/// Entries come out depth-first with each directory's children sorted by
/// name. Symlinks are not followed. To restart, call [`walk`] again.
pub struct FileWalker {
    root: PathBuf,
    inner: Walk,
}

/// Walk `root`, pruning everything `rules` excludes
pub fn walk(root: &Path, rules: &ExclusionRules, respect_gitignore: bool) -> FileWalker {
    let rules = Arc::new(rules.clone());
    let filter_root = root.to_path_buf();

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .require_git(false)
        .ignore(respect_gitignore)
        .git_ignore(respect_gitignore)
        .git_exclude(respect_gitignore)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            match make_relative(entry.path(), &filter_root) {
                Some(relative) => !rules.should_exclude(&relative, is_dir),
                None => false,
            }
        });

    FileWalker {
        root: root.to_path_buf(),
        inner: builder.build(),
    }
}

impl Iterator for FileWalker {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Error walking entry: {}", err);
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let relative = match make_relative(entry.path(), &self.root) {
                Some(r) => r,
                None => continue,
            };

            let file_type = match entry.file_type() {
                Some(ft) => ft,
                None => continue,
            };

            // Symlinks are listed but never followed or read
            if file_type.is_symlink() {
                log::debug!("Skipping symlink: {}", relative);
                continue;
            }

            log::trace!("Walked path: {}", relative);
            return Some(WalkEntry {
                relative,
                path: entry.path().to_path_buf(),
                is_dir: file_type.is_dir(),
                depth: entry.depth() - 1,
            });
        }
    }
}

/// Collect the candidate files under `root`, in walk order
pub fn scan_candidates(
    root: &Path,
    rules: &ExclusionRules,
    respect_gitignore: bool,
) -> Vec<CandidateFile> {
    let mut candidates = Vec::new();

    for entry in walk(root, rules, respect_gitignore) {
        if entry.is_dir {
            continue;
        }
        let size = match entry.path.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                log::warn!("Cannot stat {}: {}", entry.relative, e);
                0
            }
        };
        candidates.push(CandidateFile::new(entry.relative, entry.path, size));
    }

    log::debug!("Walk complete: {} candidate files", candidates.len());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    fn relative_files(root: &Path, rules: &ExclusionRules) -> Vec<String> {
        walk(root, rules, false)
            .filter(|e| !e.is_dir)
            .map(|e| e.relative)
            .collect()
    }

    #[test]
    fn test_walk_empty_dir() {
        let temp = tempdir().unwrap();
        assert_eq!(walk(temp.path(), &ExclusionRules::default(), false).count(), 0);
    }

    #[test]
    fn test_walk_sorted_by_name() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "b.txt");
        touch(temp.path(), "a.txt");
        touch(temp.path(), "sub/zz.md");
        touch(temp.path(), "sub/aa.md");

        let files = relative_files(temp.path(), &ExclusionRules::default());
        assert_eq!(files, vec!["a.txt", "b.txt", "sub/aa.md", "sub/zz.md"]);
    }

    #[test]
    fn test_walk_yields_directories() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "src/lib.rs");

        let entries: Vec<WalkEntry> = walk(temp.path(), &ExclusionRules::default(), false).collect();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_dir);
        assert_eq!(entries[0].relative, "src");
        assert_eq!(entries[0].depth, 0);
        assert_eq!(entries[1].relative, "src/lib.rs");
        assert_eq!(entries[1].depth, 1);
    }

    #[test]
    fn test_walk_prunes_excluded_dirs() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "a.py");
        touch(temp.path(), "node_modules/c.js");
        touch(temp.path(), "node_modules/deep/d.js");
        touch(temp.path(), ".git/HEAD");
        touch(temp.path(), "pkg/target/debug/out.rs");

        let entries: Vec<String> = walk(temp.path(), &ExclusionRules::default(), false)
            .map(|e| e.relative)
            .collect();
        assert_eq!(entries, vec!["a.py", "pkg"]);
    }

    #[test]
    fn test_walk_is_restartable() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "x.rs");
        let rules = ExclusionRules::default();

        let first: Vec<_> = walk(temp.path(), &rules, false).collect();
        touch(temp.path(), "y.rs");
        let second: Vec<_> = walk(temp.path(), &rules, false).collect();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_gitignore_respected_only_when_asked() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "keep.rs");
        touch(temp.path(), "generated.rs");
        fs::write(temp.path().join(".ignore"), "generated.rs\n").unwrap();

        let rules = ExclusionRules::default();
        let all: Vec<String> = walk(temp.path(), &rules, false).map(|e| e.relative).collect();
        assert_eq!(all, vec!["generated.rs", "keep.rs"]);

        let filtered: Vec<String> = walk(temp.path(), &rules, true).map(|e| e.relative).collect();
        assert_eq!(filtered, vec!["keep.rs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "dir/file.rs");
        std::os::unix::fs::symlink(temp.path(), temp.path().join("dir/loop")).unwrap();

        let files = relative_files(temp.path(), &ExclusionRules::default());
        assert_eq!(files, vec!["dir/file.rs"]);
    }

    #[test]
    fn test_walk_depth_matches_candidate_depth() {
        let temp = tempdir().unwrap();
        touch(temp.path(), "top.rs");
        touch(temp.path(), "a/b/c/deep.rs");

        let walked: Vec<(String, usize)> = walk(temp.path(), &ExclusionRules::default(), false)
            .filter(|e| !e.is_dir)
            .map(|e| (e.relative, e.depth))
            .collect();
        let scanned: Vec<(String, usize)> =
            scan_candidates(temp.path(), &ExclusionRules::default(), false)
                .into_iter()
                .map(|c| (c.path, c.depth))
                .collect();
        assert_eq!(walked, vec![("a/b/c/deep.rs".to_string(), 3), ("top.rs".to_string(), 0)]);
        assert_eq!(walked, scanned);
    }

    #[test]
    fn test_scan_candidates_reads_size() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.py"), "x".repeat(100)).unwrap();

        let candidates = scan_candidates(temp.path(), &ExclusionRules::default(), false);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, "a.py");
        assert_eq!(candidates[0].size, 100);
        assert_eq!(candidates[0].extension, ".py");
    }
}
