//! Atomic output writing
//!
//! The document goes to a temporary file next to the target, is synced, then
//! renamed over the target. An interrupted run leaves either the old file or
//! the new one, never a truncated mix.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::core::error::{ContextError, Result};

/// Write `content` to `path` atomically
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let write_err = |source: std::io::Error| ContextError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(content.as_bytes()).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;
    temp_file.persist(path).map_err(|e| write_err(e.error))?;

    log::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_new_file() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("out.txt");

        write_atomic(&target, "hello\n").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello\n");
    }

    #[test]
    fn test_overwrite_existing() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("out.txt");
        fs::write(&target, "old content that is longer").unwrap();

        write_atomic(&target, "new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp = tempdir().unwrap();
        write_atomic(&temp.path().join("out.txt"), "x").unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("missing/out.txt");

        let err = write_atomic(&target, "x").unwrap_err();
        assert!(matches!(err, ContextError::Write { .. }));
        assert!(!target.exists());
    }
}
