//! File reading
//!
//! Reads a candidate as text or explains why it cannot be used:
//! - Unreadable files (permissions, races with deletion)
//! - Oversized files
//! - Binary files (NUL bytes in the first 8 KB)
//! - Non-UTF-8 files
//!
//! Content is never truncated; a file is either usable in full or skipped.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::core::model::{SkipReason, SkippedFile};

/// Default maximum file size in bytes (10 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Bytes inspected for NUL when sniffing binaries
const BINARY_SNIFF_LEN: usize = 8192;

/// Configuration for file reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReadConfig {
    /// Files above this size are skipped (bytes)
    pub max_file_size: u64,
}

impl Default for FileReadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Read a file as UTF-8 text.
///
/// `relative` is only used to label the [`SkippedFile`] on failure.
pub fn read_text(path: &Path, relative: &str, config: &FileReadConfig) -> Result<String, SkippedFile> {
    let metadata = fs::metadata(path).map_err(|e| {
        SkippedFile::new(relative, SkipReason::Unreadable)
            .with_message(format!("Cannot read metadata: {}", e))
    })?;

    let file_size = metadata.len();
    if file_size > config.max_file_size {
        return Err(SkippedFile::new(relative, SkipReason::TooLarge).with_message(format!(
            "File exceeds size limit ({} > {} bytes)",
            file_size, config.max_file_size
        )));
    }

    let bytes = read_file_bytes(path).map_err(|e| {
        SkippedFile::new(relative, SkipReason::Unreadable)
            .with_message(format!("Cannot read file: {}", e))
    })?;

    let check_len = std::cmp::min(BINARY_SNIFF_LEN, bytes.len());
    if bytes[..check_len].contains(&0) {
        return Err(SkippedFile::new(relative, SkipReason::Binary)
            .with_message("File appears to be binary (contains null bytes)"));
    }

    String::from_utf8(bytes).map_err(|e| {
        SkippedFile::new(relative, SkipReason::InvalidEncoding).with_message(format!(
            "File contains invalid UTF-8 at byte {}",
            e.utf8_error().valid_up_to()
        ))
    })
}

fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let capacity = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
    let mut reader = std::io::BufReader::new(file);
    let mut buffer = Vec::with_capacity(capacity);
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_utf8() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "héllo\n").unwrap();

        let content = read_text(&path, "a.txt", &FileReadConfig::default()).unwrap();
        assert_eq!(content, "héllo\n");
    }

    #[test]
    fn test_read_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.py");
        fs::write(&path, "").unwrap();

        let content = read_text(&path, "empty.py", &FileReadConfig::default()).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_binary_skipped() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("blob.dat");
        fs::write(&path, [b'a', 0, b'b']).unwrap();

        let skipped = read_text(&path, "blob.dat", &FileReadConfig::default()).unwrap_err();
        assert_eq!(skipped.reason, SkipReason::Binary);
        assert_eq!(skipped.path, "blob.dat");
    }

    #[test]
    fn test_invalid_utf8_skipped() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("latin1.txt");
        fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();

        let skipped = read_text(&path, "latin1.txt", &FileReadConfig::default()).unwrap_err();
        assert_eq!(skipped.reason, SkipReason::InvalidEncoding);
        assert!(skipped.message.unwrap().contains("byte 3"));
    }

    #[test]
    fn test_too_large_skipped() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("big.txt");
        fs::write(&path, "x".repeat(100)).unwrap();

        let config = FileReadConfig { max_file_size: 10 };
        let skipped = read_text(&path, "big.txt", &config).unwrap_err();
        assert_eq!(skipped.reason, SkipReason::TooLarge);
    }

    #[test]
    fn test_missing_file_unreadable() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("gone.txt");

        let skipped = read_text(&path, "gone.txt", &FileReadConfig::default()).unwrap_err();
        assert_eq!(skipped.reason, SkipReason::Unreadable);
    }
}
