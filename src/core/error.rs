//! Fatal errors
//!
//! Anything in here aborts the run before output is written. Per-file problems
//! are not errors; they end up as [`SkippedFile`](crate::core::model::SkippedFile)
//! entries in the selection.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ContextError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ContextError {
    #[error("Path '{0}' does not exist")]
    RootNotFound(PathBuf),

    #[error("Path '{0}' is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("Output directory '{0}' does not exist or is not a directory")]
    OutputDirMissing(PathBuf),

    #[error("Output path '{0}' is a directory")]
    OutputIsDirectory(PathBuf),

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid max tokens: {0} (must be greater than zero)")]
    InvalidBudget(usize),

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = ContextError::RootNotFound(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "Path '/nope' does not exist");

        let err = ContextError::RootNotDirectory(PathBuf::from("file.txt"));
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_invalid_glob_keeps_source() {
        let source = globset::Glob::new("[").unwrap_err();
        let err = ContextError::InvalidGlob {
            pattern: "[".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Invalid exclude pattern '['"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
