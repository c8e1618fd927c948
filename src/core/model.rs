//! Selection model
//!
//! Candidates come out of the walker with only path metadata; content is
//! attached when the selector reaches them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::paths::{depth, extension};

/// A file discovered by the walk, not yet decided for inclusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Path relative to root, using '/' as separator
    pub path: String,

    /// Absolute path on disk
    #[serde(skip)]
    pub full_path: PathBuf,

    /// Size on disk in bytes
    pub size: u64,

    /// Lowercase extension with leading dot ("" when none)
    pub extension: String,

    /// Directories between root and file
    pub depth: usize,

    /// Raw text, present once read
    #[serde(skip)]
    pub content: Option<String>,

    /// Estimated content tokens, present once read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<usize>,

    /// Line count, present once read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<usize>,

    /// Set when the file matched a priority fragment
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub priority: bool,
}

impl CandidateFile {
    pub fn new(path: impl Into<String>, full_path: PathBuf, size: u64) -> Self {
        let path = path.into();
        Self {
            extension: extension(&path),
            depth: depth(&path),
            path,
            full_path,
            size,
            content: None,
            tokens: None,
            lines: None,
            priority: false,
        }
    }

    /// Attach content and its token estimate
    pub fn with_content(mut self, content: String, tokens: usize) -> Self {
        self.lines = Some(count_lines(&content));
        self.tokens = Some(tokens);
        self.content = Some(content);
        self
    }

    pub fn tokens(&self) -> usize {
        self.tokens.unwrap_or(0)
    }

    pub fn lines(&self) -> usize {
        self.lines.unwrap_or(0)
    }

    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Lines as an editor shows them: a trailing newline does not open a new line
pub fn count_lines(content: &str) -> usize {
    content.lines().count()
}

/// Why a candidate was left out without being an exclusion rule hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// I/O error while reading
    Unreadable,
    /// Content is not valid UTF-8
    InvalidEncoding,
    /// Content contains NUL bytes
    Binary,
    /// Larger than the configured file size limit
    TooLarge,
    /// Did not fit in the remaining token budget
    Budget,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Unreadable => "UNREADABLE",
            SkipReason::InvalidEncoding => "INVALID_ENCODING",
            SkipReason::Binary => "BINARY_FILE",
            SkipReason::TooLarge => "FILE_TOO_LARGE",
            SkipReason::Budget => "OVER_BUDGET",
        }
    }

    /// Read failures, as opposed to budget decisions
    pub fn is_read_failure(&self) -> bool {
        !matches!(self, SkipReason::Budget)
    }
}

/// A candidate that was considered but not included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SkippedFile {
    pub fn new(path: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Outcome of the selector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Included files in output order
    pub files: Vec<CandidateFile>,

    /// Estimated tokens including fixed overhead
    pub total_tokens: usize,

    /// Budget the selection ran against
    pub max_tokens: usize,

    /// Some eligible candidate had to be skipped to stay within budget
    pub budget_exceeded: bool,

    /// Mandatory priority files pushed the total past `max_tokens`
    pub over_budget: bool,

    /// First candidate skipped for budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_budget_skip: Option<String>,

    /// Everything considered but left out, in decision order
    pub skipped: Vec<SkippedFile>,

    /// Eligible candidates the selector looked at
    pub candidates: usize,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files dropped for budget
    pub fn budget_skipped(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::Budget)
            .count()
    }

    /// Files dropped because they could not be read as text
    pub fn unreadable(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason.is_read_failure())
            .count()
    }

    /// Tokens of file content only, without any overhead
    pub fn content_tokens(&self) -> usize {
        self.files.iter().map(CandidateFile::tokens).sum()
    }

    pub fn total_lines(&self) -> usize {
        self.files.iter().map(CandidateFile::lines).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.content().len() as u64).sum()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}
