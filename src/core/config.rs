//! Run configuration
//!
//! One immutable [`ContextConfig`] drives a whole run. The CLI builds it from
//! arguments; library users build it directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::{ContextError, Result};
use crate::core::exclude::ExclusionRules;
use crate::core::file_reader::{FileReadConfig, DEFAULT_MAX_FILE_SIZE};
use crate::core::paths::{make_relative, normalize_fragment};
use crate::core::tokenizer::TokenModel;

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "codebase-context.txt";

/// Default token budget
pub const DEFAULT_MAX_TOKENS: usize = 100_000;

/// Which extensions are eligible for selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionFilter {
    /// Every non-excluded file
    #[default]
    All,
    /// Only these lowercase extensions, each with a leading dot
    Only(BTreeSet<String>),
}

impl ExtensionFilter {
    /// Build a filter from user input; `py`, `.py` and `.PY` are the same.
    /// An empty list means no filter.
    pub fn from_list<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty() && e != ".")
            .map(|e| if e.starts_with('.') { e } else { format!(".{}", e) })
            .collect();

        if set.is_empty() {
            ExtensionFilter::All
        } else {
            ExtensionFilter::Only(set)
        }
    }

    /// Files without an extension only pass the `All` filter
    pub fn allows(&self, extension: &str) -> bool {
        match self {
            ExtensionFilter::All => true,
            ExtensionFilter::Only(set) => set.contains(extension),
        }
    }
}

impl fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionFilter::All => write!(f, "all"),
            ExtensionFilter::Only(set) => {
                let list: Vec<&str> = set.iter().map(String::as_str).collect();
                write!(f, "{}", list.join(" "))
            }
        }
    }
}

/// Everything one run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub root: PathBuf,
    pub output: PathBuf,
    pub max_tokens: usize,
    pub extensions: ExtensionFilter,
    /// Normalized priority fragments, in the order given
    pub priority: Vec<String>,
    pub include_tree: bool,
    pub token_model: TokenModel,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    pub exclude: Vec<String>,
    pub max_file_size: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            max_tokens: DEFAULT_MAX_TOKENS,
            extensions: ExtensionFilter::All,
            priority: Vec::new(),
            include_tree: true,
            token_model: TokenModel::default(),
            include_hidden: false,
            respect_gitignore: false,
            exclude: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ContextConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = ExtensionFilter::from_list(extensions);
        self
    }

    /// Set priority fragments; blanks and duplicates are dropped, first
    /// occurrence wins.
    pub fn with_priority<I, S>(mut self, priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        self.priority = priority
            .into_iter()
            .map(|p| normalize_fragment(p.as_ref()))
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();
        self
    }

    pub fn with_tree(mut self, include_tree: bool) -> Self {
        self.include_tree = include_tree;
        self
    }

    pub fn with_token_model(mut self, model: TokenModel) -> Self {
        self.token_model = model;
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn with_gitignore(mut self, respect_gitignore: bool) -> Self {
        self.respect_gitignore = respect_gitignore;
        self
    }

    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn read_config(&self) -> FileReadConfig {
        FileReadConfig {
            max_file_size: self.max_file_size,
        }
    }

    /// Check everything that can fail before any work is done, returning the
    /// canonical root.
    pub fn validate(&self) -> Result<PathBuf> {
        if self.max_tokens == 0 {
            return Err(ContextError::InvalidBudget(self.max_tokens));
        }

        if !self.root.exists() {
            return Err(ContextError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ContextError::RootNotDirectory(self.root.clone()));
        }
        let root = self
            .root
            .canonicalize()
            .map_err(|_| ContextError::RootNotFound(self.root.clone()))?;

        if self.output.is_dir() {
            return Err(ContextError::OutputIsDirectory(self.output.clone()));
        }
        let parent = output_parent(&self.output);
        if !parent.is_dir() {
            return Err(ContextError::OutputDirMissing(parent.to_path_buf()));
        }

        Ok(root)
    }

    /// Exclusion rules for this run. `root` must be canonical.
    pub fn exclusion_rules(&self, root: &Path) -> Result<ExclusionRules> {
        let mut builder = ExclusionRules::builder()
            .include_hidden(self.include_hidden)
            .patterns(self.exclude.iter().cloned());

        for fragment in &self.priority {
            builder = builder.allow_hidden_from(fragment);
        }

        if let Some(relative) = self.output_relative_to(root) {
            builder = builder.skip_path(relative);
        }

        builder.build()
    }

    /// The output path relative to `root`, when the output lands inside it
    fn output_relative_to(&self, root: &Path) -> Option<String> {
        let file_name = self.output.file_name()?;
        let parent = output_parent(&self.output).canonicalize().ok()?;
        make_relative(&parent.join(file_name), root)
    }
}

fn output_parent(output: &Path) -> &Path {
    match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
