//! Context generation flow - the end-to-end run
//!
//! validate -> walk -> select -> render tree -> assemble -> write.
//! The CLI is a thin wrapper around [`generate_context`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backends::scan::scan_candidates;
use crate::backends::write::write_atomic;
use crate::core::config::ContextConfig;
use crate::core::error::Result;
use crate::core::model::SelectionResult;
use crate::core::tree::render_tree;
use crate::flows::assemble::assemble;
use crate::flows::select::select;

/// What a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextReport {
    /// Canonical root that was scanned
    pub root: PathBuf,
    /// Where the document was written (None for dry runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Files found by the walk, before the extension filter
    pub found: usize,
    /// Size of the assembled document in bytes
    pub bytes: usize,
    pub selection: SelectionResult,
}

/// Current local time for the informational header line
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Name shown at the top of the structure tree
fn root_label(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

/// Validate, walk and select. Returns the config with its root canonicalized,
/// the number of files walked, and the selection.
pub fn select_files(config: &ContextConfig) -> Result<(ContextConfig, usize, SelectionResult)> {
    let root = config.validate()?;
    let rules = config.exclusion_rules(&root)?;
    let config = ContextConfig {
        root,
        ..config.clone()
    };

    log::info!("Scanning codebase at: {}", config.root.display());
    let candidates = scan_candidates(&config.root, &rules, config.respect_gitignore);
    let found = candidates.len();

    let selection = select(candidates, &config);
    Ok((config, found, selection))
}

/// Build the document without writing it, stamping it with `generated_at`
pub fn build_context_at(
    config: &ContextConfig,
    generated_at: &str,
) -> Result<(String, ContextReport)> {
    let (config, found, selection) = select_files(config)?;

    let tree = config
        .include_tree
        .then(|| render_tree(&root_label(&config.root), selection.paths()));
    let text = assemble(&config, &selection, tree.as_deref(), generated_at);

    let report = ContextReport {
        root: config.root,
        output: None,
        found,
        bytes: text.len(),
        selection,
    };
    Ok((text, report))
}

/// Build the document without writing it
pub fn build_context(config: &ContextConfig) -> Result<(String, ContextReport)> {
    build_context_at(config, &timestamp())
}

/// Build the document and write it to `config.output`
pub fn generate_context(config: &ContextConfig) -> Result<ContextReport> {
    let (text, mut report) = build_context(config)?;
    write_atomic(&config.output, &text)?;
    report.output = Some(config.output.clone());
    Ok(report)
}
