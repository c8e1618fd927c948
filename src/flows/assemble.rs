//! Context assembly - turn a selection into the final text document
//!
//! Sections, in order: metadata header, summary, structure tree (optional),
//! file contents. The timestamp in the header is the only part that depends
//! on when the run happened.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::core::config::ContextConfig;
use crate::core::model::{CandidateFile, SelectionResult};

const RULE: &str = "================================================================================";

/// Number of files listed under "Largest Files"
const LARGEST_FILES: usize = 5;

/// Format an integer with thousands separators
pub fn with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn header(config: &ContextConfig, generated_at: &str) -> String {
    let priority = if config.priority.is_empty() {
        "none".to_string()
    } else {
        config.priority.join(" ")
    };

    let mut out = String::new();
    out.push_str("# CODEBASE CONTEXT FOR LLM\n");
    let _ = writeln!(out, "# Generated: {} (informational only)", generated_at);
    let _ = writeln!(out, "# Root: {}", config.root.display());
    let _ = writeln!(out, "# Token Budget: {}", with_commas(config.max_tokens));
    let _ = writeln!(out, "# Token Model: {}", config.token_model);
    let _ = writeln!(out, "# Extensions: {}", config.extensions);
    let _ = writeln!(out, "# Priority: {}", priority);
    out.push('\n');
    out
}

fn summary(selection: &SelectionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\nCODEBASE SUMMARY\n{}", RULE, RULE);
    let _ = writeln!(out, "Total Files: {}", selection.len());
    let _ = writeln!(
        out,
        "Total Tokens (estimated): {}",
        with_commas(selection.total_tokens)
    );
    let _ = writeln!(out, "Budget Exceeded: {}", yes_no(selection.budget_exceeded));
    let _ = writeln!(out, "Over Budget: {}", yes_no(selection.over_budget));
    let _ = writeln!(out, "Skipped (budget): {}", selection.budget_skipped());
    let _ = writeln!(out, "Skipped (unreadable): {}", selection.unreadable());
    let _ = writeln!(out, "Total Lines: {}", with_commas(selection.total_lines()));
    let _ = writeln!(
        out,
        "Total Size: {:.2} KB",
        selection.total_bytes() as f64 / 1024.0
    );
    out.push('\n');

    // Most common first, ties by extension
    let mut by_ext: BTreeMap<&str, usize> = BTreeMap::new();
    for file in &selection.files {
        let ext = if file.extension.is_empty() {
            "no extension"
        } else {
            file.extension.as_str()
        };
        *by_ext.entry(ext).or_default() += 1;
    }
    let mut by_ext: Vec<(&str, usize)> = by_ext.into_iter().collect();
    by_ext.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    out.push_str("File Types:\n");
    for (ext, count) in by_ext {
        let _ = writeln!(out, "  {}: {} files", ext, count);
    }
    out.push('\n');

    let mut largest: Vec<&CandidateFile> = selection.files.iter().collect();
    largest.sort_by(|a, b| b.tokens().cmp(&a.tokens()).then_with(|| a.path.cmp(&b.path)));

    out.push_str("Largest Files:\n");
    for file in largest.into_iter().take(LARGEST_FILES) {
        let _ = writeln!(
            out,
            "  {} - {} lines, ~{} tokens",
            file.path,
            with_commas(file.lines()),
            with_commas(file.tokens())
        );
    }
    let _ = writeln!(out, "{}\n", RULE);
    out
}

fn file_block(file: &CandidateFile, out: &mut String) {
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "FILE: {}", file.path);
    let _ = writeln!(
        out,
        "Lines: {} | Tokens: ~{}",
        with_commas(file.lines()),
        with_commas(file.tokens())
    );
    let _ = writeln!(out, "{}\n", RULE);
    out.push_str(file.content());
    out.push_str("\n\n");
}

/// Build the final document.
///
/// `tree` is the rendered structure, or `None` to leave the section out.
pub fn assemble(
    config: &ContextConfig,
    selection: &SelectionResult,
    tree: Option<&str>,
    generated_at: &str,
) -> String {
    let content_len: usize = selection.files.iter().map(|f| f.content().len()).sum();
    let mut out = String::with_capacity(content_len + 4096);

    out.push_str(&header(config, generated_at));
    out.push_str(&summary(selection));

    if let Some(tree) = tree {
        out.push_str("PROJECT STRUCTURE:\n");
        out.push_str(tree);
        out.push('\n');
    }

    let _ = writeln!(out, "{}\nFILE CONTENTS\n{}\n", RULE, RULE);
    for file in &selection.files {
        file_block(file, &mut out);
    }

    out
}
