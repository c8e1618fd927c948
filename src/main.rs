//! codebase-context - Pack a project into a single LLM-ready context file
//!
//! codebase-context provides:
//! - Project walking with built-in exclusions for dependency and build directories
//! - Token-budgeted file selection with priority files first
//! - A single text document with summary, structure tree and file contents

use anyhow::Result;
use clap::Parser;
use codebase_context::cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
