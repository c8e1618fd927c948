//! codebase-context - pack a project into a single LLM context file
//!
//! The crate walks a directory, picks files under a token budget and writes
//! one text document with a summary, a structure tree and the full contents
//! of every selected file.
//!
//! ```no_run
//! use codebase_context::{generate_context, ContextConfig};
//!
//! let config = ContextConfig::new("path/to/project")
//!     .with_max_tokens(50_000)
//!     .with_extensions([".py", ".md"])
//!     .with_priority(["main.py"]);
//! let report = generate_context(&config)?;
//! println!("{} files", report.selection.len());
//! # Ok::<(), codebase_context::ContextError>(())
//! ```

pub mod backends;
pub mod cli;
pub mod core;
pub mod flows;

pub use crate::core::config::{ContextConfig, ExtensionFilter};
pub use crate::core::error::ContextError;
pub use crate::core::model::{CandidateFile, SelectionResult};
pub use crate::flows::generate::{build_context, generate_context, ContextReport};
