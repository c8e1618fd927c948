//! Flows module - Multi-step operations built on core and backends
//!
//! Provides:
//! - select: Ordering and token budgeting
//! - assemble: Final document layout
//! - generate: End-to-end run used by the CLI and library callers

pub mod assemble;
pub mod generate;
pub mod select;
