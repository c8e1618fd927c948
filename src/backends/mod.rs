//! Backends module - Filesystem access
//!
//! Provides:
//! - scan: Directory walking with exclusion pruning
//! - write: Atomic output writing

pub mod scan;
pub mod write;
