//! Core module - Data structures and pure building blocks
//!
//! This module provides:
//! - Run configuration and fatal errors
//! - Exclusion rules
//! - Path normalization utilities
//! - Text file reading
//! - Token estimation for context budgeting
//! - Structure tree rendering

pub mod config;
pub mod error;
pub mod exclude;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod tokenizer;
pub mod tree;
