//! CLI interface and argument parsing
//!
//! This module turns the command line into top-level task invocations.

pub mod app;

// Re-export main types
pub use app::*;
