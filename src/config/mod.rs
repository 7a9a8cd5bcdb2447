//! Rakefile discovery, parsing and loading
//!
//! This module locates the Rakefile, parses its YAML declarations and replays
//! them into a task registry.

pub mod load;
pub mod parse;
pub mod types;

// Re-export main types
pub use load::*;
pub use parse::*;
pub use types::*;
