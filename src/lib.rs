//! mrake - a rake-style task runner
//!
//! Tasks are declared in a YAML Rakefile, found by searching upward from the
//! current directory, and invoked by name (optionally `name[arg1,arg2]`)
//! together with their prerequisites.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;


// Re-export commonly used types
pub use error::{RakeError, Result};

/// Current version of mrake
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
