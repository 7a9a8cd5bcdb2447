//! Task invocation engine
//!
//! This module holds the task registry, task reference parsing and the
//! execution of prerequisites and actions.

pub mod command;
pub mod context;
pub mod interpolate;
pub mod registry;
pub mod task;
pub mod task_string;

// Re-export main types
pub use command::*;
pub use context::*;
pub use interpolate::*;
pub use registry::*;
pub use task::*;
pub use task_string::*;
