//! Error types for mrake

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mrake operations
pub type Result<T> = std::result::Result<T, RakeError>;

/// Main error type for mrake
#[derive(Error, Debug)]
pub enum RakeError {
    /// Rakefile discovery and loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task invocation errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Command line errors, including help and version requests
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

/// Rakefile discovery and declaration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No Rakefile found (looking for: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid task declaration: {0}")]
    InvalidTaskSpec(String),

    #[error("Failed to import file '{path}': {error}")]
    IncludeFile { path: PathBuf, error: String },
}

/// Task invocation errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Don't know how to build task '{0}'")]
    TaskNotFound(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Task '{task}' failed: {reason}")]
    ActionFailed { task: String, reason: String },
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
