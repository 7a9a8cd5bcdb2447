//! Rakefile types
//!
//! This module defines the data structures that represent a Rakefile. Task
//! declarations are kept in file order so they can be replayed into a
//! registry exactly as written.

use crate::runner::{ShellCommand, TaskSpec};
use serde::Deserialize;

/// Top-level Rakefile structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rakefile {
    /// Interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default)]
    pub interpreter: Option<Vec<String>>,

    /// Environment file to load, relative to the Rakefile
    #[serde(default)]
    pub dotenv: Option<String>,

    /// Other Rakefiles to load after this one (glob patterns)
    #[serde(default, deserialize_with = "deserialize_strings")]
    pub import: Vec<String>,

    /// Task declarations, in order
    #[serde(default)]
    pub tasks: Vec<TaskDecl>,
}

/// A single `task` declaration
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDecl {
    /// Name, or `{name: [prerequisites]}`
    pub task: TaskSpec,

    /// Additional prerequisites
    #[serde(default, deserialize_with = "deserialize_strings")]
    pub deps: Vec<String>,

    /// Names for positional arguments
    #[serde(default, deserialize_with = "deserialize_strings")]
    pub args: Vec<String>,

    /// Commands forming this declaration's action
    #[serde(default, deserialize_with = "deserialize_run_items")]
    pub run: Vec<RunItem>,
}

/// A command under `run:`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RunItem {
    /// Simple string command
    Simple(String),

    /// Command with additional options
    Detail(CommandDetail),
}

/// Detailed command specification
#[derive(Debug, Clone, Deserialize)]
pub struct CommandDetail {
    /// The command to execute
    pub exec: String,

    /// Working directory for the command
    #[serde(default)]
    pub dir: Option<String>,

    /// Whether to skip echoing the command
    #[serde(default)]
    pub quiet: bool,
}

impl From<RunItem> for ShellCommand {
    fn from(item: RunItem) -> Self {
        match item {
            RunItem::Simple(exec) => ShellCommand::new(exec),
            RunItem::Detail(detail) => ShellCommand {
                exec: detail.exec,
                dir: detail.dir,
                quiet: detail.quiet,
            },
        }
    }
}

/// Accept either a single string or a list of strings
fn deserialize_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| String::deserialize(item).map_err(D::Error::custom))
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("expected a string or a list of strings")),
    }
}

/// Custom deserializer for run items that handles both single values and arrays
fn deserialize_run_items<'de, D>(deserializer: D) -> Result<Vec<RunItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        // Single string command
        Value::String(s) => Ok(vec![RunItem::Simple(s)]),
        // Single detailed command
        Value::Mapping(_) => {
            let item = RunItem::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![item])
        }
        // Array of run items
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| RunItem::deserialize(item).map_err(D::Error::custom))
            .collect(),
        // Null or not present
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("run must be a string, object, or array")),
    }
}
