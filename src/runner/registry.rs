//! Task registry
//!
//! Maps task names to [`Task`]s. Defining a name that already exists enhances
//! the existing task instead of replacing it.

use crate::error::{ConfigError, ConfigResult, ExecutionError, ExecutionResult};
use crate::runner::{parse_task_string, Action, Context, Task};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// The name part of a task declaration
///
/// Either a bare name, or a single-key mapping from the name to its
/// prerequisites (`{build: [compile, link]}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TaskSpec {
    Name(String),
    WithPrerequisites(HashMap<String, Prerequisites>),
}

/// Prerequisite list as written by a Rakefile author; nested lists are flattened
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Prerequisites {
    One(String),
    Many(Vec<Prerequisites>),
}

impl Prerequisites {
    pub fn flatten(&self) -> Vec<String> {
        match self {
            Prerequisites::One(name) => vec![name.clone()],
            Prerequisites::Many(items) => items.iter().flat_map(Prerequisites::flatten).collect(),
        }
    }
}

impl From<&str> for TaskSpec {
    fn from(name: &str) -> Self {
        TaskSpec::Name(name.to_string())
    }
}

impl TaskSpec {
    /// Shorthand for `{name: [prerequisites...]}`
    pub fn with_prerequisites<I, S>(name: impl Into<String>, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = prerequisites
            .into_iter()
            .map(|p| Prerequisites::One(p.into()))
            .collect();
        TaskSpec::WithPrerequisites(HashMap::from([(name.into(), Prerequisites::Many(list))]))
    }
}

/// Normalize a declaration into `(name, prerequisite names)`
pub fn resolve_args(spec: &TaskSpec) -> ConfigResult<(String, Vec<String>)> {
    match spec {
        TaskSpec::Name(name) => Ok((name.clone(), Vec::new())),
        TaskSpec::WithPrerequisites(map) => {
            let mut entries = map.iter();
            match (entries.next(), entries.next()) {
                (Some((name, prerequisites)), None) => Ok((name.clone(), prerequisites.flatten())),
                (None, _) => Err(ConfigError::InvalidTaskSpec(
                    "task mapping has no name".to_string(),
                )),
                (Some(_), Some(_)) => {
                    let mut names: Vec<&String> = map.keys().collect();
                    names.sort();
                    Err(ConfigError::InvalidTaskSpec(format!(
                        "task mapping must have exactly one name, found: {}",
                        names
                            .iter()
                            .map(|n| n.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )))
                }
            }
        }
    }
}

/// Registry of all tasks known to a run
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a task, or enhance it if the name is already registered
    pub fn define<I, S>(
        &mut self,
        name: &str,
        prerequisites: I,
        action: Option<Action>,
    ) -> &mut Task
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let task = self.tasks.entry(name.to_string()).or_insert_with(|| {
            debug!(task = name, "defining task");
            Task::new(name)
        });
        task.enhance(prerequisites, action);
        task
    }

    /// Define a task from a declaration spec
    pub fn define_spec(&mut self, spec: &TaskSpec, action: Option<Action>) -> ConfigResult<&mut Task> {
        let (name, prerequisites) = resolve_args(spec)?;
        Ok(self.define(&name, prerequisites, action))
    }

    /// Find a task by name
    pub fn lookup(&self, name: &str) -> ExecutionResult<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| ExecutionError::TaskNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Invoke a task by name with explicit arguments
    pub fn invoke(&self, name: &str, args: &[String], ctx: &mut Context) -> ExecutionResult<()> {
        self.lookup(name)?.invoke(self, args, ctx)
    }

    /// Resolve a command-line reference such as `deploy[prod,2]` and invoke it
    pub fn invoke_task_string(&self, reference: &str, ctx: &mut Context) -> ExecutionResult<()> {
        let (name, args) = parse_task_string(reference);
        debug!(task = %name, ?args, "invoking top-level task");
        self.invoke(&name, &args, ctx)
    }
}
