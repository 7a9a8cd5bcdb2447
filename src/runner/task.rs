//! Task types and invocation
//!
//! A [`Task`] holds prerequisite names and action blocks. Prerequisites are
//! resolved against the [`TaskRegistry`] only when the task is invoked.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{Context, TaskRegistry};
use std::fmt;

/// An executable unit attached to a task
///
/// Actions receive the invocation's arguments and the execution context.
pub type Action = Box<dyn Fn(&TaskArguments, &Context) -> ExecutionResult<()>>;

/// Runtime task representation
pub struct Task {
    name: String,

    /// Prerequisite names, in declaration order
    prerequisites: Vec<String>,

    /// Names given to positional arguments
    arg_names: Vec<String>,

    actions: Vec<Action>,
}

impl Task {
    /// Create an empty task
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            name: name.into(),
            prerequisites: Vec::new(),
            arg_names: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    pub fn arg_names(&self) -> &[String] {
        &self.arg_names
    }

    /// Number of action blocks attached to this task
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Append prerequisites and, optionally, one more action
    pub fn enhance<I, S>(&mut self, prerequisites: I, action: Option<Action>) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites
            .extend(prerequisites.into_iter().map(Into::into));
        if let Some(action) = action {
            self.actions.push(action);
        }
        self
    }

    /// Name positional arguments; names already known are ignored
    pub fn add_arg_names<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.arg_names.contains(&name) {
                self.arg_names.push(name);
            }
        }
        self
    }

    /// Invoke the task: prerequisites first, depth-first, then its own actions
    ///
    /// A task that already completed in this context is skipped. Prerequisites
    /// are invoked without arguments.
    pub fn invoke(
        &self,
        registry: &TaskRegistry,
        args: &[String],
        ctx: &mut Context,
    ) -> ExecutionResult<()> {
        if ctx.is_task_in_stack(&self.name) {
            let mut chain = ctx.task_names();
            chain.push(self.name.clone());
            return Err(ExecutionError::CircularDependency(chain.join(" -> ")));
        }

        if ctx.is_invoked(&self.name) {
            ctx.print_task_skip(&self.name, "already invoked");
            return Ok(());
        }

        ctx.push_task(self.name.clone());
        let result = self.invoke_with_prerequisites(registry, args, ctx);
        ctx.pop_task();

        if result.is_ok() {
            ctx.mark_invoked(self.name.clone());
            ctx.print_task_complete(&self.name);
        }

        result
    }

    fn invoke_with_prerequisites(
        &self,
        registry: &TaskRegistry,
        args: &[String],
        ctx: &mut Context,
    ) -> ExecutionResult<()> {
        for prerequisite in &self.prerequisites {
            let task = registry.lookup(prerequisite)?;
            task.invoke(registry, &[], ctx)?;
        }

        self.execute(args, ctx)
    }

    /// Run the action blocks in order
    fn execute(&self, args: &[String], ctx: &Context) -> ExecutionResult<()> {
        if self.actions.is_empty() {
            return Ok(());
        }

        ctx.print_task_start(&self.name);
        let arguments = TaskArguments::new(self.name.clone(), self.arg_names.clone(), args.to_vec());
        for action in &self.actions {
            action(&arguments, ctx)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .field("arg_names", &self.arg_names)
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Arguments passed to a task invocation
///
/// Values are positional; names declared on the task label the leading ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskArguments {
    task_name: String,
    names: Vec<String>,
    values: Vec<String>,
}

impl TaskArguments {
    pub fn new(task_name: String, names: Vec<String>, values: Vec<String>) -> Self {
        TaskArguments {
            task_name,
            names,
            values,
        }
    }

    /// Name of the task being invoked
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Look up a value by argument name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.positional(i))
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
