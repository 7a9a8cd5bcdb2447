//! Execution context for task invocation
//!
//! Holds the state of one run: where commands execute, which tasks are in
//! progress and which already completed.

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// State shared by every task invoked during a run
pub struct Context {
    /// Directory commands run in (the project root once a Rakefile is loaded)
    pub working_dir: PathBuf,

    /// Interpreter used for shell actions (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Tasks currently being invoked, outermost first
    pub task_stack: Vec<String>,

    /// Tasks that completed during this run
    pub invoked: HashSet<String>,

    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            task_stack: Vec::new(),
            invoked: HashSet::new(),
            verbosity: Verbosity::Normal,
        }
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn push_task(&mut self, task_name: String) {
        self.task_stack.push(task_name);
    }

    pub fn pop_task(&mut self) -> Option<String> {
        self.task_stack.pop()
    }

    pub fn is_task_in_stack(&self, task_name: &str) -> bool {
        self.task_stack.iter().any(|t| t == task_name)
    }

    /// Names on the invocation stack, outermost first
    pub fn task_names(&self) -> Vec<String> {
        self.task_stack.clone()
    }

    pub fn mark_invoked(&mut self, task_name: String) {
        self.invoked.insert(task_name);
    }

    pub fn is_invoked(&self, task_name: &str) -> bool {
        self.invoked.contains(task_name)
    }

    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Echo a command about to run
    pub fn print_command(&self, command: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("[RUN] {}", command);
        }
    }

    pub fn print_task_start(&self, task_name: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("** Execute {}", task_name);
        }
    }

    pub fn print_task_complete(&self, task_name: &str) {
        debug!(task = task_name, "task completed");
    }

    pub fn print_task_skip(&self, task_name: &str, reason: &str) {
        debug!(task = task_name, reason, "skipping task");
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
