//! Shell command actions
//!
//! Commands declared under `run:` become a single [`Action`] that executes
//! them in order through the context's interpreter.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{interpolate, Action, Context, TaskArguments};
use std::collections::HashMap;
use std::process::{Command as StdCommand, Stdio};
use tracing::debug;

/// A shell command belonging to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// The command to execute
    pub exec: String,

    /// Working directory, relative to the context's working directory
    pub dir: Option<String>,

    /// Whether to skip echoing the command
    pub quiet: bool,
}

impl ShellCommand {
    pub fn new(exec: impl Into<String>) -> Self {
        ShellCommand {
            exec: exec.into(),
            dir: None,
            quiet: false,
        }
    }
}

/// Build an action that runs `commands` one after another
pub fn shell_action(commands: Vec<ShellCommand>) -> Action {
    Box::new(move |args: &TaskArguments, ctx: &Context| {
        let vars = action_vars(args);
        for cmd in &commands {
            execute_command(cmd, args.task_name(), &vars, ctx)?;
        }
        Ok(())
    })
}

/// Variables visible to a command, built from the invocation's arguments
pub fn action_vars(args: &TaskArguments) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    vars.insert("task_name".to_string(), args.task_name().to_string());
    vars.insert("args".to_string(), args.values().join(" "));

    for (i, value) in args.values().iter().enumerate() {
        vars.insert((i + 1).to_string(), value.clone());
    }

    for name in args.names() {
        if let Some(value) = args.get(name) {
            vars.insert(name.clone(), value.to_string());
        }
    }

    vars
}

/// Execute a command for `task_name` in the given context
pub fn execute_command(
    cmd: &ShellCommand,
    task_name: &str,
    vars: &HashMap<String, String>,
    ctx: &Context,
) -> ExecutionResult<()> {
    let action_failed = |reason: String| ExecutionError::ActionFailed {
        task: task_name.to_string(),
        reason,
    };

    let exec_str = interpolate(&cmd.exec, vars);

    if !cmd.quiet {
        ctx.print_command(&exec_str);
    }

    let working_dir = match &cmd.dir {
        Some(dir) => ctx.working_dir.join(interpolate(dir, vars)),
        None => ctx.working_dir.clone(),
    };

    let (program, interpreter_args) = ctx
        .interpreter
        .split_first()
        .ok_or_else(|| action_failed("interpreter is empty".to_string()))?;

    debug!(task = task_name, command = %exec_str, dir = %working_dir.display(), "spawning command");

    let status = StdCommand::new(program)
        .args(interpreter_args)
        .arg(&exec_str)
        .current_dir(&working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| action_failed(format!("failed to spawn '{}': {}", program, e)))?;

    if !status.success() {
        return Err(ExecutionError::CommandFailed(status.code()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(values: &[&str]) -> TaskArguments {
        TaskArguments::new(
            "t".to_string(),
            vec!["env".to_string()],
            values.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_execute_simple_command() {
        let ctx = Context::new()
            .with_verbosity(crate::runner::Verbosity::Silent)
            .with_working_dir(std::env::temp_dir());
        let cmd = ShellCommand::new("true");

        let result = execute_command(&cmd, "t", &HashMap::new(), &ctx);
        assert!(result.is_ok());
    }

    #[test]
    fn test_execute_failing_command() {
        let ctx = Context::new()
            .with_verbosity(crate::runner::Verbosity::Silent)
            .with_working_dir(std::env::temp_dir());
        let cmd = ShellCommand::new("exit 3");

        let result = execute_command(&cmd, "t", &HashMap::new(), &ctx);
        assert!(matches!(result, Err(ExecutionError::CommandFailed(Some(3)))));
    }

    #[test]
    fn test_missing_interpreter_is_action_failure() {
        let ctx = Context::new()
            .with_verbosity(crate::runner::Verbosity::Silent)
            .with_working_dir(std::env::temp_dir())
            .with_interpreter(vec!["/definitely/not/a/shell".to_string()]);
        let cmd = ShellCommand::new("true");

        let result = execute_command(&cmd, "t", &HashMap::new(), &ctx);
        assert!(matches!(result, Err(ExecutionError::ActionFailed { ref task, .. }) if task == "t"));
    }

    #[test]
    fn test_action_vars() {
        let vars = action_vars(&args(&["prod", "2"]));

        assert_eq!(vars.get("env").map(String::as_str), Some("prod"));
        assert_eq!(vars.get("1").map(String::as_str), Some("prod"));
        assert_eq!(vars.get("2").map(String::as_str), Some("2"));
        assert_eq!(vars.get("args").map(String::as_str), Some("prod 2"));
        assert_eq!(vars.get("task_name").map(String::as_str), Some("t"));
    }

    #[test]
    fn test_shell_action_uses_arguments_and_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("out")).unwrap();

        let ctx = Context::new()
            .with_verbosity(crate::runner::Verbosity::Silent)
            .with_working_dir(temp_dir.path().to_path_buf());
        let action = shell_action(vec![ShellCommand {
            exec: "echo ${env} > marker.txt".to_string(),
            dir: Some("out".to_string()),
            quiet: true,
        }]);

        action(&args(&["staging"]), &ctx).unwrap();

        let written = fs::read_to_string(temp_dir.path().join("out/marker.txt")).unwrap();
        assert_eq!(written.trim(), "staging");
    }

    #[test]
    fn test_argument_values_are_passed_literally() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("MRAKE_COMMAND_SECRET", "leaked");

        let ctx = Context::new()
            .with_verbosity(crate::runner::Verbosity::Silent)
            .with_working_dir(temp_dir.path().to_path_buf());
        let action = shell_action(vec![ShellCommand {
            exec: "printf '%s|%s' '${1}' '${2}' > literal.txt".to_string(),
            dir: None,
            quiet: true,
        }]);

        let result = action(&args(&["${MRAKE_COMMAND_SECRET}", "${2}"]), &ctx);
        std::env::remove_var("MRAKE_COMMAND_SECRET");
        result.unwrap();

        let written = fs::read_to_string(temp_dir.path().join("literal.txt")).unwrap();
        assert_eq!(written, "${MRAKE_COMMAND_SECRET}|${2}");
    }
}
