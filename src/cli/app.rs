//! Main CLI application

use crate::config::{default_rakefiles, find_rakefile, load_rakefile};
use crate::error::{ConfigError, RakeError, Result};
use crate::runner::{Context, TaskRegistry, Verbosity};
use clap::{Arg, ArgAction, ArgMatches, Command};
use regex::Regex;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Task run when the command line names none
pub const DEFAULT_TASK_NAME: &str = "default";

/// Options taken from the command line before tasks are collected
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub rakefile: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub verbosity: Verbosity,
    pub targets: Vec<String>,
}

/// One mrake run
pub struct Application {
    /// Candidate Rakefile names
    rakefiles: Vec<String>,
    /// Directory the process started in
    original_dir: PathBuf,
    /// Where the upward search begins
    start_dir: PathBuf,
    /// Rakefile that was loaded
    rakefile: Option<PathBuf>,
    /// Directory of the loaded Rakefile
    project_dir: Option<PathBuf>,
    registry: TaskRegistry,
    argv: Vec<String>,
    top_level_tasks: Vec<String>,
}

impl Application {
    /// Create an application rooted at the current directory
    pub fn new() -> Result<Self> {
        let original_dir = env::current_dir()?;
        Ok(Self::with_start_dir(original_dir))
    }

    /// Create an application that searches from `dir`
    pub fn with_start_dir(dir: PathBuf) -> Self {
        Application {
            rakefiles: default_rakefiles(),
            original_dir: dir.clone(),
            start_dir: dir,
            rakefile: None,
            project_dir: None,
            registry: TaskRegistry::new(),
            argv: Vec::new(),
            top_level_tasks: Vec::new(),
        }
    }

    /// Replace the candidate Rakefile names
    pub fn with_rakefiles(mut self, rakefiles: Vec<String>) -> Self {
        self.rakefiles = rakefiles;
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TaskRegistry {
        &mut self.registry
    }

    pub fn rakefile(&self) -> Option<&Path> {
        self.rakefile.as_deref()
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    pub fn original_dir(&self) -> &Path {
        &self.original_dir
    }

    /// Task references (as typed) given to this run
    pub fn top_level_tasks(&self) -> &[String] {
        &self.top_level_tasks
    }

    /// Raw tokens captured for this run
    pub fn args(&self) -> Vec<String> {
        self.argv.clone()
    }

    /// Parse flags and collect tasks from the command line
    ///
    /// Help and version requests come back as [`RakeError::Cli`] so the
    /// binary decides how to print them and exit.
    pub fn init_args<I, T>(&mut self, args: I) -> Result<Options>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = build_command().try_get_matches_from(args)?;
        let options = options_from_matches(&matches);

        if let Some(dir) = &options.directory {
            self.start_dir = self.original_dir.join(dir);
        }

        self.argv = options.targets.clone();
        let tokens = self.argv.clone();
        self.collect_top_level_tasks(&tokens);

        Ok(options)
    }

    /// Split tokens into `KEY=VALUE` assignments and task references
    ///
    /// Assignments are exported to the process environment. Tokens starting
    /// with `-` are ignored. With no task references the default task is used.
    pub fn collect_top_level_tasks(&mut self, tokens: &[String]) -> &[String] {
        self.top_level_tasks.clear();

        for token in tokens {
            if let Some(caps) = env_assignment_pattern().captures(token) {
                debug!(key = &caps[1], "setting environment variable");
                env::set_var(&caps[1], &caps[2]);
            } else if !token.starts_with('-') {
                self.top_level_tasks.push(token.clone());
            }
        }

        if self.top_level_tasks.is_empty() {
            self.top_level_tasks.push(DEFAULT_TASK_NAME.to_string());
        }

        &self.top_level_tasks
    }

    /// Locate the Rakefile (or use `explicit`) and load its tasks
    pub fn load_rakefile(&mut self, explicit: Option<&Path>, ctx: &mut Context) -> Result<()> {
        let path = match explicit {
            Some(path) => {
                let path = self.start_dir.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.display().to_string()).into());
                }
                fs::canonicalize(&path)?
            }
            None => {
                let (name, location) = find_rakefile(&self.rakefiles, &self.start_dir)?;
                location.join(name)
            }
        };

        let location = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.start_dir.clone());

        let original_dir =
            fs::canonicalize(&self.original_dir).unwrap_or_else(|_| self.original_dir.clone());
        if location != original_dir {
            ctx.print_info(&format!("(in {})", location.display()));
        }

        let summary = load_rakefile(&path, &mut self.registry)?;
        info!(files = summary.files.len(), tasks = self.registry.len(), "Rakefile loaded");

        if let Some(interpreter) = summary.interpreter {
            ctx.interpreter = interpreter;
        }
        ctx.working_dir = location.clone();

        self.rakefile = Some(path);
        self.project_dir = Some(location);
        Ok(())
    }

    /// Invoke every top-level task in order
    pub fn top_level(&self, ctx: &mut Context) -> Result<()> {
        for reference in &self.top_level_tasks {
            self.registry.invoke_task_string(reference, ctx)?;
        }
        Ok(())
    }

    /// Run the application with command line arguments
    ///
    /// The working directory is the project root while tasks run and is
    /// restored before this returns, whether or not the run succeeded.
    pub fn run<I, T>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let options = self.init_args(args)?;
        init_logging(options.verbosity);

        let mut ctx = Context::new()
            .with_working_dir(self.start_dir.clone())
            .with_verbosity(options.verbosity);

        self.load_rakefile(options.rakefile.as_deref(), &mut ctx)?;

        let project_dir = ctx.working_dir.clone();
        let _guard = WorkingDirGuard::enter(&project_dir)?;
        self.top_level(&mut ctx)
    }
}

/// Changes the process working directory and restores it when dropped
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> io::Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        Ok(WorkingDirGuard { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::warn!(dir = %self.previous.display(), error = %e, "failed to restore working directory");
        }
    }
}

fn env_assignment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^([A-Za-z0-9_]+)=(.*)$").expect("assignment pattern is valid")
    })
}

/// Build the clap command
fn build_command() -> Command {
    Command::new("mrake")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A rake-style task runner")
        .arg(
            Arg::new("rakefile")
                .short('f')
                .long("rakefile")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Use FILE as the Rakefile instead of searching for one"),
        )
        .arg(
            Arg::new("directory")
                .short('C')
                .long("directory")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Search for the Rakefile starting from DIR"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("targets")
                .value_name("TASK|KEY=VALUE")
                .help("Tasks to run, as name or name[arg1,arg2], and environment assignments")
                .num_args(0..)
                .trailing_var_arg(true),
        )
}

fn options_from_matches(matches: &ArgMatches) -> Options {
    Options {
        rakefile: matches.get_one::<PathBuf>("rakefile").cloned(),
        directory: matches.get_one::<PathBuf>("directory").cloned(),
        verbosity: get_verbosity(matches),
        targets: matches
            .get_many::<String>("targets")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    }
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Install the tracing subscriber; `RUST_LOG` takes precedence over flags
fn init_logging(verbosity: Verbosity) {
    let default_level = match verbosity {
        Verbosity::Silent => "off",
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Run mrake with the process arguments
pub fn run() -> std::result::Result<(), RakeError> {
    let mut app = Application::new()?;
    app.run(env::args_os())
}
