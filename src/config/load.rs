//! Replaying Rakefile declarations into a task registry

use crate::config::parse::parse_rakefile_file;
use crate::config::types::{Rakefile, TaskDecl};
use crate::error::{ConfigError, ConfigResult, RakeError};
use crate::runner::{shell_action, ShellCommand, TaskRegistry};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What loading a Rakefile produced besides registered tasks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    /// Every file that was read, in load order
    pub files: Vec<PathBuf>,

    /// Interpreter requested by the first file that sets one
    pub interpreter: Option<Vec<String>>,
}

/// Load a Rakefile and everything it imports into `registry`
pub fn load_rakefile(path: &Path, registry: &mut TaskRegistry) -> Result<LoadSummary, RakeError> {
    let mut loader = Loader {
        registry,
        seen: HashSet::new(),
        summary: LoadSummary::default(),
    };
    loader.load(path)?;
    Ok(loader.summary)
}

/// Register every declaration of an already parsed Rakefile
pub fn apply_rakefile(rakefile: &Rakefile, registry: &mut TaskRegistry) -> ConfigResult<()> {
    for decl in &rakefile.tasks {
        define_declaration(decl, registry)?;
    }
    Ok(())
}

fn define_declaration(decl: &TaskDecl, registry: &mut TaskRegistry) -> ConfigResult<()> {
    let action = if decl.run.is_empty() {
        None
    } else {
        let commands: Vec<ShellCommand> = decl.run.iter().cloned().map(ShellCommand::from).collect();
        Some(shell_action(commands))
    };

    let task = registry.define_spec(&decl.task, action)?;
    task.enhance(decl.deps.iter().cloned(), None);
    task.add_arg_names(decl.args.iter().cloned());
    Ok(())
}

struct Loader<'a> {
    registry: &'a mut TaskRegistry,
    seen: HashSet<PathBuf>,
    summary: LoadSummary,
}

impl Loader<'_> {
    fn load(&mut self, path: &Path) -> Result<(), RakeError> {
        let canonical = fs::canonicalize(path).map_err(|e| ConfigError::IncludeFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        if !self.seen.insert(canonical.clone()) {
            debug!(path = %canonical.display(), "already loaded, skipping");
            return Ok(());
        }

        info!(path = %canonical.display(), "loading Rakefile");
        let rakefile = parse_rakefile_file(&canonical)?;
        let base_dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(dotenv) = &rakefile.dotenv {
            load_dotenv(&base_dir.join(dotenv))?;
        }

        if self.summary.interpreter.is_none() {
            self.summary.interpreter = rakefile.interpreter.clone();
        }
        self.summary.files.push(canonical);

        apply_rakefile(&rakefile, self.registry)?;

        for pattern in &rakefile.import {
            for import in expand_import(&base_dir, pattern)? {
                self.load(&import)?;
            }
        }

        Ok(())
    }
}

/// Load `KEY=VALUE` lines without overriding variables that are already set
fn load_dotenv(path: &Path) -> ConfigResult<()> {
    dotenvy::from_path(path).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Resolve an import pattern relative to the importing file
fn expand_import(base_dir: &Path, pattern: &str) -> ConfigResult<Vec<PathBuf>> {
    let full_pattern = base_dir.join(pattern);
    let include_error = |error: String| ConfigError::IncludeFile {
        path: full_pattern.clone(),
        error,
    };

    let paths = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| include_error(e.to_string()))?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| include_error(e.to_string()))?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(include_error("no files match".to_string()));
    }

    matches.sort();
    Ok(matches)
}
