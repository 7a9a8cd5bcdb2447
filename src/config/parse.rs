//! Rakefile discovery and parsing

use crate::config::types::Rakefile;
use crate::error::{ConfigError, ConfigResult, RakeError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rakefile names to search for, in priority order
pub const DEFAULT_RAKEFILES: &[&str] = &[
    "Rakefile",
    "rakefile",
    "Rakefile.rb",
    "rakefile.rb",
    "Rakefile.yml",
    "rakefile.yml",
];

/// Names in [`DEFAULT_RAKEFILES`] as owned strings
pub fn default_rakefiles() -> Vec<String> {
    DEFAULT_RAKEFILES.iter().map(|s| s.to_string()).collect()
}

/// Find a Rakefile by searching `start_dir` and then each parent directory
///
/// Returns the matching candidate name and the (canonical) directory it was
/// found in. `start_dir` is resolved first, so `..` and symlinks follow the
/// real tree. The process working directory is never changed.
pub fn find_rakefile(candidates: &[String], start_dir: &Path) -> ConfigResult<(String, PathBuf)> {
    let mut current_dir = fs::canonicalize(start_dir).map_err(|e| {
        ConfigError::Invalid(format!(
            "Failed to resolve directory '{}': {}",
            start_dir.display(),
            e
        ))
    })?;

    loop {
        if let Some(name) = have_rakefile(candidates, &current_dir) {
            debug!(rakefile = %name, dir = %current_dir.display(), "found Rakefile");
            return Ok((name, current_dir));
        }

        match current_dir.parent() {
            Some(parent) if parent != current_dir => current_dir = parent.to_path_buf(),
            _ => return Err(ConfigError::NotFound(candidates.join(", "))),
        }
    }
}

/// First candidate that exists as a regular file in `dir`
fn have_rakefile(candidates: &[String], dir: &Path) -> Option<String> {
    candidates
        .iter()
        .find(|name| dir.join(name.as_str()).is_file())
        .cloned()
}

/// Parse a Rakefile from a path
pub fn parse_rakefile_file(path: &Path) -> Result<Rakefile, RakeError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_rakefile(&contents)
}

/// Parse a Rakefile from a string
pub fn parse_rakefile(yaml: &str) -> Result<Rakefile, RakeError> {
    if yaml.trim().is_empty() {
        return Ok(Rakefile::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
