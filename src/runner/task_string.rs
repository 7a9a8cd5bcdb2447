//! Parsing of command-line task references
//!
//! A reference is either a bare task name or `name[arg1,arg2,...]`. Inside the
//! brackets a backslash escapes the next character, so `\,` is a literal comma.

use regex::Regex;
use std::sync::OnceLock;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([^\[]+)(?:\[(.*)\])$").expect("task reference pattern is valid")
    })
}

fn fragment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\s*((?:[^\\,]|\\.)*?)\s*(?:,\s*(.*))?$").expect("argument pattern is valid")
    })
}

fn escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\\(.)").expect("escape pattern is valid"))
}

/// Split a task reference into its name and positional arguments
///
/// Anything that does not look like `name[...]` is taken verbatim as a name.
pub fn parse_task_string(reference: &str) -> (String, Vec<String>) {
    let Some(caps) = reference_pattern().captures(reference) else {
        return (reference.to_string(), Vec::new());
    };

    let name = caps[1].to_string();
    let mut remaining = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    if remaining.is_empty() {
        return (name, Vec::new());
    }

    let mut args = Vec::new();
    loop {
        let Some(fragment) = fragment_pattern().captures(remaining) else {
            break;
        };

        let raw = fragment.get(1).map(|m| m.as_str()).unwrap_or_default();
        args.push(escape_pattern().replace_all(raw, "$1").into_owned());

        match fragment.get(2) {
            Some(rest) => remaining = rest.as_str(),
            None => break,
        }
    }

    (name, args)
}
