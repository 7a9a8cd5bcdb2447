//! Common test utilities

#![allow(dead_code)]

use mrake::error::ExecutionError;
use mrake::runner::{Action, Context, TaskArguments};
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

/// Create a temporary directory with a Rakefile
pub fn create_rakefile(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let rakefile_path = temp_dir.path().join("Rakefile");
    fs::write(&rakefile_path, content).unwrap();
    (temp_dir, rakefile_path)
}

/// Create a Rakefile and a nested `a/b` directory below it
pub fn create_rakefile_with_nested_dir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, rakefile_path) = create_rakefile(content);
    let nested = temp_dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();
    (temp_dir, rakefile_path, nested)
}

/// Records which actions ran, and with which arguments
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action that logs `label` followed by the invocation's arguments
    pub fn action(&self, label: &str) -> Option<Action> {
        let events = Rc::clone(&self.events);
        let label = label.to_string();
        let action: Action = Box::new(move |args: &TaskArguments, _: &Context| {
            let entry = if args.is_empty() {
                label.clone()
            } else {
                format!("{}({})", label, args.values().join(","))
            };
            events.borrow_mut().push(entry);
            Ok(())
        });
        Some(action)
    }

    /// An action that logs `label` and then fails
    pub fn failing_action(&self, label: &str) -> Option<Action> {
        let events = Rc::clone(&self.events);
        let label = label.to_string();
        let action: Action = Box::new(move |args: &TaskArguments, _: &Context| {
            events.borrow_mut().push(label.clone());
            Err(ExecutionError::ActionFailed {
                task: args.task_name().to_string(),
                reason: "boom".to_string(),
            })
        });
        Some(action)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}
