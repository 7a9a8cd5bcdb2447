//! Integration tests for task invocation through the registry

mod common;

use common::Recorder;
use mrake::error::ExecutionError;
use mrake::runner::{Context, TaskRegistry, Verbosity};

fn context() -> Context {
    Context::new().with_verbosity(Verbosity::Silent)
}

fn no_prerequisites() -> Vec<String> {
    Vec::new()
}

#[test]
fn test_prerequisites_run_before_actions_in_order() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("leaf", no_prerequisites(), recorder.action("leaf"));
    registry.define("p1", ["leaf"], recorder.action("p1"));
    registry.define("p2", no_prerequisites(), recorder.action("p2"));
    registry.define("top", ["p1", "p2"], recorder.action("top"));

    registry.invoke("top", &[], &mut context()).unwrap();

    assert_eq!(recorder.events(), vec!["leaf", "p1", "p2", "top"]);
}

#[test]
fn test_invocation_order_is_deterministic() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    for name in ["a", "b", "c", "d"] {
        registry.define(name, no_prerequisites(), recorder.action(name));
    }
    registry.define("all", ["d", "b", "a", "c"], None);

    for _ in 0..5 {
        registry.invoke("all", &[], &mut context()).unwrap();
    }

    let events = recorder.events();
    assert_eq!(events.len(), 20);
    for run in events.chunks(4) {
        assert_eq!(run, ["d", "b", "a", "c"]);
    }
}

#[test]
fn test_enhanced_task_runs_all_actions() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("p1", no_prerequisites(), recorder.action("p1"));
    registry.define("p2", no_prerequisites(), recorder.action("p2"));
    registry.define("x", ["p1"], recorder.action("x-first"));
    registry.define("x", ["p2"], recorder.action("x-second"));

    registry.invoke("x", &[], &mut context()).unwrap();

    assert_eq!(recorder.events(), vec!["p1", "p2", "x-first", "x-second"]);
}

#[test]
fn test_shared_prerequisite_runs_once() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("base", no_prerequisites(), recorder.action("base"));
    registry.define("left", ["base"], recorder.action("left"));
    registry.define("right", ["base"], recorder.action("right"));
    registry.define("top", ["left", "right"], recorder.action("top"));

    let mut ctx = context();
    registry.invoke("top", &[], &mut ctx).unwrap();
    registry.invoke("left", &[], &mut ctx).unwrap();

    assert_eq!(recorder.events(), vec!["base", "left", "right", "top"]);
}

#[test]
fn test_cycle_is_rejected() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("a", ["b"], recorder.action("a"));
    registry.define("b", ["c"], recorder.action("b"));
    registry.define("c", ["a"], recorder.action("c"));

    let mut ctx = context();
    let result = registry.invoke("a", &[], &mut ctx);

    match result {
        Err(ExecutionError::CircularDependency(chain)) => assert_eq!(chain, "a -> b -> c -> a"),
        other => panic!("expected a cycle error, got {:?}", other),
    }
    assert!(recorder.events().is_empty());
    assert!(ctx.task_stack.is_empty());
}

#[test]
fn test_self_prerequisite_is_a_cycle() {
    let mut registry = TaskRegistry::new();
    registry.define("loop", ["loop"], None);

    let result = registry.invoke("loop", &[], &mut context());
    assert!(matches!(result, Err(ExecutionError::CircularDependency(_))));
}

#[test]
fn test_arguments_only_reach_the_named_task() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("setup", no_prerequisites(), recorder.action("setup"));
    registry.define("deploy", ["setup"], recorder.action("deploy"));

    registry
        .invoke_task_string("deploy[prod, 1.2]", &mut context())
        .unwrap();

    assert_eq!(recorder.events(), vec!["setup", "deploy(prod,1.2)"]);
}

#[test]
fn test_escaped_arguments_reach_actions() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("t", no_prerequisites(), recorder.action("t"));

    registry
        .invoke_task_string("t[a\\,b,c]", &mut context())
        .unwrap();

    assert_eq!(recorder.events(), vec!["t(a,b,c)"]);
}

#[test]
fn test_missing_prerequisite_aborts_before_actions() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("first", no_prerequisites(), recorder.action("first"));
    registry.define("build", ["first", "ghost"], recorder.action("build"));

    let result = registry.invoke("build", &[], &mut context());

    assert!(matches!(result, Err(ExecutionError::TaskNotFound(ref name)) if name == "ghost"));
    assert_eq!(recorder.events(), vec!["first"]);
    assert!(!registry.contains("ghost"));
}

#[test]
fn test_unknown_top_level_task() {
    let registry = TaskRegistry::new();
    let result = registry.invoke_task_string("nope[1]", &mut context());
    assert!(matches!(result, Err(ExecutionError::TaskNotFound(ref name)) if name == "nope"));
}

#[test]
fn test_action_failure_aborts_chain() {
    let recorder = Recorder::new();
    let mut registry = TaskRegistry::new();
    registry.define("broken", no_prerequisites(), recorder.failing_action("broken"));
    registry.define("after", no_prerequisites(), recorder.action("after"));
    registry.define("top", ["broken", "after"], recorder.action("top"));
    registry.define("top", no_prerequisites(), recorder.action("top-again"));

    let mut ctx = context();
    let result = registry.invoke("top", &[], &mut ctx);

    assert!(matches!(result, Err(ExecutionError::ActionFailed { ref task, .. }) if task == "broken"));
    assert_eq!(recorder.events(), vec!["broken"]);
    assert!(!ctx.is_invoked("broken"));
    assert!(!ctx.is_invoked("top"));
}
