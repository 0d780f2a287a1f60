//! DAG Integration Tests
//!
//! Graph construction from YAML projects, dependency validation and cycle detection.

use depwalk::{build_validated, Graph, GraphError, Project};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value};

type Payload = Map<String, Value>;

fn parse(yaml: &str) -> Project<Payload> {
    Project::from_yaml_str(yaml).unwrap()
}

// ═══════════════════════════════════════════════════════════════
// INTEGRATION TESTS: Graph Structure
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_dag_diamond_no_cycle() {
    // Diamond: A needs B and C, both need D
    let project = parse(
        r#"
units:
  a:
    depends_on: [b, c]
  b:
    depends_on: [d]
  c:
    depends_on: [d]
  d: {}
"#,
    );
    let graph = build_validated(project).unwrap();

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.leaves(), vec!["d"]);
    assert_eq!(graph.roots(), vec!["a"]);
    assert_eq!(graph.children("a"), vec!["b", "c"]);
    assert_eq!(graph.parents("d"), vec!["b", "c"]);
    assert!(graph.has_path("a", "d"));
    assert!(!graph.has_path("d", "a"));
    assert_eq!(graph.topological_order(), vec!["d", "b", "c", "a"]);
}

#[test]
fn test_dag_payload_is_untouched() {
    let project = parse(
        r#"
units:
  db:
    image: postgres:16
    ports: [5432]
"#,
    );
    let graph = Graph::new(project).unwrap();

    let payload = graph.payload("db").unwrap();
    assert_eq!(payload["image"], Value::from("postgres:16"));
    assert_eq!(payload["ports"][0], Value::from(5432));
    assert!(!payload.contains_key("depends_on"));
}

#[test]
fn test_dag_disconnected_valid() {
    let project = parse(
        r#"
units:
  a: {}
  b:
    depends_on: [a]
  x: {}
  y:
    depends_on: [x]
"#,
    );
    let graph = build_validated(project).unwrap();

    assert_eq!(graph.leaves(), vec!["a", "x"]);
    assert_eq!(graph.roots(), vec!["b", "y"]);
    assert!(!graph.has_path("b", "x"));
}

#[test]
fn test_dag_empty_project() {
    let graph = build_validated(parse("units: {}")).unwrap();
    assert!(graph.is_empty());
    assert!(graph.leaves().is_empty());
    assert!(graph.topological_order().is_empty());
}

// ═══════════════════════════════════════════════════════════════
// INTEGRATION TESTS: Dependency Validation
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_unknown_required_dependency() {
    let project = parse(
        r#"
units:
  web:
    depends_on: [db]
"#,
    );
    let err = Graph::new(project).unwrap_err();

    assert_eq!(err.code(), "DEPWALK-010");
    assert!(err
        .to_string()
        .contains("Unit 'web' depends on unknown unit 'db'"));
}

#[test]
fn test_disabled_dependency_names_profiles() {
    let project = parse(
        r#"
units:
  web:
    depends_on: [debug]
disabled:
  debug:
    profiles: [dev, test]
"#,
    );
    let err = Graph::new(project).unwrap_err();

    assert!(matches!(err, GraphError::DisabledDependency { .. }));
    assert!(err.to_string().contains(
        "Unit 'debug' is required by 'web' but is disabled; enable it with profile(s) 'dev', 'test'"
    ));
}

#[test]
fn test_optional_missing_dependency_is_dropped() {
    let project = parse(
        r#"
units:
  web:
    depends_on:
      metrics:
        required: false
"#,
    );
    let graph = build_validated(project).unwrap();

    assert!(graph.children("web").is_empty());
    assert_eq!(graph.leaves(), vec!["web"]);
}

// ═══════════════════════════════════════════════════════════════
// INTEGRATION TESTS: Cycle Detection
// ═══════════════════════════════════════════════════════════════

#[test]
fn test_dag_three_node_cycle() {
    let project = parse(
        r#"
units:
  a:
    depends_on: [b]
  b:
    depends_on: [c]
  c:
    depends_on: [a]
"#,
    );
    let err = build_validated(project).unwrap_err();

    assert_eq!(err.code(), "DEPWALK-020");
    assert!(err
        .to_string()
        .contains("dependency cycle detected: a -> b -> c -> a"));
}

#[test]
fn test_dag_self_loop() {
    let project = parse(
        r#"
units:
  a:
    depends_on: [a]
"#,
    );
    match build_validated(project).unwrap_err() {
        GraphError::DependencyCycle { path } => assert_eq!(path, vec!["a", "a"]),
        other => panic!("expected cycle, got {other}"),
    }
}

#[test]
fn test_graph_new_does_not_check_cycles() {
    let project = parse(
        r#"
units:
  a:
    depends_on: [b]
  b:
    depends_on: [a]
"#,
    );
    let graph = Graph::new(project).unwrap();
    assert!(graph.check_cycle().is_err());
}
