use std::collections::HashSet;

use treegp::nodes::float_bool::{standard_registry, BOOL, FLOAT};
use treegp::{GpError, NodeRegistry, Value};

fn no_exclusions() -> HashSet<String> {
    HashSet::new()
}

#[test]
fn re_registering_an_identical_signature_is_a_no_op() {
    let mut registry = NodeRegistry::new();
    registry
        .register_primitive("zero", FLOAT, vec![], |_, _| Ok(Value::Float(0.0)))
        .expect("first registration succeeds");
    let before = registry.len();
    registry
        .register_primitive("zero", FLOAT, vec![], |_, _| Ok(Value::Float(0.0)))
        .expect("identical re-registration is tolerated");
    assert_eq!(registry.len(), before);
}

#[test]
fn conflicting_signatures_under_one_id_are_rejected() {
    let mut registry = NodeRegistry::new();
    registry
        .register_primitive("zero", FLOAT, vec![], |_, _| Ok(Value::Float(0.0)))
        .expect("first registration succeeds");

    let err = registry
        .register_primitive("zero", FLOAT, vec![FLOAT], |_, _| Ok(Value::Float(0.0)))
        .unwrap_err();
    assert!(matches!(err, GpError::Registration(_)), "got {err}");

    let err = registry
        .register_primitive("zero", BOOL, vec![], |_, _| Ok(Value::Bool(false)))
        .unwrap_err();
    assert!(matches!(err, GpError::Registration(_)), "got {err}");

    let err = registry
        .register_literal("zero", FLOAT, |_, _| Value::Float(0.0))
        .unwrap_err();
    assert!(matches!(err, GpError::Registration(_)), "got {err}");
}

#[test]
fn available_definitions_filter_by_return_type() {
    let registry = standard_registry().expect("standard registry builds");
    for definition in registry.available_definitions(FLOAT, &no_exclusions()) {
        assert_eq!(definition.return_type(), FLOAT);
    }
    for definition in registry.available_definitions(BOOL, &no_exclusions()) {
        assert_eq!(definition.return_type(), BOOL);
    }
    assert!(!registry.available_definitions(FLOAT, &no_exclusions()).is_empty());
    assert!(!registry.available_definitions(BOOL, &no_exclusions()).is_empty());
}

#[test]
fn available_definitions_keep_registration_order() {
    let mut registry = NodeRegistry::new();
    registry
        .register_primitive("first", FLOAT, vec![], |_, _| Ok(Value::Float(1.0)))
        .expect("registration succeeds");
    registry
        .register_primitive("second", FLOAT, vec![], |_, _| Ok(Value::Float(2.0)))
        .expect("registration succeeds");
    registry
        .register_literal("third", FLOAT, |_, _| Value::Float(3.0))
        .expect("registration succeeds");

    let ids: Vec<&str> = registry
        .available_definitions(FLOAT, &no_exclusions())
        .iter()
        .map(|d| d.id())
        .collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn exclusions_apply_per_call_not_per_registry() {
    let registry = standard_registry().expect("standard registry builds");

    let all: Vec<&str> = registry
        .available_definitions(FLOAT, &no_exclusions())
        .iter()
        .map(|d| d.id())
        .collect();
    assert!(all.contains(&"add"));

    let forbidden: HashSet<String> = ["add".to_string()].into_iter().collect();
    let restricted: Vec<&str> = registry
        .available_definitions(FLOAT, &forbidden)
        .iter()
        .map(|d| d.id())
        .collect();
    assert!(!restricted.contains(&"add"));
    assert_eq!(restricted.len(), all.len() - 1);

    // The same registry answers unrestricted again: nothing was removed.
    let again: Vec<&str> = registry
        .available_definitions(FLOAT, &no_exclusions())
        .iter()
        .map(|d| d.id())
        .collect();
    assert_eq!(all, again);
}

#[test]
fn merge_composes_a_base_set_with_extensions() {
    let mut extended = NodeRegistry::new();
    extended
        .register_primitive("sensor", FLOAT, vec![], |_, _| Ok(Value::Float(0.5)))
        .expect("registration succeeds");
    extended
        .merge(&standard_registry().expect("standard registry builds"))
        .expect("merge succeeds");

    assert!(extended.definition("sensor").is_some());
    assert!(extended.definition("add").is_some());
    assert!(extended.definition("if_else").is_some());

    // Merging the same base twice stays idempotent.
    let before = extended.len();
    extended
        .merge(&standard_registry().expect("standard registry builds"))
        .expect("repeat merge succeeds");
    assert_eq!(extended.len(), before);
}

#[test]
fn merge_rejects_conflicting_definitions() {
    let mut base = standard_registry().expect("standard registry builds");

    let mut conflicting = NodeRegistry::new();
    conflicting
        .register_primitive("add", BOOL, vec![BOOL, BOOL], |_, _| Ok(Value::Bool(true)))
        .expect("registration succeeds");

    let err = base.merge(&conflicting).unwrap_err();
    assert!(matches!(err, GpError::Registration(_)), "got {err}");
}

#[test]
fn node_types_are_enumerable_before_any_tree_exists() {
    let registry = standard_registry().expect("standard registry builds");
    let types = registry.node_types();
    assert!(types.contains(&FLOAT));
    assert!(types.contains(&BOOL));
    assert_eq!(registry.node_type("float"), Some(FLOAT));
    assert_eq!(registry.node_type("bool"), Some(BOOL));
    assert_eq!(registry.node_type("no_such_type"), None);
}
