use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use treegp::nodes::float_bool::{standard_registry, FLOAT, MEMORY_SLOT};
use treegp::{
    execute_with_default, ExecutionContext, GpError, NodeInstance, NodeRegistry, Tree,
    TreeParameters, Value,
};

/// if_else over literal children: condition, then-branch 2.5, else-branch -3.25
fn conditional_tree(registry: &NodeRegistry, condition: bool) -> Tree {
    let if_else = registry.definition("if_else").expect("if_else registered");
    let bool_def = registry
        .definition("bool_literal")
        .expect("bool_literal registered");
    let float_def = registry
        .definition("float_literal")
        .expect("float_literal registered");

    let root = NodeInstance::primitive(
        if_else,
        vec![
            NodeInstance::literal(bool_def, Value::Bool(condition)).expect("bool literal"),
            NodeInstance::literal(float_def.clone(), Value::Float(2.5)).expect("float literal"),
            NodeInstance::literal(float_def, Value::Float(-3.25)).expect("float literal"),
        ],
    )
    .expect("well-typed if_else");
    Tree::new(root, TreeParameters::new(FLOAT, 1)).expect("valid tree")
}

#[test]
fn if_else_returns_exactly_the_selected_literal() {
    let registry = standard_registry().expect("standard registry builds");

    let mut context = ExecutionContext::new();
    let taken = conditional_tree(&registry, true)
        .execute(&mut context)
        .expect("execution succeeds");
    assert_eq!(taken, Value::Float(2.5));

    let not_taken = conditional_tree(&registry, false)
        .execute(&mut context)
        .expect("execution succeeds");
    assert_eq!(not_taken, Value::Float(-3.25));
}

#[test]
fn if_else_never_evaluates_the_untaken_branch() {
    let mut registry = standard_registry().expect("standard registry builds");
    let left_calls = Arc::new(AtomicUsize::new(0));
    let right_calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&left_calls);
    registry
        .register_primitive("left_probe", FLOAT, vec![], move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Float(1.0))
        })
        .expect("registration succeeds");
    let counter = Arc::clone(&right_calls);
    registry
        .register_primitive("right_probe", FLOAT, vec![], move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Float(2.0))
        })
        .expect("registration succeeds");

    let if_else = registry.definition("if_else").expect("if_else registered");
    let bool_def = registry
        .definition("bool_literal")
        .expect("bool_literal registered");
    let left = registry.definition("left_probe").expect("probe registered");
    let right = registry
        .definition("right_probe")
        .expect("probe registered");

    let root = NodeInstance::primitive(
        if_else,
        vec![
            NodeInstance::literal(bool_def, Value::Bool(true)).expect("bool literal"),
            NodeInstance::primitive(left, vec![]).expect("terminal"),
            NodeInstance::primitive(right, vec![]).expect("terminal"),
        ],
    )
    .expect("well-typed if_else");
    let tree = Tree::new(root, TreeParameters::new(FLOAT, 1)).expect("valid tree");

    let mut context = ExecutionContext::new();
    let result = tree.execute(&mut context).expect("execution succeeds");
    assert_eq!(result, Value::Float(1.0));
    assert_eq!(left_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        right_calls.load(Ordering::SeqCst),
        0,
        "untaken branch must stay unevaluated"
    );
}

#[test]
fn memory_nodes_share_state_through_the_context() {
    let registry = standard_registry().expect("standard registry builds");
    let remember = registry.definition("remember").expect("remember registered");
    let recall = registry.definition("recall").expect("recall registered");
    let float_def = registry
        .definition("float_literal")
        .expect("float_literal registered");

    let store_tree = Tree::new(
        NodeInstance::primitive(
            remember,
            vec![NodeInstance::literal(float_def, Value::Float(4.5)).expect("float literal")],
        )
        .expect("well-typed remember"),
        TreeParameters::new(FLOAT, 1),
    )
    .expect("valid tree");
    let read_tree = Tree::new(
        NodeInstance::primitive(recall, vec![]).expect("terminal"),
        TreeParameters::new(FLOAT, 0),
    )
    .expect("valid tree");

    let mut context = ExecutionContext::new();
    assert_eq!(
        read_tree.execute(&mut context).expect("execution succeeds"),
        Value::Float(0.0),
        "recall defaults to zero before anything is stored"
    );
    assert_eq!(
        store_tree.execute(&mut context).expect("execution succeeds"),
        Value::Float(4.5)
    );
    assert_eq!(context.load(MEMORY_SLOT), Some(&Value::Float(4.5)));
    assert_eq!(
        read_tree.execute(&mut context).expect("execution succeeds"),
        Value::Float(4.5)
    );
}

#[test]
fn divide_by_zero_yields_infinity() {
    let registry = standard_registry().expect("standard registry builds");
    let divide = registry.definition("divide").expect("divide registered");
    let one = registry.definition("one").expect("one registered");
    let zero = registry.definition("zero").expect("zero registered");

    let tree = Tree::new(
        NodeInstance::primitive(
            divide,
            vec![
                NodeInstance::primitive(one, vec![]).expect("terminal"),
                NodeInstance::primitive(zero, vec![]).expect("terminal"),
            ],
        )
        .expect("well-typed divide"),
        TreeParameters::new(FLOAT, 1),
    )
    .expect("valid tree");

    let mut context = ExecutionContext::new();
    let result = tree.execute(&mut context).expect("execution succeeds");
    assert_eq!(result, Value::Float(f64::INFINITY));
}

#[test]
fn arithmetic_failures_propagate_and_the_agent_boundary_substitutes() {
    let mut registry = standard_registry().expect("standard registry builds");
    registry
        .register_primitive("always_fails", FLOAT, vec![], |_, _| {
            Err(GpError::Arithmetic("intentional overflow".to_string()))
        })
        .expect("registration succeeds");

    let failing = registry
        .definition("always_fails")
        .expect("probe registered");
    let tree = Tree::new(
        NodeInstance::primitive(failing, vec![]).expect("terminal"),
        TreeParameters::new(FLOAT, 0),
    )
    .expect("valid tree");

    let mut context = ExecutionContext::new();
    let err = tree.execute(&mut context).unwrap_err();
    assert!(matches!(err, GpError::Arithmetic(_)), "got {err}");

    let substituted = execute_with_default(&tree, &mut context, Value::Float(0.0))
        .expect("substitution succeeds");
    assert_eq!(substituted, Value::Float(0.0));
}

#[test]
fn manual_construction_rejects_ill_typed_children() {
    let registry = standard_registry().expect("standard registry builds");
    let if_else = registry.definition("if_else").expect("if_else registered");
    let float_def = registry
        .definition("float_literal")
        .expect("float_literal registered");

    // FLOAT literal in the BOOL condition slot.
    let err = NodeInstance::primitive(
        if_else,
        vec![
            NodeInstance::literal(float_def.clone(), Value::Float(1.0)).expect("float literal"),
            NodeInstance::literal(float_def.clone(), Value::Float(2.0)).expect("float literal"),
            NodeInstance::literal(float_def, Value::Float(3.0)).expect("float literal"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, GpError::Invariant(_)), "got {err}");
}
