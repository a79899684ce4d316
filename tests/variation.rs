use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use treegp::nodes::float_bool::{standard_registry, FLOAT};
use treegp::{
    crossover, literal_mutation, parsimony_adjusted, subtree_mutation, GrowthStrategy,
    NodeInstance, Tree, TreeBuilder, TreeParameters, Value, VariationLimits,
};

fn standard_builder() -> TreeBuilder {
    let registry = standard_registry().expect("standard registry builds");
    TreeBuilder::new(Arc::new(registry))
}

fn build_tree(builder: &TreeBuilder, max_depth: usize, seed: u64) -> Tree {
    let mut rng = StdRng::seed_from_u64(seed);
    let parameters = TreeParameters::new(FLOAT, max_depth);
    builder
        .build(&parameters, GrowthStrategy::Grow, &mut rng)
        .expect("construction succeeds")
}

fn collect_ids(node: &NodeInstance, out: &mut Vec<&'static str>) {
    out.push(node.definition().id());
    for child in node.children() {
        collect_ids(child, out);
    }
}

#[test]
fn subtree_mutation_preserves_type_and_depth_invariants() {
    let builder = standard_builder();
    for seed in 0..50 {
        let tree = build_tree(&builder, 5, seed);
        let mut rng = StdRng::seed_from_u64(seed ^ 0xdead);
        let mutant = subtree_mutation(&tree, &builder, &mut rng).expect("mutation succeeds");
        mutant.validate().expect("type invariant holds");
        assert!(
            mutant.depth() <= 5,
            "mutant depth {} exceeds bound (seed {seed})",
            mutant.depth()
        );
        assert_eq!(mutant.return_type(), FLOAT);
    }
}

#[test]
fn literal_mutation_changes_values_but_not_structure() {
    let builder = standard_builder();
    for seed in 0..30 {
        let tree = build_tree(&builder, 5, seed);
        let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(31));
        let mutant =
            literal_mutation(&tree, builder.registry(), &mut rng).expect("mutation succeeds");
        mutant.validate().expect("type invariant holds");

        let mut before = Vec::new();
        let mut after = Vec::new();
        collect_ids(tree.root(), &mut before);
        collect_ids(mutant.root(), &mut after);
        assert_eq!(before, after, "literal mutation must not change topology");
        assert_eq!(tree.size(), mutant.size());
        assert_eq!(tree.depth(), mutant.depth());
    }
}

#[test]
fn literal_mutation_on_a_literal_free_tree_is_identity() {
    let builder = standard_builder();
    // With literals forbidden, terminals are zero/one/recall only.
    let parameters =
        TreeParameters::new(FLOAT, 4).with_forbidden(["float_literal", "bool_literal"]);
    let mut rng = StdRng::seed_from_u64(11);
    let tree = builder
        .build(&parameters, GrowthStrategy::Grow, &mut rng)
        .expect("construction succeeds");
    assert!(tree.root().literal_indices().is_empty());

    let mutant = literal_mutation(&tree, builder.registry(), &mut rng).expect("mutation succeeds");
    assert_eq!(tree.to_string(), mutant.to_string());
}

#[test]
fn literal_mutation_without_a_mutator_redraws_from_the_generator() {
    let builder = standard_builder();
    let registry = builder.registry();
    let float_def = registry
        .definition("float_literal")
        .expect("float_literal registered");

    // Single-literal tree; the standard registry registers no FLOAT mutator,
    // so mutation falls back to the generator (uniform in -10..10).
    let tree = Tree::new(
        NodeInstance::literal(float_def, Value::Float(0.0)).expect("float literal"),
        TreeParameters::new(FLOAT, 0),
    )
    .expect("valid tree");

    let mut rng = StdRng::seed_from_u64(1234);
    let mut draws = Vec::with_capacity(1000);
    for _ in 0..1000 {
        let mutant = literal_mutation(&tree, registry, &mut rng).expect("mutation succeeds");
        let value = mutant
            .root()
            .literal_value()
            .and_then(|v| v.as_float().ok())
            .expect("float literal value");
        draws.push(value);
    }

    let min = draws.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = draws.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = draws.iter().sum::<f64>() / draws.len() as f64;
    assert!(min >= -10.0 && max < 10.0, "values escaped the generator range");
    assert!(
        max - min > 15.0,
        "1000 uniform draws should cover most of the range, got [{min}, {max}]"
    );
    assert!(
        mean.abs() < 1.0,
        "uniform(-10, 10) sample mean should be near zero, got {mean}"
    );
}

#[test]
fn crossover_respects_bounds_and_the_type_invariant() {
    let builder = standard_builder();
    let limits = VariationLimits {
        max_depth: 5,
        max_size: 60,
        max_retries: 8,
    };
    for seed in 0..50 {
        let recipient = build_tree(&builder, 5, seed);
        let donor = build_tree(&builder, 5, seed + 1000);
        let mut rng = StdRng::seed_from_u64(seed ^ 0xbeef);
        let child = crossover(&recipient, &donor, &limits, &mut rng).expect("crossover succeeds");
        child.validate().expect("type invariant holds");
        assert!(child.depth() <= limits.max_depth);
        assert!(child.size() <= limits.max_size.max(recipient.size()));
        assert_eq!(child.return_type(), FLOAT);
    }
}

#[test]
fn crossover_sometimes_adopts_donor_material() {
    let builder = standard_builder();
    let limits = VariationLimits {
        max_depth: 5,
        max_size: 200,
        max_retries: 8,
    };
    let mut changed = 0;
    for seed in 0..20 {
        let recipient = build_tree(&builder, 5, seed);
        let donor = build_tree(&builder, 5, seed + 500);
        let mut rng = StdRng::seed_from_u64(seed);
        let child = crossover(&recipient, &donor, &limits, &mut rng).expect("crossover succeeds");
        if child.to_string() != recipient.to_string() {
            changed += 1;
        }
    }
    assert!(changed > 0, "no crossover produced a structurally new child");
}

#[test]
fn out_of_bound_crossover_falls_back_to_a_clone() {
    let builder = standard_builder();
    // Impossible size bound: every graft is rejected.
    let limits = VariationLimits {
        max_depth: 5,
        max_size: 1,
        max_retries: 4,
    };
    let recipient = build_tree(&builder, 4, 21);
    let donor = build_tree(&builder, 4, 22);
    assert!(recipient.size() > 1);
    let mut rng = StdRng::seed_from_u64(0);
    let child = crossover(&recipient, &donor, &limits, &mut rng).expect("crossover succeeds");
    assert_eq!(child.to_string(), recipient.to_string());
}

#[test]
fn parsimony_adjustment_penalizes_size() {
    assert_eq!(parsimony_adjusted(10.0, 20, 0.5), 0.0);
    assert_eq!(parsimony_adjusted(1.0, 7, 0.0), 1.0);
    assert!(parsimony_adjusted(1.0, 50, 0.1) < parsimony_adjusted(1.0, 5, 0.1));
}
