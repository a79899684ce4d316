//! Symbolic-regression demo of the generator boundary: evolve a float
//! expression approximating x^2 + 1 from the standard node set plus a
//! caller-registered `x` sensor.
//!
//! Usage: evolve [population_size] [generations] [max_depth]

use std::env;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use treegp::nodes::float_bool::{self, FLOAT, FLOAT_LITERAL_MAX, FLOAT_LITERAL_MIN};
use treegp::{
    crossover, execute_with_default, literal_mutation, parsimony_adjusted, subtree_mutation,
    EngineConfig, ExecutionContext, FixedContext, GpError, GrowthStrategy, NodeRegistry, Tree,
    TreeBuilder, Value,
};

/// Environment snapshot the `x` sensor reads back out of the context.
struct Sample {
    x: f64,
}

const CROSSOVER_RATE: f64 = 0.8;
const SUBTREE_MUTATION_RATE: f64 = 0.15;
const LITERAL_MUTATION_RATE: f64 = 0.25;
const TOURNAMENT_SIZE: usize = 5;
const ELITE_COUNT: usize = 2;
const PARSIMONY_WEIGHT: f64 = 0.001;

fn target(x: f64) -> f64 {
    x * x + 1.0
}

fn build_registry() -> Result<Arc<NodeRegistry>> {
    let mut registry = float_bool::standard_registry()?;
    registry.register_primitive("x", FLOAT, vec![], |_, ctx| {
        let sample = ctx
            .state::<Sample>()
            .ok_or_else(|| GpError::Invariant("x sensor expects Sample state".to_string()))?;
        Ok(Value::Float(sample.x))
    })?;
    float_bool::register_float_jitter_mutator(&mut registry);
    Ok(Arc::new(registry))
}

/// Mean squared error against the target, negated so higher is better, with
/// parsimony pressure on tree size. Arithmetic failures substitute 0.0 per
/// the agent contract.
fn fitness(tree: &Tree) -> f64 {
    let samples: Vec<f64> = (-8..=8).map(|i| f64::from(i) * 0.25).collect();
    let mut error = 0.0;
    for &x in &samples {
        let mut context = ExecutionContext::with_state(Sample { x });
        let output = match execute_with_default(tree, &mut context, Value::Float(0.0)) {
            Ok(value) => value.as_float().unwrap_or(0.0),
            Err(_) => 0.0,
        };
        let output = if output.is_finite() { output } else { 1e6 };
        let diff = output - target(x);
        error += diff * diff;
    }
    let mse = error / samples.len() as f64;
    parsimony_adjusted(-mse, tree.size(), PARSIMONY_WEIGHT)
}

/// Tournament selection: best of K random candidates.
fn tournament<'a, R: Rng>(population: &'a [(Tree, f64)], rng: &mut R) -> &'a Tree {
    let mut best = &population[rng.gen_range(0..population.len())];
    for _ in 1..TOURNAMENT_SIZE {
        let candidate = &population[rng.gen_range(0..population.len())];
        if candidate.1 > best.1 {
            best = candidate;
        }
    }
    &best.0
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let population_size: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(200);
    let generations: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(30);
    let max_depth: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(6);

    println!("=== treegp symbolic regression demo ===");
    println!("Target: x^2 + 1");
    println!("Population: {population_size}, generations: {generations}, max depth: {max_depth}");

    let registry = build_registry()?;
    let builder = TreeBuilder::new(Arc::clone(&registry));

    let config = EngineConfig {
        max_tree_depth: max_depth,
        max_tree_size: 150,
        parsimony_weight: PARSIMONY_WEIGHT,
        seed: Some(42),
        ..EngineConfig::default()
    };
    config.validate()?;
    let limits = config.variation_limits();

    let fixed_context = FixedContext::new()
        .with(FLOAT_LITERAL_MIN, Value::Float(-5.0))
        .with(FLOAT_LITERAL_MAX, Value::Float(5.0));
    let parameters = config.tree_parameters(FLOAT, fixed_context);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Half grow, half full.
    let mut population: Vec<Tree> = (0..population_size)
        .map(|i| {
            let strategy = if i % 2 == 0 {
                GrowthStrategy::Grow
            } else {
                GrowthStrategy::Full
            };
            builder.build(&parameters, strategy, &mut rng)
        })
        .collect::<treegp::Result<Vec<_>>>()?;

    for generation in 0..generations {
        // Evaluation is the external scheduler's job; trees and registry are
        // shared read-only across workers, contexts are per-evaluation.
        let mut evaluated: Vec<(Tree, f64)> = population
            .into_par_iter()
            .map(|tree| {
                let score = fitness(&tree);
                (tree, score)
            })
            .collect();
        evaluated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let best = &evaluated[0];
        println!(
            "Generation {}: best fitness = {:.6}, size = {}, formula = {}",
            generation + 1,
            best.1,
            best.0.size(),
            best.0
        );

        if generation == generations - 1 {
            println!("\nBest evolved expression: {}", best.0);
            break;
        }

        let mut next_generation: Vec<Tree> = evaluated
            .iter()
            .take(ELITE_COUNT)
            .map(|(tree, _)| tree.clone())
            .collect();

        while next_generation.len() < population_size {
            let mut child = if rng.gen::<f64>() < CROSSOVER_RATE {
                let parent_a = tournament(&evaluated, &mut rng);
                let parent_b = tournament(&evaluated, &mut rng);
                crossover(parent_a, parent_b, &limits, &mut rng)?
            } else {
                tournament(&evaluated, &mut rng).clone()
            };
            if rng.gen::<f64>() < SUBTREE_MUTATION_RATE {
                child = subtree_mutation(&child, &builder, &mut rng)?;
            }
            if rng.gen::<f64>() < LITERAL_MUTATION_RATE {
                child = literal_mutation(&child, &registry, &mut rng)?;
            }
            next_generation.push(child);
        }

        population = next_generation;
    }

    Ok(())
}
