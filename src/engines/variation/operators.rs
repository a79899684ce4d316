use log::debug;
use rand::Rng;

use crate::engines::construction::TreeBuilder;
use crate::error::{GpError, Result};
use crate::nodes::definition::NodeKind;
use crate::nodes::registry::NodeRegistry;
use crate::tree::{NodeInstance, Tree};
use crate::types::GrowthStrategy;

/// Bounds a crossover result must respect, and how many site pairs to try
/// before falling back to an unmodified clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariationLimits {
    pub max_depth: usize,
    pub max_size: usize,
    pub max_retries: usize,
}

impl Default for VariationLimits {
    fn default() -> Self {
        Self {
            max_depth: 7,
            max_size: 200,
            max_retries: 8,
        }
    }
}

/// Replace a uniformly chosen node and its subtree with a freshly built one
/// of the same return type.
///
/// The replacement's depth budget is measured from the chosen node's depth,
/// so the whole tree still respects its original bound. Exclusions and fixed
/// context carry over from the tree's build parameters.
pub fn subtree_mutation<R: Rng>(tree: &Tree, builder: &TreeBuilder, rng: &mut R) -> Result<Tree> {
    let mut child = tree.clone();
    let index = rng.gen_range(0..child.size());
    let (slot_type, depth) = {
        let (target, depth) = child
            .root()
            .get_with_depth(index)
            .ok_or_else(|| GpError::Invariant(format!("node index {index} out of range")))?;
        (target.return_type(), depth)
    };
    let budget = tree.parameters().max_depth.saturating_sub(depth);
    let replacement = builder.build_subtree(
        slot_type,
        budget,
        tree.parameters(),
        GrowthStrategy::Grow,
        rng,
    )?;
    child.root_mut().replace(index, replacement)?;
    child.validate()?;
    Ok(child)
}

/// Re-draw the value of one uniformly chosen literal node.
///
/// Uses the type's registered literal mutator when one exists; otherwise
/// falls back to a fresh call of the definition's generator. A tree with no
/// literal nodes is returned unchanged.
pub fn literal_mutation<R: Rng>(tree: &Tree, registry: &NodeRegistry, rng: &mut R) -> Result<Tree> {
    let mut child = tree.clone();
    let literals = child.root().literal_indices();
    if literals.is_empty() {
        debug!("literal mutation on a tree with no literals, returning clone");
        return Ok(child);
    }
    let index = literals[rng.gen_range(0..literals.len())];
    let (definition, current) = {
        let node = child
            .root()
            .get(index)
            .ok_or_else(|| GpError::Invariant(format!("node index {index} out of range")))?;
        let value = node.literal_value().cloned().ok_or_else(|| {
            GpError::Invariant(format!("{} is not a literal node", node.definition().id()))
        })?;
        (node.definition().clone(), value)
    };
    let fixed_context = &tree.parameters().fixed_context;
    let value = match registry.mutator(definition.return_type()) {
        Some(mutator) => mutator(&current, fixed_context, rng),
        None => match definition.kind() {
            NodeKind::Literal { generator } => generator(fixed_context, rng),
            NodeKind::Primitive { .. } => {
                return Err(GpError::Invariant(format!(
                    "{} holds a literal payload but a primitive definition",
                    definition.id()
                )))
            }
        },
    };
    let replacement = NodeInstance::literal(definition, value)?;
    child.root_mut().replace(index, replacement)?;
    child.validate()?;
    Ok(child)
}

/// Clone `recipient` and graft a deep clone of a type-compatible `donor`
/// subtree at a random site.
///
/// Site pairs that would break the depth or size bound are rejected and
/// retried; after `max_retries` failures the operator recovers by returning
/// an unmodified clone of `recipient` rather than surfacing an error.
pub fn crossover<R: Rng>(
    recipient: &Tree,
    donor: &Tree,
    limits: &VariationLimits,
    rng: &mut R,
) -> Result<Tree> {
    // A recipient built under a tighter bound than the configured limit
    // keeps its own bound; the child must satisfy both.
    let depth_bound = limits.max_depth.min(recipient.parameters().max_depth);
    for attempt in 0..limits.max_retries {
        let index = rng.gen_range(0..recipient.size());
        let (site, site_depth) = recipient
            .root()
            .get_with_depth(index)
            .ok_or_else(|| GpError::Invariant(format!("node index {index} out of range")))?;
        let slot_type = site.return_type();

        let donor_indices = donor.root().indices_with_type(slot_type);
        if donor_indices.is_empty() {
            continue;
        }
        let donor_index = donor_indices[rng.gen_range(0..donor_indices.len())];
        let subtree = donor.root().get(donor_index).ok_or_else(|| {
            GpError::Invariant(format!("donor index {donor_index} out of range"))
        })?;

        let depth = site_depth + subtree.depth();
        let size = recipient.size() - site.size() + subtree.size();
        if depth > depth_bound || size > limits.max_size {
            debug!(
                "crossover attempt {attempt} rejected: depth {depth} size {size} vs bounds {}/{}",
                depth_bound, limits.max_size
            );
            continue;
        }

        let mut child = recipient.clone();
        child.root_mut().replace(index, subtree.clone())?;
        child.validate()?;
        return Ok(child);
    }
    debug!(
        "crossover found no in-bound site pair in {} attempts, returning unmodified clone",
        limits.max_retries
    );
    Ok(recipient.clone())
}

/// Parsimony adjustment over the engine's size metric: larger trees score
/// lower, so they are selected against.
pub fn parsimony_adjusted(raw_fitness: f64, size: usize, parsimony_weight: f64) -> f64 {
    raw_fitness - parsimony_weight * size as f64
}
