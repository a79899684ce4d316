use std::sync::Arc;

use rand::Rng;

use crate::config::TreeParameters;
use crate::error::{GpError, Result};
use crate::nodes::definition::{NodeDefinition, NodeKind};
use crate::nodes::registry::NodeRegistry;
use crate::tree::{NodeInstance, Tree};
use crate::types::{GrowthStrategy, NodeType};

/// Builds type-correct random trees by recursive descent from a requested
/// return type.
pub struct TreeBuilder {
    registry: Arc<NodeRegistry>,
}

impl TreeBuilder {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn build<R: Rng>(
        &self,
        parameters: &TreeParameters,
        strategy: GrowthStrategy,
        rng: &mut R,
    ) -> Result<Tree> {
        let root = self.build_subtree(
            parameters.return_type,
            parameters.max_depth,
            parameters,
            strategy,
            rng,
        )?;
        Tree::new(root, parameters.clone())
    }

    /// Build one subtree returning `return_type` within `budget` edges below
    /// the produced node. Used directly by subtree mutation, which measures
    /// the budget from the mutation site so the whole-tree depth bound is
    /// preserved.
    pub fn build_subtree<R: Rng>(
        &self,
        return_type: NodeType,
        budget: usize,
        parameters: &TreeParameters,
        strategy: GrowthStrategy,
        rng: &mut R,
    ) -> Result<NodeInstance> {
        let candidates = self.candidates(return_type, budget, parameters, strategy)?;
        let definition = Arc::clone(&candidates[rng.gen_range(0..candidates.len())]);
        match definition.kind() {
            NodeKind::Literal { generator } => {
                // The generator runs exactly once; the value is fixed for
                // the node's lifetime.
                let value = generator(&parameters.fixed_context, rng);
                NodeInstance::literal(Arc::clone(&definition), value)
            }
            NodeKind::Primitive { child_types, .. } => {
                let children = child_types
                    .iter()
                    .map(|child_type| {
                        self.build_subtree(
                            *child_type,
                            budget.saturating_sub(1),
                            parameters,
                            strategy,
                            rng,
                        )
                    })
                    .collect::<Result<Vec<_>>>()?;
                NodeInstance::primitive(Arc::clone(&definition), children)
            }
        }
    }

    /// Candidate policy:
    /// - budget exhausted: terminals only (literals and zero-arity
    ///   primitives), guaranteeing termination;
    /// - grow: everything compatible;
    /// - full: nonzero-arity primitives while any exist for the type.
    ///
    /// An empty candidate set is a configuration defect and fails
    /// immediately rather than producing an invalid tree.
    fn candidates(
        &self,
        return_type: NodeType,
        budget: usize,
        parameters: &TreeParameters,
        strategy: GrowthStrategy,
    ) -> Result<Vec<Arc<NodeDefinition>>> {
        let all = self
            .registry
            .available_definitions(return_type, &parameters.forbidden_nodes);
        let filtered: Vec<Arc<NodeDefinition>> = if budget == 0 {
            all.into_iter().filter(|def| def.is_terminal()).collect()
        } else {
            match strategy {
                GrowthStrategy::Grow => all,
                GrowthStrategy::Full => {
                    let internal: Vec<Arc<NodeDefinition>> = all
                        .iter()
                        .filter(|def| !def.is_terminal())
                        .cloned()
                        .collect();
                    if internal.is_empty() {
                        all
                    } else {
                        internal
                    }
                }
            }
        };
        if filtered.is_empty() {
            return Err(GpError::Construction {
                node_type: return_type,
                budget,
            });
        }
        Ok(filtered)
    }
}
