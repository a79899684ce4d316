use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::engines::evaluation::FixedContext;
use crate::engines::variation::VariationLimits;
use crate::error::{GpError, Result};
use crate::types::NodeType;

/// Engine-level knobs shared by construction and variation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_tree_depth: usize,
    pub max_tree_size: usize,
    pub crossover_retries: usize,
    pub parsimony_weight: f64,
    pub forbidden_nodes: HashSet<String>,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: 7,
            max_tree_size: 200,
            crossover_retries: 8,
            parsimony_weight: 0.0,
            forbidden_nodes: HashSet::new(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_tree_size == 0 {
            return Err(GpError::Configuration(
                "Max tree size must be at least 1".to_string(),
            ));
        }
        if self.crossover_retries == 0 {
            return Err(GpError::Configuration(
                "Crossover retries must be at least 1".to_string(),
            ));
        }
        if !self.parsimony_weight.is_finite() || self.parsimony_weight < 0.0 {
            return Err(GpError::Configuration(
                "Parsimony weight must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tree_parameters(
        &self,
        return_type: NodeType,
        fixed_context: FixedContext,
    ) -> TreeParameters {
        TreeParameters {
            return_type,
            max_depth: self.max_tree_depth,
            forbidden_nodes: self.forbidden_nodes.clone(),
            fixed_context,
        }
    }

    pub fn variation_limits(&self) -> VariationLimits {
        VariationLimits {
            max_depth: self.max_tree_depth,
            max_size: self.max_tree_size,
            max_retries: self.crossover_retries,
        }
    }
}

/// Everything a single tree is built under. Kept with the tree so variation
/// can rebuild subtrees under the same regime.
///
/// `forbidden_nodes` is applied per tree, not per registry: two populations
/// sharing one registry may still evolve with different allowed subsets.
#[derive(Debug, Clone)]
pub struct TreeParameters {
    pub return_type: NodeType,
    pub max_depth: usize,
    pub forbidden_nodes: HashSet<String>,
    pub fixed_context: FixedContext,
}

impl TreeParameters {
    pub fn new(return_type: NodeType, max_depth: usize) -> Self {
        Self {
            return_type,
            max_depth,
            forbidden_nodes: HashSet::new(),
            fixed_context: FixedContext::new(),
        }
    }

    pub fn with_forbidden<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_nodes = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fixed_context(mut self, fixed_context: FixedContext) -> Self {
        self.fixed_context = fixed_context;
        self
    }
}
