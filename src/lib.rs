//! Strongly-typed genetic programming tree engine.
//!
//! Trees are built from a catalog of node definitions ([`NodeRegistry`])
//! whose typed signatures constrain tree topology: a child's return type
//! must exactly match its parent's declared slot type, transitively to the
//! root. The [`TreeBuilder`] constructs random type-correct trees under a
//! depth budget, [`Tree::execute`] evaluates them lazily against a
//! caller-owned mutable context, and the variation operators (subtree
//! mutation, literal mutation, crossover) produce type-correct, size-bounded
//! offspring. Population management, selection, and fitness are external;
//! the engine exposes [`Tree::size`] so callers can apply parsimony
//! pressure.

pub mod config;
pub mod engines;
pub mod error;
pub mod nodes;
pub mod persist;
pub mod tree;
pub mod types;

pub use config::{EngineConfig, TreeParameters};
pub use engines::construction::TreeBuilder;
pub use engines::evaluation::{execute_with_default, ExecutionContext, FixedContext};
pub use engines::variation::{
    crossover, literal_mutation, parsimony_adjusted, subtree_mutation, VariationLimits,
};
pub use error::{GpError, Result};
pub use nodes::{NodeDefinition, NodeKind, NodeRegistry};
pub use tree::{NodeInstance, Tree};
pub use types::{GrowthStrategy, NodeType, Value};
