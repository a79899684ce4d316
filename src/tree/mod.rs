pub mod node;

pub use node::NodeInstance;

use std::fmt;

use crate::config::TreeParameters;
use crate::engines::evaluation::ExecutionContext;
use crate::error::{GpError, Result};
use crate::types::{NodeType, Value};

/// An ordered, typed expression tree: the in-memory artifact that is evolved
/// and executed.
///
/// Carries the parameters it was built under so variation operators can
/// rebuild subtrees with the same exclusions, fixed context, and depth
/// budget. Read-only during evaluation; mutated or replaced only between
/// generations.
#[derive(Clone)]
pub struct Tree {
    root: NodeInstance,
    parameters: TreeParameters,
}

impl Tree {
    /// Wrap a root under the given parameters, verifying the full type
    /// invariant, the root's declared return type, and the depth bound.
    pub fn new(root: NodeInstance, parameters: TreeParameters) -> Result<Self> {
        let tree = Self { root, parameters };
        tree.validate()?;
        Ok(tree)
    }

    pub fn root(&self) -> &NodeInstance {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut NodeInstance {
        &mut self.root
    }

    pub fn parameters(&self) -> &TreeParameters {
        &self.parameters
    }

    pub fn return_type(&self) -> NodeType {
        self.parameters.return_type
    }

    /// Node count, the parsimony hook: external fitness computations
    /// subtract `parsimony_weight * size` from a raw score.
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Longest root-to-leaf path in edges; a single-node tree is depth 0.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Evaluate the tree against a caller-owned context.
    ///
    /// Arithmetic failures raised by behaviors propagate untouched; callers
    /// at the agent boundary substitute a default and continue.
    pub fn execute(&self, context: &mut ExecutionContext) -> Result<Value> {
        self.root.execute(context)
    }

    /// Structural re-check of every invariant a freshly constructed tree
    /// satisfies.
    pub fn validate(&self) -> Result<()> {
        if self.root.return_type() != self.parameters.return_type {
            return Err(GpError::Invariant(format!(
                "tree declares return type {}, root {} returns {}",
                self.parameters.return_type,
                self.root.definition().id(),
                self.root.return_type()
            )));
        }
        if self.root.depth() > self.parameters.max_depth {
            return Err(GpError::Invariant(format!(
                "tree depth {} exceeds bound {}",
                self.root.depth(),
                self.parameters.max_depth
            )));
        }
        self.root.validate()
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("return_type", &self.parameters.return_type)
            .field("size", &self.size())
            .field("depth", &self.depth())
            .field("formula", &format_args!("{}", self.root))
            .finish()
    }
}
