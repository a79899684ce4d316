use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use crate::engines::evaluation::{ExecutionContext, FixedContext};
use crate::error::Result;
use crate::tree::NodeInstance;
use crate::types::{NodeType, Value};

/// Executable body of a primitive node.
///
/// Children arrive *unevaluated*; the behavior decides which to evaluate, in
/// what order, and how many times (zero included). Evaluate a child with
/// `children[i].execute(context)`.
pub type PrimitiveBehavior =
    Arc<dyn Fn(&[NodeInstance], &mut ExecutionContext) -> Result<Value> + Send + Sync>;

/// Produces a literal's constant value, invoked once at node creation.
pub type LiteralGenerator = Arc<dyn Fn(&FixedContext, &mut dyn RngCore) -> Value + Send + Sync>;

/// Derives a replacement value from a literal's current value.
pub type LiteralMutator =
    Arc<dyn Fn(&Value, &FixedContext, &mut dyn RngCore) -> Value + Send + Sync>;

/// Stable string form for literal values whose native representation does
/// not persist directly (composite values).
#[derive(Clone)]
pub struct LiteralCodec {
    pub serialize: Arc<dyn Fn(&Value) -> Result<String> + Send + Sync>,
    pub deserialize: Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>,
}

impl fmt::Debug for LiteralCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LiteralCodec")
    }
}

#[derive(Clone)]
pub enum NodeKind {
    Primitive {
        child_types: Vec<NodeType>,
        behavior: PrimitiveBehavior,
    },
    Literal {
        generator: LiteralGenerator,
    },
}

/// One immutable catalog entry: a buildable tree operation (primitive) or
/// constant generator (literal). Identified by a stable string id used for
/// exclusion lists and persistence.
pub struct NodeDefinition {
    id: &'static str,
    return_type: NodeType,
    kind: NodeKind,
}

impl NodeDefinition {
    pub fn primitive<F>(
        id: &'static str,
        return_type: NodeType,
        child_types: Vec<NodeType>,
        behavior: F,
    ) -> Self
    where
        F: Fn(&[NodeInstance], &mut ExecutionContext) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            id,
            return_type,
            kind: NodeKind::Primitive {
                child_types,
                behavior: Arc::new(behavior),
            },
        }
    }

    pub fn literal<F>(id: &'static str, return_type: NodeType, generator: F) -> Self
    where
        F: Fn(&FixedContext, &mut dyn RngCore) -> Value + Send + Sync + 'static,
    {
        Self {
            id,
            return_type,
            kind: NodeKind::Literal {
                generator: Arc::new(generator),
            },
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn return_type(&self) -> NodeType {
        self.return_type
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Child type signature; empty for literals and terminals.
    pub fn child_types(&self) -> &[NodeType] {
        match &self.kind {
            NodeKind::Primitive { child_types, .. } => child_types,
            NodeKind::Literal { .. } => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.child_types().len()
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal { .. })
    }

    /// Literals and zero-arity primitives may sit at the depth bound.
    pub fn is_terminal(&self) -> bool {
        self.arity() == 0
    }

    /// Signature equality: same id, kind, return type, and child types.
    /// Behavior functions are not comparable, so an exact re-registration is
    /// taken at its word.
    pub(crate) fn same_signature(&self, other: &NodeDefinition) -> bool {
        self.id == other.id
            && self.return_type == other.return_type
            && self.is_literal() == other.is_literal()
            && self.child_types() == other.child_types()
    }
}

impl fmt::Debug for NodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_literal() { "literal" } else { "primitive" };
        f.debug_struct("NodeDefinition")
            .field("id", &self.id)
            .field("kind", &kind)
            .field("return_type", &self.return_type)
            .field("child_types", &self.child_types())
            .finish()
    }
}
