use std::fmt;
use std::sync::Arc;

use crate::engines::evaluation::ExecutionContext;
use crate::error::{GpError, Result};
use crate::nodes::definition::{NodeDefinition, NodeKind};
use crate::types::{NodeType, Value};

/// One concrete occurrence of a node definition inside a tree.
///
/// A primitive instance exclusively owns its ordered children; a literal
/// instance holds one value fixed at creation. Subtrees are never shared
/// between trees: crossover clones rather than aliases.
#[derive(Clone)]
pub struct NodeInstance {
    definition: Arc<NodeDefinition>,
    payload: NodePayload,
}

#[derive(Clone)]
enum NodePayload {
    Primitive(Vec<NodeInstance>),
    Literal(Value),
}

impl NodeInstance {
    /// Build a primitive instance, checking each child's return type against
    /// the definition's slot signature (exact equality).
    pub fn primitive(definition: Arc<NodeDefinition>, children: Vec<NodeInstance>) -> Result<Self> {
        let NodeKind::Primitive { child_types, .. } = definition.kind() else {
            return Err(GpError::Invariant(format!(
                "{} is a literal definition, not a primitive",
                definition.id()
            )));
        };
        if children.len() != child_types.len() {
            return Err(GpError::Invariant(format!(
                "{} expects {} children, got {}",
                definition.id(),
                child_types.len(),
                children.len()
            )));
        }
        for (slot, (child, expected)) in children.iter().zip(child_types.iter()).enumerate() {
            if child.return_type() != *expected {
                return Err(GpError::Invariant(format!(
                    "{} child slot {} expects {}, got {} returning {}",
                    definition.id(),
                    slot,
                    expected,
                    child.definition().id(),
                    child.return_type()
                )));
            }
        }
        Ok(Self {
            definition,
            payload: NodePayload::Primitive(children),
        })
    }

    pub fn literal(definition: Arc<NodeDefinition>, value: Value) -> Result<Self> {
        if !definition.is_literal() {
            return Err(GpError::Invariant(format!(
                "{} is a primitive definition, not a literal",
                definition.id()
            )));
        }
        Ok(Self {
            definition,
            payload: NodePayload::Literal(value),
        })
    }

    pub fn definition(&self) -> &Arc<NodeDefinition> {
        &self.definition
    }

    pub fn return_type(&self) -> NodeType {
        self.definition.return_type()
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.payload, NodePayload::Literal(_))
    }

    pub fn children(&self) -> &[NodeInstance] {
        match &self.payload {
            NodePayload::Primitive(children) => children,
            NodePayload::Literal(_) => &[],
        }
    }

    pub fn literal_value(&self) -> Option<&Value> {
        match &self.payload {
            NodePayload::Literal(value) => Some(value),
            NodePayload::Primitive(_) => None,
        }
    }

    /// Evaluate this node.
    ///
    /// A literal returns its fixed value without touching the context. A
    /// primitive hands its children, unevaluated, to the definition's
    /// behavior, which may evaluate any subset of them in any order against
    /// the same shared context.
    pub fn execute(&self, context: &mut ExecutionContext) -> Result<Value> {
        match (&self.payload, self.definition.kind()) {
            (NodePayload::Literal(value), NodeKind::Literal { .. }) => Ok(value.clone()),
            (NodePayload::Primitive(children), NodeKind::Primitive { behavior, .. }) => {
                behavior(children, context)
            }
            _ => Err(GpError::Invariant(format!(
                "{} payload does not match its definition kind",
                self.definition.id()
            ))),
        }
    }

    /// Node count of this subtree (at least 1).
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(NodeInstance::size).sum::<usize>()
    }

    /// Edge depth of this subtree; a childless node is depth 0.
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(NodeInstance::depth)
            .max()
            .map_or(0, |d| d + 1)
    }

    /// Preorder lookup: index 0 is this node.
    pub fn get(&self, index: usize) -> Option<&NodeInstance> {
        self.get_with_depth(index).map(|(node, _)| node)
    }

    /// Preorder lookup returning the node and its depth below this one.
    pub fn get_with_depth(&self, index: usize) -> Option<(&NodeInstance, usize)> {
        fn walk<'a>(
            node: &'a NodeInstance,
            index: &mut usize,
            depth: usize,
        ) -> Option<(&'a NodeInstance, usize)> {
            if *index == 0 {
                return Some((node, depth));
            }
            *index -= 1;
            for child in node.children() {
                if let Some(found) = walk(child, index, depth + 1) {
                    return Some(found);
                }
            }
            None
        }
        let mut index = index;
        walk(self, &mut index, 0)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut NodeInstance> {
        fn walk<'a>(node: &'a mut NodeInstance, index: &mut usize) -> Option<&'a mut NodeInstance> {
            if *index == 0 {
                return Some(node);
            }
            *index -= 1;
            if let NodePayload::Primitive(children) = &mut node.payload {
                for child in children {
                    if let Some(found) = walk(child, index) {
                        return Some(found);
                    }
                }
            }
            None
        }
        let mut index = index;
        walk(self, &mut index)
    }

    /// Swap in a replacement subtree at a preorder index, returning the old
    /// subtree. The replacement must return the same type the slot declares.
    pub fn replace(&mut self, index: usize, replacement: NodeInstance) -> Result<NodeInstance> {
        let target = self.get_mut(index).ok_or_else(|| {
            GpError::Invariant(format!("node index {index} out of range"))
        })?;
        if target.return_type() != replacement.return_type() {
            return Err(GpError::Invariant(format!(
                "cannot place {} returning {} into a {} slot",
                replacement.definition().id(),
                replacement.return_type(),
                target.return_type()
            )));
        }
        Ok(std::mem::replace(target, replacement))
    }

    /// Preorder indices of every node in this subtree satisfying `keep`.
    pub fn indices_where<F>(&self, keep: F) -> Vec<usize>
    where
        F: Fn(&NodeInstance) -> bool,
    {
        fn walk<F: Fn(&NodeInstance) -> bool>(
            node: &NodeInstance,
            keep: &F,
            next: &mut usize,
            out: &mut Vec<usize>,
        ) {
            if keep(node) {
                out.push(*next);
            }
            *next += 1;
            for child in node.children() {
                walk(child, keep, next, out);
            }
        }
        let mut out = Vec::new();
        let mut next = 0;
        walk(self, &keep, &mut next, &mut out);
        out
    }

    pub fn literal_indices(&self) -> Vec<usize> {
        self.indices_where(NodeInstance::is_literal)
    }

    pub fn indices_with_type(&self, node_type: NodeType) -> Vec<usize> {
        self.indices_where(|node| node.return_type() == node_type)
    }

    /// Re-check the structural type invariant over the whole subtree.
    ///
    /// Constructors make violations unrepresentable; variation operators
    /// still re-verify after every application rather than assume.
    pub fn validate(&self) -> Result<()> {
        match (&self.payload, self.definition.kind()) {
            (NodePayload::Literal(_), NodeKind::Literal { .. }) => Ok(()),
            (NodePayload::Primitive(children), NodeKind::Primitive { child_types, .. }) => {
                if children.len() != child_types.len() {
                    return Err(GpError::Invariant(format!(
                        "{} expects {} children, found {}",
                        self.definition.id(),
                        child_types.len(),
                        children.len()
                    )));
                }
                for (child, expected) in children.iter().zip(child_types.iter()) {
                    if child.return_type() != *expected {
                        return Err(GpError::Invariant(format!(
                            "{} child {} returns {}, slot expects {}",
                            self.definition.id(),
                            child.definition().id(),
                            child.return_type(),
                            expected
                        )));
                    }
                    child.validate()?;
                }
                Ok(())
            }
            _ => Err(GpError::Invariant(format!(
                "{} payload does not match its definition kind",
                self.definition.id()
            ))),
        }
    }
}

impl fmt::Display for NodeInstance {
    /// Formula-style rendering: `add(negate(x), 1.5)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            NodePayload::Literal(value) => write!(f, "{}", value),
            NodePayload::Primitive(children) if children.is_empty() => {
                write!(f, "{}", self.definition.id())
            }
            NodePayload::Primitive(children) => {
                write!(f, "{}(", self.definition.id())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Debug for NodeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeInstance({})", self)
    }
}
