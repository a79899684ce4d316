//! Stable persistence of trees: node identity by definition id, literal
//! values either natively (scalar kinds) or through the registry's literal
//! codecs (composite kinds).

use serde::{Deserialize, Serialize};

use crate::config::TreeParameters;
use crate::error::{GpError, Result};
use crate::engines::evaluation::FixedContext;
use crate::nodes::registry::NodeRegistry;
use crate::tree::{NodeInstance, Tree};
use crate::types::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub return_type: String,
    pub max_depth: usize,
    pub forbidden_nodes: Vec<String>,
    pub fixed_context: FixedContext,
    pub root: NodeRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeRecord {
    Primitive {
        id: String,
        children: Vec<NodeRecord>,
    },
    Literal {
        id: String,
        value: LiteralPayload,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralPayload {
    /// Scalar value, stable without a codec
    Native(Value),
    /// Codec-produced stable string form
    Encoded(String),
}

/// Encode a tree for persistence.
///
/// A literal whose type has a registered codec always goes through it.
/// Without one, scalar values persist natively; a composite value with no
/// codec is a configuration defect surfaced here, at serialization time,
/// never skipped.
pub fn encode(tree: &Tree, registry: &NodeRegistry) -> Result<TreeRecord> {
    let parameters = tree.parameters();
    let mut forbidden_nodes: Vec<String> = parameters.forbidden_nodes.iter().cloned().collect();
    forbidden_nodes.sort();
    Ok(TreeRecord {
        return_type: parameters.return_type.label().to_string(),
        max_depth: parameters.max_depth,
        forbidden_nodes,
        fixed_context: parameters.fixed_context.clone(),
        root: encode_node(tree.root(), registry)?,
    })
}

fn encode_node(node: &NodeInstance, registry: &NodeRegistry) -> Result<NodeRecord> {
    let id = node.definition().id().to_string();
    match node.literal_value() {
        Some(value) => {
            let payload = match registry.codec(node.return_type()) {
                Some(codec) => LiteralPayload::Encoded((codec.serialize)(value)?),
                None if value.is_scalar() => LiteralPayload::Native(value.clone()),
                None => {
                    return Err(GpError::Codec(format!(
                        "literal {} holds a {} value and type {} has no registered codec",
                        id,
                        value.kind(),
                        node.return_type()
                    )))
                }
            };
            Ok(NodeRecord::Literal { id, value: payload })
        }
        None => Ok(NodeRecord::Primitive {
            id,
            children: node
                .children()
                .iter()
                .map(|child| encode_node(child, registry))
                .collect::<Result<Vec<_>>>()?,
        }),
    }
}

/// Reconstruct a tree, resolving definition ids against `registry` and
/// re-validating the full type and depth invariants.
pub fn decode(registry: &NodeRegistry, record: &TreeRecord) -> Result<Tree> {
    let return_type = registry
        .node_type(&record.return_type)
        .ok_or_else(|| GpError::UnknownType(record.return_type.clone()))?;
    let parameters = TreeParameters {
        return_type,
        max_depth: record.max_depth,
        forbidden_nodes: record.forbidden_nodes.iter().cloned().collect(),
        fixed_context: record.fixed_context.clone(),
    };
    let root = decode_node(registry, &record.root)?;
    Tree::new(root, parameters)
}

fn decode_node(registry: &NodeRegistry, record: &NodeRecord) -> Result<NodeInstance> {
    match record {
        NodeRecord::Primitive { id, children } => {
            let definition = registry
                .definition(id)
                .ok_or_else(|| GpError::UnknownNode(id.clone()))?;
            let children = children
                .iter()
                .map(|child| decode_node(registry, child))
                .collect::<Result<Vec<_>>>()?;
            NodeInstance::primitive(definition, children)
        }
        NodeRecord::Literal { id, value } => {
            let definition = registry
                .definition(id)
                .ok_or_else(|| GpError::UnknownNode(id.clone()))?;
            let value = match value {
                LiteralPayload::Native(value) => value.clone(),
                LiteralPayload::Encoded(encoded) => {
                    let codec = registry.codec(definition.return_type()).ok_or_else(|| {
                        GpError::Codec(format!(
                            "literal {} was stored in encoded form and type {} has no registered codec",
                            id,
                            definition.return_type()
                        ))
                    })?;
                    (codec.deserialize)(encoded)?
                }
            };
            NodeInstance::literal(definition, value)
        }
    }
}

pub fn to_json(tree: &Tree, registry: &NodeRegistry) -> Result<String> {
    Ok(serde_json::to_string(&encode(tree, registry)?)?)
}

pub fn from_json(registry: &NodeRegistry, json: &str) -> Result<Tree> {
    let record: TreeRecord = serde_json::from_str(json)?;
    decode(registry, &record)
}
