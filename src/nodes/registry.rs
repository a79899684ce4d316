use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::RngCore;

use super::definition::{LiteralCodec, LiteralMutator, NodeDefinition};
use crate::engines::evaluation::{ExecutionContext, FixedContext};
use crate::error::{GpError, Result};
use crate::tree::NodeInstance;
use crate::types::{NodeType, Value};

/// Per-node-class catalog of primitive and literal definitions.
///
/// Built once at startup, then shared read-only (typically behind an `Arc`)
/// by every tree built from it, so concurrent reads from evaluation workers
/// need no locking. Candidate listings preserve registration order, keeping
/// construction deterministic under a fixed seed.
pub struct NodeRegistry {
    definitions: HashMap<&'static str, Arc<NodeDefinition>>,
    order: Vec<&'static str>,
    codecs: HashMap<NodeType, LiteralCodec>,
    mutators: HashMap<NodeType, LiteralMutator>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            order: Vec::new(),
            codecs: HashMap::new(),
            mutators: HashMap::new(),
        }
    }

    pub fn register_primitive<F>(
        &mut self,
        id: &'static str,
        return_type: NodeType,
        child_types: Vec<NodeType>,
        behavior: F,
    ) -> Result<()>
    where
        F: Fn(&[NodeInstance], &mut ExecutionContext) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(NodeDefinition::primitive(
            id,
            return_type,
            child_types,
            behavior,
        ))
    }

    pub fn register_literal<F>(
        &mut self,
        id: &'static str,
        return_type: NodeType,
        generator: F,
    ) -> Result<()>
    where
        F: Fn(&FixedContext, &mut dyn RngCore) -> Value + Send + Sync + 'static,
    {
        self.insert(NodeDefinition::literal(id, return_type, generator))
    }

    /// Re-registering an identical signature is a no-op; a conflicting
    /// signature under the same id is fatal at startup.
    fn insert(&mut self, definition: NodeDefinition) -> Result<()> {
        if let Some(existing) = self.definitions.get(definition.id()) {
            if existing.same_signature(&definition) {
                return Ok(());
            }
            return Err(GpError::Registration(format!(
                "definition {} already registered with a different signature",
                definition.id()
            )));
        }
        let id = definition.id();
        self.definitions.insert(id, Arc::new(definition));
        self.order.push(id);
        Ok(())
    }

    pub fn register_literal_codec<S, D>(&mut self, node_type: NodeType, serialize: S, deserialize: D)
    where
        S: Fn(&Value) -> Result<String> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        self.codecs.insert(
            node_type,
            LiteralCodec {
                serialize: Arc::new(serialize),
                deserialize: Arc::new(deserialize),
            },
        );
    }

    pub fn register_literal_mutator<F>(&mut self, node_type: NodeType, mutator: F)
    where
        F: Fn(&Value, &FixedContext, &mut dyn RngCore) -> Value + Send + Sync + 'static,
    {
        self.mutators.insert(node_type, Arc::new(mutator));
    }

    pub fn definition(&self, id: &str) -> Option<Arc<NodeDefinition>> {
        self.definitions.get(id).cloned()
    }

    /// Every definition returning `return_type` whose id is not in
    /// `forbidden`, in registration order.
    ///
    /// Exclusions are applied per call so that tree instances sharing this
    /// registry can still play with different allowed subsets.
    pub fn available_definitions(
        &self,
        return_type: NodeType,
        forbidden: &HashSet<String>,
    ) -> Vec<Arc<NodeDefinition>> {
        self.order
            .iter()
            .copied()
            .filter(|id| !forbidden.contains(*id))
            .filter_map(|id| self.definitions.get(id))
            .filter(|def| def.return_type() == return_type)
            .cloned()
            .collect()
    }

    pub fn codec(&self, node_type: NodeType) -> Option<&LiteralCodec> {
        self.codecs.get(&node_type)
    }

    pub fn mutator(&self, node_type: NodeType) -> Option<&LiteralMutator> {
        self.mutators.get(&node_type)
    }

    /// Distinct type labels in first-use order.
    pub fn node_types(&self) -> Vec<NodeType> {
        let mut types = Vec::new();
        for id in &self.order {
            if let Some(def) = self.definitions.get(id) {
                for t in std::iter::once(def.return_type()).chain(def.child_types().iter().copied())
                {
                    if !types.contains(&t) {
                        types.push(t);
                    }
                }
            }
        }
        types
    }

    pub fn node_type(&self, label: &str) -> Option<NodeType> {
        self.node_types().into_iter().find(|t| t.label() == label)
    }

    /// Union another registry's definitions, codecs, and mutators into this
    /// one. This is how a base node set is shared across specialized sets
    /// (composition, not inheritance): exact duplicates are skipped, codec
    /// and mutator tables keep the first registration, and signature
    /// conflicts are fatal.
    pub fn merge(&mut self, other: &NodeRegistry) -> Result<()> {
        for &id in &other.order {
            let incoming = match other.definitions.get(id) {
                Some(def) => def,
                None => continue,
            };
            if let Some(existing) = self.definitions.get(id) {
                if existing.same_signature(incoming) {
                    continue;
                }
                return Err(GpError::Registration(format!(
                    "definition {id} already registered with a different signature"
                )));
            }
            self.definitions.insert(id, Arc::clone(incoming));
            self.order.push(id);
        }
        for (node_type, codec) in &other.codecs {
            self.codecs.entry(*node_type).or_insert_with(|| codec.clone());
        }
        for (node_type, mutator) in &other.mutators {
            self.mutators
                .entry(*node_type)
                .or_insert_with(|| Arc::clone(mutator));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("definitions", &self.order)
            .field("codec_types", &self.codecs.keys().collect::<Vec<_>>())
            .field("mutator_types", &self.mutators.keys().collect::<Vec<_>>())
            .finish()
    }
}
