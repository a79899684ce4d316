use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::types::Value;

/// Evolution-time-constant data handed to literal generators and mutators.
///
/// Fixed at tree construction, never visible during execution. Persisted
/// with the tree so rebuilt subtrees draw literals from the same ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedContext {
    values: HashMap<String, Value>,
}

impl FixedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(Value::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(Value::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

/// Caller-owned mutable state shared by every node activated within one
/// top-level `execute` call.
///
/// The context is fully exposed: any behavior may read or write the memory
/// map, and no isolation exists between sibling subtrees' effects. That is a
/// deliberate capability (memory nodes, iteration patterns), and it puts the
/// discipline burden on node authors. A context must never be shared across
/// concurrently executing trees.
#[derive(Default)]
pub struct ExecutionContext {
    state: Option<Box<dyn Any>>,
    memory: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying an environment snapshot (e.g. current game state).
    /// Sensor behaviors downcast it back out with [`state`](Self::state).
    pub fn with_state<T: Any>(state: T) -> Self {
        Self {
            state: Some(Box::new(state)),
            memory: HashMap::new(),
        }
    }

    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.as_deref().and_then(|s| s.downcast_ref())
    }

    pub fn state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state.as_deref_mut().and_then(|s| s.downcast_mut())
    }

    pub fn load(&self, key: &str) -> Option<&Value> {
        self.memory.get(key)
    }

    pub fn store(&mut self, key: impl Into<String>, value: Value) {
        self.memory.insert(key.into(), value);
    }

    pub fn memory(&self) -> &HashMap<String, Value> {
        &self.memory
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("has_state", &self.state.is_some())
            .field("memory", &self.memory)
            .finish()
    }
}
