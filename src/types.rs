use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GpError, Result};

/// Opaque label naming a category of value flow between nodes.
///
/// A registry's set of labels is fixed at registration time; labels constrain
/// which node instances may connect as parent and child (exact equality, no
/// subtyping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeType(pub &'static str);

impl NodeType {
    pub fn label(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Strategy for random tree construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthStrategy {
    /// Any compatible definition may be chosen above the depth floor
    Grow,
    /// Nonzero-arity primitives are forced above the depth floor when any
    /// exist, pushing every branch toward the depth bound
    Full,
}

/// Runtime value carried between nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    FloatVec(Vec<f64>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::FloatVec(_) => "float_vec",
        }
    }

    /// Whether the value persists stably without a registered codec.
    /// Composite values (`FloatVec`) require one.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::FloatVec(_))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(GpError::Value {
                expected: "bool",
                actual: other.kind(),
            }),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(GpError::Value {
                expected: "int",
                actual: other.kind(),
            }),
        }
    }

    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(GpError::Value {
                expected: "float",
                actual: other.kind(),
            }),
        }
    }

    pub fn as_float_vec(&self) -> Result<&[f64]> {
        match self {
            Value::FloatVec(v) => Ok(v),
            other => Err(GpError::Value {
                expected: "float_vec",
                actual: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::FloatVec(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
        }
    }
}
