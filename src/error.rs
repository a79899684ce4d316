use thiserror::Error;

use crate::types::NodeType;

#[derive(Error, Debug)]
pub enum GpError {
    #[error("no node definition returns {node_type} within a depth budget of {budget}")]
    Construction { node_type: NodeType, budget: usize },

    #[error("registration conflict: {0}")]
    Registration(String),

    #[error("arithmetic failure: {0}")]
    Arithmetic(String),

    #[error("type invariant violated: {0}")]
    Invariant(String),

    #[error("literal codec error: {0}")]
    Codec(String),

    #[error("unknown node definition: {0}")]
    UnknownNode(String),

    #[error("unknown node type label: {0}")]
    UnknownType(String),

    #[error("value kind mismatch: expected {expected}, got {actual}")]
    Value {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GpError>;
