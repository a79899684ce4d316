use log::warn;

use super::context::ExecutionContext;
use crate::error::{GpError, Result};
use crate::tree::Tree;
use crate::types::Value;

/// Execute a tree, substituting `default` if a behavior raises an
/// arithmetic failure.
///
/// This is the agent-boundary contract: arithmetic failures are expected
/// from evolved expressions and must not abort an evaluation batch. Every
/// other error kind still propagates.
pub fn execute_with_default(
    tree: &Tree,
    context: &mut ExecutionContext,
    default: Value,
) -> Result<Value> {
    match tree.execute(context) {
        Ok(value) => Ok(value),
        Err(GpError::Arithmetic(reason)) => {
            warn!("arithmetic failure executing tree, substituting default: {reason}");
            Ok(default)
        }
        Err(other) => Err(other),
    }
}
