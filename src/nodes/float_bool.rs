//! Standard float/bool node set: arithmetic, comparisons, boolean logic, a
//! lazy conditional, and working-memory access. Callers extend it with their
//! own sensor primitives by merging registries.

use rand::Rng;

use super::registry::NodeRegistry;
use crate::engines::evaluation::FixedContext;
use crate::error::Result;
use crate::types::{NodeType, Value};

pub const FLOAT: NodeType = NodeType("float");
pub const BOOL: NodeType = NodeType("bool");

/// Fixed-context keys bounding the float literal generator.
pub const FLOAT_LITERAL_MIN: &str = "float_literal_min";
pub const FLOAT_LITERAL_MAX: &str = "float_literal_max";

/// Execution-context slot used by `recall` and `remember`.
pub const MEMORY_SLOT: &str = "memory";

const DEFAULT_FLOAT_MIN: f64 = -10.0;
const DEFAULT_FLOAT_MAX: f64 = 10.0;

fn literal_bounds(fixed: &FixedContext) -> (f64, f64) {
    let min = fixed.float(FLOAT_LITERAL_MIN).unwrap_or(DEFAULT_FLOAT_MIN);
    let max = fixed.float(FLOAT_LITERAL_MAX).unwrap_or(DEFAULT_FLOAT_MAX);
    (min, max)
}

/// Build the standard registry.
pub fn standard_registry() -> Result<NodeRegistry> {
    let mut registry = NodeRegistry::new();

    registry.register_literal("float_literal", FLOAT, |fixed, rng| {
        let (min, max) = literal_bounds(fixed);
        if min >= max {
            Value::Float(min)
        } else {
            Value::Float(rng.gen_range(min..max))
        }
    })?;

    registry.register_literal("bool_literal", BOOL, |_, rng| Value::Bool(rng.gen_bool(0.5)))?;

    registry.register_primitive("zero", FLOAT, vec![], |_, _| Ok(Value::Float(0.0)))?;

    registry.register_primitive("one", FLOAT, vec![], |_, _| Ok(Value::Float(1.0)))?;

    registry.register_primitive("negate", FLOAT, vec![FLOAT], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_float()?;
        Ok(Value::Float(-value))
    })?;

    registry.register_primitive("invert", FLOAT, vec![FLOAT], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_float()?;
        if value == 0.0 {
            Ok(Value::Float(f64::INFINITY))
        } else {
            Ok(Value::Float(1.0 / value))
        }
    })?;

    registry.register_primitive("sign", FLOAT, vec![FLOAT], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_float()?;
        let sign = if value > 0.0 {
            1.0
        } else if value < 0.0 {
            -1.0
        } else {
            0.0
        };
        Ok(Value::Float(sign))
    })?;

    registry.register_primitive("absolute_value", FLOAT, vec![FLOAT], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_float()?;
        Ok(Value::Float(value.abs()))
    })?;

    registry.register_primitive("square", FLOAT, vec![FLOAT], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_float()?;
        Ok(Value::Float(value * value))
    })?;

    registry.register_primitive("square_root", FLOAT, vec![FLOAT], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_float()?;
        if value < 0.0 {
            Ok(Value::Float(0.0))
        } else {
            Ok(Value::Float(value.sqrt()))
        }
    })?;

    registry.register_primitive("add", FLOAT, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        Ok(Value::Float(left + right))
    })?;

    registry.register_primitive("subtract", FLOAT, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        Ok(Value::Float(left - right))
    })?;

    registry.register_primitive("multiply", FLOAT, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        Ok(Value::Float(left * right))
    })?;

    // Division by zero yields infinity rather than an error; evolved
    // expressions hit it constantly and downstream comparisons handle it.
    registry.register_primitive("divide", FLOAT, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        if right == 0.0 {
            Ok(Value::Float(f64::INFINITY))
        } else {
            Ok(Value::Float(left / right))
        }
    })?;

    registry.register_primitive("maximum", FLOAT, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        Ok(Value::Float(left.max(right)))
    })?;

    registry.register_primitive("minimum", FLOAT, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        Ok(Value::Float(left.min(right)))
    })?;

    registry.register_primitive("bool_not", BOOL, vec![BOOL], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_bool()?;
        Ok(Value::Bool(!value))
    })?;

    registry.register_primitive("bool_and", BOOL, vec![BOOL, BOOL], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_bool()?;
        let right = nodes[1].execute(ctx)?.as_bool()?;
        Ok(Value::Bool(left && right))
    })?;

    registry.register_primitive("bool_or", BOOL, vec![BOOL, BOOL], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_bool()?;
        let right = nodes[1].execute(ctx)?.as_bool()?;
        Ok(Value::Bool(left || right))
    })?;

    registry.register_primitive("bool_xor", BOOL, vec![BOOL, BOOL], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_bool()?;
        let right = nodes[1].execute(ctx)?.as_bool()?;
        Ok(Value::Bool(left != right))
    })?;

    registry.register_primitive("greater_than", BOOL, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        Ok(Value::Bool(left > right))
    })?;

    registry.register_primitive("less_than", BOOL, vec![FLOAT, FLOAT], |nodes, ctx| {
        let left = nodes[0].execute(ctx)?.as_float()?;
        let right = nodes[1].execute(ctx)?.as_float()?;
        Ok(Value::Bool(left < right))
    })?;

    // Only the taken branch is evaluated.
    registry.register_primitive(
        "if_else",
        FLOAT,
        vec![BOOL, FLOAT, FLOAT],
        |nodes, ctx| {
            let condition = nodes[0].execute(ctx)?.as_bool()?;
            if condition {
                nodes[1].execute(ctx)
            } else {
                nodes[2].execute(ctx)
            }
        },
    )?;

    registry.register_primitive("recall", FLOAT, vec![], |_, ctx| {
        let value = match ctx.load(MEMORY_SLOT) {
            Some(stored) => stored.as_float()?,
            None => 0.0,
        };
        Ok(Value::Float(value))
    })?;

    registry.register_primitive("remember", FLOAT, vec![FLOAT], |nodes, ctx| {
        let value = nodes[0].execute(ctx)?.as_float()?;
        ctx.store(MEMORY_SLOT, Value::Float(value));
        Ok(Value::Float(value))
    })?;

    Ok(registry)
}

/// Opt-in float literal mutator: bounded jitter proportional to the
/// generator's range, instead of the re-generation fallback.
pub fn register_float_jitter_mutator(registry: &mut NodeRegistry) {
    registry.register_literal_mutator(FLOAT, |current, fixed, rng| {
        let (min, max) = literal_bounds(fixed);
        let span = (max - min).abs().max(f64::EPSILON);
        let jitter = rng.gen_range(-0.1..0.1) * span;
        let value = current.as_float().unwrap_or(0.0) + jitter;
        Value::Float(value.clamp(min.min(max), max.max(min)))
    });
}
