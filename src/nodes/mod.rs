pub mod definition;
pub mod float_bool;
pub mod registry;

pub use definition::{
    LiteralCodec, LiteralGenerator, LiteralMutator, NodeDefinition, NodeKind, PrimitiveBehavior,
};
pub use registry::NodeRegistry;
