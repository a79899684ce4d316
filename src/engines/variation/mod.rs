pub mod operators;

pub use operators::{
    crossover, literal_mutation, parsimony_adjusted, subtree_mutation, VariationLimits,
};
