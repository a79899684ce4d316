pub mod context;
pub mod executor;

pub use context::{ExecutionContext, FixedContext};
pub use executor::execute_with_default;
