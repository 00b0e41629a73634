pub mod cgen;
pub mod deepcopy;
pub mod expr;
pub mod generator;
pub mod module;
pub mod runtime;
pub mod shape;

pub use generator::{DEFAULT_POOL_HEADER, DeepcopyGenerator, DeepcopyGeneratorOptions};
pub use module::GeneratedModule;
pub use shape::{Shape, classify, iterate_type};
