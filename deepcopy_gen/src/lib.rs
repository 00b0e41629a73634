//! Generates C++ deep-copy functions from a YAML type registry.
//!
//! A registry is loaded into a [`model::TypeInfo`], each struct and union
//! member is classified into a [`codegen::Shape`], and the
//! [`codegen::DeepcopyGenerator`] turns the model into a header and an
//! implementation file that copy through a caller-supplied pool.

pub mod cmds;
pub mod codegen;
pub mod error;
pub mod model;

pub use error::{GenError, GenResult, ShapeError};
