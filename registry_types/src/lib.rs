//! Registry Type Definitions
//!
//! This crate contains the serde data model for API registry documents:
//! named types (structs, unions, aliases and opaque scalars) and commands.
//! It provides pure data structures without any file I/O, resolution or
//! code generation logic.

pub mod types;

// Re-export commonly used types at the crate root
pub use types::*;
