pub mod descriptor;
pub mod loader;
pub mod type_info;

pub use descriptor::{FunctionSignature, LengthAssociation, TypeCategory, TypeDescriptor};
pub use loader::{load_registry_file, load_registry_files, parse_registry};
pub use type_info::{Category, CommandInfo, StructInfo, TypeInfo};
