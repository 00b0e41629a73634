/* Use-site type descriptors and their derived access views */

use serde_derive::Serialize;

/// Name of the member that conventionally carries an extension chain.
pub const NEXT_POINTER_NAME: &str = "pNext";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeCategory {
  Scalar,
  Struct,
  Union,
  /// Character base type (`char`); strings and string arrays are built from it.
  String,
  /// Forward/extension link pointer, opaque to the generator.
  Next,
}

/* Length association with a sibling field */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LengthAssociation {
  pub field: String,
  /// The sibling holding the count is itself a pointer and must be dereferenced.
  pub field_is_pointer: bool,
}

/// One occurrence of a type at a use site (a struct member or a command parameter).
///
/// Descriptors are values: every view method returns an adjusted copy and
/// leaves `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
  pub type_name: String,
  pub category: TypeCategory,
  pub param_name: String,
  pub pointer_levels: u8,
  pub is_const: bool,
  pub is_pointer_to_const_pointer: bool,
  pub static_array: Option<String>,
  pub length: Option<LengthAssociation>,
  pub null_terminated: bool,
}

impl TypeDescriptor {
  /* Descriptor with no array or length information, used for signatures */
  pub fn simple(
    category: TypeCategory,
    is_const: bool,
    type_name: &str,
    pointer_levels: u8,
    param_name: &str,
  ) -> Self {
    Self {
      type_name: type_name.to_string(),
      category,
      param_name: param_name.to_string(),
      pointer_levels,
      is_const,
      is_pointer_to_const_pointer: false,
      static_array: None,
      length: None,
      null_terminated: false,
    }
  }

  pub fn is_composite(&self) -> bool {
    matches!(self.category, TypeCategory::Struct | TypeCategory::Union)
  }

  pub fn is_next_pointer(&self) -> bool {
    self.category == TypeCategory::Next
  }

  pub fn is_void(&self) -> bool {
    self.type_name == "void"
  }

  /// Storage that decays to a pointer: real pointers and fixed arrays.
  pub fn accessible_as_pointer(&self) -> bool {
    self.pointer_levels > 0 || self.static_array.is_some()
  }

  /// View for taking the address: a fixed array becomes a pointer to its first element,
  /// anything else gains one level of indirection.
  pub fn for_address_access(&self) -> Self {
    let mut view = self.clone();
    view.static_array = None;
    view.pointer_levels += 1;
    view.length = None;
    view
  }

  /// View of the pointee/element: a fixed array loses its extent, a pointer loses one level.
  pub fn for_value_access(&self) -> Self {
    let mut view = self.clone();
    if view.static_array.take().is_none() {
      view.pointer_levels = view.pointer_levels.saturating_sub(1);
    }
    if view.pointer_levels < 2 {
      view.is_pointer_to_const_pointer = false;
    }
    view.length = None;
    view.null_terminated = false;
    view
  }

  pub fn for_non_const_access(&self) -> Self {
    let mut view = self.clone();
    view.is_const = false;
    view.is_pointer_to_const_pointer = false;
    view
  }

  pub fn with_param_name(&self, param_name: &str) -> Self {
    let mut view = self.clone();
    view.param_name = param_name.to_string();
    view
  }
}

/// Prototype of an emitted or registry-declared function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
  pub name: String,
  pub return_type: TypeDescriptor,
  pub params: Vec<TypeDescriptor>,
}
