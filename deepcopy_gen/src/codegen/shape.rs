/* Shape classification for member descriptors */

use crate::codegen::cgen::make_c_type_decl;
use crate::error::ShapeError;
use crate::model::{LengthAssociation, TypeCategory, TypeDescriptor};
use serde_derive::Serialize;
use std::fmt;

/// Exactly one of these applies to every member the generator accepts.
/// Variants are listed in dispatch precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
  ExtensionChain,
  Composite,
  String,
  StringArray,
  FixedArray,
  Pointer,
  Value,
}

impl fmt::Display for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Shape::ExtensionChain => "extension-chain",
      Shape::Composite => "composite",
      Shape::String => "string",
      Shape::StringArray => "string-array",
      Shape::FixedArray => "fixed-array",
      Shape::Pointer => "pointer",
      Shape::Value => "value",
    })
  }
}

fn unsupported(ty: &TypeDescriptor, reason: &'static str) -> ShapeError {
  ShapeError::Unsupported { decl: make_c_type_decl(ty, true), reason }
}

pub fn classify(ty: &TypeDescriptor) -> Result<Shape, ShapeError> {
  if ty.is_next_pointer() {
    return Ok(Shape::ExtensionChain);
  }

  /* composite before array, so counted arrays of structs recurse per element */
  if ty.is_composite() {
    return match (ty.pointer_levels, ty.static_array.is_some()) {
      (0, _) | (1, false) => Ok(Shape::Composite),
      (1, true) => Err(unsupported(ty, "fixed array of pointers to a composite")),
      _ => Err(unsupported(ty, "more than one level of indirection to a composite")),
    };
  }

  if ty.category == TypeCategory::String && ty.static_array.is_none() {
    match ty.pointer_levels {
      1 if ty.length.is_none() => return Ok(Shape::String),
      2 if ty.length.is_some() => return Ok(Shape::StringArray),
      2 => return Err(ShapeError::MissingLength { decl: make_c_type_decl(ty, true) }),
      _ => {}
    }
  }

  if ty.static_array.is_some() {
    if ty.pointer_levels > 0 {
      return Err(unsupported(ty, "fixed array of pointers"));
    }
    return Ok(Shape::FixedArray);
  }

  match ty.pointer_levels {
    0 => Ok(Shape::Value),
    1 => Ok(Shape::Pointer),
    _ => Err(unsupported(ty, "pointer-to-pointer of a non-character type")),
  }
}

/// One callback per shape; `iterate_type` routes each descriptor to exactly one.
pub trait ShapeVisitor {
  fn on_extension_chain(&mut self, ty: &TypeDescriptor);
  fn on_compound_type(&mut self, ty: &TypeDescriptor);
  fn on_string(&mut self, ty: &TypeDescriptor);
  fn on_string_array(&mut self, ty: &TypeDescriptor, length: &LengthAssociation);
  fn on_static_arr(&mut self, ty: &TypeDescriptor);
  fn on_pointer(&mut self, ty: &TypeDescriptor);
  fn on_value(&mut self, ty: &TypeDescriptor);
}

pub fn iterate_type<V: ShapeVisitor + ?Sized>(
  ty: &TypeDescriptor,
  visitor: &mut V,
) -> Result<Shape, ShapeError> {
  let shape = classify(ty)?;
  match shape {
    Shape::ExtensionChain => visitor.on_extension_chain(ty),
    Shape::Composite => visitor.on_compound_type(ty),
    Shape::String => visitor.on_string(ty),
    Shape::StringArray => {
      let length = ty
        .length
        .as_ref()
        .ok_or_else(|| ShapeError::MissingLength { decl: make_c_type_decl(ty, true) })?;
      visitor.on_string_array(ty, length);
    }
    Shape::FixedArray => visitor.on_static_arr(ty),
    Shape::Pointer => visitor.on_pointer(ty),
    Shape::Value => visitor.on_value(ty),
  }
  Ok(shape)
}
