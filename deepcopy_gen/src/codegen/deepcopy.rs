/* Copy-code emission rules, one per member shape */

use crate::codegen::cgen::{CodeGen, VarDecl, make_c_type_decl, sizeof_expr};
use crate::codegen::expr::CExpr;
use crate::codegen::shape::ShapeVisitor;
use crate::model::{LengthAssociation, TypeDescriptor};
use tracing::debug;

const LOOP_VAR: &str = "i";

/// Produces access expressions for members of one top-level variable.
#[derive(Debug, Clone)]
pub struct Accessor {
  parent: String,
}

impl Accessor {
  pub fn new(parent: &str) -> Self {
    Self { parent: parent.to_string() }
  }

  /// `parent->member`, or `&parent->member` when pointer access is requested for inline storage.
  pub fn field(&self, ty: &TypeDescriptor, as_ptr: bool) -> CExpr {
    let access = CExpr::ident(&self.parent).arrow(&ty.param_name);
    if as_ptr && !ty.accessible_as_pointer() { access.addr_of() } else { access }
  }

  /// Element count: the declared extent, the associated sibling field, or nothing.
  pub fn length(&self, ty: &TypeDescriptor) -> Option<CExpr> {
    if let Some(extent) = &ty.static_array {
      return Some(CExpr::ident(extent));
    }
    ty.length.as_ref().map(|assoc| self.count(assoc))
  }

  /// Read of an associated count field, dereferenced when the count is held by pointer.
  pub fn count(&self, assoc: &LengthAssociation) -> CExpr {
    let access = CExpr::ident(&self.parent).arrow(&assoc.field);
    if assoc.field_is_pointer { access.deref() } else { access }
  }

  /* Pointer-held counts must be non-null before they are read */
  fn length_guard(&self, ty: &TypeDescriptor) -> Option<CExpr> {
    let assoc = ty.length.as_ref().filter(|assoc| assoc.field_is_pointer)?;
    Some(CExpr::ident(&self.parent).arrow(&assoc.field))
  }
}

/// Source and destination accessors shared by every emitted body.
#[derive(Debug, Clone)]
pub struct EmissionContext {
  pub src: Accessor,
  pub dst: Accessor,
}

impl EmissionContext {
  pub fn new(from_var: &str, to_var: &str) -> Self {
    Self { src: Accessor::new(from_var), dst: Accessor::new(to_var) }
  }
}

#[derive(Debug, Clone)]
pub struct DeepcopyCodegen {
  pool_var: String,
  prefix: String,
  ctx: EmissionContext,
}

impl DeepcopyCodegen {
  pub fn new(input_vars: [&str; 2], pool_var: &str, prefix: &str) -> Self {
    Self {
      pool_var: pool_var.to_string(),
      prefix: prefix.to_string(),
      ctx: EmissionContext::new(input_vars[0], input_vars[1]),
    }
  }

  pub fn function_name(&self, type_name: &str) -> String {
    format!("{}{}", self.prefix, type_name)
  }

  /// Attach the rules to an output buffer for the duration of one function body.
  pub fn bind<'a>(&'a self, cgen: &'a mut CodeGen) -> DeepcopyEmitter<'a> {
    DeepcopyEmitter { rules: self, cgen }
  }

  fn pool(&self) -> CExpr {
    CExpr::ident(&self.pool_var)
  }

  fn pool_call(&self, method: &str, args: Vec<CExpr>) -> CExpr {
    CExpr::method(self.pool(), method, args)
  }

  fn cast_expr(&self, ty: &TypeDescriptor) -> String {
    make_c_type_decl(ty, false)
  }

  /* Strip const for the write side; arrays and inline values are first taken by address */
  fn make_non_const_cast_for_copy(&self, access: CExpr, ty: &TypeDescriptor) -> CExpr {
    let target = if ty.pointer_levels > 0 {
      ty.for_non_const_access()
    } else {
      ty.for_address_access().for_non_const_access()
    };
    access.cast(&self.cast_expr(&target))
  }

  fn element_sizeof(&self, ty: &TypeDescriptor) -> CExpr {
    let element = ty.for_value_access().for_non_const_access();
    if element.is_void() && element.pointer_levels == 0 {
      return CExpr::Sizeof("uint8_t".to_string());
    }
    sizeof_expr(&element)
  }

  fn make_alloc_bytes_expr(&self, len_access: Option<CExpr>, ty: &TypeDescriptor) -> CExpr {
    let sizeof = self.element_sizeof(ty);
    match len_access {
      Some(len) => len.mul(sizeof),
      None => sizeof,
    }
  }

  fn guarded(&self, access: CExpr, ty: &TypeDescriptor) -> CExpr {
    match self.ctx.src.length_guard(ty) {
      Some(guard) => access.and(guard),
      None => access,
    }
  }
}

/// Rules bound to an output buffer; implements the shape callbacks.
pub struct DeepcopyEmitter<'a> {
  rules: &'a DeepcopyCodegen,
  cgen: &'a mut CodeGen,
}

impl ShapeVisitor for DeepcopyEmitter<'_> {
  fn on_extension_chain(&mut self, ty: &TypeDescriptor) {
    let access_rhs = self.rules.ctx.dst.field(ty, true);
    debug!(member = %ty.param_name, "extension chain left unset");
    self.cgen.comment(&format!("extension chain not copied: {}", make_c_type_decl(ty, true)));
    self.cgen.stmt(&access_rhs.assign(CExpr::Null));
  }

  fn on_compound_type(&mut self, ty: &TypeDescriptor) {
    let rules = self.rules;
    let mut access_lhs = rules.ctx.src.field(ty, true);
    let mut access_rhs = rules.ctx.dst.field(ty, true);

    let len_access_lhs = rules.ctx.src.length(ty);
    let len_access_rhs = rules.ctx.dst.length(ty);

    let is_ptr = ty.pointer_levels > 0;

    if is_ptr {
      self.cgen.stmt(&access_rhs.clone().assign(CExpr::Null));
      self.cgen.begin_if(&rules.guarded(access_lhs.clone(), ty));

      let bytes = rules.make_alloc_bytes_expr(len_access_lhs.clone(), ty);
      let alloc = rules.pool_call("alloc", vec![bytes]).cast(&rules.cast_expr(&ty.for_non_const_access()));
      self.cgen.stmt(&access_rhs.clone().assign(alloc));
    }

    if let Some(len_lhs) = &len_access_lhs {
      /* only by-value counts are written back */
      let len_is_value = ty.length.as_ref().is_some_and(|assoc| !assoc.field_is_pointer);
      if is_ptr && len_is_value {
        if let Some(len_rhs) = &len_access_rhs {
          self.cgen.stmt(&len_rhs.clone().assign(len_lhs.clone()));
        }
      }

      let loop_var = CExpr::ident(LOOP_VAR);
      access_lhs = access_lhs.add(loop_var.clone());
      access_rhs = access_rhs.add(loop_var.clone());

      let init = VarDecl { ty: "uint32_t".to_string(), name: LOOP_VAR.to_string(), init: CExpr::Literal(0) };
      let cond = loop_var.clone().lt(len_lhs.clone().cast("uint32_t"));
      self.cgen.begin_for(&init, &cond, &loop_var.pre_increment());
    }

    let access_rhs_casted = rules.make_non_const_cast_for_copy(access_rhs, ty);
    self.cgen.func_call(
      None,
      &rules.function_name(&ty.type_name),
      vec![rules.pool(), access_lhs, access_rhs_casted],
    );

    if len_access_lhs.is_some() {
      self.cgen.end_for();
    }

    if is_ptr {
      self.cgen.end_if();
    }
  }

  fn on_string(&mut self, ty: &TypeDescriptor) {
    let rules = self.rules;
    let access_lhs = rules.ctx.src.field(ty, true);
    let access_rhs = rules.ctx.dst.field(ty, true);

    self.cgen.stmt(&access_rhs.clone().assign(CExpr::Null));
    self.cgen.begin_if(&access_lhs);
    self.cgen.stmt(&access_rhs.assign(rules.pool_call("strDup", vec![access_lhs.clone()])));
    self.cgen.end_if();
  }

  fn on_string_array(&mut self, ty: &TypeDescriptor, length: &LengthAssociation) {
    let rules = self.rules;
    let access_lhs = rules.ctx.src.field(ty, true);
    let access_rhs = rules.ctx.dst.field(ty, true);
    let len_access_lhs = rules.ctx.src.count(length);

    self.cgen.stmt(&access_rhs.clone().assign(CExpr::Null));
    let cond = rules.guarded(access_lhs.clone(), ty).and(len_access_lhs.clone());
    self.cgen.begin_if(&cond);
    let dup = rules
      .pool_call("strDupArray", vec![access_lhs, len_access_lhs])
      .cast(&rules.cast_expr(ty));
    self.cgen.stmt(&access_rhs.assign(dup));
    self.cgen.end_if();
  }

  fn on_static_arr(&mut self, ty: &TypeDescriptor) {
    let rules = self.rules;
    let access_lhs = rules.ctx.src.field(ty, true);
    let access_rhs = rules.ctx.dst.field(ty, true);

    let bytes = rules.make_alloc_bytes_expr(rules.ctx.src.length(ty), ty);
    self.cgen.func_call(None, "memcpy", vec![access_rhs, access_lhs, bytes]);
  }

  fn on_pointer(&mut self, ty: &TypeDescriptor) {
    let rules = self.rules;
    let access_lhs = rules.ctx.src.field(ty, true);
    let access_rhs = rules.ctx.dst.field(ty, true);

    self.cgen.stmt(&access_rhs.clone().assign(CExpr::Null));
    self.cgen.begin_if(&rules.guarded(access_lhs.clone(), ty));

    let bytes = rules.make_alloc_bytes_expr(rules.ctx.src.length(ty), ty);
    let dup = rules
      .pool_call("dupArray", vec![access_lhs, bytes])
      .cast(&rules.cast_expr(&ty.for_non_const_access()));
    self.cgen.stmt(&access_rhs.assign(dup));
    self.cgen.end_if();
  }

  fn on_value(&mut self, ty: &TypeDescriptor) {
    let access_lhs = self.rules.ctx.src.field(ty, false);
    let access_rhs = self.rules.ctx.dst.field(ty, false);
    self.cgen.stmt(&access_rhs.assign(access_lhs));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codegen::shape::iterate_type;
  use crate::model::{LengthAssociation, TypeCategory};

  fn emit(ty: &TypeDescriptor) -> String {
    let rules = DeepcopyCodegen::new(["from", "to"], "pool", "deepcopy_");
    let mut cgen = CodeGen::new();
    iterate_type(ty, &mut rules.bind(&mut cgen)).expect("shape accepted");
    cgen.into_output()
  }

  fn member(category: TypeCategory, is_const: bool, type_name: &str, levels: u8, name: &str) -> TypeDescriptor {
    TypeDescriptor::simple(category, is_const, type_name, levels, name)
  }

  fn with_len(mut ty: TypeDescriptor, field: &str, field_is_pointer: bool) -> TypeDescriptor {
    ty.length = Some(LengthAssociation { field: field.to_string(), field_is_pointer });
    ty
  }

  #[test]
  fn value_is_plain_assignment() {
    let out = emit(&member(TypeCategory::Scalar, false, "uint32_t", 0, "count"));
    assert_eq!(out, "to->count = from->count;\n");
  }

  #[test]
  fn extension_chain_is_nulled_with_marker() {
    let out = emit(&member(TypeCategory::Next, true, "void", 1, "pNext"));
    assert_eq!(out, "/* extension chain not copied: const void* pNext */\nto->pNext = nullptr;\n");
  }

  #[test]
  fn string_uses_null_then_populate() {
    let out = emit(&member(TypeCategory::String, true, "char", 1, "pName"));
    assert_eq!(
      out,
      "to->pName = nullptr;\nif (from->pName)\n{\n    to->pName = pool->strDup(from->pName);\n}\n"
    );
  }

  #[test]
  fn string_array_requires_nonzero_count() {
    let mut names = with_len(member(TypeCategory::String, true, "char", 2, "ppNames"), "nameCount", false);
    names.is_pointer_to_const_pointer = true;
    let out = emit(&names);
    assert_eq!(
      out,
      "to->ppNames = nullptr;\n\
       if (from->ppNames && from->nameCount)\n{\n    \
       to->ppNames = (const char* const*)pool->strDupArray(from->ppNames, from->nameCount);\n}\n"
    );
  }

  #[test]
  fn string_array_reads_pointer_held_count_after_guard() {
    let names = with_len(member(TypeCategory::String, true, "char", 2, "ppNames"), "pNameCount", true);
    let out = emit(&names);
    assert!(out.contains("if (from->ppNames && from->pNameCount && *from->pNameCount)\n"));
    assert!(out.contains("to->ppNames = (const char**)pool->strDupArray(from->ppNames, *from->pNameCount);"));
  }

  #[test]
  fn fixed_array_is_memcpy_of_extent() {
    let mut uuid = member(TypeCategory::Scalar, false, "uint8_t", 0, "uuid");
    uuid.static_array = Some("UUID_SIZE".to_string());
    assert_eq!(emit(&uuid), "memcpy(to->uuid, from->uuid, UUID_SIZE * sizeof(uint8_t));\n");
  }

  #[test]
  fn counted_pointer_duplicates_bytes() {
    let code = with_len(member(TypeCategory::Scalar, true, "uint32_t", 1, "pCode"), "codeSize", false);
    assert_eq!(
      emit(&code),
      "to->pCode = nullptr;\nif (from->pCode)\n{\n    \
       to->pCode = (uint32_t*)pool->dupArray(from->pCode, from->codeSize * sizeof(uint32_t));\n}\n"
    );
  }

  #[test]
  fn opaque_void_pointer_sizes_bytes() {
    let data = with_len(member(TypeCategory::Scalar, true, "void", 1, "pData"), "dataSize", false);
    assert!(emit(&data).contains("(void*)pool->dupArray(from->pData, from->dataSize * sizeof(uint8_t))"));
  }

  #[test]
  fn uncounted_pointer_copies_one_element() {
    let single = member(TypeCategory::Scalar, true, "float", 1, "pValue");
    assert!(emit(&single).contains("(float*)pool->dupArray(from->pValue, sizeof(float))"));
  }

  #[test]
  fn pointer_held_count_is_guarded_and_dereferenced() {
    let data = with_len(member(TypeCategory::Scalar, false, "uint8_t", 1, "pData"), "pDataSize", true);
    let out = emit(&data);
    assert!(out.contains("if (from->pData && from->pDataSize)\n"));
    assert!(out.contains("pool->dupArray(from->pData, *from->pDataSize * sizeof(uint8_t))"));
  }

  #[test]
  fn inline_composite_calls_nested_copy_by_address() {
    let extent = member(TypeCategory::Struct, false, "Extent", 0, "extent");
    assert_eq!(emit(&extent), "deepcopy_Extent(pool, &from->extent, (Extent*)&to->extent);\n");
  }

  #[test]
  fn composite_pointer_allocates_before_recursing() {
    let info = member(TypeCategory::Struct, true, "Info", 1, "pInfo");
    assert_eq!(
      emit(&info),
      "to->pInfo = nullptr;\nif (from->pInfo)\n{\n    \
       to->pInfo = (Info*)pool->alloc(sizeof(Info));\n    \
       deepcopy_Info(pool, from->pInfo, (Info*)to->pInfo);\n}\n"
    );
  }

  #[test]
  fn counted_composite_pointer_loops_per_element() {
    let items = with_len(member(TypeCategory::Struct, true, "Item", 1, "pItems"), "itemCount", false);
    assert_eq!(
      emit(&items),
      "to->pItems = nullptr;\n\
       if (from->pItems)\n{\n    \
       to->pItems = (Item*)pool->alloc(from->itemCount * sizeof(Item));\n    \
       to->itemCount = from->itemCount;\n    \
       for (uint32_t i = 0; i < (uint32_t)from->itemCount; ++i)\n    {\n        \
       deepcopy_Item(pool, from->pItems + i, (Item*)(to->pItems + i));\n    }\n}\n"
    );
  }

  #[test]
  fn fixed_array_of_composites_loops_over_extent() {
    let mut types = member(TypeCategory::Struct, false, "MemoryType", 0, "memoryTypes");
    types.static_array = Some("32".to_string());
    assert_eq!(
      emit(&types),
      "for (uint32_t i = 0; i < (uint32_t)32; ++i)\n{\n    \
       deepcopy_MemoryType(pool, from->memoryTypes + i, (MemoryType*)(to->memoryTypes + i));\n}\n"
    );
  }

  #[test]
  fn pointer_held_count_is_not_written_back() {
    let items = with_len(member(TypeCategory::Struct, false, "Item", 1, "pItems"), "pItemCount", true);
    let out = emit(&items);
    assert!(out.contains("if (from->pItems && from->pItemCount)\n"));
    assert!(!out.contains("*to->pItemCount ="));
    assert!(out.contains("i < (uint32_t)*from->pItemCount"));
  }
}
