/* Indented C/C++ text emitter */

use crate::codegen::expr::CExpr;
use crate::model::{FunctionSignature, TypeDescriptor};
use std::fmt::Write;

const INDENT_WIDTH: usize = 4;

/* Loop variable declaration for `for` headers */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
  pub ty: String,
  pub name: String,
  pub init: CExpr,
}

#[derive(Debug, Default)]
pub struct CodeGen {
  out: String,
  indent: usize,
}

impl CodeGen {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn into_output(self) -> String {
    self.out
  }

  pub fn output(&self) -> &str {
    &self.out
  }

  pub fn line(&mut self, text: &str) {
    for _ in 0..self.indent * INDENT_WIDTH {
      self.out.push(' ');
    }
    self.out.push_str(text);
    self.out.push('\n');
  }

  pub fn comment(&mut self, text: &str) {
    self.line(&format!("/* {} */", text));
  }

  pub fn stmt(&mut self, expr: &CExpr) {
    self.line(&format!("{};", expr));
  }

  fn begin_block(&mut self, header: &str) {
    self.line(header);
    self.line("{");
    self.indent += 1;
  }

  fn end_block(&mut self) {
    self.indent = self.indent.saturating_sub(1);
    self.line("}");
  }

  pub fn begin_if(&mut self, cond: &CExpr) {
    self.begin_block(&format!("if ({})", cond));
  }

  pub fn end_if(&mut self) {
    self.end_block();
  }

  pub fn begin_for(&mut self, init: &VarDecl, cond: &CExpr, incr: &CExpr) {
    self.begin_block(&format!(
      "for ({} {} = {}; {}; {})",
      init.ty, init.name, init.init, cond, incr
    ));
  }

  pub fn end_for(&mut self) {
    self.end_block();
  }

  /// Emit `name(args);`, or `lhs = name(args);` when a result target is given.
  pub fn func_call(&mut self, lhs: Option<&CExpr>, name: &str, args: Vec<CExpr>) {
    let call = CExpr::ident(name).call(args);
    match lhs {
      Some(target) => self.stmt(&target.clone().assign(call)),
      None => self.stmt(&call),
    }
  }

  pub fn make_c_type_decl(&self, ty: &TypeDescriptor, use_param_name: bool) -> String {
    make_c_type_decl(ty, use_param_name)
  }

  pub fn make_func_decl(&self, signature: &FunctionSignature) -> String {
    format!("{};\n\n", format_prototype(signature))
  }

  /* Emit a full definition; the body callback writes into a nested, indented emitter */
  pub fn make_func_impl<E, F>(&self, signature: &FunctionSignature, body: F) -> Result<String, E>
  where
    F: FnOnce(&mut CodeGen) -> Result<(), E>,
  {
    let mut inner = CodeGen { out: String::new(), indent: 1 };
    body(&mut inner)?;

    let mut output = format_prototype(signature);
    output.push_str("\n{\n");
    output.push_str(&inner.out);
    output.push_str("}\n\n");
    Ok(output)
  }
}

pub fn make_c_type_decl(ty: &TypeDescriptor, use_param_name: bool) -> String {
  let mut decl = String::new();
  if ty.is_const {
    decl.push_str("const ");
  }
  decl.push_str(&ty.type_name);
  for level in 1..=ty.pointer_levels {
    if level == 2 && ty.is_pointer_to_const_pointer {
      decl.push_str(" const*");
    } else {
      decl.push('*');
    }
  }
  if use_param_name && !ty.param_name.is_empty() {
    write!(decl, " {}", ty.param_name).unwrap();
  }
  if let Some(extent) = &ty.static_array {
    write!(decl, "[{}]", extent).unwrap();
  }
  decl
}

pub fn sizeof_expr(ty: &TypeDescriptor) -> CExpr {
  CExpr::Sizeof(make_c_type_decl(ty, false))
}

fn format_prototype(signature: &FunctionSignature) -> String {
  let mut output = format!("{} {}(", make_c_type_decl(&signature.return_type, false), signature.name);
  for (i, param) in signature.params.iter().enumerate() {
    output.push_str(if i == 0 { "\n" } else { ",\n" });
    for _ in 0..INDENT_WIDTH {
      output.push(' ');
    }
    output.push_str(&make_c_type_decl(param, true));
  }
  output.push(')');
  output
}
