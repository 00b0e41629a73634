/* Deep-copy generation pass: model + options in, header/implementation text out */

use crate::codegen::cgen::CodeGen;
use crate::codegen::deepcopy::DeepcopyCodegen;
use crate::codegen::module::{GeneratedModule, Module};
use crate::codegen::shape::iterate_type;
use crate::error::{GenError, GenResult};
use crate::model::{FunctionSignature, StructInfo, TypeCategory, TypeDescriptor, TypeInfo};
use indexmap::IndexSet;
use tracing::{debug, info};

pub const DEFAULT_POOL_HEADER: &str = "deepcopy_pool.h";

#[derive(Debug, Clone)]
pub struct DeepcopyGeneratorOptions {
  pub prefix: String,
  pub pool_type: String,
  pub pool_var: String,
  pub from_var: String,
  pub to_var: String,
  pub namespace: Option<String>,
  /// Extra includes for the header; bare names are quoted, `<...>` is kept as written.
  pub includes: Vec<String>,
  pub pool_header: String,
  pub basename: String,
  /// Types to start from. Empty means every struct and union in the model.
  pub roots: Vec<String>,
}

impl Default for DeepcopyGeneratorOptions {
  fn default() -> Self {
    Self {
      prefix: "deepcopy_".to_string(),
      pool_type: "Pool".to_string(),
      pool_var: "pool".to_string(),
      from_var: "from".to_string(),
      to_var: "to".to_string(),
      namespace: None,
      includes: Vec::new(),
      pool_header: DEFAULT_POOL_HEADER.to_string(),
      basename: "deepcopy".to_string(),
      roots: Vec::new(),
    }
  }
}

pub struct DeepcopyGenerator<'a> {
  type_info: &'a TypeInfo,
  options: DeepcopyGeneratorOptions,
  rules: DeepcopyCodegen,
}

impl<'a> DeepcopyGenerator<'a> {
  pub fn new(type_info: &'a TypeInfo, options: DeepcopyGeneratorOptions) -> Self {
    let rules = DeepcopyCodegen::new(
      [options.from_var.as_str(), options.to_var.as_str()],
      &options.pool_var,
      &options.prefix,
    );
    Self { type_info, options, rules }
  }

  /// Composite type names in emission order: dependencies before dependents, declaration order otherwise.
  pub fn emission_order(&self) -> GenResult<Vec<String>> {
    let roots: Vec<String> = if self.options.roots.is_empty() {
      self
        .type_info
        .type_names()
        .filter(|name| self.type_info.struct_info(name).is_some())
        .map(str::to_string)
        .collect()
    } else {
      let mut resolved = Vec::with_capacity(self.options.roots.len());
      for root in &self.options.roots {
        let canonical = self.type_info.resolve_alias(root)?;
        if self.type_info.struct_info(canonical).is_none() {
          return Err(GenError::NotComposite { type_name: root.clone() });
        }
        resolved.push(canonical.to_string());
      }
      resolved
    };

    let mut visited: IndexSet<String> = IndexSet::new();
    let mut order = Vec::new();
    for root in &roots {
      self.visit(root, &mut visited, &mut order);
    }
    Ok(order)
  }

  /* Mark before descending so recursive pointers terminate */
  fn visit(&self, name: &str, visited: &mut IndexSet<String>, order: &mut Vec<String>) {
    if !visited.insert(name.to_string()) {
      return;
    }
    if let Some(info) = self.type_info.struct_info(name) {
      for member in info.members.iter().filter(|member| member.is_composite()) {
        self.visit(&member.type_name, visited, order);
      }
      order.push(name.to_string());
    }
  }

  pub fn signature(&self, info: &StructInfo) -> FunctionSignature {
    let category = if info.is_union { TypeCategory::Union } else { TypeCategory::Struct };
    let target = TypeDescriptor::simple(category, false, &info.name, 1, &self.options.to_var);
    FunctionSignature {
      name: self.rules.function_name(&info.name),
      return_type: TypeDescriptor::simple(TypeCategory::Scalar, false, "void", 0, ""),
      params: vec![
        TypeDescriptor::simple(TypeCategory::Scalar, false, &self.options.pool_type, 1, &self.options.pool_var),
        TypeDescriptor { is_const: true, ..target.with_param_name(&self.options.from_var) },
        target,
      ],
    }
  }

  /* Members are emitted in declaration order; the first rejected member aborts the function */
  fn emit_function(&self, cgen: &CodeGen, info: &StructInfo) -> GenResult<(String, String)> {
    let signature = self.signature(info);
    let mut decl = String::new();
    if let Some(comment) = &info.comment {
      decl.push_str(&format!("/* {} */\n", comment));
    }
    decl.push_str(&cgen.make_func_decl(&signature));
    let definition = cgen.make_func_impl(&signature, |body| {
      let mut emitter = self.rules.bind(body);
      for member in &info.members {
        iterate_type(member, &mut emitter).map_err(|source| GenError::Dispatch {
          owner: info.name.clone(),
          member: member.param_name.clone(),
          source,
        })?;
      }
      Ok(())
    })?;
    debug!(function = %signature.name, members = info.members.len(), "emitted deep copy");
    Ok((decl, definition))
  }

  pub fn generate(&self) -> GenResult<GeneratedModule> {
    let order = self.emission_order()?;
    let cgen = CodeGen::new();
    let mut module = Module::new(&self.options);

    for name in &order {
      let info = self
        .type_info
        .struct_info(name)
        .ok_or_else(|| GenError::NotComposite { type_name: name.clone() })?;
      let (decl, definition) = self.emit_function(&cgen, info)?;
      module.append_header(&decl);
      module.append_impl(&definition);
      module.record_function(self.rules.function_name(name));
    }

    let generated = module.finish();
    info!(
      functions = generated.functions.len(),
      registries = self.type_info.registry_names().len(),
      "generated deep copy module"
    );
    Ok(generated)
  }
}
