/* Header/implementation assembly and output files */

use crate::codegen::generator::DeepcopyGeneratorOptions;
use crate::error::{GenError, GenResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Accumulates declarations and definitions for one generated translation unit.
#[derive(Debug)]
pub struct Module {
  basename: String,
  header_prelude: String,
  impl_prelude: String,
  namespace: Option<String>,
  decls: String,
  defs: String,
  functions: Vec<String>,
}

fn include_line(include: &str) -> String {
  if include.starts_with('<') || include.starts_with('"') {
    format!("#include {}\n", include)
  } else {
    format!("#include \"{}\"\n", include)
  }
}

impl Module {
  pub fn new(options: &DeepcopyGeneratorOptions) -> Self {
    let mut header_prelude = String::from("#pragma once\n\n");
    header_prelude.push_str(&include_line(&options.pool_header));
    for include in &options.includes {
      header_prelude.push_str(&include_line(include));
    }
    header_prelude.push('\n');

    let mut impl_prelude = include_line(&format!("{}.h", options.basename));
    impl_prelude.push('\n');
    impl_prelude.push_str("#include <stdint.h>\n");
    impl_prelude.push_str("#include <string.h>\n\n");

    Self {
      basename: options.basename.clone(),
      header_prelude,
      impl_prelude,
      namespace: options.namespace.clone(),
      decls: String::new(),
      defs: String::new(),
      functions: Vec::new(),
    }
  }

  pub fn append_header(&mut self, text: &str) {
    self.decls.push_str(text);
  }

  pub fn append_impl(&mut self, text: &str) {
    self.defs.push_str(text);
  }

  pub fn record_function(&mut self, name: String) {
    self.functions.push(name);
  }

  fn wrap_namespace(&self, prelude: &str, body: &str) -> String {
    let mut out = String::from(prelude);
    match &self.namespace {
      Some(ns) => {
        out.push_str(&format!("namespace {} {{\n\n", ns));
        out.push_str(body);
        out.push_str(&format!("}} /* namespace {} */\n", ns));
      }
      None => out.push_str(body),
    }
    out
  }

  pub fn finish(self) -> GeneratedModule {
    GeneratedModule {
      header: self.wrap_namespace(&self.header_prelude, &self.decls),
      implementation: self.wrap_namespace(&self.impl_prelude, &self.defs),
      basename: self.basename,
      functions: self.functions,
    }
  }
}

/// Complete generator output, held in memory until written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
  pub basename: String,
  pub header: String,
  pub implementation: String,
  /// Emitted function names in emission order.
  pub functions: Vec<String>,
}

impl GeneratedModule {
  pub fn header_file_name(&self) -> String {
    format!("{}.h", self.basename)
  }

  pub fn impl_file_name(&self) -> String {
    format!("{}.cpp", self.basename)
  }

  /// Write `<basename>.h` and `<basename>.cpp` into `dir`, creating it if needed.
  pub fn write_to(&self, dir: &Path) -> GenResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| GenError::Write { path: dir.to_path_buf(), source })?;
    let files = [
      (dir.join(self.header_file_name()), &self.header),
      (dir.join(self.impl_file_name()), &self.implementation),
    ];
    let mut written = Vec::with_capacity(files.len());
    for (path, contents) in files {
      fs::write(&path, contents).map_err(|source| GenError::Write { path: path.clone(), source })?;
      written.push(path);
    }
    Ok(written)
  }
}
