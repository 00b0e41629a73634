/* Codegen command - generate deep-copy functions from registry definitions */

use super::common::load_type_info;
use crate::codegen::runtime::write_pool_header;
use crate::codegen::{DeepcopyGenerator, DeepcopyGeneratorOptions};
use anyhow::Context;
use std::path::{Path, PathBuf};

/* Execute the codegen command */
pub fn run(
  files: Vec<PathBuf>,
  output_dir: PathBuf,
  options: DeepcopyGeneratorOptions,
  emit_runtime: bool,
  verbose: bool,
) -> anyhow::Result<Vec<PathBuf>> {
  if verbose {
    println!("Deep-copy Generator - Code Generation Tool");
    println!("==========================================\n");
    println!("[~] Configuration:");
    println!("  Output directory: {}", output_dir.display());
    println!("  Basename: {}", options.basename);
    println!("  Function prefix: {}", options.prefix);
    println!("  Pool type: {}", options.pool_type);
    if let Some(ns) = &options.namespace {
      println!("  Namespace: {}", ns);
    }
    if !options.includes.is_empty() {
      println!("  Includes: {}", options.includes.len());
      for include in &options.includes {
        println!("    - {}", include);
      }
    }
    println!();
  }

  let type_info = load_type_info(&files, verbose)?;
  generate_code(&type_info, options, &output_dir, emit_runtime, verbose)
}

fn generate_code(
  type_info: &crate::model::TypeInfo,
  options: DeepcopyGeneratorOptions,
  output_dir: &Path,
  emit_runtime: bool,
  verbose: bool,
) -> anyhow::Result<Vec<PathBuf>> {
  if verbose {
    println!("\n[*] Starting deep-copy generation...");
  }

  let pool_header = options.pool_header.clone();
  let pool_type = options.pool_type.clone();
  let generator = DeepcopyGenerator::new(type_info, options);

  /* Everything is generated in memory first so a failure leaves no partial output */
  let module = generator.generate().context("Deep-copy generation failed")?;

  /* Runtime header first, so a failed write leaves no copy code behind */
  let mut written = Vec::new();
  if emit_runtime {
    written.push(
      write_pool_header(output_dir, &pool_header, &pool_type).context("Failed to write pool runtime header")?,
    );
  }

  written.extend(
    module
      .write_to(output_dir)
      .with_context(|| format!("Failed to write generated code to {}", output_dir.display()))?,
  );

  if verbose {
    println!("[✓] Generated {} deep-copy function(s):", module.functions.len());
    for name in &module.functions {
      println!("    - {}", name);
    }
    println!("[✓] Wrote:");
    for path in &written {
      println!("    - {}", path.display());
    }
  }

  Ok(written)
}
