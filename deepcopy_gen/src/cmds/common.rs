/* Common utilities shared between analyze and codegen commands */

use crate::model::{TypeInfo, load_registry_files};
use anyhow::Context;
use std::path::PathBuf;

/* Load every registry file and build the resolved type model */
pub fn load_type_info(files: &[PathBuf], verbose: bool) -> anyhow::Result<TypeInfo> {
  if verbose {
    println!("[~] Loading {} registry file(s)...", files.len());
    for file in files {
      println!("    - {}", file.display());
    }
  }

  let registries = load_registry_files(files).context("Failed to load registry files")?;

  if verbose {
    let type_count: usize = registries.iter().map(|r| r.types.len()).sum();
    let command_count: usize = registries.iter().map(|r| r.commands.len()).sum();
    println!("[~] Loaded {} type definition(s), {} command(s)", type_count, command_count);
    for registry in &registries {
      for typedef in &registry.types {
        println!("  - {} ({})", typedef.name, typedef.kind.category_name());
      }
    }
    println!();
    println!("[~] Resolving type model...");
  }

  let type_info = TypeInfo::from_registries(&registries).context("Type resolution failed")?;

  if verbose {
    println!("[✓] Type resolution successful");
  }

  Ok(type_info)
}
