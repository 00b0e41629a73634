/* Analyze command - type model and per-member dispatch report */

use super::common::load_type_info;
use crate::codegen::cgen::make_c_type_decl;
use crate::codegen::shape::{Shape, classify};
use crate::model::{Category, TypeInfo};
use anyhow::Context;
use serde_derive::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemberReport {
  pub name: String,
  pub decl: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub shape: Option<Shape>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub length: Option<String>,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub null_terminated: bool,
  /* Rejected members carry the error text instead of a shape */
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TypeReport {
  pub name: String,
  pub category: Category,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alias_of: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub members: Vec<MemberReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandReport {
  pub name: String,
  pub return_type: String,
  pub params: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
  pub registries: Vec<String>,
  pub types: Vec<TypeReport>,
  pub commands: Vec<CommandReport>,
}

impl AnalysisReport {
  pub fn rejected_members(&self) -> usize {
    self
      .types
      .iter()
      .flat_map(|t| &t.members)
      .filter(|m| m.error.is_some())
      .count()
  }
}

pub fn build_report(type_info: &TypeInfo) -> AnalysisReport {
  let mut types = Vec::new();
  for name in type_info.type_names() {
    let Some(category) = type_info.category_of(name) else {
      continue;
    };
    let alias_of = match category {
      Category::Alias => type_info.resolve_alias(name).ok().map(str::to_string),
      _ => None,
    };
    let members = type_info
      .struct_info(name)
      .map(|info| {
        info
          .members
          .iter()
          .map(|member| {
            let (shape, error) = match classify(member) {
              Ok(shape) => (Some(shape), None),
              Err(err) => (None, Some(err.to_string())),
            };
            MemberReport {
              name: member.param_name.clone(),
              decl: make_c_type_decl(member, true),
              shape,
              length: member.length.as_ref().map(|assoc| assoc.field.clone()),
              null_terminated: member.null_terminated,
              error,
            }
          })
          .collect()
      })
      .unwrap_or_default();
    types.push(TypeReport { name: name.to_string(), category, alias_of, members });
  }

  let commands = type_info
    .commands()
    .map(|command| CommandReport {
      name: command.signature.name.clone(),
      return_type: make_c_type_decl(&command.signature.return_type, false),
      params: command.signature.params.iter().map(|p| make_c_type_decl(p, true)).collect(),
      alias: command.alias.clone(),
    })
    .collect();

  AnalysisReport {
    registries: type_info.registry_names().to_vec(),
    types,
    commands,
  }
}

/* Execute the analyze command */
pub fn run(files: Vec<PathBuf>, json: bool) -> anyhow::Result<AnalysisReport> {
  if !json {
    println!("Deep-copy Generator - Type Analysis Tool");
    println!("========================================\n");
  }

  let type_info = load_type_info(&files, !json)?;
  let report = build_report(&type_info);

  if json {
    let text = serde_json::to_string_pretty(&report).context("Failed to serialize analysis report")?;
    println!("{}", text);
  } else {
    print_report(&report);
  }

  Ok(report)
}

fn print_report(report: &AnalysisReport) {
  println!("\n[~] Type Analysis:");
  println!("=================");
  for ty in &report.types {
    match &ty.alias_of {
      Some(target) => println!("\n{} (alias -> {})", ty.name, target),
      None => println!("\n{} ({:?})", ty.name, ty.category),
    }
    for member in &ty.members {
      match (&member.shape, &member.error) {
        (Some(shape), _) => {
          let length = member.length.as_deref().map(|l| format!(" [len: {}]", l)).unwrap_or_default();
          let terminated = if member.null_terminated { " [null-terminated]" } else { "" };
          println!("  {:<40} {}{}{}", member.decl, shape, length, terminated);
        }
        (None, Some(err)) => println!("  {:<40} [!] {}", member.decl, err),
        (None, None) => println!("  {}", member.decl),
      }
    }
  }

  if !report.commands.is_empty() {
    println!("\n[~] Commands:");
    for command in &report.commands {
      let alias = command.alias.as_deref().map(|a| format!(" (alias of {})", a)).unwrap_or_default();
      println!("  {} {}({}){}", command.return_type, command.name, command.params.join(", "), alias);
    }
  }

  let rejected = report.rejected_members();
  if rejected == 0 {
    println!("\n[✓] Every member has a supported shape");
  } else {
    println!("\n[✗] {} member(s) cannot be deep-copied", rejected);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::parse_registry;
  use std::path::Path;

  const REGISTRY: &str = r#"
registry:
  name: "report"
types:
  - name: "Mixed"
    kind:
      struct:
        members:
          - name: "pNext"
            type: "void"
            pointer: 1
            const: true
          - name: "count"
            type: "uint32_t"
          - name: "pValues"
            type: "float"
            pointer: 1
            const: true
            len: "count"
          - name: "ppMatrix"
            type: "float"
            pointer: 2
          - name: "pLabel"
            type: "char"
            pointer: 1
            const: true
            len: "null-terminated"
  - name: "MixedAlias"
    kind:
      alias: "Mixed"
commands:
  - name: "useMixed"
    params:
      - name: "pMixed"
        type: "MixedAlias"
        pointer: 1
        const: true
"#;

  fn report() -> AnalysisReport {
    let file = parse_registry(REGISTRY, Path::new("report.yaml")).expect("parses");
    build_report(&TypeInfo::from_registry(&file).expect("resolves"))
  }

  #[test]
  fn reports_shapes_and_rejections_per_member() {
    let report = report();
    let mixed = &report.types[0];
    let shapes: Vec<_> = mixed.members.iter().map(|m| m.shape).collect();
    assert_eq!(
      shapes,
      [Some(Shape::ExtensionChain), Some(Shape::Value), Some(Shape::Pointer), None, Some(Shape::String)]
    );
    assert_eq!(mixed.members[2].length.as_deref(), Some("count"));
    assert!(mixed.members[3].error.as_deref().is_some_and(|e| e.contains("float** ppMatrix")));
    assert_eq!(report.rejected_members(), 1);
  }

  #[test]
  fn aliases_and_commands_are_listed() {
    let report = report();
    assert_eq!(report.types[1].alias_of.as_deref(), Some("Mixed"));
    assert_eq!(report.commands[0].return_type, "void");
    assert_eq!(report.commands[0].params, ["const Mixed* pMixed"]);
  }

  #[test]
  fn json_uses_kebab_case_shapes() {
    let json = serde_json::to_value(report()).expect("serializes");
    assert_eq!(json["types"][0]["members"][0]["shape"], "extension-chain");
    assert_eq!(json["types"][0]["category"], "struct");
    assert!(json["types"][0]["members"][3].get("shape").is_none());
  }

  #[test]
  fn null_terminated_members_are_flagged() {
    let report = report();
    let flagged: Vec<_> = report.types[0].members.iter().map(|m| m.null_terminated).collect();
    assert_eq!(flagged, [false, false, false, false, true]);

    let json = serde_json::to_value(&report).expect("serializes");
    assert_eq!(json["types"][0]["members"][4]["null-terminated"], true);
    assert!(json["types"][0]["members"][2].get("null-terminated").is_none());
  }
}
