use crate::error::{GenError, GenResult};
use crate::model::descriptor::{
  FunctionSignature, LengthAssociation, NEXT_POINTER_NAME, TypeCategory, TypeDescriptor,
};
use indexmap::IndexMap;
use registry_types::{CommandDef, Member, RegistryFile, TypeDef, TypeKind};
use serde_derive::Serialize;
use tracing::debug;

/// C types every registry may reference without declaring them.
pub const BUILTIN_TYPES: &[&str] = &[
  "void", "char", "bool", "float", "double", "int", "unsigned", "size_t", "int8_t", "int16_t",
  "int32_t", "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  Builtin,
  Struct,
  Union,
  Alias,
  Basetype,
  Enum,
  Bitmask,
  Handle,
  Funcpointer,
}

/// Ordered members of one struct or union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructInfo {
  pub name: String,
  pub is_union: bool,
  pub comment: Option<String>,
  pub members: Vec<TypeDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInfo {
  pub signature: FunctionSignature,
  pub alias: Option<String>,
}

#[derive(Debug, Clone)]
enum TypeEntry {
  Alias { target: String },
  Composite(StructInfo),
  Opaque(Category),
}

/// Resolved, read-only view of one or more registry documents.
#[derive(Debug, Clone)]
pub struct TypeInfo {
  registry_names: Vec<String>,
  types: IndexMap<String, TypeEntry>,
  commands: IndexMap<String, CommandInfo>,
}

impl TypeInfo {
  pub fn from_registry(file: &RegistryFile) -> GenResult<Self> {
    Self::from_registries(std::slice::from_ref(file))
  }

  pub fn from_registries(files: &[RegistryFile]) -> GenResult<Self> {
    /* Pass 1: index declarations so member resolution can see forward references */
    let mut declared: IndexMap<String, &TypeDef> = IndexMap::new();
    for file in files {
      for typedef in &file.types {
        if let Some(comment) = &typedef.comment {
          if comment.contains("*/") {
            return Err(GenError::InvalidComment { type_name: typedef.name.clone() });
          }
        }
        if BUILTIN_TYPES.contains(&typedef.name.as_str())
          || declared.insert(typedef.name.clone(), typedef).is_some()
        {
          return Err(GenError::DuplicateType { name: typedef.name.clone() });
        }
      }
    }

    let mut info = TypeInfo {
      registry_names: files.iter().map(|f| f.registry.name.clone()).collect(),
      types: IndexMap::with_capacity(declared.len()),
      commands: IndexMap::new(),
    };

    for (name, typedef) in &declared {
      let entry = match &typedef.kind {
        TypeKind::Alias(target) => TypeEntry::Alias { target: target.clone() },
        TypeKind::Struct(_) | TypeKind::Union(_) => TypeEntry::Composite(StructInfo {
          name: name.clone(),
          is_union: matches!(typedef.kind, TypeKind::Union(_)),
          comment: typedef.comment.clone(),
          members: Vec::new(),
        }),
        TypeKind::Basetype => TypeEntry::Opaque(Category::Basetype),
        TypeKind::Enum => TypeEntry::Opaque(Category::Enum),
        TypeKind::Bitmask => TypeEntry::Opaque(Category::Bitmask),
        TypeKind::Handle => TypeEntry::Opaque(Category::Handle),
        TypeKind::Funcpointer => TypeEntry::Opaque(Category::Funcpointer),
      };
      info.types.insert(name.clone(), entry);
    }

    /* Pass 2: every alias must land on a defined type without cycling */
    for name in declared.keys() {
      if info.is_alias(name) {
        info.resolve_alias(name)?;
      }
    }

    /* Pass 3: member descriptors */
    for (name, typedef) in &declared {
      let members = match &typedef.kind {
        TypeKind::Struct(s) | TypeKind::Union(s) => &s.members,
        _ => continue,
      };
      let descriptors = members
        .iter()
        .map(|member| info.make_descriptor(name, member, members))
        .collect::<GenResult<Vec<_>>>()?;
      if let Some(TypeEntry::Composite(struct_info)) = info.types.get_mut(name.as_str()) {
        struct_info.members = descriptors;
      }
    }

    for file in files {
      for command in &file.commands {
        let resolved = info.make_command(command)?;
        if info.commands.insert(command.name.clone(), resolved).is_some() {
          return Err(GenError::DuplicateCommand { name: command.name.clone() });
        }
      }
    }

    debug!(
      types = info.types.len(),
      commands = info.commands.len(),
      "resolved type model"
    );
    Ok(info)
  }

  pub fn registry_names(&self) -> &[String] {
    &self.registry_names
  }

  /// Declared type names in registry order.
  pub fn type_names(&self) -> impl Iterator<Item = &str> {
    self.types.keys().map(String::as_str)
  }

  pub fn category_of(&self, name: &str) -> Option<Category> {
    if BUILTIN_TYPES.contains(&name) {
      return Some(Category::Builtin);
    }
    self.types.get(name).map(|entry| match entry {
      TypeEntry::Alias { .. } => Category::Alias,
      TypeEntry::Composite(info) if info.is_union => Category::Union,
      TypeEntry::Composite(_) => Category::Struct,
      TypeEntry::Opaque(category) => *category,
    })
  }

  pub fn is_alias(&self, name: &str) -> bool {
    matches!(self.types.get(name), Some(TypeEntry::Alias { .. }))
  }

  /// Follow alias links to the canonical definition.
  pub fn resolve_alias<'a>(&'a self, name: &'a str) -> GenResult<&'a str> {
    let mut chain = vec![name.to_string()];
    let mut current = name;
    while let Some(TypeEntry::Alias { target }) = self.types.get(current) {
      if chain.iter().any(|seen| seen == target) {
        chain.push(target.clone());
        return Err(GenError::AliasCycle { chain });
      }
      chain.push(target.clone());
      current = target.as_str();
    }
    if self.category_of(current).is_none() {
      return Err(GenError::UnknownType {
        owner: name.to_string(),
        type_name: current.to_string(),
      });
    }
    Ok(current)
  }

  pub fn struct_info(&self, name: &str) -> Option<&StructInfo> {
    match self.types.get(name) {
      Some(TypeEntry::Composite(info)) => Some(info),
      _ => None,
    }
  }

  pub fn commands(&self) -> impl Iterator<Item = &CommandInfo> {
    self.commands.values()
  }


  fn canonical_for(&self, owner: &str, type_name: &str) -> GenResult<(String, Category)> {
    if self.category_of(type_name).is_none() {
      return Err(GenError::UnknownType {
        owner: owner.to_string(),
        type_name: type_name.to_string(),
      });
    }
    let canonical = self.resolve_alias(type_name)?;
    let category = self.category_of(canonical).unwrap_or(Category::Builtin);
    Ok((canonical.to_string(), category))
  }

  fn make_descriptor(
    &self,
    owner: &str,
    member: &Member,
    siblings: &[Member],
  ) -> GenResult<TypeDescriptor> {
    let invalid = |reason: &'static str| GenError::InvalidMember {
      owner: owner.to_string(),
      member: member.name.clone(),
      reason,
    };

    let (type_name, category) = self.canonical_for(owner, &member.type_name)?;

    let mut descriptor_category = match category {
      Category::Struct => TypeCategory::Struct,
      Category::Union => TypeCategory::Union,
      Category::Builtin if type_name == "char" => TypeCategory::String,
      _ => TypeCategory::Scalar,
    };

    if member.extension_chain && member.pointer == 0 {
      return Err(invalid("extension-chain member must be a pointer"));
    }
    if member.pointer > 0 && (member.extension_chain || member.name == NEXT_POINTER_NAME) {
      descriptor_category = TypeCategory::Next;
    }

    if member.const_pointer && member.pointer < 2 {
      return Err(invalid("const-pointer requires at least two levels of indirection"));
    }

    let len_spec = member.len_spec();
    let length = match len_spec.as_ref().and_then(|spec| spec.count_field.as_ref()) {
      None => None,
      Some(field) => {
        if member.pointer == 0 && member.array.is_none() {
          return Err(invalid("length association on a member that is neither pointer nor array"));
        }
        let sibling = siblings.iter().find(|s| &s.name == field).ok_or_else(|| {
          GenError::UnknownLengthField {
            owner: owner.to_string(),
            member: member.name.clone(),
            field: field.clone(),
          }
        })?;
        Some(LengthAssociation {
          field: field.clone(),
          field_is_pointer: sibling.pointer > 0,
        })
      }
    };

    Ok(TypeDescriptor {
      type_name,
      category: descriptor_category,
      param_name: member.name.clone(),
      pointer_levels: member.pointer,
      is_const: member.is_const,
      is_pointer_to_const_pointer: member.const_pointer,
      static_array: member.array.as_ref().map(|extent| extent.to_c_string()),
      length,
      null_terminated: len_spec.map(|spec| spec.null_terminated).unwrap_or(false),
    })
  }

  fn make_command(&self, command: &CommandDef) -> GenResult<CommandInfo> {
    let (return_name, return_category) = self.canonical_for(&command.name, &command.return_type)?;
    let return_category = match return_category {
      Category::Struct => TypeCategory::Struct,
      Category::Union => TypeCategory::Union,
      _ => TypeCategory::Scalar,
    };
    let params = command
      .params
      .iter()
      .map(|param| self.make_descriptor(&command.name, param, &command.params))
      .collect::<GenResult<Vec<_>>>()?;

    Ok(CommandInfo {
      signature: FunctionSignature {
        name: command.name.clone(),
        return_type: TypeDescriptor::simple(return_category, false, &return_name, 0, ""),
        params,
      },
      alias: command.alias.clone(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::loader::parse_registry;
  use std::path::Path;

  fn model(yaml: &str) -> GenResult<TypeInfo> {
    let file = parse_registry(yaml, Path::new("inline.yaml"))?;
    TypeInfo::from_registry(&file)
  }

  const SAMPLE: &str = r#"
registry:
  name: "sample"
types:
  - name: "Outer"
    kind:
      struct:
        members:
          - name: "pNext"
            type: "void"
            pointer: 1
            const: true
          - name: "innerCount"
            type: "uint32_t"
          - name: "pInners"
            type: "InnerKHR"
            pointer: 1
            const: true
            len: "innerCount"
          - name: "pLabel"
            type: "char"
            pointer: 1
            const: true
            len: "null-terminated"
  - name: "InnerKHR"
    kind:
      alias: "Inner"
  - name: "Inner"
    kind:
      union:
        members:
          - name: "asInt"
            type: "int32_t"
          - name: "asFloat"
            type: "float"
  - name: "Handle"
    kind: handle
commands:
  - name: "consume"
    return-type: "Handle"
    params:
      - name: "pOuter"
        type: "Outer"
        pointer: 1
        const: true
"#;

  #[test]
  fn resolves_categories_and_aliases() {
    let info = model(SAMPLE).expect("model builds");
    assert_eq!(info.category_of("Outer"), Some(Category::Struct));
    assert_eq!(info.category_of("Inner"), Some(Category::Union));
    assert_eq!(info.category_of("InnerKHR"), Some(Category::Alias));
    assert_eq!(info.category_of("uint32_t"), Some(Category::Builtin));
    assert_eq!(info.category_of("Missing"), None);
    assert_eq!(info.resolve_alias("InnerKHR").expect("alias"), "Inner");
  }

  #[test]
  fn builds_member_descriptors() {
    let info = model(SAMPLE).expect("model builds");
    let outer = info.struct_info("Outer").expect("struct info");
    let names: Vec<_> = outer.members.iter().map(|m| m.param_name.as_str()).collect();
    assert_eq!(names, ["pNext", "innerCount", "pInners", "pLabel"]);

    assert_eq!(outer.members[0].category, TypeCategory::Next);

    let inners = &outer.members[2];
    assert_eq!(inners.type_name, "Inner");
    assert_eq!(inners.category, TypeCategory::Union);
    assert_eq!(
      inners.length,
      Some(LengthAssociation { field: "innerCount".to_string(), field_is_pointer: false })
    );

    let label = &outer.members[3];
    assert_eq!(label.category, TypeCategory::String);
    assert!(label.null_terminated);
    assert_eq!(label.length, None);
  }

  #[test]
  fn preserves_declaration_order() {
    let info = model(SAMPLE).expect("model builds");
    let names: Vec<_> = info.type_names().collect();
    assert_eq!(names, ["Outer", "InnerKHR", "Inner", "Handle"]);
  }

  #[test]
  fn resolves_commands() {
    let info = model(SAMPLE).expect("model builds");
    let command = info.commands().find(|c| c.signature.name == "consume").expect("command");
    assert_eq!(command.signature.return_type.type_name, "Handle");
    assert_eq!(command.signature.params[0].category, TypeCategory::Struct);
  }

  #[test]
  fn unknown_member_type_is_fatal() {
    let err = model(
      r#"
registry:
  name: "bad"
types:
  - name: "Holder"
    kind:
      struct:
        members:
          - name: "value"
            type: "Nowhere"
"#,
    )
    .unwrap_err();
    match err {
      GenError::UnknownType { owner, type_name } => {
        assert_eq!(owner, "Holder");
        assert_eq!(type_name, "Nowhere");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn unknown_length_field_is_fatal() {
    let err = model(
      r#"
registry:
  name: "bad"
types:
  - name: "Holder"
    kind:
      struct:
        members:
          - name: "pData"
            type: "uint8_t"
            pointer: 1
            len: "dataSize"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, GenError::UnknownLengthField { ref field, .. } if field == "dataSize"));
  }

  #[test]
  fn alias_cycle_is_fatal() {
    let err = model(
      r#"
registry:
  name: "bad"
types:
  - name: "A"
    kind:
      alias: "B"
  - name: "B"
    kind:
      alias: "A"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, GenError::AliasCycle { .. }));
  }

  #[test]
  fn duplicate_definition_is_fatal() {
    let err = model(
      r#"
registry:
  name: "bad"
types:
  - name: "A"
    kind: enum
  - name: "A"
    kind: handle
"#,
    )
    .unwrap_err();
    assert!(matches!(err, GenError::DuplicateType { ref name } if name == "A"));
  }

  #[test]
  fn comment_terminator_is_rejected() {
    let err = model(
      r#"
registry:
  name: "bad"
types:
  - name: "A"
    comment: "ends early */"
    kind: enum
"#,
    )
    .unwrap_err();
    assert!(matches!(err, GenError::InvalidComment { .. }));
  }
}
