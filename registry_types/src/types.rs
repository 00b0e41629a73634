use serde_derive::{Deserialize, Serialize};

/// Reserved `len` component marking a character sequence terminated by NUL.
pub const NULL_TERMINATED: &str = "null-terminated";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Top-level registry document.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryFile {
    pub registry: RegistryMetadata,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub commands: Vec<CommandDef>,
}

/* Declared extent of a fixed-size array: a literal count or a named constant */
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(untagged)]
#[serde(expecting = "expected an integer extent or a constant name")]
pub enum ArrayExtent {
    Count(u64),
    Constant(String),
}

impl ArrayExtent {
    pub fn to_c_string(&self) -> String {
        match self {
            ArrayExtent::Count(n) => n.to_string(),
            ArrayExtent::Constant(name) => name.clone(),
        }
    }
}

/// One member of a struct or union, or one parameter of a command.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Member {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Pointer indirection levels (0 = value, 1 = pointer, 2 = pointer-to-pointer).
    #[serde(default)]
    pub pointer: u8,
    /// The pointee (or the value itself at depth 0) is const-qualified.
    #[serde(default, rename = "const")]
    pub is_const: bool,
    /// At depth 2, the intermediate pointer is const as well (`const T* const*`).
    #[serde(default)]
    pub const_pointer: bool,
    #[serde(default)]
    pub array: Option<ArrayExtent>,
    #[serde(default)]
    pub len: Option<String>,
    /// Marks a forward/extension link in addition to the `pNext` naming convention.
    #[serde(default)]
    pub extension_chain: bool,
}

impl Member {
    pub fn len_spec(&self) -> Option<LenSpec> {
        self.len.as_deref().map(LenSpec::parse)
    }
}

/* Parsed form of a member's `len` attribute */
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LenSpec {
    /// Sibling member holding the element count, if any.
    pub count_field: Option<String>,
    pub null_terminated: bool,
}

impl LenSpec {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',').map(str::trim).filter(|p| !p.is_empty());
        let mut spec = LenSpec {
            count_field: None,
            null_terminated: false,
        };
        if let Some(first) = parts.next() {
            if first == NULL_TERMINATED {
                spec.null_terminated = true;
            } else {
                spec.count_field = Some(first.to_string());
            }
        }
        if parts.any(|p| p == NULL_TERMINATED) {
            spec.null_terminated = true;
        }
        spec
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructType {
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    Struct(StructType),
    Union(StructType),
    Alias(String),
    Basetype,
    Enum,
    Bitmask,
    Handle,
    Funcpointer,
}

impl TypeKind {
    pub fn category_name(&self) -> &'static str {
        match self {
            TypeKind::Struct(_) => "struct",
            TypeKind::Union(_) => "union",
            TypeKind::Alias(_) => "alias",
            TypeKind::Basetype => "basetype",
            TypeKind::Enum => "enum",
            TypeKind::Bitmask => "bitmask",
            TypeKind::Handle => "handle",
            TypeKind::Funcpointer => "funcpointer",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypeDef {
    pub name: String,
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub kind: TypeKind,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_return_type() -> String {
    "void".to_string()
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct CommandDef {
    pub name: String,
    #[serde(default = "default_return_type")]
    pub return_type: String,
    #[serde(default)]
    pub params: Vec<Member>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_count_then_null_terminated() {
        let spec = LenSpec::parse("enabledLayerCount,null-terminated");
        assert_eq!(spec.count_field.as_deref(), Some("enabledLayerCount"));
        assert!(spec.null_terminated);
    }

    #[test]
    fn parses_bare_null_terminated() {
        let spec = LenSpec::parse("null-terminated");
        assert_eq!(spec.count_field, None);
        assert!(spec.null_terminated);
    }

    #[test]
    fn struct_kind_is_a_singleton_map() {
        let typedef: TypeDef =
            serde_yml::from_str("name: S\nkind:\n  struct:\n    members: []").expect("struct parses");
        assert_eq!(typedef.kind, TypeKind::Struct(StructType { members: vec![] }));

        let typedef: TypeDef =
            serde_yml::from_str("name: U\nkind:\n  union:\n    members: []").expect("union parses");
        assert_eq!(typedef.kind.category_name(), "union");

        let typedef: TypeDef = serde_yml::from_str("name: H\nkind: handle").expect("unit kind parses");
        assert_eq!(typedef.kind, TypeKind::Handle);
    }

    #[test]
    fn deserializes_registry_document() {
        let yaml = r#"
registry:
  name: "sample"
types:
  - name: "Extent"
    kind:
      struct:
        members:
          - name: "width"
            type: "uint32_t"
          - name: "uuid"
            type: "uint8_t"
            array: 16
          - name: "name"
            type: "char"
            array: "MAX_NAME"
  - name: "ExtentKHR"
    kind:
      alias: "Extent"
  - name: "Format"
    kind: enum
commands:
  - name: "doThing"
    params:
      - name: "pExtent"
        type: "Extent"
        pointer: 1
        const: true
"#;
        let file: RegistryFile = serde_yml::from_str(yaml).expect("registry parses");
        assert_eq!(file.registry.name, "sample");
        assert_eq!(file.types.len(), 3);

        let TypeKind::Struct(extent) = &file.types[0].kind else {
            panic!("expected struct kind");
        };
        assert_eq!(extent.members[1].array, Some(ArrayExtent::Count(16)));
        assert_eq!(
            extent.members[2].array,
            Some(ArrayExtent::Constant("MAX_NAME".to_string()))
        );
        assert_eq!(file.types[1].kind, TypeKind::Alias("Extent".to_string()));
        assert_eq!(file.types[2].kind, TypeKind::Enum);

        let command = &file.commands[0];
        assert_eq!(command.return_type, "void");
        assert!(command.params[0].is_const);
        assert_eq!(command.params[0].pointer, 1);
    }
}
