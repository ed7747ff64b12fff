// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML struct schema loader.
//!
//! # Example YAML
//!
//! ```yaml
//! platform:
//!   endian: little
//!   arch: x86_64
//!   os: linux
//!
//! typedefs:
//!   port_t: uint16_be
//!
//! structs:
//!   - name: Header
//!     padding: false
//!     members:
//!       - { name: kind, type: uint8 }
//!       - { name: port, type: port_t }
//!   - name: Packet
//!     extends: Header
//!     members:
//!       - { name: payload, type: "uint8.." }
//!
//! unions:
//!   - name: Word
//!     members:
//!       - { name: u, type: uint32 }
//!       - { name: bytes, type: "uint8[4]" }
//! ```
//!
//! Declarations may refer to each other by name in any order; cycles and
//! references to undeclared names are reported as errors.

use crate::ctypes::{Platform, Signature, StructBuilder, StructType, TypeSystem};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Root YAML document structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaDocument {
    /// Platform for every declaration without its own.
    pub platform: Option<PlatformDecl>,
    /// Named aliases; may refer to each other and to declared layouts.
    pub typedefs: BTreeMap<String, String>,
    pub structs: Vec<StructDecl>,
    pub unions: Vec<StructDecl>,
}

/// Textual platform keys.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformDecl {
    pub endian: Option<String>,
    pub arch: Option<String>,
    pub os: Option<String>,
}

impl PlatformDecl {
    pub fn to_platform(&self) -> Result<Platform> {
        Platform::parse(
            self.endian.as_deref(),
            self.arch.as_deref(),
            self.os.as_deref(),
        )
    }
}

/// One struct or union declaration.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StructDecl {
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub align: Option<usize>,
    #[serde(default)]
    pub padding: Option<bool>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub platform: Option<PlatformDecl>,
}

/// A member: name plus textual signature.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MemberDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Layouts loaded from a schema document, by name.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    types: TypeSystem,
    layouts: HashMap<String, Arc<StructType>>,
}

impl SchemaRegistry {
    /// Load a schema from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::parse_yaml(&yaml)
    }

    /// Parse and resolve YAML content.
    pub fn parse_yaml(yaml: &str) -> Result<Self> {
        let doc: SchemaDocument = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("failed to parse YAML schema: {}", e)))?;
        Self::from_document(&doc)
    }

    /// Resolve every declaration of `doc`.
    pub fn from_document(doc: &SchemaDocument) -> Result<Self> {
        let platform = match &doc.platform {
            Some(decl) => decl.to_platform()?,
            None => Platform::native(),
        };
        let types = TypeSystem::for_platform(platform);

        let mut pending: Vec<Pending> = doc
            .typedefs
            .iter()
            .map(|(name, signature)| Pending::Typedef(name, signature))
            .chain(doc.structs.iter().map(|d| Pending::Layout(d, false)))
            .chain(doc.unions.iter().map(|d| Pending::Layout(d, true)))
            .collect();
        let mut layouts = HashMap::new();

        // Build whatever resolves; repeat until nothing is left or no progress.
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            let mut last_error = None;
            for item in pending {
                match resolve_pending(item, &types, &mut layouts) {
                    Ok(()) => {}
                    Err(e @ Error::UnknownType(_)) => {
                        last_error = Some(e);
                        deferred.push(item);
                    }
                    Err(e) => {
                        log::debug!("[config] declaration {} rejected: {}", item.name(), e);
                        return Err(e);
                    }
                }
            }
            if deferred.len() == before {
                let names: Vec<_> = deferred.iter().map(Pending::name).collect();
                return Err(Error::Config(format!(
                    "unresolvable declarations [{}]: {}",
                    names.join(", "),
                    last_error.map_or_else(String::new, |e| e.to_string())
                )));
            }
            pending = deferred;
        }

        log::debug!(
            "[config] loaded {} layouts for platform {}",
            layouts.len(),
            platform
        );
        Ok(Self { types, layouts })
    }

    /// Layout declared as `name`.
    pub fn get(&self, name: &str) -> Result<Arc<StructType>> {
        self.layouts
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Type system holding the document typedefs and every loaded layout.
    pub fn types(&self) -> &TypeSystem {
        &self.types
    }
}

/// A document entry waiting for its references to resolve.
#[derive(Debug, Clone, Copy)]
enum Pending<'a> {
    Typedef(&'a str, &'a str),
    Layout(&'a StructDecl, bool),
}

impl<'a> Pending<'a> {
    fn name(&self) -> &'a str {
        match self {
            Self::Typedef(name, _) => name,
            Self::Layout(decl, _) => &decl.name,
        }
    }
}

fn resolve_pending(
    item: Pending,
    types: &TypeSystem,
    layouts: &mut HashMap<String, Arc<StructType>>,
) -> Result<()> {
    match item {
        Pending::Typedef(name, signature) => {
            types.typedef(name, Signature::parse(signature)?)?;
        }
        Pending::Layout(decl, is_union) => {
            let layout = build_decl(decl, is_union, types, layouts)?;
            types.typedef(&decl.name, &layout)?;
            layouts.insert(decl.name.clone(), layout);
        }
    }
    Ok(())
}

fn build_decl(
    decl: &StructDecl,
    is_union: bool,
    types: &TypeSystem,
    layouts: &HashMap<String, Arc<StructType>>,
) -> Result<Arc<StructType>> {
    let mut builder = if is_union {
        StructBuilder::union(&decl.name)
    } else {
        StructBuilder::new(&decl.name)
    };
    let parent = match &decl.extends {
        Some(name) => Some(
            layouts
                .get(name)
                .ok_or_else(|| Error::UnknownType(name.clone()))?,
        ),
        None => None,
    };
    if let Some(parent) = parent {
        builder = builder.extends(parent);
    }
    // own platform, else the parent's, else the document's
    let platform = match (&decl.platform, parent) {
        (Some(platform), _) => Some(platform.to_platform()?),
        (None, Some(parent)) => Some(parent.platform()),
        (None, None) => None,
    };
    builder = match platform {
        Some(platform) => builder.types(&types.with_platform(platform)),
        None => builder.types(types),
    };
    if let Some(align) = decl.align {
        builder = builder.align(align);
    }
    if let Some(padding) = decl.padding {
        builder = builder.padding(padding);
    }
    for member in &decl.members {
        builder = builder.member(&member.name, Signature::parse(&member.ty)?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctypes::Endian;
    use crate::memory::{Memory, StructView};

    const YAML: &str = r#"
platform:
  endian: little

typedefs:
  port_t: uint16_be

structs:
  - name: Packet
    extends: Header
    members:
      - { name: payload, type: "uint8.." }
  - name: Header
    padding: false
    members:
      - { name: kind, type: uint8 }
      - { name: port, type: port_t }
      - { name: word, type: Word }

unions:
  - name: Word
    members:
      - { name: u, type: uint32 }
      - { name: bytes, type: "uint8[4]" }
"#;

    #[test]
    fn test_parse_resolves_out_of_order_references() {
        let registry = SchemaRegistry::parse_yaml(YAML).expect("schema should load");
        assert_eq!(registry.len(), 3);

        let header = registry.get("Header").unwrap();
        assert_eq!(header.offset_of("port").unwrap(), 1);
        assert_eq!(header.offset_of("word").unwrap(), 3);
        assert_eq!(header.size(), 7);

        let packet = registry.get("Packet").unwrap();
        assert!(!packet.padding());
        assert_eq!(packet.offset_of("payload").unwrap(), 7);
        assert_eq!(packet.platform().endian, Some(Endian::Little));

        let view = StructView::from_bytes(&packet, &[1, 0x1F, 0x90, 4, 3, 2, 1, 0xAA]).unwrap();
        assert_eq!(view.value("port").unwrap().as_u64(), Some(8080));
        let word = view.get("word").unwrap();
        assert_eq!(
            word.as_union().unwrap().value("u").unwrap().as_u64(),
            Some(0x01020304)
        );
        assert_eq!(view.size_of("payload").unwrap(), 1);
        assert_eq!(view.size(), 8);
    }

    #[test]
    fn test_per_struct_platform() {
        let yaml = r#"
structs:
  - name: Net
    platform: { endian: net }
    members:
      - { name: v, type: uint32 }
"#;
        let registry = SchemaRegistry::parse_yaml(yaml).unwrap();
        let layout = registry.get("Net").unwrap();
        let bytes = layout
            .pack(&crate::value::Value::structure([("v", 1u32)]))
            .unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_typedefs_resolve_in_any_order() {
        let yaml = r#"
typedefs:
  a_t: b_t
  b_t: uint16
  pair_t: "point_t[2]"
  point_t: Point

structs:
  - name: Point
    members:
      - { name: x, type: a_t }
      - { name: y, type: a_t }
"#;
        let registry = SchemaRegistry::parse_yaml(yaml).expect("schema should load");
        let types = registry.types();
        assert_eq!(types.resolve("a_t").unwrap().size(), Some(2));
        assert_eq!(registry.get("Point").unwrap().size(), 4);
        assert_eq!(types.resolve("pair_t").unwrap().size(), Some(8));

        let dangling = "typedefs:\n  a_t: b_t\n  b_t: missing_t\n";
        match SchemaRegistry::parse_yaml(dangling) {
            Err(Error::Config(msg)) => assert!(msg.contains("a_t") && msg.contains("b_t")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        let unknown = "structs:\n  - name: A\n    members:\n      - { name: x, type: nope }\n";
        assert!(matches!(
            SchemaRegistry::parse_yaml(unknown),
            Err(Error::Config(_))
        ));

        let cycle = r#"
structs:
  - name: A
    members: [{ name: b, type: B }]
  - name: B
    members: [{ name: a, type: A }]
"#;
        match SchemaRegistry::parse_yaml(cycle) {
            Err(Error::Config(msg)) => assert!(msg.contains("A") && msg.contains("B")),
            other => panic!("unexpected {:?}", other),
        }

        let bad_sig = "structs:\n  - name: A\n    members:\n      - { name: x, type: \"uint8[\" }\n";
        assert!(matches!(
            SchemaRegistry::parse_yaml(bad_sig),
            Err(Error::InvalidSignature(_))
        ));

        assert!(matches!(
            SchemaRegistry::parse_yaml("platform: { arch: vax }"),
            Err(Error::UnknownPlatform { .. })
        ));
        assert!(matches!(
            SchemaRegistry::parse_yaml("bogus: 1"),
            Err(Error::Config(_))
        ));
    }
}
