// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type signatures and their resolution against a type table.

use crate::ctypes::{
    types, AggregateKind, ArrayType, ObjectType, Platform, StructType, Type, TypeTable,
    UnboundedArrayType,
};
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A type request, before resolution.
///
/// `Name` also accepts the textual forms `name[N]` and `name..`, which are
/// parsed when the signature is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Signature {
    Name(String),
    Array(Box<Signature>, usize),
    Unbounded(Box<Signature>),
    Struct(Arc<StructType>),
    Union(Arc<StructType>),
}

impl Signature {
    /// Parse the textual signature syntax.
    ///
    /// ```
    /// use cbinary::ctypes::Signature;
    ///
    /// let sig = Signature::parse("uint16_le[3]").unwrap();
    /// assert_eq!(sig, Signature::array("uint16_le", 3));
    /// assert!(Signature::parse("uint8[x]").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || Error::InvalidSignature(text.to_string());

        if let Some(element) = text.strip_suffix("..") {
            return Ok(Self::Unbounded(Box::new(Self::parse(element)?)));
        }
        if let Some(head) = text.strip_suffix(']') {
            let open = head.rfind('[').ok_or_else(invalid)?;
            let count = head[open + 1..]
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid())?;
            let element = &head[..open];
            if element.trim().is_empty() || element.trim_end().ends_with("..") {
                return Err(invalid());
            }
            return Ok(Self::Array(Box::new(Self::parse(element)?), count));
        }
        if is_identifier(text) {
            Ok(Self::Name(text.to_string()))
        } else {
            Err(invalid())
        }
    }

    pub fn array(element: impl Into<Signature>, count: usize) -> Self {
        Self::Array(Box::new(element.into()), count)
    }

    pub fn unbounded(element: impl Into<Signature>) -> Self {
        Self::Unbounded(Box::new(element.into()))
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&str> for Signature {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Signature {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<S: Into<Signature>> From<(S, usize)> for Signature {
    fn from((element, count): (S, usize)) -> Self {
        Self::array(element, count)
    }
}

impl From<Arc<StructType>> for Signature {
    fn from(layout: Arc<StructType>) -> Self {
        match layout.kind() {
            AggregateKind::Struct => Self::Struct(layout),
            AggregateKind::Union => Self::Union(layout),
        }
    }
}

impl From<&Arc<StructType>> for Signature {
    fn from(layout: &Arc<StructType>) -> Self {
        Self::from(layout.clone())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Array(element, count) => write!(f, "{}[{}]", element, count),
            Self::Unbounded(element) => write!(f, "{}..", element),
            Self::Struct(s) | Self::Union(s) => f.write_str(s.name()),
        }
    }
}

/// Platform table plus a registry of custom typedefs.
///
/// Clones share the typedef registry.
#[derive(Debug, Clone)]
pub struct TypeSystem {
    table: Arc<TypeTable>,
    custom: Arc<RwLock<HashMap<String, Type>>>,
}

impl TypeSystem {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            table: types(platform),
            custom: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Host byte order and word size, no OS typedefs.
    pub fn native() -> Self {
        Self::for_platform(Platform::native())
    }

    /// Same typedef registry over another platform's table.
    pub fn with_platform(&self, platform: Platform) -> Self {
        Self {
            table: types(platform),
            custom: self.custom.clone(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.table.platform()
    }

    pub fn table(&self) -> &Arc<TypeTable> {
        &self.table
    }

    /// Look up a bare name: custom typedefs first, then the platform table.
    pub fn lookup(&self, name: &str) -> Result<Type> {
        if let Some(ty) = self.custom.read().get(name) {
            return Ok(ty.clone());
        }
        self.table.get(name)
    }

    /// Resolve a signature into a type descriptor.
    ///
    /// Struct and union references resolve to their object type so that
    /// views decode them into nested views.
    pub fn resolve(&self, signature: impl Into<Signature>) -> Result<Type> {
        self.resolve_signature(&signature.into())
    }

    pub(crate) fn resolve_signature(&self, signature: &Signature) -> Result<Type> {
        match signature {
            Signature::Name(text) => match Signature::parse(text)? {
                Signature::Name(name) => self.lookup(&name),
                parsed => self.resolve_signature(&parsed),
            },
            Signature::Array(element, count) => {
                let element = self.resolve_signature(element)?;
                if matches!(element, Type::UnboundedArray(_)) {
                    return Err(Error::InvalidSignature(signature.to_string()));
                }
                Ok(Type::Array(ArrayType::new(element, *count)?))
            }
            Signature::Unbounded(element) => {
                let element = self.resolve_signature(element)?;
                if matches!(element, Type::UnboundedArray(_)) {
                    return Err(Error::InvalidSignature(signature.to_string()));
                }
                Ok(Type::UnboundedArray(UnboundedArrayType::new(element)?))
            }
            Signature::Struct(layout) => Ok(Type::Object(ObjectType::Struct(layout.clone()))),
            Signature::Union(layout) => Ok(Type::Object(ObjectType::Union(layout.clone()))),
        }
    }

    /// Register `name` as an alias for `signature`.
    ///
    /// Later lookups of `name` (including inside array signatures and struct
    /// members) resolve to the aliased type.
    pub fn typedef(&self, name: &str, signature: impl Into<Signature>) -> Result<Type> {
        if !is_identifier(name) {
            return Err(Error::InvalidSignature(name.to_string()));
        }
        let ty = self.resolve(signature)?;
        log::debug!("[resolver] typedef {} = {}", name, ty);
        self.custom.write().insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.custom.read().contains_key(name) || self.table.contains(name)
    }
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctypes::{Endian, StructBuilder};

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            Signature::parse("uint32").unwrap(),
            Signature::Name("uint32".into())
        );
        assert_eq!(
            Signature::parse("int8[2][3]").unwrap(),
            Signature::array(Signature::array("int8", 2), 3)
        );
        assert_eq!(
            Signature::parse("uint8..").unwrap(),
            Signature::unbounded("uint8")
        );
        for bad in ["", "[3]", "uint8[", "uint8]", "uint8[-1]", "uint8[x]", "9lives", "a b"] {
            assert!(
                matches!(Signature::parse(bad), Err(Error::InvalidSignature(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_resolve_array_and_unbounded() {
        let types = TypeSystem::for_platform(Platform::native().with_endian(Endian::Big));
        let arr = types.resolve(("uint16_le", 3)).unwrap();
        assert_eq!(arr.size(), Some(6));
        assert_eq!(arr.to_string(), "uint16_le[3]");

        let flex = types.resolve("uint32..").unwrap();
        assert!(matches!(flex, Type::UnboundedArray(_)));
        assert!(types.resolve("uint8..[2]").is_err());
        assert!(types.resolve(Signature::unbounded("uint8..")).is_err());
    }

    #[test]
    fn test_unknown_names() {
        let types = TypeSystem::native();
        assert!(matches!(types.resolve("nope"), Err(Error::UnknownType(_))));
        assert!(matches!(types.resolve("nope[2]"), Err(Error::UnknownType(_))));
        assert!(matches!(
            types.resolve(("string", 2)),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_typedef_registry_is_shared() {
        let types = TypeSystem::native();
        let alias = types.clone();
        types.typedef("handle_t", "uint32_be").unwrap();
        assert_eq!(alias.resolve("handle_t[2]").unwrap().size(), Some(8));
        assert!(alias.is_defined("handle_t"));
        assert!(types.typedef("bad name", "uint8").is_err());
    }

    #[test]
    fn test_struct_reference_resolves_to_object() {
        let point = StructBuilder::new("Point")
            .member("x", "int32")
            .member("y", "int32")
            .build()
            .unwrap();
        let types = TypeSystem::native();
        match types.resolve(&point).unwrap() {
            Type::Object(ObjectType::Struct(s)) => assert!(Arc::ptr_eq(&s, &point)),
            other => panic!("unexpected {:?}", other),
        }
        types.typedef("point_t", &point).unwrap();
        assert_eq!(types.resolve("point_t[4]").unwrap().size(), Some(32));
    }
}
