// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! C type descriptors and the platform type tables.
//!
//! A [`Type`] is a closed tagged union over every shape the engine knows:
//! scalars, fixed arrays, flexible arrays, structs, unions and the object
//! wrapper that makes aggregates decode into nested views. Types are resolved
//! from [`Signature`]s against a [`TypeSystem`], which layers custom typedefs
//! on top of a per-platform [`TypeTable`].
//!
//! # Example
//!
//! ```
//! use cbinary::ctypes::{Platform, StructBuilder, TypeSystem};
//!
//! let header = StructBuilder::packet("Header")
//!     .member("kind", "uint8")
//!     .member("len", "uint16")
//!     .build()
//!     .unwrap();
//! assert_eq!(header.size(), 3);
//!
//! let types = TypeSystem::for_platform(Platform::native());
//! assert_eq!(types.resolve("uint32_be").unwrap().size(), Some(4));
//! ```

mod aggregate;
mod builder;
mod platform;
mod resolver;
mod scalar;
mod table;

pub use aggregate::{AggregateKind, ArrayType, Member, ObjectType, StructType, UnboundedArrayType};
pub use builder::StructBuilder;
pub use platform::{Arch, Endian, Os, Platform};
pub use resolver::{Signature, TypeSystem};
pub use scalar::{FloatType, IntType, ScalarType};
pub use table::{types, TypeTable};

use crate::error::Result;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A resolved type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Scalar(ScalarType),
    Array(ArrayType),
    /// Consumes the remaining bytes of whatever range it is bound to.
    UnboundedArray(UnboundedArrayType),
    Struct(Arc<StructType>),
    Union(Arc<StructType>),
    /// Aggregate that decodes into a nested view.
    Object(ObjectType),
}

impl Type {
    /// Size in bytes; `None` for strings and flexible arrays.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Scalar(s) => s.size(),
            Self::Array(a) => Some(a.size()),
            Self::UnboundedArray(_) => None,
            Self::Struct(s) | Self::Union(s) => Some(s.size()),
            Self::Object(o) => Some(o.size()),
        }
    }

    pub fn alignment(&self) -> usize {
        match self {
            Self::Scalar(s) => s.alignment(),
            Self::Array(a) => a.element().alignment(),
            Self::UnboundedArray(u) => u.element().alignment(),
            Self::Struct(s) | Self::Union(s) => s.alignment(),
            Self::Object(o) => o.alignment(),
        }
    }

    pub fn is_signed(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_signed(),
            _ => false,
        }
    }

    /// Byte order of fixed-width multi-byte numeric encodings.
    pub fn endian(&self) -> Option<Endian> {
        match self {
            Self::Scalar(s) => s.endian(),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn is_char(&self) -> bool {
        matches!(self, Self::Scalar(ScalarType::Char { .. }))
    }

    /// The object wrapper for aggregates accessed as nested views.
    pub fn object(&self) -> Option<ObjectType> {
        match self {
            Self::Array(a) => Some(ObjectType::Array(a.clone())),
            Self::Struct(s) => Some(ObjectType::Struct(s.clone())),
            Self::Union(u) => Some(ObjectType::Union(u.clone())),
            Self::Object(o) => Some(o.clone()),
            Self::Scalar(_) | Self::UnboundedArray(_) => None,
        }
    }

    /// Encode `value` into a fresh byte vector.
    pub fn pack(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size().unwrap_or(0));
        self.encode(value, &mut out)?;
        Ok(out)
    }

    /// Decode a value from the front of `bytes`.
    pub fn unpack(&self, bytes: &[u8]) -> Result<Value> {
        self.decode(bytes)
    }

    pub(crate) fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Scalar(s) => s.encode(value, out),
            Self::Array(a) => a.encode(value, out),
            Self::UnboundedArray(u) => u.encode(value, out),
            Self::Struct(s) | Self::Union(s) => s.encode(value, out),
            Self::Object(o) => o.layout().encode(value, out),
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<Value> {
        match self {
            Self::Scalar(s) => s.decode(bytes),
            Self::Array(a) => a.decode(bytes),
            Self::UnboundedArray(u) => u.decode(bytes),
            Self::Struct(s) | Self::Union(s) => s.decode(bytes),
            Self::Object(o) => o.layout().decode(bytes),
        }
    }
}

impl From<ScalarType> for Type {
    fn from(s: ScalarType) -> Self {
        Self::Scalar(s)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => s.fmt(f),
            Self::Array(a) => a.fmt(f),
            Self::UnboundedArray(u) => u.fmt(f),
            Self::Struct(s) | Self::Union(s) => s.fmt(f),
            Self::Object(o) => o.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_size_and_alignment() {
        let u16le = Type::Scalar(ScalarType::Int(IntType::new(2, false, Endian::Little).unwrap()));
        let arr = Type::Array(ArrayType::new(u16le.clone(), 3).unwrap());
        assert_eq!(arr.size(), Some(6));
        assert_eq!(arr.alignment(), 2);
        assert_eq!(arr.to_string(), "uint16_le[3]");

        let flex = Type::UnboundedArray(UnboundedArrayType::new(u16le).unwrap());
        assert_eq!(flex.size(), None);
        assert_eq!(flex.to_string(), "uint16_le..");
        assert!(Type::Scalar(ScalarType::String).size().is_none());
    }

    #[test]
    fn test_object_wraps_aggregates_only() {
        let byte = Type::Scalar(ScalarType::Int(IntType::new(1, false, Endian::Little).unwrap()));
        assert!(byte.object().is_none());
        let arr = Type::Array(ArrayType::new(byte, 4).unwrap());
        match arr.object() {
            Some(ObjectType::Array(a)) => assert_eq!(a.length(), 4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pack_unpack_through_type() {
        let i32be = Type::Scalar(ScalarType::Int(IntType::new(4, true, Endian::Big).unwrap()));
        let bytes = i32be.pack(&Value::Int(-2)).unwrap();
        assert_eq!(bytes, vec![0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(i32be.unpack(&bytes).unwrap(), Value::Int(-2));
        assert!(i32be.is_signed());
        assert_eq!(i32be.endian(), Some(Endian::Big));
    }
}
