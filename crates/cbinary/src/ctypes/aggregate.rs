// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Aggregate type descriptors: arrays, flexible arrays, structs and unions.

use crate::ctypes::{Platform, Type};
use crate::error::{Error, Result};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Fixed-length array of a sized element type.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    element: Box<Type>,
    length: usize,
}

impl ArrayType {
    /// Create an array type; the element must have a fixed size.
    pub fn new(element: Type, length: usize) -> Result<Self> {
        let Some(size) = element.size() else {
            return Err(Error::InvalidSignature(format!(
                "array element {} has no fixed size",
                element
            )));
        };
        if size.checked_mul(length).is_none() {
            return Err(Error::InvalidSignature(format!(
                "{}[{}] is too large",
                element, length
            )));
        }
        Ok(Self {
            element: Box::new(element),
            length,
        })
    }

    pub fn element(&self) -> &Type {
        &self.element
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn element_size(&self) -> usize {
        self.element.size().unwrap_or(0)
    }

    pub fn size(&self) -> usize {
        self.element_size() * self.length
    }

    /// Encode element-wise; missing trailing elements are zero-filled.
    pub(crate) fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let start = out.len();
        match value {
            Value::Array(items) => {
                if items.len() > self.length {
                    return Err(Error::InvalidArgument(format!(
                        "{} elements do not fit in {}",
                        items.len(),
                        self
                    )));
                }
                for item in items {
                    self.element.encode(item, out)?;
                }
            }
            // char arrays accept string literals
            Value::Str(bytes) if self.element.is_char() => {
                if bytes.len() > self.length {
                    return Err(Error::InvalidArgument(format!(
                        "string of {} bytes does not fit in {}",
                        bytes.len(),
                        self
                    )));
                }
                out.extend_from_slice(bytes);
            }
            other => {
                return Err(Error::InvalidArgument(format!(
                    "cannot pack {} value as {}",
                    other.kind_name(),
                    self
                )))
            }
        }
        out.resize(start + self.size(), 0);
        Ok(())
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let stride = self.element_size();
        if bytes.len() < self.size() {
            return Err(Error::OffsetOutOfBounds {
                offset: 0,
                size: self.size(),
                len: bytes.len(),
            });
        }
        (0..self.length)
            .map(|i| self.element.decode(&bytes[i * stride..(i + 1) * stride]))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.element, self.length)
    }
}

/// Array with no fixed count; consumes whatever bytes remain.
#[derive(Debug, Clone, PartialEq)]
pub struct UnboundedArrayType {
    element: Box<Type>,
}

impl UnboundedArrayType {
    pub fn new(element: Type) -> Result<Self> {
        if element.size().map_or(true, |s| s == 0) {
            return Err(Error::InvalidSignature(format!(
                "unbounded array element {} has no fixed size",
                element
            )));
        }
        Ok(Self {
            element: Box::new(element),
        })
    }

    pub fn element(&self) -> &Type {
        &self.element
    }

    pub fn element_size(&self) -> usize {
        self.element.size().unwrap_or(1)
    }

    /// Element count when bound to `available` bytes (trailing partial element ignored).
    pub fn count_for(&self, available: usize) -> usize {
        available / self.element_size()
    }

    pub(crate) fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.element.encode(item, out)?;
                }
                Ok(())
            }
            Value::Str(bytes) if self.element.is_char() => {
                out.extend_from_slice(bytes);
                Ok(())
            }
            other => Err(Error::InvalidArgument(format!(
                "cannot pack {} value as {}",
                other.kind_name(),
                self
            ))),
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let stride = self.element_size();
        bytes
            .chunks_exact(stride)
            .map(|chunk| self.element.decode(chunk))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

impl fmt::Display for UnboundedArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..", self.element)
    }
}

/// Whether members are laid out sequentially or all at offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Struct,
    Union,
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Struct => "struct",
            Self::Union => "union",
        })
    }
}

/// A named member with its resolved type and byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    name: String,
    ty: Type,
    offset: usize,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Fixed size of the member (None for a flexible array member).
    pub fn size(&self) -> Option<usize> {
        self.ty.size()
    }

    pub fn is_flexible(&self) -> bool {
        matches!(self.ty, Type::UnboundedArray(_))
    }
}

/// Resolved struct or union layout.
///
/// Produced by [`crate::ctypes::StructBuilder`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    name: String,
    kind: AggregateKind,
    members: Vec<Member>,
    size: usize,
    alignment: usize,
    padding: bool,
    align_override: Option<usize>,
    platform: Platform,
}

impl StructType {
    /// Compute member offsets and the total size.
    ///
    /// With padding, each member starts at the previous end rounded up to its
    /// alignment (or to `align_override` when set) and the total size is
    /// rounded up to the aggregate alignment. Without padding members are
    /// packed back to back. A union is as large as its largest member.
    pub(crate) fn layout(
        name: impl Into<String>,
        kind: AggregateKind,
        members: Vec<(String, Type)>,
        align_override: Option<usize>,
        padding: bool,
        platform: Platform,
    ) -> Result<Self> {
        let name = name.into();
        if let Some(align) = align_override {
            if align == 0 || !align.is_power_of_two() {
                return Err(Error::InvalidArgument(format!(
                    "alignment {} of {} is not a power of two",
                    align, name
                )));
            }
        }

        let count = members.len();
        let mut laid_out = Vec::with_capacity(count);
        let mut offset = 0usize;
        let mut end = 0usize;
        let mut max_align = 1usize;

        for (i, (member_name, ty)) in members.into_iter().enumerate() {
            if laid_out.iter().any(|m: &Member| m.name == member_name) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate member {} in {}",
                    member_name, name
                )));
            }
            let size = match (&ty, ty.size()) {
                (Type::UnboundedArray(_), _) => {
                    if kind == AggregateKind::Union || i + 1 != count {
                        return Err(Error::InvalidSignature(format!(
                            "flexible array member {} must be the last member of a struct",
                            member_name
                        )));
                    }
                    0
                }
                (_, Some(size)) => size,
                (_, None) => {
                    return Err(Error::InvalidSignature(format!(
                        "member {} of type {} has no fixed size",
                        member_name, ty
                    )))
                }
            };

            let member_align = align_override.unwrap_or_else(|| ty.alignment());
            max_align = max_align.max(ty.alignment());
            let member_offset = match kind {
                AggregateKind::Union => 0,
                AggregateKind::Struct if padding => round_up(offset, member_align),
                AggregateKind::Struct => offset,
            };
            log::trace!(
                "[ctypes] {} {}.{} @{} size={}",
                kind,
                name,
                member_name,
                member_offset,
                size
            );

            offset = member_offset
                .checked_add(size)
                .filter(|&end| end < usize::MAX / 2)
                .ok_or_else(|| {
                    Error::InvalidSignature(format!("{} {} is too large", kind, name))
                })?;
            end = end.max(offset);
            laid_out.push(Member {
                name: member_name,
                ty,
                offset: member_offset,
            });
        }

        // padding moves members and the tail, never the alignment itself
        let alignment = align_override.unwrap_or(max_align);
        let size = match kind {
            AggregateKind::Union => end,
            AggregateKind::Struct if padding => round_up(end, alignment),
            AggregateKind::Struct => end,
        };
        log::debug!(
            "[ctypes] laid out {} {}: {} members, size={} align={}",
            kind,
            name,
            laid_out.len(),
            size,
            alignment
        );

        Ok(Self {
            name,
            kind,
            members: laid_out,
            size,
            alignment,
            padding,
            align_override,
            platform,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AggregateKind {
        self.kind
    }

    pub fn is_union(&self) -> bool {
        self.kind == AggregateKind::Union
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    /// Member lookup failing with `UnknownMember`.
    pub fn require_member(&self, name: &str) -> Result<&Member> {
        self.member(name)
            .ok_or_else(|| Error::UnknownMember(name.to_string()))
    }

    pub fn offset_of(&self, name: &str) -> Result<usize> {
        self.require_member(name).map(Member::offset)
    }

    /// Size of a member (None for the flexible array member).
    pub fn size_of(&self, name: &str) -> Result<Option<usize>> {
        self.require_member(name).map(Member::size)
    }

    /// Fixed size, excluding any flexible array payload.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn padding(&self) -> bool {
        self.padding
    }

    pub fn align_override(&self) -> Option<usize> {
        self.align_override
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn flexible_member(&self) -> Option<&Member> {
        self.members.last().filter(|m| m.is_flexible())
    }

    /// Encode a `Value::Struct`; absent members stay zero.
    pub fn pack(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size);
        self.encode(value, &mut out)?;
        Ok(out)
    }

    /// Decode a `Value::Struct` from `bytes`.
    pub fn unpack(&self, bytes: &[u8]) -> Result<Value> {
        self.decode(bytes)
    }

    pub(crate) fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let fields = match value {
            Value::Struct(fields) => fields,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "cannot pack {} value as {} {}",
                    other.kind_name(),
                    self.kind,
                    self.name
                )))
            }
        };

        let start = out.len();
        let mut body = vec![0u8; self.size];
        let mut tail = Vec::new();
        for (name, field) in fields {
            let member = self.require_member(name)?;
            if member.is_flexible() {
                member.ty.encode(field, &mut tail)?;
                continue;
            }
            let mut encoded = Vec::with_capacity(member.size().unwrap_or(0));
            member.ty.encode(field, &mut encoded)?;
            if encoded.len() > member.size().unwrap_or(0) {
                return Err(Error::InvalidArgument(format!(
                    "{} bytes do not fit in member {} of {}",
                    encoded.len(),
                    name,
                    self
                )));
            }
            body[member.offset..member.offset + encoded.len()].copy_from_slice(&encoded);
        }
        out.extend_from_slice(&body);
        if !tail.is_empty() {
            // flexible payload starts at the member offset, which may precede trailing padding
            let flex_offset = self.flexible_member().map_or(self.size, Member::offset);
            out.truncate(start + flex_offset);
            out.extend_from_slice(&tail);
        }
        Ok(())
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.len() < self.size {
            return Err(Error::OffsetOutOfBounds {
                offset: 0,
                size: self.size,
                len: bytes.len(),
            });
        }
        let mut fields = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let value = match member.size() {
                Some(size) => member
                    .ty
                    .decode(&bytes[member.offset..member.offset + size])?,
                None => member.ty.decode(&bytes[member.offset..])?,
            };
            fields.push((member.name.clone(), value));
        }
        Ok(Value::Struct(fields))
    }
}

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Aggregate type that decodes into a nested view rather than a plain value.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectType {
    Array(ArrayType),
    Struct(Arc<StructType>),
    Union(Arc<StructType>),
}

impl ObjectType {
    /// The plain value-level type behind this object type.
    pub fn layout(&self) -> Type {
        match self {
            Self::Array(a) => Type::Array(a.clone()),
            Self::Struct(s) => Type::Struct(s.clone()),
            Self::Union(u) => Type::Union(u.clone()),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Array(a) => a.size(),
            Self::Struct(s) | Self::Union(s) => s.size(),
        }
    }

    pub fn alignment(&self) -> usize {
        match self {
            Self::Array(a) => a.element().alignment(),
            Self::Struct(s) | Self::Union(s) => s.alignment(),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(a) => a.fmt(f),
            Self::Struct(s) | Self::Union(s) => s.fmt(f),
        }
    }
}

/// Round `value` up to a multiple of `align` (a power of two).
pub(crate) fn round_up(value: usize, align: usize) -> usize {
    if align <= 1 {
        return value;
    }
    value.saturating_add(align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctypes::{Endian, IntType, ScalarType};

    fn uint(size: usize) -> Type {
        Type::Scalar(ScalarType::Int(IntType::new(size, false, Endian::Little).unwrap()))
    }

    fn members(list: &[(&str, Type)]) -> Vec<(String, Type)> {
        list.iter()
            .map(|(n, t)| (n.to_string(), t.clone()))
            .collect()
    }

    #[test]
    fn test_padded_struct_offsets() {
        let layout = StructType::layout(
            "Padded",
            AggregateKind::Struct,
            members(&[("a", uint(1)), ("b", uint(4)), ("c", uint(2))]),
            None,
            true,
            Platform::native(),
        )
        .expect("layout");
        let offsets: Vec<_> = layout.members().iter().map(Member::offset).collect();
        assert_eq!(offsets, vec![0, 4, 8]);
        assert_eq!(layout.size(), 12);
        assert_eq!(layout.alignment(), 4);
    }

    #[test]
    fn test_packed_struct_offsets() {
        let layout = StructType::layout(
            "Packed",
            AggregateKind::Struct,
            members(&[("a", uint(1)), ("b", uint(4)), ("c", uint(2))]),
            None,
            false,
            Platform::native(),
        )
        .expect("layout");
        let offsets: Vec<_> = layout.members().iter().map(Member::offset).collect();
        assert_eq!(offsets, vec![0, 1, 5]);
        assert_eq!(layout.size(), 7);
        assert_eq!(layout.alignment(), 4);
    }

    #[test]
    fn test_packed_struct_nested_in_padded_struct() {
        let packed = StructType::layout(
            "P",
            AggregateKind::Struct,
            members(&[("a", uint(1)), ("b", uint(4))]),
            None,
            false,
            Platform::native(),
        )
        .expect("layout");
        assert_eq!(packed.size(), 5);
        assert_eq!(packed.alignment(), 4);

        let outer = StructType::layout(
            "Outer",
            AggregateKind::Struct,
            members(&[("tag", uint(1)), ("p", Type::Struct(Arc::new(packed)))]),
            None,
            true,
            Platform::native(),
        )
        .expect("layout");
        assert_eq!(outer.offset_of("p").unwrap(), 4);
        assert_eq!(outer.size(), 12);
        assert_eq!(outer.alignment(), 4);
    }

    #[test]
    fn test_align_override_forces_member_alignment() {
        let layout = StructType::layout(
            "Aligned",
            AggregateKind::Struct,
            members(&[("a", uint(1)), ("b", uint(1))]),
            Some(4),
            true,
            Platform::native(),
        )
        .expect("layout");
        assert_eq!(layout.offset_of("b").unwrap(), 4);
        assert_eq!(layout.size(), 8);
        assert!(StructType::layout(
            "Bad",
            AggregateKind::Struct,
            Vec::new(),
            Some(3),
            true,
            Platform::native()
        )
        .is_err());
    }

    #[test]
    fn test_union_layout() {
        let layout = StructType::layout(
            "U",
            AggregateKind::Union,
            members(&[("u", uint(4)), ("c", uint(1)), ("w", uint(2))]),
            None,
            true,
            Platform::native(),
        )
        .expect("layout");
        assert!(layout.members().iter().all(|m| m.offset() == 0));
        assert_eq!(layout.size(), 4);
    }

    #[test]
    fn test_union_size_is_largest_member() {
        let bytes = Type::Array(ArrayType::new(uint(1), 3).unwrap());
        let layout = StructType::layout(
            "U",
            AggregateKind::Union,
            members(&[("bytes", bytes), ("w", uint(2))]),
            None,
            true,
            Platform::native(),
        )
        .expect("layout");
        assert_eq!(layout.size(), 3);
        assert_eq!(layout.alignment(), 2);
    }

    #[test]
    fn test_flexible_member_rules() {
        let flex = Type::UnboundedArray(UnboundedArrayType::new(uint(2)).unwrap());
        let layout = StructType::layout(
            "Flex",
            AggregateKind::Struct,
            members(&[("len", uint(1)), ("data", flex.clone())]),
            None,
            true,
            Platform::native(),
        )
        .expect("layout");
        assert_eq!(layout.offset_of("data").unwrap(), 2);
        assert_eq!(layout.size(), 2);
        assert!(layout.flexible_member().is_some());

        let err = StructType::layout(
            "Flex",
            AggregateKind::Struct,
            members(&[("data", flex), ("len", uint(1))]),
            None,
            true,
            Platform::native(),
        );
        assert!(matches!(err, Err(Error::InvalidSignature(_))));
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let err = StructType::layout(
            "Dup",
            AggregateKind::Struct,
            members(&[("a", uint(1)), ("a", uint(2))]),
            None,
            true,
            Platform::native(),
        );
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_struct_pack_unpack() {
        let layout = StructType::layout(
            "Pair",
            AggregateKind::Struct,
            members(&[("a", uint(1)), ("b", uint(2))]),
            None,
            true,
            Platform::native(),
        )
        .expect("layout");
        let bytes = layout
            .pack(&Value::structure([("b", 0x0102u16)]))
            .expect("pack");
        assert_eq!(bytes, vec![0, 0, 0x02, 0x01]);
        let value = layout.unpack(&bytes).expect("unpack");
        assert_eq!(value.get_field("b"), Some(&Value::UInt(0x0102)));
        assert!(matches!(
            layout.pack(&Value::structure([("zz", 1u8)])),
            Err(Error::UnknownMember(_))
        ));
    }

    #[test]
    fn test_array_pack_zero_fills() {
        let arr = ArrayType::new(uint(2), 3).unwrap();
        let mut out = Vec::new();
        arr.encode(&Value::from(vec![1u16]), &mut out).unwrap();
        assert_eq!(out, vec![1, 0, 0, 0, 0, 0]);
        assert!(arr
            .encode(&Value::from(vec![1u16, 2, 3, 4]), &mut Vec::new())
            .is_err());
        assert!(ArrayType::new(Type::Scalar(ScalarType::String), 2).is_err());
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(5, 4), 8);
        assert_eq!(round_up(8, 4), 8);
        assert_eq!(round_up(3, 1), 3);
    }
}
