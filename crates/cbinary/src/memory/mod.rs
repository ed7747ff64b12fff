// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memory-mapped views over shared byte stores.
//!
//! Every view owns a [`ByteSlice`] and decodes on read / encodes on write.
//! Sub-views (`buffer_at`, struct members, array elements) are slices of the
//! same store, so a write through any of them is visible through all.
//!
//! Stores are `Rc<RefCell<..>>`: views are single-threaded.

mod array;
mod buffer;
mod byte_slice;
mod cstring;
mod stack;
mod structure;

pub use array::{ArrayIter, ArrayView};
pub use buffer::Buffer;
pub use byte_slice::{new_store, ByteSlice, Store};
pub use cstring::CString;
pub use stack::Stack;
pub use structure::{StructView, UnionView};

use crate::ctypes::{ObjectType, Type};
use crate::error::{Error, Result};
use crate::value::Value;
use std::io::{Read, Write};

/// Operations shared by every view.
pub trait Memory {
    /// The bytes this view addresses.
    fn bytes(&self) -> &ByteSlice;

    fn size(&self) -> usize {
        self.bytes().len()
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.bytes().to_vec()
    }

    /// Alias of [`to_bytes`](Self::to_bytes).
    fn pack(&self) -> Vec<u8> {
        self.to_bytes()
    }

    /// Zero every byte.
    fn clear(&self) -> Result<()> {
        self.bytes().fill(0)
    }

    /// Fill from `reader` with a single `read(size)` call.
    ///
    /// A short read leaves the remaining bytes untouched. Returns the number
    /// of bytes copied.
    fn read_from<R: Read>(&self, reader: &mut R) -> Result<usize>
    where
        Self: Sized,
    {
        let mut buf = vec![0u8; self.size()];
        let n = reader.read(&mut buf)?;
        if n < buf.len() {
            log::debug!("[memory] short read: {} of {} bytes", n, buf.len());
        }
        self.bytes().write(0, &buf[..n])?;
        Ok(n)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>
    where
        Self: Sized,
    {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Zero-copy child slice of this view's bytes.
    fn byteslice(&self, offset: usize, length: Option<usize>) -> Result<ByteSlice> {
        self.bytes().byteslice(offset, length)
    }
}

impl Memory for ByteSlice {
    fn bytes(&self) -> &ByteSlice {
        self
    }
}

/// Result of reading an array element or struct member.
///
/// Aggregates come back as views over the same store; everything else is
/// decoded into a [`Value`].
#[derive(Debug, Clone)]
pub enum Element {
    Value(Value),
    Array(ArrayView),
    Struct(StructView),
    Union(UnionView),
}

impl Element {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayView> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructView> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionView> {
        match self {
            Self::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Decode fully into a plain value.
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Array(a) => a.to_values().map(Value::Array),
            Self::Struct(s) => s.to_value(),
            Self::Union(u) => u.to_value(),
        }
    }
}

/// Read an element of type `ty` stored in `slice`.
pub(crate) fn read_element(ty: &Type, slice: ByteSlice) -> Result<Element> {
    match ty {
        Type::UnboundedArray(flex) => {
            ArrayView::from_slice(flex.element().clone(), slice).map(Element::Array)
        }
        _ => match ty.object() {
            Some(ObjectType::Array(a)) => {
                ArrayView::from_slice(a.element().clone(), slice).map(Element::Array)
            }
            Some(ObjectType::Struct(s)) => StructView::from_slice(&s, slice).map(Element::Struct),
            Some(ObjectType::Union(u)) => UnionView::from_slice(&u, slice).map(Element::Union),
            None => slice.with(|bytes| ty.decode(bytes))?.map(Element::Value),
        },
    }
}

/// Encode `value` as `ty` and write it into `slice`.
///
/// The value is fully encoded before any byte is written.
pub(crate) fn write_element(ty: &Type, slice: &ByteSlice, value: &Value) -> Result<()> {
    let encoded = ty.pack(value)?;
    if encoded.len() > slice.len() {
        return Err(Error::OffsetOutOfBounds {
            offset: 0,
            size: encoded.len(),
            len: slice.len(),
        });
    }
    slice.write(0, &encoded)
}

/// Bytes of a fresh view: either a zero-filled size or a copy of a source.
pub(crate) fn sized_or_copied(size: usize, source: Option<&[u8]>) -> ByteSlice {
    match source {
        Some(bytes) => ByteSlice::from_bytes(bytes),
        None => ByteSlice::zeroed(size),
    }
}
