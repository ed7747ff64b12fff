// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Flat byte buffer addressed by offset.

use crate::ctypes::{Signature, StructType, Type, TypeSystem};
use crate::error::{check_range, Error, Result};
use crate::memory::{ArrayView, ByteSlice, CString, Memory, StructView, UnionView};
use crate::value::Value;
use std::sync::Arc;

/// Generate typed `get_*` / `put_*` / `get_array_of_*` / `put_array_of_*`
/// accessors for one table name each.
///
/// Widths follow the buffer's type table, so `get_long` reads 4 or 8 bytes
/// depending on the platform.
macro_rules! impl_scalar_accessors {
    ($($name:literal => $get:ident, $put:ident, $get_array:ident, $put_array:ident: $ty:ty, $conv:ident;)*) => {
        $(
            #[doc = concat!("Read a `", $name, "` at `offset`.")]
            pub fn $get(&self, offset: usize) -> Result<$ty> {
                let value = self.get($name, offset)?;
                value.$conv().ok_or_else(|| decoded_as($name, &value))
            }

            #[doc = concat!("Write a `", $name, "` at `offset`.")]
            pub fn $put(&self, offset: usize, value: $ty) -> Result<()> {
                self.put($name, offset, value)
            }

            #[doc = concat!("Read `count` consecutive `", $name, "` values.")]
            pub fn $get_array(&self, offset: usize, count: usize) -> Result<Vec<$ty>> {
                self.get_array_of($name, offset, count)?
                    .iter()
                    .map(|value| value.$conv().ok_or_else(|| decoded_as($name, value)))
                    .collect()
            }

            #[doc = concat!("Write consecutive `", $name, "` values.")]
            pub fn $put_array(&self, offset: usize, values: &[$ty]) -> Result<()> {
                let values: Vec<Value> = values.iter().copied().map(Value::from).collect();
                self.put_array_of($name, offset, &values)
            }
        )*
    };
}

/// A flat region of bytes read and written through a type table.
#[derive(Debug, Clone)]
pub struct Buffer {
    bytes: ByteSlice,
    types: TypeSystem,
}

impl Buffer {
    /// Zero-filled buffer using the native type table.
    pub fn new(size: usize) -> Self {
        Self::with_types(size, TypeSystem::native())
    }

    pub fn with_types(size: usize, types: TypeSystem) -> Self {
        Self {
            bytes: ByteSlice::zeroed(size),
            types,
        }
    }

    /// Buffer over a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_slice(ByteSlice::from_bytes(bytes), TypeSystem::native())
    }

    /// Buffer over `bytes` (no copy).
    pub fn from_slice(bytes: ByteSlice, types: TypeSystem) -> Self {
        Self { bytes, types }
    }

    pub fn types(&self) -> &TypeSystem {
        &self.types
    }

    fn resolve(&self, signature: impl Into<Signature>) -> Result<Type> {
        self.types.resolve(signature)
    }

    /// Decode a value of `signature` at `offset`.
    ///
    /// Strings scan to the first NUL; flexible arrays consume the rest of
    /// the buffer.
    pub fn get(&self, signature: impl Into<Signature>, offset: usize) -> Result<Value> {
        let ty = self.resolve(signature)?;
        let len = match ty.size() {
            Some(size) => {
                check_range(offset, size, self.size())?;
                size
            }
            None => {
                check_range(offset, 0, self.size())?;
                self.size() - offset
            }
        };
        self.bytes
            .with(|bytes| ty.decode(&bytes[offset..offset + len]))?
    }

    /// Encode `value` as `signature` at `offset`.
    pub fn put(
        &self,
        signature: impl Into<Signature>,
        offset: usize,
        value: impl Into<Value>,
    ) -> Result<()> {
        let ty = self.resolve(signature)?;
        let encoded = ty.pack(&value.into())?;
        self.bytes.write(offset, &encoded)
    }

    /// Decode `count` consecutive values of `signature`.
    pub fn get_array_of(
        &self,
        signature: impl Into<Signature>,
        offset: usize,
        count: usize,
    ) -> Result<Vec<Value>> {
        let ty = self.resolve(signature)?;
        let stride = fixed_size(&ty)?;
        check_range(offset, span(stride, count)?, self.size())?;
        self.bytes.with(|bytes| {
            (0..count)
                .map(|i| {
                    let start = offset + i * stride;
                    ty.decode(&bytes[start..start + stride])
                })
                .collect::<Result<Vec<_>>>()
        })?
    }

    /// Encode `values` consecutively starting at `offset`.
    pub fn put_array_of(
        &self,
        signature: impl Into<Signature>,
        offset: usize,
        values: &[Value],
    ) -> Result<()> {
        let ty = self.resolve(signature)?;
        let stride = fixed_size(&ty)?;
        let mut encoded = Vec::with_capacity(stride * values.len());
        for value in values {
            ty.encode(value, &mut encoded)?;
        }
        self.bytes.write(offset, &encoded)
    }

    /// NUL-terminated string at `offset`, scanning at most `max_len` bytes.
    ///
    /// Without a NUL in the window the whole window is returned.
    pub fn get_string(&self, offset: usize, max_len: Option<usize>) -> Result<Vec<u8>> {
        check_range(offset, 0, self.size())?;
        let available = self.size() - offset;
        let window = max_len.map_or(available, |max| max.min(available));
        self.bytes.with(|bytes| {
            let window = &bytes[offset..offset + window];
            let end = window.iter().position(|&b| b == 0).unwrap_or(window.len());
            window[..end].to_vec()
        })
    }

    /// Write `string` plus a NUL terminator at `offset`.
    pub fn put_string(&self, offset: usize, string: impl AsRef<[u8]>) -> Result<()> {
        let string = string.as_ref();
        let mut encoded = Vec::with_capacity(string.len() + 1);
        encoded.extend_from_slice(string);
        encoded.push(0);
        self.bytes.write(offset, &encoded)
    }

    /// Copy raw bytes in at `offset`.
    pub fn copy_from(&self, offset: usize, data: &[u8]) -> Result<()> {
        self.bytes.write(offset, data)
    }

    /// Sub-buffer sharing this buffer's bytes and type table.
    pub fn buffer_at(&self, offset: usize, size: Option<usize>) -> Result<Buffer> {
        Ok(Self::from_slice(
            self.checked_slice(offset, size)?,
            self.types.clone(),
        ))
    }

    /// Array view of `count` elements at `offset`.
    pub fn array_at(
        &self,
        signature: impl Into<Signature>,
        offset: usize,
        count: usize,
    ) -> Result<ArrayView> {
        let ty = self.resolve(signature)?;
        let stride = fixed_size(&ty)?;
        ArrayView::from_slice(ty, self.checked_slice(offset, Some(span(stride, count)?))?)
    }

    /// Struct view at `offset`. A flexible array member spans the rest.
    pub fn struct_at(&self, layout: &Arc<StructType>, offset: usize) -> Result<StructView> {
        StructView::from_slice(layout, self.aggregate_slice(layout, offset)?)
    }

    pub fn union_at(&self, layout: &Arc<StructType>, offset: usize) -> Result<UnionView> {
        UnionView::from_slice(layout, self.aggregate_slice(layout, offset)?)
    }

    /// C string over the rest of the buffer starting at `offset`.
    pub fn cstring_at(&self, offset: usize) -> Result<CString> {
        CString::from_slice(self.checked_slice(offset, None)?)
    }

    fn checked_slice(&self, offset: usize, size: Option<usize>) -> Result<ByteSlice> {
        let size = match size {
            Some(size) => size,
            None => {
                check_range(offset, 0, self.size())?;
                self.size() - offset
            }
        };
        check_range(offset, size, self.size())?;
        self.bytes.byteslice(offset, Some(size))
    }

    fn aggregate_slice(&self, layout: &StructType, offset: usize) -> Result<ByteSlice> {
        let size = layout.flexible_member().map_or(Some(layout.size()), |_| None);
        let slice = self.checked_slice(offset, size)?;
        check_range(0, layout.size(), slice.len())?;
        Ok(slice)
    }

    impl_scalar_accessors! {
        "char" => get_char, put_char, get_array_of_char, put_array_of_char: u8, as_char;
        "uchar" => get_uchar, put_uchar, get_array_of_uchar, put_array_of_uchar: u8, as_char;
        "byte" => get_byte, put_byte, get_array_of_byte, put_array_of_byte: u64, as_u64;
        "bool" => get_bool, put_bool, get_array_of_bool, put_array_of_bool: bool, as_bool;
        "int8" => get_int8, put_int8, get_array_of_int8, put_array_of_int8: i64, as_i64;
        "uint8" => get_uint8, put_uint8, get_array_of_uint8, put_array_of_uint8: u64, as_u64;
        "int16" => get_int16, put_int16, get_array_of_int16, put_array_of_int16: i64, as_i64;
        "uint16" => get_uint16, put_uint16, get_array_of_uint16, put_array_of_uint16: u64, as_u64;
        "int32" => get_int32, put_int32, get_array_of_int32, put_array_of_int32: i64, as_i64;
        "uint32" => get_uint32, put_uint32, get_array_of_uint32, put_array_of_uint32: u64, as_u64;
        "int64" => get_int64, put_int64, get_array_of_int64, put_array_of_int64: i64, as_i64;
        "uint64" => get_uint64, put_uint64, get_array_of_uint64, put_array_of_uint64: u64, as_u64;
        "short" => get_short, put_short, get_array_of_short, put_array_of_short: i64, as_i64;
        "ushort" => get_ushort, put_ushort, get_array_of_ushort, put_array_of_ushort: u64, as_u64;
        "int" => get_int, put_int, get_array_of_int, put_array_of_int: i64, as_i64;
        "uint" => get_uint, put_uint, get_array_of_uint, put_array_of_uint: u64, as_u64;
        "long" => get_long, put_long, get_array_of_long, put_array_of_long: i64, as_i64;
        "ulong" => get_ulong, put_ulong, get_array_of_ulong, put_array_of_ulong: u64, as_u64;
        "long_long" => get_long_long, put_long_long, get_array_of_long_long, put_array_of_long_long: i64, as_i64;
        "ulong_long" => get_ulong_long, put_ulong_long, get_array_of_ulong_long, put_array_of_ulong_long: u64, as_u64;
        "float32" => get_float32, put_float32, get_array_of_float32, put_array_of_float32: f64, as_f64;
        "float64" => get_float64, put_float64, get_array_of_float64, put_array_of_float64: f64, as_f64;
        "float" => get_float, put_float, get_array_of_float, put_array_of_float: f64, as_f64;
        "double" => get_double, put_double, get_array_of_double, put_array_of_double: f64, as_f64;
        "word" => get_word, put_word, get_array_of_word, put_array_of_word: u64, as_u64;
        "dword" => get_dword, put_dword, get_array_of_dword, put_array_of_dword: u64, as_u64;
        "qword" => get_qword, put_qword, get_array_of_qword, put_array_of_qword: u64, as_u64;
        "machine_word" => get_machine_word, put_machine_word, get_array_of_machine_word, put_array_of_machine_word: u64, as_u64;
        "pointer" => get_pointer, put_pointer, get_array_of_pointer, put_array_of_pointer: u64, as_u64;
        "int16_le" => get_int16_le, put_int16_le, get_array_of_int16_le, put_array_of_int16_le: i64, as_i64;
        "uint16_le" => get_uint16_le, put_uint16_le, get_array_of_uint16_le, put_array_of_uint16_le: u64, as_u64;
        "int32_le" => get_int32_le, put_int32_le, get_array_of_int32_le, put_array_of_int32_le: i64, as_i64;
        "uint32_le" => get_uint32_le, put_uint32_le, get_array_of_uint32_le, put_array_of_uint32_le: u64, as_u64;
        "int64_le" => get_int64_le, put_int64_le, get_array_of_int64_le, put_array_of_int64_le: i64, as_i64;
        "uint64_le" => get_uint64_le, put_uint64_le, get_array_of_uint64_le, put_array_of_uint64_le: u64, as_u64;
        "float32_le" => get_float32_le, put_float32_le, get_array_of_float32_le, put_array_of_float32_le: f64, as_f64;
        "float64_le" => get_float64_le, put_float64_le, get_array_of_float64_le, put_array_of_float64_le: f64, as_f64;
        "int16_be" => get_int16_be, put_int16_be, get_array_of_int16_be, put_array_of_int16_be: i64, as_i64;
        "uint16_be" => get_uint16_be, put_uint16_be, get_array_of_uint16_be, put_array_of_uint16_be: u64, as_u64;
        "int32_be" => get_int32_be, put_int32_be, get_array_of_int32_be, put_array_of_int32_be: i64, as_i64;
        "uint32_be" => get_uint32_be, put_uint32_be, get_array_of_uint32_be, put_array_of_uint32_be: u64, as_u64;
        "int64_be" => get_int64_be, put_int64_be, get_array_of_int64_be, put_array_of_int64_be: i64, as_i64;
        "uint64_be" => get_uint64_be, put_uint64_be, get_array_of_uint64_be, put_array_of_uint64_be: u64, as_u64;
        "float32_be" => get_float32_be, put_float32_be, get_array_of_float32_be, put_array_of_float32_be: f64, as_f64;
        "float64_be" => get_float64_be, put_float64_be, get_array_of_float64_be, put_array_of_float64_be: f64, as_f64;
    }
}

impl Memory for Buffer {
    fn bytes(&self) -> &ByteSlice {
        &self.bytes
    }
}

fn fixed_size(ty: &Type) -> Result<usize> {
    ty.size().ok_or_else(|| {
        Error::InvalidArgument(format!("{} has no fixed size", ty))
    })
}

fn span(stride: usize, count: usize) -> Result<usize> {
    stride.checked_mul(count).ok_or(Error::IndexOutOfBounds {
        index: count as i64,
        len: 0,
    })
}

fn decoded_as(name: &str, value: &Value) -> Error {
    Error::InvalidArgument(format!("{} decoded as {}", name, value.kind_name()))
}
