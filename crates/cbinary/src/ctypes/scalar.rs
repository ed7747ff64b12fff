// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar type descriptors: integers, floats, chars, bools and C strings.

use crate::ctypes::Endian;
use crate::error::{Error, Result};
use crate::value::Value;
use std::fmt;

/// Fixed-width two's-complement integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntType {
    size: usize,
    signed: bool,
    endian: Endian,
}

impl IntType {
    /// Integer of `size` bytes; only 1, 2, 4 and 8 are accepted.
    pub fn new(size: usize, signed: bool, endian: Endian) -> Result<Self> {
        match size {
            1 | 2 | 4 | 8 => Ok(Self::sized(size, signed, endian)),
            _ => Err(Error::InvalidArgument(format!(
                "integer size must be 1, 2, 4 or 8 bytes, got {}",
                size
            ))),
        }
    }

    /// Built-in table entries, whose sizes are known to be valid.
    pub(crate) const fn sized(size: usize, signed: bool, endian: Endian) -> Self {
        Self {
            size,
            signed,
            endian,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Smallest representable value.
    pub fn min(&self) -> i128 {
        if self.signed {
            -(1i128 << (self.size * 8 - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    pub fn max(&self) -> i128 {
        if self.signed {
            (1i128 << (self.size * 8 - 1)) - 1
        } else {
            (1i128 << (self.size * 8)) - 1
        }
    }
}

/// IEEE-754 binary32 or binary64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatType {
    size: usize,
    endian: Endian,
}

impl FloatType {
    /// binary32 (`size == 4`) or binary64 (`size == 8`).
    pub fn new(size: usize, endian: Endian) -> Result<Self> {
        match size {
            4 | 8 => Ok(Self::sized(size, endian)),
            _ => Err(Error::InvalidArgument(format!(
                "float size must be 4 or 8 bytes, got {}",
                size
            ))),
        }
    }

    pub(crate) const fn sized(size: usize, endian: Endian) -> Self {
        Self { size, endian }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }
}

/// Primitive type encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int(IntType),
    Float(FloatType),
    /// One byte decoding to `Value::Char`.
    Char { signed: bool },
    Bool,
    /// Null-terminated string; length determined by scanning.
    String,
}

impl ScalarType {
    /// Size in bytes (None for strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Int(i) => Some(i.size),
            Self::Float(f) => Some(f.size),
            Self::Char { .. } | Self::Bool => Some(1),
            Self::String => None,
        }
    }

    /// Natural alignment (equal to the size).
    pub fn alignment(&self) -> usize {
        self.size().unwrap_or(1)
    }

    pub fn is_signed(&self) -> bool {
        match self {
            Self::Int(i) => i.signed,
            Self::Float(_) => true,
            Self::Char { signed } => *signed,
            Self::Bool | Self::String => false,
        }
    }

    /// Byte order tag of multi-byte numeric encodings.
    pub fn endian(&self) -> Option<Endian> {
        match self {
            Self::Int(i) if i.size > 1 => Some(i.endian),
            Self::Float(f) => Some(f.endian),
            _ => None,
        }
    }

    /// Copy of this type in another byte order (no-op for byte-sized types).
    pub fn with_endian(self, endian: Endian) -> Self {
        match self {
            Self::Int(i) => Self::Int(IntType { endian, ..i }),
            Self::Float(f) => Self::Float(FloatType { endian, ..f }),
            other => other,
        }
    }

    /// Append the encoding of `value` to `out`.
    ///
    /// Integers wrap to the type's width with two's-complement truncation.
    pub fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Int(i) => {
                let bits = value.as_u64().ok_or_else(|| mismatch(self, value))?;
                encode_uint(bits, i.size, i.endian, out);
            }
            Self::Float(f) => {
                let v = value.as_f64().ok_or_else(|| mismatch(self, value))?;
                if f.size == 4 {
                    encode_uint(u64::from((v as f32).to_bits()), 4, f.endian, out);
                } else {
                    encode_uint(v.to_bits(), 8, f.endian, out);
                }
            }
            Self::Char { .. } => {
                let byte = match value {
                    Value::Char(c) => *c,
                    Value::Str(s) if s.len() == 1 => s[0],
                    Value::Int(_) | Value::UInt(_) => value.as_u64().unwrap_or(0) as u8,
                    _ => return Err(mismatch(self, value)),
                };
                out.push(byte);
            }
            Self::Bool => {
                let flag = value.as_bool().ok_or_else(|| mismatch(self, value))?;
                out.push(u8::from(flag));
            }
            Self::String => {
                let bytes = match value {
                    Value::Str(s) => s.as_slice(),
                    _ => return Err(mismatch(self, value)),
                };
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                out.extend_from_slice(&bytes[..end]);
                out.push(0);
            }
        }
        Ok(())
    }

    /// Decode a value from the front of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        if let Some(size) = self.size() {
            if bytes.len() < size {
                return Err(Error::OffsetOutOfBounds {
                    offset: 0,
                    size,
                    len: bytes.len(),
                });
            }
        }
        Ok(match self {
            Self::Int(i) => {
                let bits = decode_uint(&bytes[..i.size], i.endian);
                if i.signed {
                    Value::Int(sign_extend(bits, i.size))
                } else {
                    Value::UInt(bits)
                }
            }
            Self::Float(f) => {
                let bits = decode_uint(&bytes[..f.size], f.endian);
                if f.size == 4 {
                    Value::Float(f64::from(f32::from_bits(bits as u32)))
                } else {
                    Value::Float(f64::from_bits(bits))
                }
            }
            Self::Char { .. } => Value::Char(bytes[0]),
            Self::Bool => Value::Bool(bytes[0] != 0),
            Self::String => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                Value::Str(bytes[..end].to_vec())
            }
        })
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => {
                let sign = if i.signed { "" } else { "u" };
                if i.size == 1 {
                    write!(f, "{}int8", sign)
                } else {
                    write!(f, "{}int{}_{}", sign, i.size * 8, i.endian.suffix())
                }
            }
            Self::Float(fl) => write!(f, "float{}_{}", fl.size * 8, fl.endian.suffix()),
            Self::Char { signed: true } => f.write_str("char"),
            Self::Char { signed: false } => f.write_str("uchar"),
            Self::Bool => f.write_str("bool"),
            Self::String => f.write_str("string"),
        }
    }
}

fn mismatch(ty: &ScalarType, value: &Value) -> Error {
    Error::InvalidArgument(format!("cannot pack {} value as {}", value.kind_name(), ty))
}

/// Append the low `size` bytes of `bits` in the given byte order.
fn encode_uint(bits: u64, size: usize, endian: Endian, out: &mut Vec<u8>) {
    match endian {
        Endian::Little => out.extend_from_slice(&bits.to_le_bytes()[..size]),
        Endian::Big => out.extend_from_slice(&bits.to_be_bytes()[8 - size..]),
    }
}

/// Read an unsigned integer of `bytes.len()` (<= 8) bytes.
fn decode_uint(bytes: &[u8], endian: Endian) -> u64 {
    let mut buf = [0u8; 8];
    let n = bytes.len();
    match endian {
        Endian::Little => {
            buf[..n].copy_from_slice(bytes);
            u64::from_le_bytes(buf)
        }
        Endian::Big => {
            buf[8 - n..].copy_from_slice(bytes);
            u64::from_be_bytes(buf)
        }
    }
}

fn sign_extend(bits: u64, size: usize) -> i64 {
    let shift = 64 - (size * 8) as u32;
    ((bits << shift) as i64) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(size: usize, signed: bool, endian: Endian) -> ScalarType {
        ScalarType::Int(IntType::new(size, signed, endian).expect("valid integer size"))
    }

    fn pack(ty: ScalarType, value: Value) -> Vec<u8> {
        let mut out = Vec::new();
        ty.encode(&value, &mut out).expect("encode should succeed");
        out
    }

    #[test]
    fn test_int_byte_order() {
        let le = int(4, false, Endian::Little);
        let be = int(4, false, Endian::Big);
        assert_eq!(pack(le, Value::UInt(1)), vec![1, 0, 0, 0]);
        assert_eq!(pack(be, Value::UInt(1)), vec![0, 0, 0, 1]);
        assert_eq!(
            be.decode(&[0x12, 0x34, 0x56, 0x78]).unwrap(),
            Value::UInt(0x1234_5678)
        );
    }

    #[test]
    fn test_signed_boundaries_roundtrip() {
        for size in [1usize, 2, 4, 8] {
            for endian in [Endian::Little, Endian::Big] {
                let ty = IntType::new(size, true, endian).unwrap();
                for v in [ty.min(), ty.max(), -1, 0] {
                    let bytes = pack(ScalarType::Int(ty), Value::Int(v as i64));
                    assert_eq!(
                        ScalarType::Int(ty).decode(&bytes).unwrap(),
                        Value::Int(v as i64)
                    );
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_wraps() {
        let int8 = int(1, true, Endian::Little);
        assert_eq!(pack(int8, Value::Int(128)), vec![0x80]);
        assert_eq!(int8.decode(&[0x80]).unwrap(), Value::Int(-128));
        assert_eq!(pack(int8, Value::Int(-129)), vec![0x7F]);

        let uint16 = int(2, false, Endian::Big);
        assert_eq!(pack(uint16, Value::Int(-1)), vec![0xFF, 0xFF]);
        assert_eq!(pack(uint16, Value::UInt(0x1_0001)), vec![0x00, 0x01]);
    }

    #[test]
    fn test_float_encoding() {
        let f32_le = ScalarType::Float(FloatType::new(4, Endian::Little).unwrap());
        let f64_be = ScalarType::Float(FloatType::new(8, Endian::Big).unwrap());
        assert_eq!(pack(f32_le, Value::Float(1.5)), 1.5f32.to_le_bytes().to_vec());
        assert_eq!(pack(f64_be, Value::Float(-2.25)), (-2.25f64).to_be_bytes().to_vec());
        assert_eq!(f64_be.decode(&(-2.25f64).to_be_bytes()).unwrap(), Value::Float(-2.25));
    }

    #[test]
    fn test_constructor_rejects_unsupported_sizes() {
        for size in [0usize, 3, 16] {
            assert!(matches!(
                IntType::new(size, false, Endian::Little),
                Err(Error::InvalidArgument(_))
            ));
        }
        for size in [2usize, 10] {
            assert!(matches!(
                FloatType::new(size, Endian::Big),
                Err(Error::InvalidArgument(_))
            ));
        }

        let int = IntType::new(8, true, Endian::Big).unwrap();
        assert_eq!((int.size(), int.is_signed(), int.endian()), (8, true, Endian::Big));
        assert_eq!(FloatType::new(4, Endian::Little).unwrap().size(), 4);
    }

    #[test]
    fn test_char_bool_string() {
        let ch = ScalarType::Char { signed: true };
        assert_eq!(pack(ch, Value::from("A")), vec![b'A']);
        assert_eq!(ch.decode(b"Z").unwrap(), Value::Char(b'Z'));
        assert!(ch.encode(&Value::from("AB"), &mut Vec::new()).is_err());

        assert_eq!(ScalarType::Bool.decode(&[2]).unwrap(), Value::Bool(true));

        let s = ScalarType::String;
        assert_eq!(pack(s, Value::from("hi")), b"hi\0".to_vec());
        assert_eq!(s.decode(b"hi\0junk").unwrap(), Value::from("hi"));
        assert_eq!(s.decode(b"no-null").unwrap(), Value::from("no-null"));
    }

    #[test]
    fn test_decode_short_input() {
        let ty = int(8, false, Endian::Little);
        assert!(matches!(
            ty.decode(&[0; 4]),
            Err(Error::OffsetOutOfBounds { size: 8, len: 4, .. })
        ));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(int(4, false, Endian::Little).to_string(), "uint32_le");
        assert_eq!(int(2, true, Endian::Big).to_string(), "int16_be");
        assert_eq!(int(1, false, Endian::Big).to_string(), "uint8");
    }
}
