// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoded values.

/// A decoded C value.
///
/// Integers decode to `Int` or `UInt` depending on the signedness of the type.
/// Strings and chars are raw bytes; C strings carry no encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Scalars
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(u8),
    Str(Vec<u8>),

    // Aggregates
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>), // declaration order
}

impl Value {
    /// Integer view of the value (floats truncate, chars widen).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => Some(*v as i64),
            Self::Float(v) => Some(*v as i64),
            Self::Bool(v) => Some(i64::from(*v)),
            Self::Char(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Unsigned view of the value, reinterpreting negative integers.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => Some(*v as u64),
            Self::Float(v) => Some(*v as u64),
            Self::Bool(v) => Some(u64::from(*v)),
            Self::Char(v) => Some(u64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(v) => Some(*v != 0),
            Self::UInt(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<u8> {
        match self {
            Self::Char(v) => Some(*v),
            Self::Str(s) if s.len() == 1 => Some(s[0]),
            _ => None,
        }
    }

    /// Raw bytes of a string value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a struct member by name.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Set (or append) a struct member.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self {
            Self::Struct(fields) => {
                let name = name.into();
                match fields.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, slot)) => *slot = value,
                    None => fields.push((name, value)),
                }
                true
            }
            _ => false,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
        }
    }

    /// Build a struct value from `(name, value)` pairs.
    pub fn structure<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Struct(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty, $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v as $wide)
                }
            }
        )*
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64, isize);
impl_from_int!(UInt, u64, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Str(v.to_vec())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}
