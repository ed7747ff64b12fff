// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the type system and the memory views.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving types or accessing memory.
///
/// All of these are programmer/input errors. Nothing is retried and no
/// operation that fails leaves a partially written value behind.
#[derive(Debug)]
pub enum Error {
    /// Symbolic type name with no table entry.
    UnknownType(String),
    /// Unknown endian / arch / os key.
    UnknownPlatform { kind: &'static str, name: String },
    /// Element index outside `0..len`.
    IndexOutOfBounds { index: i64, len: usize },
    /// Byte range `offset..offset + size` outside a store of `len` bytes.
    OffsetOutOfBounds { offset: i64, size: usize, len: usize },
    /// Signature that matches no recognized form, or breaks a layout rule.
    InvalidSignature(String),
    /// Value or constructor input of the wrong shape.
    InvalidArgument(String),
    /// Named access to an undeclared struct/union member.
    UnknownMember(String),
    /// Failure reported by a byte-stream collaborator.
    Io(std::io::Error),
    /// Malformed schema or platform configuration.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(name) => write!(f, "unknown type: {}", name),
            Self::UnknownPlatform { kind, name } => write!(f, "unknown {}: {}", kind, name),
            Self::IndexOutOfBounds { index, len } => {
                if *len == 0 {
                    write!(f, "index {} is out of bounds: collection is empty", index)
                } else {
                    write!(f, "index {} is out of bounds: 0...{}", index, len - 1)
                }
            }
            Self::OffsetOutOfBounds { offset, size, len } => {
                if *size > *len {
                    write!(
                        f,
                        "offset {} is out of bounds: {} bytes do not fit in {}",
                        offset, size, len
                    )
                } else {
                    write!(
                        f,
                        "offset {} is out of bounds: 0...{}",
                        offset,
                        len - size
                    )
                }
            }
            Self::InvalidSignature(sig) => write!(f, "invalid type signature: {}", sig),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::UnknownMember(name) => write!(f, "no such member: {}", name),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Check that `offset..offset + size` lies inside `0..len`.
pub(crate) fn check_range(offset: usize, size: usize, len: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= len => Ok(()),
        _ => Err(Error::OffsetOutOfBounds {
            offset: offset as i64,
            size,
            len,
        }),
    }
}
