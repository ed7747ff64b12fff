// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NUL-terminated string buffer.

use crate::error::{Error, Result};
use crate::memory::{ByteSlice, Memory};
use std::fmt;

/// Byte buffer that always holds at least one NUL.
///
/// The logical length stops at the first NUL; the backing store may be
/// larger. Concatenation overwrites from the first NUL and grows the store
/// when needed.
#[derive(Clone)]
pub struct CString {
    bytes: ByteSlice,
}

impl CString {
    /// Copy `string`, appending a NUL if it has none.
    pub fn new(string: impl AsRef<[u8]>) -> Self {
        let string = string.as_ref();
        let mut owned = string.to_vec();
        if !owned.contains(&0) {
            owned.push(0);
        }
        Self {
            bytes: ByteSlice::from_bytes(&owned),
        }
    }

    /// Zero-filled buffer of `size` bytes (empty string).
    pub fn with_capacity(size: usize) -> Self {
        Self {
            bytes: ByteSlice::zeroed(size.max(1)),
        }
    }

    /// String over `bytes` (no copy); the slice must contain a NUL.
    pub fn from_slice(bytes: ByteSlice) -> Result<Self> {
        if bytes.index(&[0], 0).is_none() {
            return Err(Error::InvalidArgument(
                "C string slice has no NUL terminator".to_string(),
            ));
        }
        Ok(Self { bytes })
    }

    /// Offset of the first NUL.
    pub fn len(&self) -> usize {
        self.bytes.index(&[0], 0).unwrap_or(self.bytes.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `string` at the first NUL, keeping a terminator after it.
    pub fn concat(&mut self, string: impl AsRef<[u8]>) -> Result<&mut Self> {
        let string = string.as_ref();
        let start = self.len();
        let end = start + string.len() + 1;
        if end > self.bytes.len() {
            let grow = end - self.bytes.len();
            let at = self.bytes.len();
            self.bytes.splice(at, 0, &vec![0u8; grow])?;
        }
        let mut terminated = Vec::with_capacity(string.len() + 1);
        terminated.extend_from_slice(string);
        terminated.push(0);
        self.bytes.write(start, &terminated)?;
        Ok(self)
    }

    /// Bytes before the first NUL.
    pub fn to_s(&self) -> Vec<u8> {
        let len = self.len();
        self.bytes.read(0, len).unwrap_or_default()
    }

    /// Lossy UTF-8 rendering of [`to_s`](Self::to_s).
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.to_s()).into_owned()
    }

    /// Bytes up to (not including) the first NUL.
    pub fn each_byte(&self) -> impl Iterator<Item = u8> {
        self.to_s().into_iter()
    }

    /// Chars up to the first NUL, one per byte.
    pub fn each_char(&self) -> impl Iterator<Item = char> {
        self.each_byte().map(char::from)
    }

    /// Position of `needle` within the string part.
    pub fn index(&self, needle: impl AsRef<[u8]>) -> Option<usize> {
        let needle = needle.as_ref();
        let haystack = self.to_s();
        if needle.is_empty() {
            return Some(0);
        }
        haystack.windows(needle.len()).position(|w| w == needle)
    }
}

impl Memory for CString {
    fn bytes(&self) -> &ByteSlice {
        &self.bytes
    }
}

impl fmt::Debug for CString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CString").field(&self.to_string_lossy()).finish()
    }
}

impl fmt::Display for CString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for CString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_stops_at_nul() {
        let s = CString::new("AB");
        assert_eq!(s.len(), 2);
        assert_eq!(s.size(), 3);

        let s = CString::new(b"ab\0cd\0");
        assert_eq!(s.len(), 2);
        assert_eq!(s.size(), 6);
        assert_eq!(s.each_byte().collect::<Vec<_>>(), b"ab".to_vec());
        assert_eq!(s.each_char().collect::<String>(), "ab");
    }

    #[test]
    fn test_concat_grows_in_place() {
        let mut s = CString::new("AB");
        s.concat("C").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.size(), 4);
        assert_eq!(s.to_s(), b"ABC".to_vec());
        assert_eq!(s.to_string(), "ABC");

        s.concat("").unwrap().concat("DE").unwrap();
        assert_eq!(s.to_bytes(), b"ABCDE\0".to_vec());
    }

    #[test]
    fn test_concat_reuses_spare_capacity() {
        let mut s = CString::with_capacity(8);
        s.concat("hi").unwrap();
        assert_eq!(s.size(), 8);
        assert_eq!(s.to_s(), b"hi".to_vec());
    }

    #[test]
    fn test_index() {
        let s = CString::new("hello");
        assert_eq!(s.index("ll"), Some(2));
        assert_eq!(s.index("z"), None);
        assert!(!s.is_empty());
        assert!(CString::new("").is_empty());
    }

    #[test]
    fn test_borrowed_slice_cannot_grow() {
        let root = ByteSlice::from_bytes(b"ab\0xyz");
        let mut s = CString::from_slice(root.byteslice(0, Some(3)).unwrap()).unwrap();
        assert!(s.concat("cdef").is_err());
        assert_eq!(root.to_vec(), b"ab\0xyz".to_vec());
        assert!(CString::from_slice(root.byteslice(3, None).unwrap()).is_err());
    }
}
