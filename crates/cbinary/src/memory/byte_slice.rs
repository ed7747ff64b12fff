// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Zero-copy offset/length windows over a shared byte store.

use crate::error::{check_range, Error, Result};
use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

/// Shared, growable backing bytes.
pub type Store = Rc<RefCell<Vec<u8>>>;

/// Create a zero-filled store.
pub fn new_store(size: usize) -> Store {
    Rc::new(RefCell::new(vec![0u8; size]))
}

/// A bounds-checked window `offset..offset + len` into a [`Store`].
///
/// Slices never copy: every slice over the same store sees every write.
/// Reads and writes are confined to the window; only constructing a child
/// slice is validated against the root store instead.
#[derive(Clone)]
pub struct ByteSlice {
    store: Store,
    offset: usize,
    length: usize,
}

impl ByteSlice {
    /// Window over `store`; `None` length means "to the end of the store".
    pub fn new(store: &Store, offset: usize, length: Option<usize>) -> Result<Self> {
        let total = store.borrow().len();
        let length = match length {
            Some(length) => length,
            None => total.checked_sub(offset).ok_or(Error::OffsetOutOfBounds {
                offset: offset as i64,
                size: 0,
                len: total,
            })?,
        };
        check_range(offset, length, total)?;
        Ok(Self {
            store: store.clone(),
            offset,
            length,
        })
    }

    /// Slice spanning a fresh copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            store: Rc::new(RefCell::new(bytes.to_vec())),
            offset: 0,
            length: bytes.len(),
        }
    }

    /// Slice spanning a fresh zero-filled store.
    pub fn zeroed(size: usize) -> Self {
        Self {
            store: new_store(size),
            offset: 0,
            length: size,
        }
    }

    /// Child slice at `offset` relative to this one.
    ///
    /// The absolute window is validated against the root store, so a child
    /// may reach past this slice's nominal end as long as the store has the
    /// bytes.
    pub fn byteslice(&self, offset: usize, length: Option<usize>) -> Result<Self> {
        let length = match length {
            Some(length) => length,
            None => self
                .length
                .checked_sub(offset)
                .ok_or(Error::OffsetOutOfBounds {
                    offset: offset as i64,
                    size: 0,
                    len: self.length,
                })?,
        };
        let absolute = self
            .offset
            .checked_add(offset)
            .ok_or(Error::OffsetOutOfBounds {
                offset: offset as i64,
                size: length,
                len: self.length,
            })?;
        Self::new(&self.store, absolute, Some(length))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Absolute offset into the root store.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether this slice spans the whole root store.
    pub fn is_root(&self) -> bool {
        self.offset == 0 && self.length == self.store.borrow().len()
    }

    /// Both slices address the same bytes of the same store.
    pub fn ptr_eq(&self, other: &ByteSlice) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
            && self.offset == other.offset
            && self.length == other.length
    }

    /// Run `f` over the window's bytes.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let store = self.store.borrow();
        store
            .get(self.offset..self.offset + self.length)
            .map(f)
            .ok_or(Error::OffsetOutOfBounds {
                offset: self.offset as i64,
                size: self.length,
                len: store.len(),
            })
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> Result<R> {
        let mut store = self.store.borrow_mut();
        let len = store.len();
        store
            .get_mut(self.offset..self.offset + self.length)
            .map(f)
            .ok_or(Error::OffsetOutOfBounds {
                offset: self.offset as i64,
                size: self.length,
                len,
            })
    }

    /// Byte at `index`, or `None` past the end of the window.
    pub fn getbyte(&self, index: usize) -> Option<u8> {
        if index >= self.length {
            return None;
        }
        self.with(|bytes| bytes[index]).ok()
    }

    pub fn setbyte(&self, index: usize, byte: u8) -> Result<()> {
        if index >= self.length {
            return Err(Error::IndexOutOfBounds {
                index: index as i64,
                len: self.length,
            });
        }
        self.with_mut(|bytes| bytes[index] = byte)
    }

    /// Copy `len` bytes starting at `offset` within the window.
    pub fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        check_range(offset, len, self.length)?;
        self.with(|bytes| bytes[offset..offset + len].to_vec())
    }

    /// Copy a half-open range of the window.
    pub fn read_range(&self, range: Range<usize>) -> Result<Vec<u8>> {
        let len = range.end.checked_sub(range.start).ok_or(Error::OffsetOutOfBounds {
            offset: range.start as i64,
            size: 0,
            len: self.length,
        })?;
        self.read(range.start, len)
    }

    /// Overwrite bytes at `offset`; fails without writing if they do not fit.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.length)?;
        self.with_mut(|bytes| bytes[offset..offset + data.len()].copy_from_slice(data))
    }

    pub fn fill(&self, byte: u8) -> Result<()> {
        self.with_mut(|bytes| bytes.fill(byte))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.with(<[u8]>::to_vec).unwrap_or_default()
    }

    /// Position of `needle` at or after `offset`, relative to this slice.
    ///
    /// The search runs over the root store; a match is only reported when it
    /// starts inside the window.
    pub fn index(&self, needle: &[u8], offset: usize) -> Option<usize> {
        let store = self.store.borrow();
        let start = self.offset.checked_add(offset)?;
        let haystack = store.get(start..)?;
        let found = if needle.is_empty() {
            Some(0)
        } else {
            haystack.windows(needle.len()).position(|w| w == needle)
        }?;
        let relative = offset + found;
        (relative < self.length).then_some(relative)
    }

    /// Replace `remove` bytes at `at` with `insert`, resizing the root store.
    ///
    /// Only a slice spanning the whole store may grow or shrink it.
    pub(crate) fn splice(&mut self, at: usize, remove: usize, insert: &[u8]) -> Result<()> {
        if !self.is_root() {
            return Err(Error::InvalidArgument(
                "cannot resize a store through a partial slice".to_string(),
            ));
        }
        check_range(at, remove, self.length)?;
        let mut store = self.store.borrow_mut();
        store.splice(at..at + remove, insert.iter().copied());
        self.length = store.len();
        Ok(())
    }
}

impl fmt::Debug for ByteSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSlice")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("bytes", &self.to_vec())
            .finish()
    }
}

impl PartialEq for ByteSlice {
    fn eq(&self, other: &Self) -> bool {
        self.to_vec() == other.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(bytes: &[u8]) -> Store {
        Rc::new(RefCell::new(bytes.to_vec()))
    }

    #[test]
    fn test_construction_bounds() {
        let store = new_store(10);
        assert_eq!(ByteSlice::new(&store, 4, None).unwrap().len(), 6);
        assert_eq!(ByteSlice::new(&store, 10, None).unwrap().len(), 0);
        assert!(ByteSlice::new(&store, 11, None).is_err());
        assert!(ByteSlice::new(&store, 8, Some(3)).is_err());
    }

    #[test]
    fn test_nested_slices_compose_offsets() {
        let store = store_of(b"0123456789abcdefghijklmnopqrstuvwxyz");
        let outer = ByteSlice::new(&store, 5, Some(20)).unwrap();
        let inner = outer.byteslice(2, Some(3)).unwrap();
        let direct = ByteSlice::new(&store, 7, Some(3)).unwrap();
        assert_eq!(inner.offset(), 7);
        assert_eq!(inner.to_vec(), b"789".to_vec());
        assert!(inner.ptr_eq(&direct));

        // validated against the root store, not the parent window
        let past = outer.byteslice(19, Some(5)).unwrap();
        assert_eq!(past.to_vec(), b"opqrs".to_vec());
        assert!(outer.byteslice(30, Some(5)).is_err());
    }

    #[test]
    fn test_writes_are_shared() {
        let store = new_store(8);
        let a = ByteSlice::new(&store, 2, Some(4)).unwrap();
        let b = ByteSlice::new(&store, 0, None).unwrap();
        a.write(1, &[0xAA, 0xBB]).unwrap();
        assert_eq!(b.to_vec(), vec![0, 0, 0, 0xAA, 0xBB, 0, 0, 0]);
        b.setbyte(3, 0x11).unwrap();
        assert_eq!(a.getbyte(1), Some(0x11));
    }

    #[test]
    fn test_access_is_confined_to_window() {
        let store = new_store(8);
        let slice = ByteSlice::new(&store, 2, Some(4)).unwrap();
        assert_eq!(slice.getbyte(4), None);
        assert!(matches!(
            slice.setbyte(4, 1),
            Err(Error::IndexOutOfBounds { index: 4, len: 4 })
        ));
        assert!(slice.write(3, &[1, 2]).is_err());
        assert!(slice.read(2, 3).is_err());
        assert_eq!(slice.read_range(1..3).unwrap(), vec![0, 0]);
        assert_eq!(store.borrow().as_slice(), &[0u8; 8]);
    }

    #[test]
    fn test_index_reports_matches_inside_window() {
        let store = store_of(b"xxhello world");
        let slice = ByteSlice::new(&store, 2, Some(5)).unwrap();
        assert_eq!(slice.index(b"llo", 0), Some(2));
        assert_eq!(slice.index(b"ell", 2), None);
        // match starts past the window
        assert_eq!(slice.index(b"world", 0), None);
    }

    #[test]
    fn test_splice_requires_root() {
        let mut root = ByteSlice::from_bytes(b"abc");
        root.splice(0, 0, b"zz").unwrap();
        assert_eq!(root.to_vec(), b"zzabc".to_vec());
        assert_eq!(root.len(), 5);

        let mut child = root.byteslice(1, Some(2)).unwrap();
        assert!(child.splice(0, 0, b"q").is_err());
    }
}
