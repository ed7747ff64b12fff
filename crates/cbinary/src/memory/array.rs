// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Homogeneous array view.

use crate::ctypes::Type;
use crate::error::{Error, Result};
use crate::memory::{read_element, write_element, ByteSlice, Element, Memory};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Array of one element type laid over a byte slice.
///
/// The element count is `size / element_size`; any trailing partial element
/// is not addressable. Aggregate elements come back as nested views, cached
/// per index so repeated reads hand out the same view.
#[derive(Debug, Clone)]
pub struct ArrayView {
    bytes: ByteSlice,
    element: Type,
    stride: usize,
    cache: Rc<RefCell<HashMap<usize, Element>>>,
}

impl ArrayView {
    /// Zero-filled array of `count` elements.
    pub fn new(element: Type, count: usize) -> Result<Self> {
        let stride = stride_of(&element)?;
        let size = stride.checked_mul(count).ok_or_else(|| {
            Error::InvalidArgument(format!("{} elements of {} overflow", count, element))
        })?;
        Self::from_slice(element, ByteSlice::zeroed(size))
    }

    /// Array over a copy of `bytes`.
    pub fn from_bytes(element: Type, bytes: &[u8]) -> Result<Self> {
        Self::from_slice(element, ByteSlice::from_bytes(bytes))
    }

    /// Array over `slice` (no copy).
    pub fn from_slice(element: Type, bytes: ByteSlice) -> Result<Self> {
        let stride = stride_of(&element)?;
        Ok(Self {
            bytes,
            element,
            stride,
            cache: Rc::new(RefCell::new(HashMap::new())),
        })
    }

    /// Array holding `values`, encoded in order.
    pub fn from_values(element: Type, values: &[Value]) -> Result<Self> {
        let array = Self::new(element, values.len())?;
        for (i, value) in values.iter().enumerate() {
            array.set(i as isize, value.clone())?;
        }
        Ok(array)
    }

    pub fn element_type(&self) -> &Type {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, index: isize) -> Result<usize> {
        let len = self.len();
        usize::try_from(index)
            .ok()
            .filter(|&i| i < len)
            .ok_or(Error::IndexOutOfBounds {
                index: index as i64,
                len,
            })
    }

    /// Element at `index`; negative indices are out of bounds.
    pub fn get(&self, index: isize) -> Result<Element> {
        let slot = self.slot(index)?;
        if let Some(cached) = self.cache.borrow().get(&slot) {
            return Ok(cached.clone());
        }
        let slice = self.bytes.byteslice(slot * self.stride, Some(self.stride))?;
        let element = read_element(&self.element, slice)?;
        if !matches!(element, Element::Value(_)) {
            log::trace!("[memory] caching array element view #{}", slot);
            self.cache.borrow_mut().insert(slot, element.clone());
        }
        Ok(element)
    }

    /// Decoded value at `index`.
    pub fn value(&self, index: isize) -> Result<Value> {
        self.get(index)?.to_value()
    }

    pub fn set(&self, index: isize, value: impl Into<Value>) -> Result<()> {
        let slot = self.slot(index)?;
        let slice = self.bytes.byteslice(slot * self.stride, Some(self.stride))?;
        write_element(&self.element, &slice, &value.into())?;
        self.cache.borrow_mut().remove(&slot);
        Ok(())
    }

    /// Elements in index order. Each call starts over.
    pub fn iter(&self) -> ArrayIter<'_> {
        ArrayIter {
            array: self,
            next: 0,
        }
    }

    pub fn to_values(&self) -> Result<Vec<Value>> {
        self.iter().map(|e| e.and_then(|e| e.to_value())).collect()
    }

    /// Same view instance (shares its element cache).
    pub fn ptr_eq(&self, other: &ArrayView) -> bool {
        Rc::ptr_eq(&self.cache, &other.cache)
    }
}

impl Memory for ArrayView {
    fn bytes(&self) -> &ByteSlice {
        &self.bytes
    }
}

impl<'a> IntoIterator for &'a ArrayView {
    type Item = Result<Element>;
    type IntoIter = ArrayIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`ArrayView`].
pub struct ArrayIter<'a> {
    array: &'a ArrayView,
    next: usize,
}

impl Iterator for ArrayIter<'_> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.array.len() {
            return None;
        }
        let item = self.array.get(self.next as isize);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.array.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

fn stride_of(element: &Type) -> Result<usize> {
    match element.size() {
        Some(size) if size > 0 => Ok(size),
        _ => Err(Error::InvalidArgument(format!(
            "array element {} has no fixed size",
            element
        ))),
    }
}
