// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simulated downward-growing stack of machine words.

use crate::ctypes::{Type, TypeSystem};
use crate::error::{Error, Result};
use crate::memory::{ByteSlice, Memory};
use crate::value::Value;

/// Stack whose top is always byte offset 0.
///
/// `push` prepends a machine word and `pop` removes the first one, so
/// addresses grow downward the way a native stack does. Non-negative indices
/// select words from the top; negative indices are byte offsets back from the
/// end of the stack (`size + index`).
#[derive(Debug, Clone)]
pub struct Stack {
    bytes: ByteSlice,
    word: Type,
    word_size: usize,
}

impl Stack {
    /// Empty stack using the native machine word.
    pub fn new() -> Result<Self> {
        Self::with_types(&TypeSystem::native())
    }

    /// Empty stack using `types`' `machine_word`.
    pub fn with_types(types: &TypeSystem) -> Result<Self> {
        let word = types.resolve("machine_word")?;
        let word_size = word.size().filter(|&s| s > 0).ok_or_else(|| {
            Error::InvalidArgument(format!("machine word {} has no fixed size", word))
        })?;
        Ok(Self {
            bytes: ByteSlice::zeroed(0),
            word,
            word_size,
        })
    }

    /// Stack over a copy of existing words, top first.
    pub fn from_bytes(types: &TypeSystem, bytes: &[u8]) -> Result<Self> {
        let mut stack = Self::with_types(types)?;
        stack.bytes = ByteSlice::from_bytes(bytes);
        Ok(stack)
    }

    pub fn word_size(&self) -> usize {
        self.word_size
    }

    /// Number of whole words.
    pub fn len(&self) -> usize {
        self.bytes.len() / self.word_size
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Push a word on top (byte offset 0).
    pub fn push(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let encoded = self.word.pack(&value.into())?;
        self.bytes.splice(0, 0, &encoded)?;
        Ok(self)
    }

    /// Remove and decode the top word.
    pub fn pop(&mut self) -> Result<Value> {
        if self.bytes.len() < self.word_size {
            return Err(Error::IndexOutOfBounds {
                index: 0,
                len: self.len(),
            });
        }
        let top = self.bytes.read(0, self.word_size)?;
        let value = self.word.unpack(&top)?;
        self.bytes.splice(0, self.word_size, &[])?;
        Ok(value)
    }

    fn offset_of(&self, index: isize) -> Result<usize> {
        let size = self.bytes.len();
        let offset = if index >= 0 {
            index.unsigned_abs().checked_mul(self.word_size)
        } else {
            size.checked_sub(index.unsigned_abs())
        };
        offset
            .filter(|&o| o.checked_add(self.word_size).is_some_and(|end| end <= size))
            .ok_or(Error::IndexOutOfBounds {
                index: index as i64,
                len: self.len(),
            })
    }

    /// Word at `index` (see the type docs for negative indices).
    pub fn get(&self, index: isize) -> Result<Value> {
        let offset = self.offset_of(index)?;
        self.word.unpack(&self.bytes.read(offset, self.word_size)?)
    }

    pub fn set(&self, index: isize, value: impl Into<Value>) -> Result<()> {
        let offset = self.offset_of(index)?;
        let encoded = self.word.pack(&value.into())?;
        self.bytes.write(offset, &encoded)
    }

    /// Words from the top down.
    pub fn iter(&self) -> impl Iterator<Item = Result<Value>> + '_ {
        (0..self.len()).map(move |i| self.get(i as isize))
    }
}

impl Memory for Stack {
    fn bytes(&self) -> &ByteSlice {
        &self.bytes
    }
}
