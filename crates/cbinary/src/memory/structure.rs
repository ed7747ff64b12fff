// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct and union views.
//!
//! Both share one implementation; they differ only in the layout kind they
//! accept. Union members all alias offset 0 and carry no tag: writing one
//! member and reading another reinterprets the same bytes.

use crate::ctypes::{AggregateKind, Member, StructType};
use crate::error::{Error, Result};
use crate::memory::{read_element, sized_or_copied, write_element, ByteSlice, Element, Memory};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

macro_rules! aggregate_view {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            bytes: ByteSlice,
            layout: Arc<StructType>,
            cache: Rc<RefCell<HashMap<String, Element>>>,
        }

        impl $name {
            /// Zero-filled instance of `layout`.
            pub fn new(layout: &Arc<StructType>) -> Result<Self> {
                Self::from_slice(layout, sized_or_copied(layout.size(), None))
            }

            /// Instance over a copy of `bytes`.
            ///
            /// Bytes past the fixed size belong to the flexible array member,
            /// if the layout has one.
            pub fn from_bytes(layout: &Arc<StructType>, bytes: &[u8]) -> Result<Self> {
                Self::from_slice(layout, sized_or_copied(0, Some(bytes)))
            }

            /// Instance over `bytes` (no copy).
            pub fn from_slice(layout: &Arc<StructType>, bytes: ByteSlice) -> Result<Self> {
                if layout.kind() != $kind {
                    return Err(Error::InvalidArgument(format!(
                        "{} is not a {}",
                        layout,
                        $kind
                    )));
                }
                if bytes.len() < layout.size() {
                    return Err(Error::OffsetOutOfBounds {
                        offset: 0,
                        size: layout.size(),
                        len: bytes.len(),
                    });
                }
                Ok(Self {
                    bytes,
                    layout: layout.clone(),
                    cache: Rc::new(RefCell::new(HashMap::new())),
                })
            }

            /// Instance initialised from a `Value::Struct`.
            ///
            /// A flexible array member extends the store to hold its values.
            pub fn from_value(layout: &Arc<StructType>, value: &Value) -> Result<Self> {
                let bytes = layout.pack(value)?;
                let bytes = if bytes.len() < layout.size() {
                    let mut padded = bytes;
                    padded.resize(layout.size(), 0);
                    padded
                } else {
                    bytes
                };
                Self::from_bytes(layout, &bytes)
            }

            pub fn layout(&self) -> &Arc<StructType> {
                &self.layout
            }

            pub fn members(&self) -> &[Member] {
                self.layout.members()
            }

            pub fn has_member(&self, name: &str) -> bool {
                self.layout.has_member(name)
            }

            pub fn offset_of(&self, name: &str) -> Result<usize> {
                self.layout.offset_of(name)
            }

            /// Byte size of a member; a flexible array member reports the
            /// bytes it currently spans.
            pub fn size_of(&self, name: &str) -> Result<usize> {
                let member = self.layout.require_member(name)?;
                Ok(member
                    .size()
                    .unwrap_or_else(|| self.bytes.len().saturating_sub(member.offset())))
            }

            fn member_slice(&self, member: &Member) -> Result<ByteSlice> {
                self.bytes.byteslice(member.offset(), member.size())
            }

            /// Read a member; aggregate members come back as cached views.
            pub fn get(&self, name: &str) -> Result<Element> {
                let member = self.layout.require_member(name)?;
                if let Some(cached) = self.cache.borrow().get(name) {
                    return Ok(cached.clone());
                }
                let element = read_element(member.ty(), self.member_slice(member)?)?;
                if !matches!(element, Element::Value(_)) {
                    log::trace!("[memory] caching {}.{} view", self.layout.name(), name);
                    self.cache
                        .borrow_mut()
                        .insert(name.to_string(), element.clone());
                }
                Ok(element)
            }

            /// Decoded value of a member.
            pub fn value(&self, name: &str) -> Result<Value> {
                self.get(name)?.to_value()
            }

            /// Encode `value` into a member and drop its cached view.
            pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
                let member = self.layout.require_member(name)?;
                write_element(member.ty(), &self.member_slice(member)?, &value.into())?;
                self.cache.borrow_mut().remove(name);
                Ok(())
            }

            /// Visit `(name, element)` for every member in declaration order.
            pub fn each<F>(&self, mut f: F) -> Result<()>
            where
                F: FnMut(&str, Element),
            {
                for member in self.layout.members() {
                    f(member.name(), self.get(member.name())?);
                }
                Ok(())
            }

            /// Decode every member into ordered name/value pairs.
            pub fn to_value(&self) -> Result<Value> {
                self.bytes.with(|bytes| self.layout.unpack(bytes))?
            }

            /// Same view instance (shares its member cache).
            pub fn ptr_eq(&self, other: &$name) -> bool {
                Rc::ptr_eq(&self.cache, &other.cache)
            }
        }

        impl Memory for $name {
            fn bytes(&self) -> &ByteSlice {
                &self.bytes
            }
        }
    };
}

aggregate_view!(
    /// Struct instance laid over a byte slice.
    StructView,
    AggregateKind::Struct
);

aggregate_view!(
    /// Union instance laid over a byte slice.
    UnionView,
    AggregateKind::Union
);
