// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder for struct and union layouts.

use crate::ctypes::{AggregateKind, Endian, Platform, Signature, StructType, TypeSystem};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Builder for [`StructType`] schemas.
///
/// Members are resolved against the builder's platform (or an explicit
/// [`TypeSystem`] carrying custom typedefs) when [`build`](Self::build) runs.
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    kind: AggregateKind,
    members: Vec<(String, Signature)>,
    parent: Option<Arc<StructType>>,
    platform: Option<Platform>,
    types: Option<TypeSystem>,
    align: Option<usize>,
    padding: Option<bool>,
}

impl StructBuilder {
    /// Start a struct schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, AggregateKind::Struct)
    }

    /// Start a union schema; every member sits at offset 0.
    pub fn union(name: impl Into<String>) -> Self {
        Self::with_kind(name, AggregateKind::Union)
    }

    /// Wire-format preset: network byte order, alignment 1, no padding.
    pub fn packet(name: impl Into<String>) -> Self {
        Self::new(name)
            .platform(Platform::native().with_endian(Endian::NETWORK))
            .align(1)
            .padding(false)
    }

    fn with_kind(name: impl Into<String>, kind: AggregateKind) -> Self {
        Self {
            name: name.into(),
            kind,
            members: Vec::new(),
            parent: None,
            platform: None,
            types: None,
            align: None,
            padding: None,
        }
    }

    /// Declare a member.
    pub fn member(mut self, name: impl Into<String>, signature: impl Into<Signature>) -> Self {
        self.members.push((name.into(), signature.into()));
        self
    }

    /// Inherit the members and settings of `parent`.
    ///
    /// Settings given explicitly on this builder take precedence. Inherited
    /// members keep the types they were resolved with.
    pub fn extends(mut self, parent: &Arc<StructType>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Resolve members through `types` (its platform plus its typedefs).
    pub fn types(mut self, types: &TypeSystem) -> Self {
        self.platform = Some(types.platform());
        self.types = Some(types.clone());
        self
    }

    /// Force every member (and the aggregate) to `align` bytes.
    pub fn align(mut self, align: usize) -> Self {
        self.align = Some(align);
        self
    }

    /// Disable to pack members back to back.
    pub fn padding(mut self, padding: bool) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Resolve all members and compute the layout.
    pub fn build(self) -> Result<Arc<StructType>> {
        let parent = self.parent.as_deref();
        if let Some(parent) = parent {
            if parent.kind() != self.kind {
                return Err(Error::InvalidArgument(format!(
                    "{} {} cannot extend {}",
                    self.kind, self.name, parent
                )));
            }
        }

        let platform = self
            .platform
            .or_else(|| parent.map(StructType::platform))
            .unwrap_or_else(Platform::native);
        let align = self.align.or_else(|| parent.and_then(StructType::align_override));
        let padding = self
            .padding
            .or_else(|| parent.map(StructType::padding))
            .unwrap_or(true);
        let types = match self.types {
            Some(types) => types,
            None => TypeSystem::for_platform(platform),
        };

        let mut members: Vec<_> = parent
            .map(|p| {
                p.members()
                    .iter()
                    .map(|m| (m.name().to_string(), m.ty().clone()))
                    .collect()
            })
            .unwrap_or_default();
        for (name, signature) in &self.members {
            let ty = types.resolve_signature(signature)?;
            members.push((name.clone(), ty));
        }

        StructType::layout(self.name, self.kind, members, align, padding, platform).map(Arc::new)
    }
}
