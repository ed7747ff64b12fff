// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-platform type tables.
//!
//! Each table is one flat name -> descriptor map composed in a fixed order:
//!
//! 1. byte-sized names (`char`, `uint8`, `bool`, `string`, ...)
//! 2. multi-byte names in the table's byte order (explicit endian, else the
//!    arch default, else the host)
//! 3. `_le` / `_be` / `_ne` / `_net` aliases of every multi-byte name
//! 4. OS typedefs (`size_t`, `off_t`, ...) when an OS is selected
//!
//! Tables are built once per [`Platform`] and shared afterwards.

use crate::ctypes::{Endian, FloatType, IntType, Os, Platform, ScalarType, Type};
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static TABLES: OnceLock<DashMap<Platform, Arc<TypeTable>>> = OnceLock::new();

/// Fetch (building on first use) the table for `platform`.
pub fn types(platform: Platform) -> Arc<TypeTable> {
    let tables = TABLES.get_or_init(DashMap::new);
    if let Some(table) = tables.get(&platform) {
        return table.clone();
    }
    tables
        .entry(platform)
        .or_insert_with(|| Arc::new(TypeTable::build(platform)))
        .clone()
}

/// Symbolic name -> type descriptor map for one platform.
#[derive(Debug, Clone)]
pub struct TypeTable {
    platform: Platform,
    entries: HashMap<String, Type>,
}

impl TypeTable {
    /// Compose a table for `platform`. Prefer [`types`], which caches.
    pub fn build(platform: Platform) -> Self {
        let byte_order = platform.byte_order();
        let word = platform.word_size();
        let long = platform.long_size();
        let mut entries = HashMap::new();

        for (name, ty) in byte_sized() {
            entries.insert(name.to_string(), Type::Scalar(ty));
        }
        let numeric = multi_byte(word, long);
        for (name, ty) in &numeric {
            entries.insert(name.to_string(), Type::Scalar(ty.with_endian(byte_order)));
        }
        for (suffix, endian) in [
            ("le", Endian::Little),
            ("be", Endian::Big),
            ("ne", Endian::NETWORK),
            ("net", Endian::NETWORK),
        ] {
            for (name, ty) in &numeric {
                entries.insert(
                    format!("{}_{}", name, suffix),
                    Type::Scalar(ty.with_endian(endian)),
                );
            }
        }
        if let Some(os) = platform.os {
            for (name, size, signed) in os_typedefs(os, word, long) {
                entries.insert(
                    name.to_string(),
                    Type::Scalar(ScalarType::Int(IntType::sized(size, signed, byte_order))),
                );
            }
        }

        log::debug!(
            "[ctypes] built type table ({}): {} names, byte order {}",
            platform,
            entries.len(),
            byte_order
        );
        Self { platform, entries }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Look up a name, failing with `UnknownType`.
    pub fn get(&self, name: &str) -> Result<Type> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All names in the table, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All scalar entries, for exhaustive checks.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, &ScalarType)> {
        self.entries
            .iter()
            .filter_map(|(name, ty)| ty.as_scalar().map(|s| (name.as_str(), s)))
    }
}

const fn int(size: usize, signed: bool) -> ScalarType {
    // byte order is patched in by the table
    ScalarType::Int(IntType::sized(size, signed, Endian::Little))
}

const fn float(size: usize) -> ScalarType {
    ScalarType::Float(FloatType::sized(size, Endian::Little))
}

fn byte_sized() -> [(&'static str, ScalarType); 7] {
    [
        ("char", ScalarType::Char { signed: true }),
        ("uchar", ScalarType::Char { signed: false }),
        ("byte", int(1, false)),
        ("int8", int(1, true)),
        ("uint8", int(1, false)),
        ("bool", ScalarType::Bool),
        ("string", ScalarType::String),
    ]
}

fn multi_byte(word: usize, long: usize) -> Vec<(&'static str, ScalarType)> {
    vec![
        ("int16", int(2, true)),
        ("uint16", int(2, false)),
        ("int32", int(4, true)),
        ("uint32", int(4, false)),
        ("int64", int(8, true)),
        ("uint64", int(8, false)),
        ("short", int(2, true)),
        ("ushort", int(2, false)),
        ("int", int(4, true)),
        ("uint", int(4, false)),
        ("long", int(long, true)),
        ("ulong", int(long, false)),
        ("long_long", int(8, true)),
        ("ulong_long", int(8, false)),
        ("float32", float(4)),
        ("float64", float(8)),
        ("float", float(4)),
        ("double", float(8)),
        ("word", int(2, false)),
        ("dword", int(4, false)),
        ("qword", int(8, false)),
        ("machine_word", int(word, false)),
        ("pointer", int(word, false)),
    ]
}

/// `(name, size, signed)` typedefs for an OS family.
fn os_typedefs(os: Os, word: usize, long: usize) -> Vec<(&'static str, usize, bool)> {
    let bsd_like = matches!(
        os,
        Os::Bsd | Os::FreeBsd | Os::OpenBsd | Os::NetBsd | Os::MacOs | Os::AppleIos
    );
    let mut defs = vec![
        ("size_t", word, false),
        ("ssize_t", word, true),
        ("ptrdiff_t", word, true),
        ("intptr_t", word, true),
        ("uintptr_t", word, false),
        ("pid_t", 4, true),
        ("uid_t", 4, false),
        ("gid_t", 4, false),
    ];
    match os {
        Os::Windows => defs.extend([
            ("off_t", 4, true),
            ("time_t", 8, true),
            ("mode_t", 2, false),
            ("dev_t", 4, false),
            ("ino_t", 2, false),
        ]),
        _ if bsd_like => {
            // Darwin and OpenBSD keep a signed 32-bit dev_t
            let narrow_dev = matches!(os, Os::MacOs | Os::AppleIos | Os::OpenBsd);
            let dev_t = if narrow_dev { (4, true) } else { (8, false) };
            defs.extend([
                ("off_t", 8, true),
                ("time_t", long, true),
                ("mode_t", 2, false),
                ("dev_t", dev_t.0, dev_t.1),
                ("ino_t", 8, false),
            ]);
        }
        _ => defs.extend([
            ("off_t", long, true),
            ("time_t", long, true),
            ("mode_t", 4, false),
            ("dev_t", 8, false),
            ("ino_t", long, false),
        ]),
    }
    defs
}
