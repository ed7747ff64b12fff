// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # cbinary - virtual C types over byte buffers
//!
//! Describe C scalars, arrays, structs and unions at runtime, parameterised by
//! byte order, architecture and OS, and read or write them directly against
//! byte buffers. No C compiler and no header parsing involved.
//!
//! ## Quick Start
//!
//! ```rust
//! use cbinary::ctypes::StructBuilder;
//! use cbinary::memory::{Memory, StructView};
//! use cbinary::Value;
//!
//! let layout = StructBuilder::new("Counted")
//!     .member("count", "uint8")
//!     .member("values", ("uint16_le", 3))
//!     .padding(false)
//!     .build()?;
//!
//! let view = StructView::new(&layout)?;
//! view.set("count", 2u8)?;
//! view.set("values", [1u16, 2, 3])?;
//! assert_eq!(view.to_bytes(), b"\x02\x01\x00\x02\x00\x03\x00");
//!
//! let values = view.get("values")?;
//! assert_eq!(values.as_array().unwrap().value(1)?, Value::UInt(2));
//! # Ok::<(), cbinary::Error>(())
//! ```
//!
//! ## Layers
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  memory   Buffer | ArrayView | StructView | UnionView | ...    |
//! +---------------------------------------------------------------+
//! |  ctypes   TypeSystem -> Signature -> Type (pack / unpack)      |
//! |           TypeTable per Platform (endian, arch, os)           |
//! +---------------------------------------------------------------+
//! |  memory   ByteSlice over a shared Store                       |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Layout policy
//!
//! With padding (the default) every member starts at the previous member's
//! end rounded up to its own alignment, or to the struct-wide alignment when
//! one is set, and the struct size is rounded up to the struct alignment.
//! Without padding members are packed back to back and the size is not
//! rounded. Either way the alignment is the override, else the largest
//! member alignment. Unions place every member at offset 0 and are as large
//! as their largest member.
//!
//! ## Features
//!
//! - `schema-loaders` (default): load struct schemas from YAML documents.

pub mod config;
pub mod ctypes;
pub mod error;
pub mod memory;
pub mod value;

pub use config::PlatformConfig;
#[cfg(feature = "schema-loaders")]
pub use config::SchemaRegistry;
pub use ctypes::{Arch, Endian, Os, Platform, Signature, StructBuilder, StructType, Type, TypeSystem};
pub use error::{Error, Result};
pub use memory::{
    ArrayView, Buffer, ByteSlice, CString, Element, Memory, Stack, StructView, UnionView,
};
pub use value::Value;
