// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime configuration: platform selection from the environment, and
//! (with `schema-loaders`) struct schemas from YAML documents.
//!
//! # Environment
//!
//! | Variable | Values |
//! |---|---|
//! | `CBINARY_ENDIAN` | `little`, `big`, `net` |
//! | `CBINARY_ARCH` | `x86`, `x86_64`, `arm64`, ... |
//! | `CBINARY_OS` | `linux`, `windows`, `macos`, ... |

#[cfg(feature = "schema-loaders")]
mod schema;

#[cfg(feature = "schema-loaders")]
pub use schema::{MemberDecl, PlatformDecl, SchemaDocument, SchemaRegistry, StructDecl};

use crate::ctypes::{Platform, TypeSystem};
use crate::error::Result;

pub const ENV_ENDIAN: &str = "CBINARY_ENDIAN";
pub const ENV_ARCH: &str = "CBINARY_ARCH";
pub const ENV_OS: &str = "CBINARY_OS";

/// Platform selection resolved from configuration sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformConfig {
    pub platform: Platform,
}

impl PlatformConfig {
    /// Read `CBINARY_ENDIAN`, `CBINARY_ARCH` and `CBINARY_OS`.
    ///
    /// Unset variables keep the native default; set but unknown values fail
    /// with `UnknownPlatform`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_ascii_lowercase());
        let endian = value(ENV_ENDIAN);
        let arch = value(ENV_ARCH);
        let os = value(ENV_OS);
        let platform = Platform::parse(endian.as_deref(), arch.as_deref(), os.as_deref())?;
        log::debug!("[config] platform from environment: {}", platform);
        Ok(Self { platform })
    }

    pub fn type_system(&self) -> TypeSystem {
        TypeSystem::for_platform(self.platform)
    }
}
