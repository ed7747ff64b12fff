// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Platform keys selecting a type table: byte order, architecture, OS.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Byte order of multi-byte integers and floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Network byte order.
    pub const NETWORK: Endian = Endian::Big;

    /// Byte order of the host this crate was compiled for.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// Type-name suffix for this byte order.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Little => "le",
            Self::Big => "be",
        }
    }
}

impl FromStr for Endian {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "little" | "le" => Ok(Self::Little),
            "big" | "be" => Ok(Self::Big),
            "net" | "network" => Ok(Self::NETWORK),
            _ => Err(Error::UnknownPlatform {
                kind: "endian",
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Little => "little",
            Self::Big => "big",
        })
    }
}

/// Target architecture.
///
/// Decides the width of `long`, `pointer` and `machine_word`, and the
/// default byte order of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Ppc,
    Ppc64,
    Mips,
    MipsLe,
    MipsBe,
    Mips64,
    Mips64Le,
    Mips64Be,
    Arm,
    ArmLe,
    ArmBe,
    Arm64,
    Arm64Le,
    Arm64Be,
}

impl Arch {
    pub const ALL: [Arch; 16] = [
        Self::X86,
        Self::X86_64,
        Self::Ppc,
        Self::Ppc64,
        Self::Mips,
        Self::MipsLe,
        Self::MipsBe,
        Self::Mips64,
        Self::Mips64Le,
        Self::Mips64Be,
        Self::Arm,
        Self::ArmLe,
        Self::ArmBe,
        Self::Arm64,
        Self::Arm64Le,
        Self::Arm64Be,
    ];

    /// Machine word / pointer width in bytes.
    pub const fn word_size(self) -> usize {
        match self {
            Self::X86 | Self::Ppc | Self::Mips | Self::MipsLe | Self::MipsBe => 4,
            Self::Arm | Self::ArmLe | Self::ArmBe => 4,
            _ => 8,
        }
    }

    /// Byte order the architecture uses when none is requested.
    pub const fn endian(self) -> Endian {
        match self {
            Self::X86 | Self::X86_64 => Endian::Little,
            Self::Ppc | Self::Ppc64 => Endian::Big,
            Self::Mips | Self::MipsBe | Self::Mips64 | Self::Mips64Be => Endian::Big,
            Self::MipsLe | Self::Mips64Le => Endian::Little,
            Self::Arm | Self::ArmLe | Self::Arm64 | Self::Arm64Le => Endian::Little,
            Self::ArmBe | Self::Arm64Be => Endian::Big,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Ppc => "ppc",
            Self::Ppc64 => "ppc64",
            Self::Mips => "mips",
            Self::MipsLe => "mips_le",
            Self::MipsBe => "mips_be",
            Self::Mips64 => "mips64",
            Self::Mips64Le => "mips64_le",
            Self::Mips64Be => "mips64_be",
            Self::Arm => "arm",
            Self::ArmLe => "arm_le",
            Self::ArmBe => "arm_be",
            Self::Arm64 => "arm64",
            Self::Arm64Le => "arm64_le",
            Self::Arm64Be => "arm64_be",
        }
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "amd64" | "ia64" => return Ok(Self::X86_64),
            "i386" | "i686" => return Ok(Self::X86),
            "aarch64" => return Ok(Self::Arm64),
            _ => {}
        }
        Self::ALL
            .iter()
            .copied()
            .find(|arch| arch.name() == s)
            .ok_or_else(|| Error::UnknownPlatform {
                kind: "arch",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operating system whose C typedefs and `long` width apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Unix,
    Bsd,
    FreeBsd,
    OpenBsd,
    NetBsd,
    Linux,
    MacOs,
    Windows,
    Android,
    AppleIos,
}

impl Os {
    pub const ALL: [Os; 10] = [
        Self::Unix,
        Self::Bsd,
        Self::FreeBsd,
        Self::OpenBsd,
        Self::NetBsd,
        Self::Linux,
        Self::MacOs,
        Self::Windows,
        Self::Android,
        Self::AppleIos,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Unix => "unix",
            Self::Bsd => "bsd",
            Self::FreeBsd => "freebsd",
            Self::OpenBsd => "openbsd",
            Self::NetBsd => "netbsd",
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Android => "android",
            Self::AppleIos => "apple_ios",
        }
    }

    /// Width of `long`/`ulong` given the architecture word size.
    ///
    /// Windows is LLP64: `long` stays 4 bytes on 64-bit targets.
    pub const fn long_size(self, word_size: usize) -> usize {
        match self {
            Self::Windows => 4,
            _ => word_size,
        }
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "darwin" | "osx" => return Ok(Self::MacOs),
            "win32" => return Ok(Self::Windows),
            "ios" => return Ok(Self::AppleIos),
            _ => {}
        }
        Self::ALL
            .iter()
            .copied()
            .find(|os| os.name() == s)
            .ok_or_else(|| Error::UnknownPlatform {
                kind: "os",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full platform selection. Unset keys fall back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Platform {
    pub endian: Option<Endian>,
    pub arch: Option<Arch>,
    pub os: Option<Os>,
}

impl Platform {
    /// The host platform (native byte order and word size, no OS typedefs).
    pub const fn native() -> Self {
        Self {
            endian: None,
            arch: None,
            os: None,
        }
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = Some(endian);
        self
    }

    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = Some(arch);
        self
    }

    pub fn with_os(mut self, os: Os) -> Self {
        self.os = Some(os);
        self
    }

    /// Parse optional textual keys; unknown keys fail with `UnknownPlatform`.
    pub fn parse(endian: Option<&str>, arch: Option<&str>, os: Option<&str>) -> Result<Self> {
        Ok(Self {
            endian: endian.map(str::parse::<Endian>).transpose()?,
            arch: arch.map(str::parse::<Arch>).transpose()?,
            os: os.map(str::parse::<Os>).transpose()?,
        })
    }

    /// Effective byte order: explicit endian, then arch default, then host.
    pub fn byte_order(&self) -> Endian {
        self.endian
            .or_else(|| self.arch.map(Arch::endian))
            .unwrap_or_else(Endian::native)
    }

    /// Effective machine word width.
    pub fn word_size(&self) -> usize {
        self.arch
            .map(Arch::word_size)
            .unwrap_or(std::mem::size_of::<usize>())
    }

    /// Effective `long` width.
    pub fn long_size(&self) -> usize {
        let word = self.word_size();
        match self.os {
            Some(os) => os.long_size(word),
            None => word,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "endian={} arch={} os={}",
            self.endian.map_or("native".to_string(), |e| e.to_string()),
            self.arch.map_or("native", Arch::name),
            self.os.map_or("none", Os::name),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        let platform = Platform::parse(Some("net"), Some("amd64"), Some("windows")).unwrap();
        assert_eq!(platform.endian, Some(Endian::Big));
        assert_eq!(platform.arch, Some(Arch::X86_64));
        assert_eq!(platform.os, Some(Os::Windows));
        assert_eq!(platform.long_size(), 4);
        assert_eq!(platform.word_size(), 8);
    }

    #[test]
    fn test_parse_unknown_keys() {
        match Platform::parse(None, Some("z80"), None) {
            Err(Error::UnknownPlatform { kind, name }) => {
                assert_eq!(kind, "arch");
                assert_eq!(name, "z80");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!("middle".parse::<Endian>().is_err());
        assert!("plan9".parse::<Os>().is_err());
    }

    #[test]
    fn test_arch_default_byte_order() {
        assert_eq!(Arch::Arm.endian(), Endian::Little);
        assert_eq!(Arch::Mips.endian(), Endian::Big);
        assert_eq!(Arch::MipsLe.endian(), Endian::Little);
        assert_eq!(Arch::Arm64Be.endian(), Endian::Big);

        let platform = Platform::native().with_arch(Arch::Ppc);
        assert_eq!(platform.byte_order(), Endian::Big);
        let platform = platform.with_endian(Endian::Little);
        assert_eq!(platform.byte_order(), Endian::Little);
    }

    #[test]
    fn test_names_roundtrip_through_from_str() {
        for arch in Arch::ALL {
            assert_eq!(arch.name().parse::<Arch>().unwrap(), arch);
        }
        for os in Os::ALL {
            assert_eq!(os.name().parse::<Os>().unwrap(), os);
        }
    }
}
