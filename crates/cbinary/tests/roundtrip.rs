// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Randomised round-trips over every scalar entry of several type tables.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use cbinary::ctypes::{types, Arch, Endian, Os, Platform, ScalarType};
use cbinary::memory::Memory;
use cbinary::{Buffer, TypeSystem, Value};

const SAMPLES: usize = 64;

fn platforms() -> Vec<Platform> {
    vec![
        Platform::native(),
        Platform::native().with_endian(Endian::Big),
        Platform::native().with_arch(Arch::X86),
        Platform::native().with_arch(Arch::Ppc64).with_os(Os::Linux),
        Platform::native().with_arch(Arch::X86_64).with_os(Os::Windows),
    ]
}

fn random_value(rng: &mut fastrand::Rng, ty: &ScalarType) -> Option<Value> {
    Some(match ty {
        ScalarType::Int(int) => {
            let bits = rng.u64(..);
            let shift = 64 - (int.size() as u32 * 8);
            if int.is_signed() {
                Value::Int(((bits << shift) as i64) >> shift)
            } else {
                Value::UInt((bits << shift) >> shift)
            }
        }
        ScalarType::Float(f) if f.size() == 4 => Value::Float(f64::from(rng.f32() * 1.0e6 - 5.0e5)),
        ScalarType::Float(_) => Value::Float(rng.f64() * 1.0e12 - 5.0e11),
        ScalarType::Char { .. } => Value::Char(rng.u8(..)),
        ScalarType::Bool => Value::Bool(rng.bool()),
        ScalarType::String => return None,
    })
}

#[test]
fn test_scalar_roundtrip_random() {
    let mut rng = fastrand::Rng::with_seed(0x5EED);
    for platform in platforms() {
        let table = types(platform);
        for (name, ty) in table.scalars() {
            for _ in 0..SAMPLES {
                let Some(value) = random_value(&mut rng, ty) else {
                    continue;
                };
                let mut bytes = Vec::new();
                ty.encode(&value, &mut bytes).expect("encode");
                assert_eq!(Some(bytes.len()), ty.size(), "{} ({})", name, platform);
                assert_eq!(ty.decode(&bytes).expect("decode"), value, "{} ({})", name, platform);
            }
        }
    }
}

#[test]
fn test_integer_boundaries_roundtrip() {
    let table = types(Platform::native());
    for (name, ty) in table.scalars() {
        let ScalarType::Int(int) = ty else { continue };
        for bound in [int.min(), int.max()] {
            let value = if int.is_signed() {
                Value::Int(bound as i64)
            } else {
                Value::UInt(bound as u64)
            };
            let mut bytes = Vec::new();
            ty.encode(&value, &mut bytes).expect("encode");
            assert_eq!(ty.decode(&bytes).expect("decode"), value, "{}", name);
        }
        // one past max wraps to min
        let past = Value::Int((int.max() + 1) as i64);
        let mut bytes = Vec::new();
        ty.encode(&past, &mut bytes).expect("encode");
        let wrapped = ty.decode(&bytes).expect("decode");
        if int.is_signed() {
            assert_eq!(wrapped, Value::Int(int.min() as i64), "{}", name);
        } else {
            assert_eq!(wrapped, Value::UInt(0), "{}", name);
        }
    }
}

#[test]
fn test_buffer_roundtrip_random_offsets() {
    let mut rng = fastrand::Rng::with_seed(7);
    let types = TypeSystem::for_platform(Platform::native().with_endian(Endian::Big));
    let buffer = Buffer::with_types(64, types);
    for _ in 0..SAMPLES {
        let offset = rng.usize(..=56);
        let value = rng.u64(..);
        buffer.put_uint64(offset, value).expect("put");
        assert_eq!(buffer.get_uint64(offset).expect("get"), value);
        assert_eq!(
            buffer.to_bytes()[offset..offset + 8],
            value.to_be_bytes()
        );
    }
}
