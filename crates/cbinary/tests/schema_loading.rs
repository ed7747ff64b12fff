// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Loading struct schemas from YAML files.

#![cfg(feature = "schema-loaders")]

use cbinary::memory::Memory;
use cbinary::{Buffer, Endian, Error, SchemaRegistry, StructView, Value};
use std::io::Write;

const SCHEMA: &str = r#"
platform:
  endian: big
  arch: x86_64
  os: linux

typedefs:
  seq_t: uint32

structs:
  - name: EthHeader
    padding: false
    members:
      - { name: dst, type: "uint8[6]" }
      - { name: src, type: "uint8[6]" }
      - { name: ethertype, type: uint16 }
  - name: Frame
    extends: EthHeader
    members:
      - { name: seq, type: seq_t }
      - { name: payload, type: "uint8.." }
  - name: Aligned
    align: 8
    members:
      - { name: a, type: uint8 }
      - { name: b, type: uint8 }
"#;

fn load() -> SchemaRegistry {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(SCHEMA.as_bytes()).expect("write schema");
    file.flush().expect("flush");
    SchemaRegistry::load_from_file(file.path()).expect("schema should load")
}

#[test]
fn test_load_from_file() {
    let registry = load();
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("Frame"));
    assert_eq!(registry.types().platform().endian, Some(Endian::Big));

    let header = registry.get("EthHeader").expect("header");
    assert_eq!(header.size(), 14);

    let frame = registry.get("Frame").expect("frame");
    assert_eq!(frame.offset_of("seq").expect("seq"), 14);
    assert_eq!(frame.offset_of("payload").expect("payload"), 18);

    let aligned = registry.get("Aligned").expect("aligned");
    assert_eq!(aligned.offset_of("b").expect("b"), 8);
    assert_eq!(aligned.size(), 16);
}

#[test]
fn test_loaded_layout_drives_views() {
    let registry = load();
    let frame = registry.get("Frame").expect("frame");

    let mut wire = vec![0xFFu8; 6];
    wire.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
    wire.extend_from_slice(&[0x08, 0x00]);
    wire.extend_from_slice(&[0, 0, 0, 42]);
    wire.extend_from_slice(b"data");

    let view = StructView::from_bytes(&frame, &wire).expect("view");
    assert_eq!(view.value("ethertype").expect("ethertype"), Value::UInt(0x0800));
    assert_eq!(view.value("seq").expect("seq"), Value::UInt(42));
    assert_eq!(view.size_of("payload").expect("payload"), 4);

    // struct names resolve through the registry's type system
    let buffer = Buffer::with_types(32, registry.types().clone());
    buffer.copy_from(0, &wire).expect("copy");
    let header = buffer.get("EthHeader", 0).expect("decode header");
    assert_eq!(
        header.get_field("src"),
        Some(&Value::from(vec![1u8, 2, 3, 4, 5, 6]))
    );
    assert_eq!(buffer.size(), 32);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.yaml");
    assert!(matches!(
        SchemaRegistry::load_from_file(&missing),
        Err(Error::Io(_))
    ));
}
