// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use cbinary::ctypes::StructBuilder;
use cbinary::{Memory, StructView};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(layout) = StructBuilder::packet("Frame")
        .member("kind", "uint8")
        .member("len", "uint16")
        .member("words", ("uint32", 2))
        .member("payload", "uint16..")
        .build()
    else {
        return;
    };

    // Short inputs must be rejected, never panic
    let Ok(view) = StructView::from_bytes(&layout, data) else {
        return;
    };
    let _ = view.to_value();
    if let Ok(payload) = view.get("payload") {
        if let Some(array) = payload.as_array() {
            let _ = array.to_values();
            let _ = array.get(array.len() as isize);
        }
    }

    // Re-encoding the decoded value reproduces the fixed part
    if let Ok(value) = view.to_value() {
        if let Ok(bytes) = layout.pack(&value) {
            assert_eq!(&bytes[..layout.size()], &view.to_bytes()[..layout.size()]);
        }
    }
});
