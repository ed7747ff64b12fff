// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use cbinary::{Buffer, Signature, TypeSystem};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Fuzz signature parsing and resolution
    let _ = Signature::parse(text);
    let types = TypeSystem::native();
    if let Ok(ty) = types.resolve(text) {
        let buffer = Buffer::new(64);
        let _ = buffer.get(text, 0);
        let _ = ty.size();
    }
});
