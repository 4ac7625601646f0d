// Wavstream -- A streaming RIFF/WAVE container library in Rust
// Copyright 2026 The Wavstream Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

#![no_main]

extern crate libfuzzer_sys;
extern crate wavstream;

use std::io::Cursor;

#[export_name="rust_fuzzer_test_input"]
pub extern fn go(data: &[u8]) {
    let cursor = Cursor::new(data);
    let mut reader = match wavstream::WavReader::new(cursor) {
        Ok(r) => r,
        Err(..) => return,
    };

    let mut buf = [0u8; 512];
    loop {
        match reader.read_data(&mut buf) {
            Ok(0) => break,
            Ok(..) => { }
            Err(..) => return,
        }
    }

    reader.close();
    assert!(reader.read_data(&mut buf).is_err());
}
