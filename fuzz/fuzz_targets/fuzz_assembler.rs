//! Fuzz target for the program loader.
//!
//! This target feeds arbitrary strings to the loader and decoder to find
//! edge cases and panics in label collection and `.fill` evaluation.

#![no_main]

use lc2k::{assemble, decode_line, MemoryBus};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    if let Ok(program) = assemble(&source) {
        // Memory always matches the line count
        assert_eq!(program.memory.size(), program.line_count());

        for line in 0..program.line_count() {
            let _ = program.decode(line);
        }
    }

    for line in source.lines() {
        let _ = decode_line(line);
    }
});
