//! Fuzz target for the instruction-unit map and disassembler.
//!
//! Checks that every listed unit maps back to the line whose address range
//! contains it.

#![no_main]

use lc2k::assembler::source_map::SourceMap;
use lc2k::disassemble;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);
    let map = SourceMap::new(&source);

    for unit in disassemble(&map, 0, map.unit_count()) {
        let range = map.get_address_range(unit.location.line);
        assert!(range.contains(unit.address));
        assert_eq!(map.get_source_location(unit.address), Some(unit.location));
    }
});
