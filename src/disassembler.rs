//! Instruction-Unit Disassembler
//!
//! Lists the instruction units of a loaded program (every word of the source is one
//! addressable unit) for debugger disassembly views and instruction breakpoints.

pub mod formatter;

use crate::assembler::source_map::{SourceLocation, SourceMap};

/// A single instruction unit with its source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionUnit {
    /// Instruction-unit address
    pub address: usize,

    /// The word as written in the source
    pub word: String,

    /// Where the word sits in the source
    pub location: SourceLocation,
}

/// Disassemble up to `count` units starting at `start`
///
/// Addresses past the last unit are simply not listed.
///
/// # Examples
///
/// ```
/// use lc2k::assembler::source_map::SourceMap;
/// use lc2k::disassemble;
///
/// let map = SourceMap::new("start\tlw\t0\t1\tten\n\thalt");
/// let units = disassemble(&map, 1, 10);
///
/// let words: Vec<&str> = units.iter().map(|u| u.word.as_str()).collect();
/// assert_eq!(words, vec!["lw", "ten", "halt"]);
/// assert_eq!(units[2].location.line, 1);
/// ```
pub fn disassemble(source_map: &SourceMap, start: usize, count: usize) -> Vec<InstructionUnit> {
    (start..start.saturating_add(count))
        .map_while(|address| {
            source_map.unit(address).map(|unit| InstructionUnit {
                address,
                word: unit.word.clone(),
                location: unit.location,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_empty() {
        let map = SourceMap::new("  1 2 3");
        assert!(disassemble(&map, 0, 16).is_empty());
    }

    #[test]
    fn test_disassemble_past_end() {
        let map = SourceMap::new("\tnoop");
        assert_eq!(disassemble(&map, 0, usize::MAX).len(), 1);
        assert!(disassemble(&map, 5, 3).is_empty());
    }
}
