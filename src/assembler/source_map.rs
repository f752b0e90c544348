//! Source model: program lines and the bidirectional mapping between source lines
//! and instruction-unit addresses

use crate::assembler::lexer;
use crate::ExecutionError;

/// The loaded program text plus its instruction-unit map
///
/// Every word on a line is one instruction unit. Units are numbered in source order
/// starting at 0, so each line owns a contiguous (possibly empty) address range.
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Program lines, without line terminators
    lines: Vec<String>,

    /// Forward map: unit address → source location
    units: Vec<Unit>,

    /// Reverse map: line number → unit address range
    line_units: Vec<AddressRange>,
}

/// One instruction unit (a word of the source)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// The word as written
    pub word: String,

    /// Where the word sits in the source
    pub location: SourceLocation,
}

/// A location in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (0-indexed)
    pub line: usize,

    /// Column where the word starts (0-indexed)
    pub column: usize,

    /// Length of the word in source characters
    pub length: usize,
}

/// A range of instruction-unit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    /// Starting address (inclusive)
    pub start: usize,

    /// Ending address (exclusive)
    pub end: usize,
}

impl AddressRange {
    /// True if the range holds no units
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True if `address` falls inside the range
    pub fn contains(&self, address: usize) -> bool {
        (self.start..self.end).contains(&address)
    }
}

impl SourceMap {
    /// Build the source model for a program text
    pub fn new(source: &str) -> Self {
        let lines = lexer::split_lines(source);
        let mut units = Vec::new();
        let mut line_units = Vec::with_capacity(lines.len());

        for (line_number, text) in lines.iter().enumerate() {
            let start = units.len();
            for word in lexer::words(text) {
                units.push(Unit {
                    word: word.text.to_string(),
                    location: SourceLocation {
                        line: line_number,
                        column: word.column,
                        length: word.text.len(),
                    },
                });
            }
            line_units.push(AddressRange {
                start,
                end: units.len(),
            });
        }

        Self {
            lines,
            units,
            line_units,
        }
    }

    /// Number of lines in the program (and cells in its memory)
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of line `line`
    pub fn line(&self, line: usize) -> Result<&str, ExecutionError> {
        self.lines
            .get(line)
            .map(String::as_str)
            .ok_or(ExecutionError::OutOfRange { line })
    }

    /// All lines in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Total number of instruction units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Get the unit at an instruction address
    pub fn unit(&self, address: usize) -> Option<&Unit> {
        self.units.get(address)
    }

    /// Get source location for a given instruction address
    pub fn get_source_location(&self, address: usize) -> Option<SourceLocation> {
        self.units.get(address).map(|unit| unit.location)
    }

    /// Get address range for a given source line
    ///
    /// Lines past the end of the program map to the empty range at the end of the
    /// unit space, so "one past the last line" is a valid position.
    pub fn get_address_range(&self, line: usize) -> AddressRange {
        self.line_units.get(line).copied().unwrap_or(AddressRange {
            start: self.units.len(),
            end: self.units.len(),
        })
    }

    /// Columns of the words on `line` longer than `min_len` characters
    pub fn breakpoint_columns(&self, line: usize, min_len: usize) -> Vec<usize> {
        let range = self.get_address_range(line);
        self.units[range.start..range.end]
            .iter()
            .filter(|unit| unit.word.len() > min_len)
            .map(|unit| unit.location.column)
            .collect()
    }
}
