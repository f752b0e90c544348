//! Program Loader
//!
//! Turns program text into a [`Program`]: the source model, the label table, and the
//! initial memory image produced by the `.fill` directives.
//!
//! Loading is a single scan over the lines with two passes over the results:
//!
//! 1. Every line that starts in column 0 declares its first field as a label
//!    (first occurrence wins).
//! 2. Every line that decodes as a `.fill` directive stores its value in the cell at
//!    its own line. Labels resolve to their line number, so forward references work.
//!
//! Instructions are not pre-decoded: the CPU decodes a line each time it executes it.

pub mod lexer;
pub mod parser;
pub mod source_map;
pub mod symbol_table;

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::addressing::Operand;
use crate::memory::LineMemory;
use crate::ExecutionError;
use parser::{decode_line, Instruction};
use source_map::SourceMap;
use symbol_table::SymbolTable;

/// A symbol table entry mapping a label to its declaring line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Label name, case-sensitive
    pub name: String,

    /// Line on which the label is declared (also its address)
    pub line: usize,
}

/// A loaded program
#[derive(Debug, Clone)]
pub struct Program {
    /// Program lines and instruction-unit map
    pub source_map: SourceMap,

    /// Label declarations
    pub symbol_table: SymbolTable,

    /// Memory image after `.fill` evaluation; copied into the CPU on every run
    pub memory: LineMemory,
}

impl Program {
    /// Number of lines (and memory cells)
    pub fn line_count(&self) -> usize {
        self.source_map.line_count()
    }

    /// Decode the instruction on `line`
    pub fn decode(&self, line: usize) -> Result<Instruction, ExecutionError> {
        let text = self.source_map.line(line)?;
        decode_line(text).map(|decoded| decoded.instruction)
    }
}

/// Errors that prevent a program from loading
#[derive(Debug, Error)]
pub enum LoadError {
    /// A `.fill` directive references a label that is never declared
    #[error("line {line}: unresolved label `{name}` in .fill")]
    UnresolvedLabel { name: String, line: usize },

    /// The program file could not be read
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load program text
///
/// # Examples
///
/// ```
/// use lc2k::{assemble, MemoryBus};
///
/// let program = assemble("\tlw\t0\t1\tfive\n\thalt\nfive\t.fill\t5\nptr\t.fill\tfive").unwrap();
///
/// assert_eq!(program.line_count(), 4);
/// assert_eq!(program.symbol_table.line_of("five"), Some(2));
/// assert_eq!(program.memory.peek(2), Some(5));
/// assert_eq!(program.memory.peek(3), Some(2)); // a label stores its line number
/// assert_eq!(program.memory.peek(0), None);
/// ```
pub fn assemble(source: &str) -> Result<Program, LoadError> {
    let source_map = SourceMap::new(source);
    let mut symbol_table = SymbolTable::new();

    // Pass 1: label declarations
    for (line, text) in source_map.lines().iter().enumerate() {
        if lexer::is_indented(text) {
            continue;
        }
        if let Some(name) = lexer::fields(text).first() {
            if !symbol_table.add_symbol(name.to_string(), line) {
                debug!(label = %name, line, "duplicate label ignored");
            }
        }
    }

    // Pass 2: data directives
    let mut cells = vec![None; source_map.line_count()];
    for (line, text) in source_map.lines().iter().enumerate() {
        let Ok(decoded) = decode_line(text) else {
            continue;
        };
        let Instruction::Directive { value } = decoded.instruction else {
            continue;
        };

        let word = match &value {
            Operand::Literal(literal) => *literal,
            Operand::Label(name) => {
                let target = symbol_table
                    .line_of(name)
                    .ok_or_else(|| LoadError::UnresolvedLabel {
                        name: name.clone(),
                        line,
                    })?;
                target as i32
            }
        };

        cells[line] = Some(word);
    }
    let memory = LineMemory::from(cells);

    info!(
        lines = source_map.line_count(),
        labels = symbol_table.symbols().len(),
        units = source_map.unit_count(),
        "program loaded"
    );

    Ok(Program {
        source_map,
        symbol_table,
        memory,
    })
}

/// Read and load a program file
pub fn assemble_file(path: impl Into<PathBuf>) -> Result<Program, LoadError> {
    let path = path.into();
    let source = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    assemble(&source)
}
