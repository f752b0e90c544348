//! Lexical analysis for line-addressed assembly source
//!
//! This module provides the character-level view of a program:
//!
//! 1. **Lines** ([`split_lines`]): the program as an ordered sequence of lines
//! 2. **Fields** ([`fields`]): whitespace-delimited fields the decoder matches against
//! 3. **Words** ([`words`]): identifier-like words with their columns
//!
//! # Words
//!
//! A word is a run of ASCII letters; digits, punctuation and whitespace are all word
//! boundaries, and matching is case-insensitive (letters of either case are kept as
//! written). Words drive three things:
//!
//! - label discovery hints,
//! - breakpoint column suggestions (long words make good column targets),
//! - instruction-unit addressing: every word is one addressable unit.
//!
//! ```
//! use lc2k::assembler::lexer::words;
//!
//! let found = words("loop\tbeq\t0\t1\tdone");
//! let names: Vec<&str> = found.iter().map(|w| w.text).collect();
//! assert_eq!(names, vec!["loop", "beq", "done"]);
//! assert_eq!(found[2].column, 13);
//! ```
//!
//! # Fields
//!
//! ```
//! use lc2k::assembler::lexer::{fields, is_indented};
//!
//! assert_eq!(fields("\tlw 0 1 ten  load ten"), vec!["lw", "0", "1", "ten", "load", "ten"]);
//! assert!(is_indented("\thalt"));
//! assert!(!is_indented("done\thalt"));
//! ```

/// An identifier-like word and where it starts in its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    /// The word as written
    pub text: &'a str,

    /// Byte offset of the first letter (0-indexed)
    pub column: usize,
}

/// Single-pass word scanner over one line
struct WordScanner<'a> {
    line: &'a str,
    position: usize,
}

impl<'a> WordScanner<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, position: 0 }
    }

    /// Skip to the next letter, returning false at end of line
    fn skip_boundaries(&mut self) -> bool {
        let bytes = self.line.as_bytes();
        while self.position < bytes.len() && !bytes[self.position].is_ascii_alphabetic() {
            self.position += 1;
        }
        self.position < bytes.len()
    }

    /// Scan one run of letters starting at the current position
    fn scan_word(&mut self) -> Word<'a> {
        let bytes = self.line.as_bytes();
        let start = self.position;
        while self.position < bytes.len() && bytes[self.position].is_ascii_alphabetic() {
            self.position += 1;
        }

        Word {
            text: &self.line[start..self.position],
            column: start,
        }
    }
}

impl<'a> Iterator for WordScanner<'a> {
    type Item = Word<'a>;

    fn next(&mut self) -> Option<Word<'a>> {
        if self.skip_boundaries() {
            Some(self.scan_word())
        } else {
            None
        }
    }
}

/// Extract the words of a line, in order, with their columns
pub fn words(line: &str) -> Vec<Word<'_>> {
    WordScanner::new(line).collect()
}

/// Split a line into whitespace-delimited fields
pub fn fields(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// True if the line starts with indentation (and therefore declares no label)
pub fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Split program text into lines
///
/// Lines are separated by `\n`; a trailing `\r` is dropped from every line. A
/// trailing newline yields a final empty line, which still counts as a line.
pub fn split_lines(source: &str) -> Vec<String> {
    source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
