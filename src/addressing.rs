//! # Operand Addressing
//!
//! This module defines how the third field of an instruction (and the value of a
//! `.fill` directive) is interpreted.
//!
//! An operand is either a decimal literal or a label. Literals are used as-is; labels
//! resolve to the *line number* on which they are declared, never to the value stored
//! at that line. This is what makes jump targets, data addresses and label references
//! all "a line number".

use crate::assembler::parser::parse_number;
use crate::assembler::symbol_table::SymbolTable;
use crate::ExecutionError;

/// An instruction operand: a literal or a label to be resolved at execution time.
///
/// # Examples
///
/// ```
/// use lc2k::Operand;
///
/// assert_eq!(Operand::parse("-4"), Some(Operand::Literal(-4)));
/// assert_eq!(Operand::parse("loop"), Some(Operand::Label("loop".to_string())));
/// assert_eq!(Operand::parse("4x"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Base-10 literal, truncated to 32 bits.
    Literal(i32),

    /// Symbolic reference to a label.
    Label(String),
}

impl Operand {
    /// Parse an operand field.
    ///
    /// Returns `None` when the field is neither a decimal literal nor a symbol
    /// (a symbol may not start with a digit or a minus sign).
    pub fn parse(field: &str) -> Option<Self> {
        if let Ok(value) = parse_number(field) {
            return Some(Operand::Literal(value));
        }

        let first = field.chars().next()?;
        if first.is_ascii_digit() || first == '-' {
            return None;
        }

        Some(Operand::Label(field.to_string()))
    }

    /// Resolve the operand to a number.
    ///
    /// Literals resolve to themselves; labels resolve to their declaring line.
    pub fn resolve(&self, symbols: &SymbolTable) -> Result<i64, ExecutionError> {
        match self {
            Operand::Literal(value) => Ok(*value as i64),
            Operand::Label(name) => symbols
                .line_of(name)
                .map(|line| line as i64)
                .ok_or_else(|| ExecutionError::UnresolvedLabel { name: name.clone() }),
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Label(name) => write!(f, "{}", name),
        }
    }
}
