//! # Opcode Metadata Table
//!
//! This module contains the opcode metadata table that serves as the single source of
//! truth for every mnemonic the engine understands.
//!
//! Each entry includes:
//! - Mnemonic (as written in source, lower case)
//! - Instruction shape (arithmetic, branch, memory op, jump, control, directive)
//! - Operand form (which fields follow the mnemonic)
//!
//! The decoder walks [`DECODE_ORDER`] and, for each operand form, only accepts the
//! mnemonics whose entry carries that form. This preserves the shape precedence that
//! keeps ambiguous lines decoding the same way every time.

/// Every mnemonic the engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Add,
    Nor,
    Beq,
    Lw,
    Sw,
    Jalr,
    Halt,
    Noop,
    Fill,
}

impl Mnemonic {
    /// Returns the source spelling of this mnemonic.
    pub fn name(self) -> &'static str {
        match self {
            Mnemonic::Add => "add",
            Mnemonic::Nor => "nor",
            Mnemonic::Beq => "beq",
            Mnemonic::Lw => "lw",
            Mnemonic::Sw => "sw",
            Mnemonic::Jalr => "jalr",
            Mnemonic::Halt => "halt",
            Mnemonic::Noop => "noop",
            Mnemonic::Fill => ".fill",
        }
    }
}

/// The category a decoded line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionShape {
    /// `add`, `nor`
    Arithmetic,
    /// `beq`
    Branch,
    /// `lw`, `sw`
    MemoryOp,
    /// `jalr`
    Jump,
    /// `halt`, `noop`
    Control,
    /// `.fill`
    Directive,
}

/// The fields that follow a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandForm {
    /// `reg reg operand`
    RegRegOperand,
    /// `reg reg`
    RegReg,
    /// no fields
    Bare,
    /// a single literal or label
    Value,
}

impl OperandForm {
    /// Number of fields the form requires after the mnemonic.
    pub fn field_count(self) -> usize {
        match self {
            OperandForm::RegRegOperand => 3,
            OperandForm::RegReg => 2,
            OperandForm::Bare => 0,
            OperandForm::Value => 1,
        }
    }
}

/// Metadata for a single mnemonic.
///
/// # Examples
///
/// ```
/// use lc2k::{InstructionShape, OPCODE_TABLE};
///
/// let beq = OPCODE_TABLE.iter().find(|m| m.name == "beq").unwrap();
/// assert_eq!(beq.shape, InstructionShape::Branch);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Typed mnemonic.
    pub mnemonic: Mnemonic,

    /// Source spelling matched by the decoder.
    pub name: &'static str,

    /// Instruction category.
    pub shape: InstructionShape,

    /// Fields following the mnemonic.
    pub form: OperandForm,
}

/// Operand forms in decode precedence order.
///
/// Arithmetic/branch/memory ops are tried first, then `jalr`, then `halt`/`noop`,
/// then `.fill`. The first form whose grammar matches wins.
pub const DECODE_ORDER: [OperandForm; 4] = [
    OperandForm::RegRegOperand,
    OperandForm::RegReg,
    OperandForm::Bare,
    OperandForm::Value,
];

/// Complete mnemonic table.
pub const OPCODE_TABLE: [OpcodeMetadata; 9] = [
    OpcodeMetadata {
        mnemonic: Mnemonic::Add,
        name: "add",
        shape: InstructionShape::Arithmetic,
        form: OperandForm::RegRegOperand,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Nor,
        name: "nor",
        shape: InstructionShape::Arithmetic,
        form: OperandForm::RegRegOperand,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Beq,
        name: "beq",
        shape: InstructionShape::Branch,
        form: OperandForm::RegRegOperand,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Lw,
        name: "lw",
        shape: InstructionShape::MemoryOp,
        form: OperandForm::RegRegOperand,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Sw,
        name: "sw",
        shape: InstructionShape::MemoryOp,
        form: OperandForm::RegRegOperand,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Jalr,
        name: "jalr",
        shape: InstructionShape::Jump,
        form: OperandForm::RegReg,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Halt,
        name: "halt",
        shape: InstructionShape::Control,
        form: OperandForm::Bare,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Noop,
        name: "noop",
        shape: InstructionShape::Control,
        form: OperandForm::Bare,
    },
    OpcodeMetadata {
        mnemonic: Mnemonic::Fill,
        name: ".fill",
        shape: InstructionShape::Directive,
        form: OperandForm::Value,
    },
];

/// Look up a mnemonic by its source spelling.
pub fn lookup(name: &str) -> Option<&'static OpcodeMetadata> {
    let table: &'static [OpcodeMetadata] = &OPCODE_TABLE;
    table.iter().find(|m| m.name == name)
}
