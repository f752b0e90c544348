//! Assembly source parser
//!
//! Decodes one source line into a typed [`Instruction`] with an ordered grammar
//! matcher over the line's whitespace-delimited fields:
//!
//! 1. `[label] (add|nor|beq|lw|sw) reg reg operand`
//! 2. `[label] jalr reg reg`
//! 3. `[label] (halt|noop)`
//! 4. `[label] .fill value`
//!
//! The first form that matches wins. Within a form, a leading label is tried first
//! (only for lines that start in column 0), then the label-less reading. Fields
//! after the last required one are a free-form comment.

use crate::addressing::Operand;
use crate::assembler::lexer;
use crate::opcodes::{self, InstructionShape, Mnemonic, OperandForm, DECODE_ORDER};
use crate::ExecutionError;

/// A decoded instruction
///
/// Register fields are kept as written; range checking happens at execution time so
/// an out-of-range register is reported as `InvalidRegister`, not as a syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `add` / `nor`: the third field names the destination register
    ///
    /// The destination is kept as written; any operand decodes here, and only an
    /// unsigned register number in range executes.
    Arithmetic {
        mnemonic: Mnemonic,
        reg_a: u64,
        reg_b: u64,
        dest: String,
    },

    /// `beq`: the third field is the target line
    Branch {
        reg_a: u64,
        reg_b: u64,
        target: Operand,
    },

    /// `lw` / `sw`: the third field is added to `reg_a` to form the address
    Memory {
        mnemonic: Mnemonic,
        reg_a: u64,
        reg_b: u64,
        offset: Operand,
    },

    /// `jalr`: jump to `reg_a`, link into `reg_b`
    Jump { reg_a: u64, reg_b: u64 },

    /// `halt` / `noop`
    Control { mnemonic: Mnemonic },

    /// `.fill`: data, applied at load time
    Directive { value: Operand },
}

impl Instruction {
    /// The shape category of this instruction
    pub fn shape(&self) -> InstructionShape {
        match self {
            Instruction::Arithmetic { .. } => InstructionShape::Arithmetic,
            Instruction::Branch { .. } => InstructionShape::Branch,
            Instruction::Memory { .. } => InstructionShape::MemoryOp,
            Instruction::Jump { .. } => InstructionShape::Jump,
            Instruction::Control { .. } => InstructionShape::Control,
            Instruction::Directive { .. } => InstructionShape::Directive,
        }
    }
}

/// A decoded line: optional label plus instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine<'a> {
    /// Label declared on the line, if the label reading matched
    pub label: Option<&'a str>,

    /// The decoded instruction
    pub instruction: Instruction,
}

/// Parse a base-10 number, optionally negative, truncated to 32 bits
pub fn parse_number(s: &str) -> Result<i32, String> {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid decimal number: {}", s));
    }

    s.parse::<i64>()
        .map(|value| value as i32)
        .map_err(|e| format!("invalid decimal number: {}", e))
}

/// Parse a register field (unsigned decimal)
///
/// Values too large to represent still parse (as `u64::MAX`) so they surface as an
/// invalid register at execution time instead of changing how the line decodes.
pub fn parse_register(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse::<u64>().unwrap_or(u64::MAX))
}

/// Decode a source line
///
/// # Examples
///
/// ```
/// use lc2k::{decode_line, Instruction, Mnemonic, Operand};
///
/// let decoded = decode_line("start\tlw\t0\t1\tten\tload ten").unwrap();
/// assert_eq!(decoded.label, Some("start"));
/// assert_eq!(
///     decoded.instruction,
///     Instruction::Memory {
///         mnemonic: Mnemonic::Lw,
///         reg_a: 0,
///         reg_b: 1,
///         offset: Operand::Label("ten".to_string()),
///     }
/// );
/// ```
pub fn decode_line(text: &str) -> Result<DecodedLine<'_>, ExecutionError> {
    let fields = lexer::fields(text);
    if fields.is_empty() {
        return Err(ExecutionError::InvalidInstruction);
    }

    // Label reading first, then the label-less one
    let label_skips: &[usize] = if lexer::is_indented(text) { &[0] } else { &[1, 0] };

    for form in DECODE_ORDER {
        for &skip in label_skips {
            if let Some(instruction) = match_form(form, &fields[skip..]) {
                let label = if skip == 1 { Some(fields[0]) } else { None };
                return Ok(DecodedLine { label, instruction });
            }
        }
    }

    Err(ExecutionError::InvalidInstruction)
}

/// Try to read `fields` as a mnemonic of the given operand form
fn match_form(form: OperandForm, fields: &[&str]) -> Option<Instruction> {
    let (name, rest) = fields.split_first()?;
    let metadata = opcodes::lookup(name)?;
    if metadata.form != form || rest.len() < form.field_count() {
        return None;
    }

    match form {
        OperandForm::RegRegOperand => {
            let reg_a = parse_register(rest[0])?;
            let reg_b = parse_register(rest[1])?;
            let operand = Operand::parse(rest[2])?;

            match metadata.shape {
                InstructionShape::Arithmetic => Some(Instruction::Arithmetic {
                    mnemonic: metadata.mnemonic,
                    reg_a,
                    reg_b,
                    dest: rest[2].to_string(),
                }),
                InstructionShape::Branch => Some(Instruction::Branch {
                    reg_a,
                    reg_b,
                    target: operand,
                }),
                InstructionShape::MemoryOp => Some(Instruction::Memory {
                    mnemonic: metadata.mnemonic,
                    reg_a,
                    reg_b,
                    offset: operand,
                }),
                _ => None,
            }
        }
        OperandForm::RegReg => Some(Instruction::Jump {
            reg_a: parse_register(rest[0])?,
            reg_b: parse_register(rest[1])?,
        }),
        OperandForm::Bare => Some(Instruction::Control {
            mnemonic: metadata.mnemonic,
        }),
        OperandForm::Value => Some(Instruction::Directive {
            value: Operand::parse(rest[0])?,
        }),
    }
}
