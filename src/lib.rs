//! # Line-Addressed Assembly Execution Engine
//!
//! An educational execution engine for a minimal register-machine assembly language,
//! designed for debugger integration and WebAssembly portability.
//!
//! The machine has 8 general-purpose 32-bit registers and a flat memory with one word
//! per source line. Addresses *are* source line numbers: a `.fill` directive lives at
//! the address of the line that declares it, and a symbolic operand resolves to the
//! line number of the referenced label.
//!
//! ## Quick Start
//!
//! ```rust
//! use lc2k::{Debugger, EngineConfig, Event};
//!
//! let source = "\tlw\t0\t1\tten\n\tadd\t1\t1\t2\n\thalt\nten\t.fill\t10";
//!
//! let mut debugger = Debugger::new(EngineConfig::default());
//! let events = debugger.subscribe();
//!
//! debugger.load_source("double.as", source).unwrap();
//! debugger.run(false).unwrap();
//!
//! assert_eq!(debugger.registers()[2], ("r2".to_string(), 20));
//!
//! let received: Vec<Event> = events.try_iter().collect();
//! assert_eq!(received.last(), Some(&Event::End));
//! ```
//!
//! ## Instruction Set
//!
//! | Form                 | Effect                                          |
//! |----------------------|-------------------------------------------------|
//! | `add A B D`          | `reg[D] = reg[A] + reg[B]` (wrapping)           |
//! | `nor A B D`          | `reg[D] = !(reg[A] \| reg[B])`                  |
//! | `beq A B target`     | jump to `target` when `reg[A] == reg[B]`        |
//! | `lw A B offset`      | `reg[B] = mem[reg[A] + offset]`                 |
//! | `sw A B offset`      | `mem[reg[A] + offset] = reg[B]`                 |
//! | `jalr A B`           | `reg[B] = line + 1`, jump to `reg[A]`           |
//! | `halt` / `noop`      | stop with a register dump / do nothing          |
//! | `.fill value`        | data directive, applied at load time            |
//!
//! ## Modules
//!
//! - `assembler` - Source model, label table and `.fill` resolution
//! - `cpu` - Register/memory state and instruction execution
//! - `debugger` - Program counter, breakpoints and the event stream
//! - `memory` - `MemoryBus` trait and the line-addressed memory
//! - `opcodes` - Mnemonic metadata table
//! - `addressing` - Operand resolution
//! - `disassembler` - Instruction-unit listing for debugger views
//! - `config` - Engine configuration

pub mod addressing;
pub mod assembler;
pub mod config;
pub mod cpu;
pub mod debugger;
pub mod disassembler;
pub mod memory;
pub mod opcodes;
pub mod wasm;

// Internal instruction implementations (not part of public API)
mod instructions;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export public API
pub use addressing::Operand;
pub use assembler::parser::{decode_line, Instruction};
pub use assembler::{assemble, LoadError, Program};
pub use config::EngineConfig;
pub use cpu::{Access, AccessKind, Flow, Location, CPU, REGISTER_COUNT};
pub use debugger::breakpoints::{AccessType, Breakpoint};
pub use debugger::events::Event;
pub use debugger::{Debugger, DebuggerError, ExecutionPoint, RunState, StopReason};
pub use disassembler::{disassemble, InstructionUnit};
pub use memory::{LineMemory, MemoryBus};
pub use opcodes::{InstructionShape, Mnemonic, OpcodeMetadata, OPCODE_TABLE};

/// Classification of run-time exceptions, as reported to debug adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExceptionKind {
    UnresolvedLabel,
    InvalidInstruction,
    InvalidRegister,
    InvalidMemory,
    OutOfRange,
}

/// Errors that can occur while decoding or executing a source line.
///
/// None of these are fatal to the engine itself: the debugger turns them into
/// `stopOnException` notifications and leaves the machine state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// An operand or `.fill` value names a label that was never declared.
    #[error("unresolved label `{name}`")]
    UnresolvedLabel { name: String },

    /// The line matches none of the recognized instruction shapes.
    #[error("invalid instruction")]
    InvalidInstruction,

    /// A register field lies outside `0..=7` (or is not a register at all).
    #[error("invalid register `{register}`")]
    InvalidRegister { register: String },

    /// An address outside the program, or a read of a cell that was never written.
    #[error("invalid memory access at address {address}")]
    InvalidMemory { address: i64 },

    /// A line index outside the loaded program.
    #[error("line {line} is out of range")]
    OutOfRange { line: usize },
}

impl ExecutionError {
    /// Returns the exception kind reported alongside this error.
    pub fn kind(&self) -> ExceptionKind {
        match self {
            ExecutionError::UnresolvedLabel { .. } => ExceptionKind::UnresolvedLabel,
            ExecutionError::InvalidInstruction => ExceptionKind::InvalidInstruction,
            ExecutionError::InvalidRegister { .. } => ExceptionKind::InvalidRegister,
            ExecutionError::InvalidMemory { .. } => ExceptionKind::InvalidMemory,
            ExecutionError::OutOfRange { .. } => ExceptionKind::OutOfRange,
        }
    }
}
