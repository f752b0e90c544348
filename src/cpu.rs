//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the register machine state and the
//! execute step for one decoded line.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: 8 general-purpose signed 32-bit registers (`r0`..`r7`)
//! - **Memory**: a `MemoryBus`, one word per source line
//! - **Access log**: every register and memory access of the line being executed,
//!   consumed by the debugger to enforce data breakpoints
//! - **Executed counter**: number of lines completed since the last reset
//!
//! ## Execution Model
//!
//! The CPU does not own a program counter; the debugger does. `execute()` runs one
//! decoded instruction that sits on a given line and returns a [`Flow`] telling the
//! caller where control goes next.
//!
//! A failed instruction leaves registers, memory and the access log exactly as they
//! were before the call.

use crate::assembler::parser::{parse_register, Instruction};
use crate::assembler::symbol_table::SymbolTable;
use crate::instructions::{alu, branches, control, load_store};
use crate::{ExecutionError, MemoryBus};

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Where control goes after an instruction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Fall through to the next line
    Next,

    /// Transfer to a line (which may lie past the end of the program)
    Jump(usize),

    /// Stop the program
    Halt,
}

/// Direction of a recorded access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

/// A register or memory cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Register(usize),
    Memory(usize),
}

/// One access performed while executing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub location: Location,
    pub kind: AccessKind,
}

/// Register machine state and execution context.
///
/// # Type Parameters
///
/// * `M` - Memory bus implementation (must implement `MemoryBus` trait)
///
/// # Examples
///
/// ```
/// use lc2k::{assemble, Flow, CPU};
///
/// let program = assemble("\tlw\t0\t1\tfive\nfive\t.fill\t5").unwrap();
/// let mut cpu = CPU::new(program.memory.clone());
///
/// let instruction = program.decode(0).unwrap();
/// let flow = cpu.execute(&instruction, 0, &program.symbol_table).unwrap();
///
/// assert_eq!(flow, Flow::Next);
/// assert_eq!(cpu.register(1), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct CPU<M: MemoryBus> {
    /// General-purpose registers
    pub(crate) registers: [i32; REGISTER_COUNT],

    /// Memory bus implementation
    pub(crate) memory: M,

    /// Accesses performed since the last `take_accesses()`
    pub(crate) accesses: Vec<Access>,

    /// Lines completed since construction
    pub(crate) executed: u64,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a CPU with all registers zeroed.
    pub fn new(memory: M) -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            memory,
            accesses: Vec::new(),
            executed: 0,
        }
    }

    /// Executes one decoded instruction that sits on `line`.
    ///
    /// # Returns
    ///
    /// - `Ok(flow)` with the control transfer the instruction requests
    /// - `Err(ExecutionError)` if a register, address or label is invalid; no state
    ///   has been changed in that case
    pub fn execute(
        &mut self,
        instruction: &Instruction,
        line: usize,
        symbols: &SymbolTable,
    ) -> Result<Flow, ExecutionError> {
        let mark = self.accesses.len();

        let result = match instruction {
            Instruction::Arithmetic {
                mnemonic,
                reg_a,
                reg_b,
                dest,
            } => alu::execute_arithmetic(self, *mnemonic, *reg_a, *reg_b, dest),
            Instruction::Branch {
                reg_a,
                reg_b,
                target,
            } => branches::execute_beq(self, *reg_a, *reg_b, target, symbols),
            Instruction::Memory {
                mnemonic,
                reg_a,
                reg_b,
                offset,
            } => load_store::execute_memory_op(self, *mnemonic, *reg_a, *reg_b, offset, symbols),
            Instruction::Jump { reg_a, reg_b } => control::execute_jalr(self, *reg_a, *reg_b, line),
            Instruction::Control { mnemonic } => control::execute_control(*mnemonic),
            Instruction::Directive { .. } => Ok(Flow::Next),
        };

        match result {
            Ok(flow) => {
                self.executed += 1;
                Ok(flow)
            }
            Err(err) => {
                self.accesses.truncate(mark);
                Err(err)
            }
        }
    }

    // ========== Register Access ==========

    /// Returns all registers in index order.
    pub fn registers(&self) -> &[i32; REGISTER_COUNT] {
        &self.registers
    }

    /// Returns register `index`, or `None` outside `0..8`.
    pub fn register(&self, index: usize) -> Option<i32> {
        self.registers.get(index).copied()
    }

    /// Sets register `index` directly (no access is recorded).
    pub fn set_register(&mut self, index: usize, value: i32) -> Result<(), ExecutionError> {
        let slot = self
            .registers
            .get_mut(index)
            .ok_or_else(|| ExecutionError::InvalidRegister {
                register: index.to_string(),
            })?;
        *slot = value;
        Ok(())
    }

    /// Returns the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns the memory bus mutably (no access is recorded).
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Drains the access log.
    pub fn take_accesses(&mut self) -> Vec<Access> {
        std::mem::take(&mut self.accesses)
    }

    /// Lines completed since construction.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    // ========== Helpers for instruction implementations ==========

    /// Reads a register, recording the access.
    pub(crate) fn read_register(&mut self, index: usize) -> i32 {
        self.accesses.push(Access {
            location: Location::Register(index),
            kind: AccessKind::Read,
        });
        self.registers[index]
    }

    /// Writes a register, recording the access.
    pub(crate) fn write_register(&mut self, index: usize, value: i32) {
        self.accesses.push(Access {
            location: Location::Register(index),
            kind: AccessKind::Write,
        });
        self.registers[index] = value;
    }

    /// Reads a memory word, recording the access on success.
    pub(crate) fn read_memory(&mut self, addr: i64) -> Result<i32, ExecutionError> {
        let value = self.memory.read(addr)?;
        self.accesses.push(Access {
            location: Location::Memory(addr as usize),
            kind: AccessKind::Read,
        });
        Ok(value)
    }

    /// Writes a memory word, recording the access on success.
    pub(crate) fn write_memory(&mut self, addr: i64, value: i32) -> Result<(), ExecutionError> {
        self.memory.write(addr, value)?;
        self.accesses.push(Access {
            location: Location::Memory(addr as usize),
            kind: AccessKind::Write,
        });
        Ok(())
    }

    /// Validates a register field.
    pub(crate) fn register_index(raw: u64) -> Result<usize, ExecutionError> {
        usize::try_from(raw)
            .ok()
            .filter(|&index| index < REGISTER_COUNT)
            .ok_or_else(|| ExecutionError::InvalidRegister {
                register: raw.to_string(),
            })
    }

    /// Validates a destination field (must be an unsigned register number).
    ///
    /// The field is checked at full width, so a number that only looks like a
    /// register after truncation is still rejected.
    pub(crate) fn destination_index(field: &str) -> Result<usize, ExecutionError> {
        parse_register(field)
            .and_then(|raw| usize::try_from(raw).ok())
            .filter(|&index| index < REGISTER_COUNT)
            .ok_or_else(|| ExecutionError::InvalidRegister {
                register: field.to_string(),
            })
    }

    /// Validates a control-transfer target.
    ///
    /// Negative targets are invalid; targets past the last line are allowed and end
    /// the program when reached.
    pub(crate) fn target_line(target: i64) -> Result<Flow, ExecutionError> {
        usize::try_from(target)
            .map(Flow::Jump)
            .map_err(|_| ExecutionError::InvalidMemory { address: target })
    }
}
