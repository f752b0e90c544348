//! # Control Flow Instructions
//!
//! This module implements:
//! - JALR: Jump and Link Register
//! - HALT: stop the machine
//! - NOOP: no operation

use crate::{ExecutionError, Flow, MemoryBus, Mnemonic, CPU};

/// Executes the JALR (Jump and Link Register) instruction.
///
/// Stores `line + 1` in `reg[B]` and jumps to the line held in `reg[A]`. The target
/// is read before the link is written, so `jalr 4 4` jumps to the old `reg[4]`.
pub(crate) fn execute_jalr<M: MemoryBus>(
    cpu: &mut CPU<M>,
    reg_a: u64,
    reg_b: u64,
    line: usize,
) -> Result<Flow, ExecutionError> {
    let a = CPU::<M>::register_index(reg_a)?;
    let b = CPU::<M>::register_index(reg_b)?;

    let target = cpu.read_register(a);
    let flow = CPU::<M>::target_line(target as i64)?;

    cpu.write_register(b, line.wrapping_add(1) as i32);

    Ok(flow)
}

/// Executes HALT or NOOP.
pub(crate) fn execute_control(mnemonic: Mnemonic) -> Result<Flow, ExecutionError> {
    match mnemonic {
        Mnemonic::Halt => Ok(Flow::Halt),
        _ => Ok(Flow::Next),
    }
}
