//! # Branch Instructions
//!
//! This module implements the conditional branch:
//! - BEQ: jump to the target line when `reg[A] == reg[B]`
//!
//! The target is always resolved (an undeclared label fails even when the branch
//! falls through), but it is only range-checked when the branch is taken.

use crate::addressing::Operand;
use crate::assembler::symbol_table::SymbolTable;
use crate::{ExecutionError, Flow, MemoryBus, CPU};

/// Executes the BEQ (Branch if Equal) instruction.
pub(crate) fn execute_beq<M: MemoryBus>(
    cpu: &mut CPU<M>,
    reg_a: u64,
    reg_b: u64,
    target: &Operand,
    symbols: &SymbolTable,
) -> Result<Flow, ExecutionError> {
    let a = CPU::<M>::register_index(reg_a)?;
    let b = CPU::<M>::register_index(reg_b)?;
    let target = target.resolve(symbols)?;

    if cpu.read_register(a) == cpu.read_register(b) {
        CPU::<M>::target_line(target)
    } else {
        Ok(Flow::Next)
    }
}
