//! # Load/Store Instructions
//!
//! This module implements memory transfer operations:
//! - LW: `reg[B] = mem[reg[A] + offset]`
//! - SW: `mem[reg[A] + offset] = reg[B]`
//!
//! The effective address is computed in 64 bits, so it can never wrap back into
//! range. Offsets may be labels, which resolve to their declaring line.

use crate::addressing::Operand;
use crate::assembler::symbol_table::SymbolTable;
use crate::{ExecutionError, Flow, MemoryBus, Mnemonic, CPU};

/// Executes LW or SW.
pub(crate) fn execute_memory_op<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    reg_a: u64,
    reg_b: u64,
    offset: &Operand,
    symbols: &SymbolTable,
) -> Result<Flow, ExecutionError> {
    let a = CPU::<M>::register_index(reg_a)?;
    let b = CPU::<M>::register_index(reg_b)?;
    let offset = offset.resolve(symbols)?;

    let address = cpu.read_register(a) as i64 + offset;

    match mnemonic {
        Mnemonic::Sw => {
            let value = cpu.read_register(b);
            cpu.write_memory(address, value)?;
        }
        _ => {
            let value = cpu.read_memory(address)?;
            cpu.write_register(b, value);
        }
    }

    Ok(Flow::Next)
}
