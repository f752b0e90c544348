//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements the register-to-register operations:
//! - ADD: `reg[D] = reg[A] + reg[B]`, wrapping at 32 bits
//! - NOR: `reg[D] = !(reg[A] | reg[B])`
//!
//! The third field names the destination register; it must be an unsigned number in `0..8`.

use crate::{ExecutionError, Flow, MemoryBus, Mnemonic, CPU};

/// Executes ADD or NOR.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU
/// * `mnemonic` - `Mnemonic::Add` or `Mnemonic::Nor`
/// * `reg_a`, `reg_b` - Source register fields
/// * `dest` - Destination register field as written
pub(crate) fn execute_arithmetic<M: MemoryBus>(
    cpu: &mut CPU<M>,
    mnemonic: Mnemonic,
    reg_a: u64,
    reg_b: u64,
    dest: &str,
) -> Result<Flow, ExecutionError> {
    let a = CPU::<M>::register_index(reg_a)?;
    let b = CPU::<M>::register_index(reg_b)?;
    let d = CPU::<M>::destination_index(dest)?;

    let left = cpu.read_register(a);
    let right = cpu.read_register(b);

    let result = match mnemonic {
        Mnemonic::Nor => !(left | right),
        _ => left.wrapping_add(right),
    };

    cpu.write_register(d, result);

    Ok(Flow::Next)
}
