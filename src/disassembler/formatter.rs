//! Formatting functions for register dumps and disassembly listings

use crate::cpu::REGISTER_COUNT;
use crate::disassembler::InstructionUnit;

/// Format the register file as `r0=<v> r1=<v> ... r7=<v>` (signed decimal)
///
/// # Examples
///
/// ```
/// use lc2k::disassembler::formatter::format_registers;
///
/// let text = format_registers(&[0, 1, -2, 3, 4, 5, 6, 7]);
/// assert_eq!(text, "r0=0 r1=1 r2=-2 r3=3 r4=4 r5=5 r6=6 r7=7");
/// ```
pub fn format_registers(registers: &[i32; REGISTER_COUNT]) -> String {
    registers
        .iter()
        .enumerate()
        .map(|(index, value)| format!("r{}={}", index, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name of register `index` as exposed to debugger clients
pub fn register_name(index: usize) -> String {
    format!("r{}", index)
}

/// Format one instruction unit as a listing line: `address  line:column  word`
pub fn format_unit(unit: &InstructionUnit) -> String {
    format!(
        "{:>5}  {:>4}:{:<3} {}",
        unit.address, unit.location.line, unit.location.column, unit.word
    )
}
