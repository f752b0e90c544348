//! Property-based tests for instruction execution.
//!
//! These tests verify CPU invariants like:
//! - 32-bit wrapping arithmetic and NOR semantics
//! - Branches taken exactly when the registers are equal
//! - Failed instructions leave registers, memory and the access log untouched
//! - Memory addresses computed from signed register values

use lc2k::{assemble, ExecutionError, Flow, LineMemory, MemoryBus, Program, CPU};
use proptest::prelude::*;

fn setup(source: &str) -> (Program, CPU<LineMemory>) {
    let program = assemble(source).unwrap();
    let cpu = CPU::new(program.memory.clone());
    (program, cpu)
}

fn execute(program: &Program, cpu: &mut CPU<LineMemory>, line: usize) -> Result<Flow, ExecutionError> {
    let instruction = program.decode(line)?;
    cpu.execute(&instruction, line, &program.symbol_table)
}

// ========== Arithmetic ==========

proptest! {
    /// Property: add is two's-complement addition truncated to 32 bits
    #[test]
    fn prop_add_wraps(a in any::<i32>(), b in any::<i32>()) {
        let (program, mut cpu) = setup("\tadd\t1\t2\t3");
        cpu.set_register(1, a).unwrap();
        cpu.set_register(2, b).unwrap();

        prop_assert_eq!(execute(&program, &mut cpu, 0), Ok(Flow::Next));
        prop_assert_eq!(cpu.register(3), Some(a.wrapping_add(b)));
    }

    /// Property: nor is the complement of the bitwise or
    #[test]
    fn prop_nor(a in any::<i32>(), b in any::<i32>()) {
        let (program, mut cpu) = setup("\tnor\t1\t2\t3");
        cpu.set_register(1, a).unwrap();
        cpu.set_register(2, b).unwrap();

        execute(&program, &mut cpu, 0).unwrap();
        prop_assert_eq!(cpu.register(3), Some(!(a | b)));
    }

    /// Property: only the destination register changes
    #[test]
    fn prop_arithmetic_writes_only_destination(
        regs in prop::array::uniform8(any::<i32>()),
        dest in 0usize..8,
    ) {
        let (program, mut cpu) = setup(&format!("\tadd\t1\t2\t{}", dest));
        for (index, value) in regs.iter().enumerate() {
            cpu.set_register(index, *value).unwrap();
        }

        execute(&program, &mut cpu, 0).unwrap();

        for index in (0..8).filter(|&i| i != dest) {
            prop_assert_eq!(cpu.register(index), Some(regs[index]));
        }
    }
}

// ========== Control flow ==========

proptest! {
    /// Property: beq jumps exactly when both registers hold the same value
    #[test]
    fn prop_beq_taken_iff_equal(a in any::<i32>(), b in any::<i32>(), target in 0i32..1000) {
        let (program, mut cpu) = setup(&format!("\tbeq\t1\t2\t{}", target));
        cpu.set_register(1, a).unwrap();
        cpu.set_register(2, b).unwrap();

        let expected = if a == b { Flow::Jump(target as usize) } else { Flow::Next };
        prop_assert_eq!(execute(&program, &mut cpu, 0), Ok(expected));
    }

    /// Property: jalr links to the following line and jumps to the register value
    #[test]
    fn prop_jalr_link(line in 0usize..20, target in 0i32..1000) {
        let mut source = "\tnoop\n".repeat(line);
        source.push_str("\tjalr\t1\t2");
        let (program, mut cpu) = setup(&source);
        cpu.set_register(1, target).unwrap();

        prop_assert_eq!(execute(&program, &mut cpu, line), Ok(Flow::Jump(target as usize)));
        prop_assert_eq!(cpu.register(2), Some(line as i32 + 1));
    }
}

// ========== Failure atomicity ==========

proptest! {
    /// Property: an out-of-range load changes nothing
    #[test]
    fn prop_failed_load_is_atomic(
        regs in prop::array::uniform8(any::<i32>()),
        offset in -50i32..50,
    ) {
        let (program, mut cpu) = setup(&format!("\tlw\t1\t2\t{}\n\thalt", offset));
        for (index, value) in regs.iter().enumerate() {
            cpu.set_register(index, *value).unwrap();
        }

        let address = regs[1] as i64 + offset as i64;
        prop_assume!(!(0..2).contains(&address));

        prop_assert_eq!(
            execute(&program, &mut cpu, 0),
            Err(ExecutionError::InvalidMemory { address })
        );
        prop_assert_eq!(cpu.registers(), &regs);
        prop_assert!(cpu.take_accesses().is_empty());
        prop_assert_eq!(cpu.executed(), 0);
    }

    /// Property: any register field of 8 or more is rejected before any access
    #[test]
    fn prop_invalid_register_rejected(field in 8u32..100_000, position in 0usize..3) {
        let mut fields = ["1", "2", "3"].map(String::from);
        fields[position] = field.to_string();
        let (program, mut cpu) = setup(&format!("\tadd\t{}\t{}\t{}", fields[0], fields[1], fields[2]));

        let result = execute(&program, &mut cpu, 0);
        prop_assert_eq!(result, Err(ExecutionError::InvalidRegister { register: field.to_string() }));
        prop_assert!(cpu.take_accesses().is_empty());
    }
}

// ========== Memory ==========

proptest! {
    /// Property: sw stores at base register plus offset
    #[test]
    fn prop_store_address(base in 0i32..8, offset in -8i32..8, value in any::<i32>()) {
        let mut source = String::from("\tsw\t1\t2\t");
        source.push_str(&offset.to_string());
        source.push_str(&"\n\t.fill\t0".repeat(16));
        let (program, mut cpu) = setup(&source);
        cpu.set_register(1, base).unwrap();
        cpu.set_register(2, value).unwrap();

        let address = base as i64 + offset as i64;
        let result = execute(&program, &mut cpu, 0);

        if (0..17).contains(&address) {
            prop_assert_eq!(result, Ok(Flow::Next));
            prop_assert_eq!(cpu.memory().peek(address as usize), Some(value));
        } else {
            prop_assert_eq!(result, Err(ExecutionError::InvalidMemory { address }));
            prop_assert_eq!(cpu.memory(), &program.memory);
        }
    }
}
