//! Tests for the NOR instruction.

use lc2k::{assemble, Flow, LineMemory, Program, CPU};

fn setup(source: &str) -> (Program, CPU<LineMemory>) {
    let program = assemble(source).unwrap();
    let cpu = CPU::new(program.memory.clone());
    (program, cpu)
}

fn execute(program: &Program, cpu: &mut CPU<LineMemory>, line: usize) -> Flow {
    let instruction = program.decode(line).unwrap();
    cpu.execute(&instruction, line, &program.symbol_table).unwrap()
}

#[test]
fn test_nor_basic() {
    let (program, mut cpu) = setup("\tnor\t1\t2\t3");
    cpu.set_register(1, 0b1100).unwrap();
    cpu.set_register(2, 0b1010).unwrap();

    assert_eq!(execute(&program, &mut cpu, 0), Flow::Next);
    assert_eq!(cpu.register(3), Some(!0b1110));
}

#[test]
fn test_nor_zero_gives_all_ones() {
    let (program, mut cpu) = setup("\tnor\t0\t0\t1");
    execute(&program, &mut cpu, 0);
    assert_eq!(cpu.register(1), Some(-1));
}

#[test]
fn test_nor_as_not() {
    // nor x x = !x, the usual way to negate with add + 1
    let (program, mut cpu) = setup("\tnor\t1\t1\t2");
    cpu.set_register(1, 5).unwrap();
    execute(&program, &mut cpu, 0);
    assert_eq!(cpu.register(2), Some(-6));
}

#[test]
fn test_nor_all_ones_gives_zero() {
    let (program, mut cpu) = setup("\tnor\t1\t2\t1");
    cpu.set_register(1, -1).unwrap();
    cpu.set_register(2, 0).unwrap();
    execute(&program, &mut cpu, 0);
    assert_eq!(cpu.register(1), Some(0));
}
