//! Fuzz target for debugger execution.
//!
//! Builds a small program from arbitrary lines, arbitrary initial breakpoints and
//! a sequence of control commands, then drives the debugger with them. Any panic is
//! a bug; exceptions raised by the program are expected.

#![no_main]

use arbitrary::Arbitrary;
use lc2k::{AccessType, Debugger, EngineConfig, RunState};
use libfuzzer_sys::fuzz_target;

/// One source line built from fuzz data
#[derive(Debug, Arbitrary)]
enum FuzzLine {
    Arithmetic { nor: bool, a: u8, b: u8, dest: i8 },
    Branch { a: u8, b: u8, target: i8 },
    Memory { store: bool, a: u8, b: u8, offset: i8 },
    Jump { a: u8, b: u8 },
    Halt,
    Noop,
    Fill(i32),
    Blank,
    Raw(String),
}

impl FuzzLine {
    fn render(&self, index: usize) -> String {
        let label = format!("l{}", "abcdefgh".as_bytes()[index % 8] as char);
        match self {
            FuzzLine::Arithmetic { nor, a, b, dest } => {
                let op = if *nor { "nor" } else { "add" };
                format!("\t{}\t{}\t{}\t{}", op, a % 10, b % 10, dest)
            }
            FuzzLine::Branch { a, b, target } => {
                format!("{}\tbeq\t{}\t{}\t{}", label, a % 10, b % 10, target)
            }
            FuzzLine::Memory { store, a, b, offset } => {
                let op = if *store { "sw" } else { "lw" };
                format!("\t{}\t{}\t{}\t{}", op, a % 10, b % 10, offset)
            }
            FuzzLine::Jump { a, b } => format!("\tjalr\t{}\t{}", a % 10, b % 10),
            FuzzLine::Halt => "\thalt".to_string(),
            FuzzLine::Noop => "\tnoop".to_string(),
            FuzzLine::Fill(value) => format!("{}\t.fill\t{}", label, value),
            FuzzLine::Blank => String::new(),
            FuzzLine::Raw(text) => text.replace('\n', " "),
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Command {
    Run(bool),
    Continue,
    Step,
    StepInstruction,
    Breakpoint(u8),
    InstructionBreakpoint(u8),
    Watch(u8),
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    lines: Vec<FuzzLine>,
    commands: Vec<Command>,
}

fuzz_target!(|input: FuzzInput| {
    let source = input
        .lines
        .iter()
        .take(32)
        .enumerate()
        .map(|(index, line)| line.render(index))
        .collect::<Vec<_>>()
        .join("\n");

    let mut debugger = Debugger::new(EngineConfig {
        max_steps: Some(256),
        ..Default::default()
    });
    let events = debugger.subscribe();

    if debugger.load_source("fuzz.as", &source).is_err() {
        return;
    }

    for command in input.commands.iter().take(64) {
        let _ = match command {
            Command::Run(entry) => debugger.run(*entry),
            Command::Continue => debugger.continue_execution(),
            Command::Step => debugger.step(),
            Command::StepInstruction => debugger.step_instruction(),
            Command::Breakpoint(line) => {
                debugger.set_breakpoint("fuzz.as", *line as usize % 40);
                Ok(())
            }
            Command::InstructionBreakpoint(address) => {
                debugger.set_instruction_breakpoint(*address as usize);
                Ok(())
            }
            Command::Watch(register) => {
                debugger.set_data_breakpoint(&format!("r{}", register % 8), AccessType::ReadWrite);
                Ok(())
            }
        };

        assert_eq!(debugger.registers().len(), 8);
        if debugger.state() == RunState::Running {
            panic!("control call returned while still running");
        }
    }

    // Drain so the channel never grows unbounded across iterations
    let _ = events.try_iter().count();
});
