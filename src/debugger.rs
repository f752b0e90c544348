//! # Execution and Breakpoint Controller
//!
//! The [`Debugger`] owns the loaded program, the CPU, the program counter and the
//! breakpoint tables, and drives execution one source line at a time.
//!
//! ## Run states
//!
//! ```text
//! Idle ──run──▶ Running ──▶ Stopped(reason) ──continue/step──▶ Running
//!                  │                                              │
//!                  └──────────── halt / end of program ───────────┴──▶ Terminated
//! ```
//!
//! ## Positions
//!
//! Besides the program counter (the line about to execute) the debugger keeps an
//! *instruction pointer* into the line's instruction units. Before a line executes,
//! its units are walked from the pointer to the end of the line; an instruction
//! breakpoint on a unit stops there, with the pointer already past that unit.
//!
//! After a line completes, control *arrives* at the next line: blank lines are
//! skipped and a source breakpoint on any visited line stops execution. When a stop
//! happens before arrival is processed (a data breakpoint), the arrival is
//! left pending and processed by the next continue or step.
//!
//! Every notification is delivered through [`Debugger::subscribe`].

pub mod breakpoints;
pub mod events;

use std::path::Path;
use std::sync::mpsc::Receiver;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::assembler::source_map::AddressRange;
use crate::assembler::{assemble, LoadError, Program};
use crate::cpu::{Flow, Location, CPU, REGISTER_COUNT};
use crate::disassembler::formatter::{format_registers, register_name};
use crate::disassembler::{self, InstructionUnit};
use crate::memory::LineMemory;
use crate::EngineConfig;
use breakpoints::{
    AccessType, Breakpoint, DataBreakpoints, InstructionBreakpoints, SourceBreakpoints,
};
use events::{Event, EventQueue};

/// Why execution stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Entry,
    Step,
    Breakpoint,
    InstructionBreakpoint,
    DataBreakpoint,
    Exception,
    Pause,
}

/// Debugger run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Loaded (or empty) and not started
    Idle,
    Running,
    Stopped(StopReason),
    /// Halted or ran past the last line
    Terminated,
}

/// Errors returned by debugger control operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebuggerError {
    #[error("no program loaded")]
    NoProgram,
}

/// Current execution position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPoint {
    /// Line about to execute
    pub line: usize,

    /// Next instruction-unit address
    pub instruction: usize,
}

/// Result of running the current line
enum LineOutcome {
    /// A stop was raised before or during the line
    Stopped,

    /// The line completed
    Completed {
        flow: Flow,
        data_hit: Option<(String, AccessType)>,
    },
}

/// Result of seeking the next statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seek {
    /// Positioned on a non-blank line
    Statement,

    /// Stopped on a source breakpoint
    Breakpoint,

    /// Ran past the last line
    End,
}

/// The execution engine with debugger controls
///
/// # Examples
///
/// ```
/// use lc2k::{Debugger, EngineConfig, Event, RunState, StopReason};
///
/// let mut debugger = Debugger::new(EngineConfig::default());
/// let events = debugger.subscribe();
///
/// debugger.load_source("count.as", "\tnoop\n\tnoop\n\thalt").unwrap();
/// debugger.set_breakpoint("count.as", 1);
///
/// debugger.run(false).unwrap();
/// assert_eq!(debugger.state(), RunState::Stopped(StopReason::Breakpoint));
/// assert_eq!(debugger.location().line, 1);
///
/// debugger.continue_execution().unwrap();
/// assert_eq!(debugger.state(), RunState::Terminated);
///
/// let names: Vec<&str> = events.try_iter().map(|e| e.name()).collect();
/// assert!(names.contains(&"stopOnBreakpoint"));
/// ```
pub struct Debugger {
    config: EngineConfig,
    program: Option<Program>,
    path: Option<String>,
    cpu: CPU<LineMemory>,
    pc: usize,
    instruction: usize,
    state: RunState,
    arrival_pending: bool,
    breakpoints: SourceBreakpoints,
    instruction_breakpoints: InstructionBreakpoints,
    data_breakpoints: DataBreakpoints,
    events: EventQueue,
}

impl Debugger {
    /// Create a debugger with no program loaded
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            program: None,
            path: None,
            cpu: CPU::new(LineMemory::new(0)),
            pc: 0,
            instruction: 0,
            state: RunState::Idle,
            arrival_pending: false,
            breakpoints: SourceBreakpoints::new(),
            instruction_breakpoints: InstructionBreakpoints::default(),
            data_breakpoints: DataBreakpoints::default(),
            events: EventQueue::new(),
        }
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&mut self) -> Receiver<Event> {
        self.events.subscribe()
    }

    // ========== Loading ==========

    /// Read and load a program file
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();

        match std::fs::read_to_string(path) {
            Ok(source) => self.load_source(&key, &source),
            Err(source) => {
                warn!(path = %key, error = %source, "failed to read program");
                self.unload();
                Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Load program text under `path`
    ///
    /// Resets registers, memory and position, then verifies the breakpoints already
    /// set for `path`. Data breakpoints are resolved again against the new labels.
    /// A failed load leaves no program loaded.
    pub fn load_source(&mut self, path: &str, source: &str) -> Result<(), LoadError> {
        let program = match assemble(source) {
            Ok(program) => program,
            Err(err) => {
                warn!(path, error = %err, "program failed to load");
                self.unload();
                return Err(err);
            }
        };

        self.cpu = CPU::new(program.memory.clone());
        self.program = Some(program);
        self.path = Some(path.to_string());
        self.move_to(0);
        self.arrival_pending = false;
        self.state = RunState::Idle;

        info!(path, "program ready");

        self.relocate_data_breakpoints();

        let mut verified = Vec::new();
        if let Some(program) = &self.program {
            for bp in self.breakpoints.for_path_mut(path) {
                if bp.verify(program.source_map.lines(), &self.config) {
                    verified.push(bp.clone());
                }
            }
        }
        for breakpoint in verified {
            debug!(id = breakpoint.id, line = breakpoint.line, "breakpoint verified");
            self.events.emit(Event::BreakpointVerified { breakpoint });
        }

        Ok(())
    }

    fn unload(&mut self) {
        self.program = None;
        self.path = None;
        self.cpu = CPU::new(LineMemory::new(0));
        self.pc = 0;
        self.instruction = 0;
        self.arrival_pending = false;
        self.state = RunState::Idle;
        self.relocate_data_breakpoints();
    }

    // ========== Execution control ==========

    /// Start the program from its first line
    ///
    /// Registers and memory are reset to the loaded image. With `stop_on_entry`
    /// the debugger stops on the first statement; otherwise it runs like
    /// [`continue_execution`](Self::continue_execution).
    pub fn run(&mut self, stop_on_entry: bool) -> Result<(), DebuggerError> {
        let program = self.program.as_ref().ok_or(DebuggerError::NoProgram)?;
        self.cpu = CPU::new(program.memory.clone());
        self.move_to(0);
        self.state = RunState::Running;

        debug!(stop_on_entry, "run");

        if stop_on_entry {
            self.arrival_pending = false;
            match self.seek_statement(true) {
                Seek::Statement => self.stop(StopReason::Entry, Event::StopOnEntry),
                Seek::Breakpoint => {}
                Seek::End => self.terminate(),
            }
            Ok(())
        } else {
            self.arrival_pending = true;
            self.continue_execution()
        }
    }

    /// Run until a stop, the end of the program, or the step limit
    pub fn continue_execution(&mut self) -> Result<(), DebuggerError> {
        if !self.begin()? {
            return Ok(());
        }

        let mut steps: u64 = 0;
        loop {
            if self.arrival_pending {
                self.arrival_pending = false;
                match self.seek_statement(true) {
                    Seek::Statement => {}
                    Seek::Breakpoint => return Ok(()),
                    Seek::End => {
                        self.terminate();
                        return Ok(());
                    }
                }
            }

            if self.config.max_steps.is_some_and(|max| steps >= max) {
                self.stop(StopReason::Pause, Event::StopOnPause);
                return Ok(());
            }

            let (flow, data_hit) = match self.execute_current_line() {
                LineOutcome::Stopped => return Ok(()),
                LineOutcome::Completed { flow, data_hit } => (flow, data_hit),
            };
            steps += 1;

            if !self.advance(flow) {
                return Ok(());
            }
            self.arrival_pending = true;

            if let Some((name, access)) = data_hit {
                self.stop(
                    StopReason::DataBreakpoint,
                    Event::StopOnDataBreakpoint { name, access },
                );
                return Ok(());
            }
        }
    }

    /// Execute one line and stop on the next statement
    pub fn step(&mut self) -> Result<(), DebuggerError> {
        if !self.begin()? {
            return Ok(());
        }

        if self.arrival_pending {
            self.arrival_pending = false;
            match self.seek_statement(true) {
                Seek::Statement => {}
                Seek::Breakpoint => return Ok(()),
                Seek::End => {
                    self.terminate();
                    return Ok(());
                }
            }
        }

        let (flow, data_hit) = match self.execute_current_line() {
            LineOutcome::Stopped => return Ok(()),
            LineOutcome::Completed { flow, data_hit } => (flow, data_hit),
        };

        if !self.advance(flow) {
            return Ok(());
        }

        match self.seek_statement(true) {
            Seek::Statement => match data_hit {
                Some((name, access)) => self.stop(
                    StopReason::DataBreakpoint,
                    Event::StopOnDataBreakpoint { name, access },
                ),
                None => self.stop(StopReason::Step, Event::StopOnStep),
            },
            Seek::Breakpoint => {}
            Seek::End => self.terminate(),
        }

        Ok(())
    }

    /// Step one instruction unit
    ///
    /// Moves the instruction pointer over the next unit of the current line without
    /// checking instruction breakpoints. Once the line's units are exhausted this
    /// performs a line [`step`](Self::step).
    pub fn step_instruction(&mut self) -> Result<(), DebuggerError> {
        if !self.begin()? {
            return Ok(());
        }

        if self.arrival_pending {
            self.arrival_pending = false;
            match self.seek_statement(true) {
                Seek::Statement => self.stop(StopReason::Step, Event::StopOnStep),
                Seek::Breakpoint => {}
                Seek::End => self.terminate(),
            }
            return Ok(());
        }

        let range = self.current_range();
        if self.instruction < range.end {
            self.instruction += 1;
            self.stop(StopReason::Step, Event::StopOnStep);
            return Ok(());
        }

        self.step()
    }

    /// Common prologue of continue and step
    ///
    /// Returns false (after re-announcing the end) when the program has terminated.
    fn begin(&mut self) -> Result<bool, DebuggerError> {
        if self.program.is_none() {
            return Err(DebuggerError::NoProgram);
        }
        if self.state == RunState::Terminated {
            self.events.emit(Event::End);
            return Ok(false);
        }
        self.state = RunState::Running;
        Ok(true)
    }

    // ========== Line execution ==========

    fn execute_current_line(&mut self) -> LineOutcome {
        let range = self.current_range();

        while self.instruction < range.end {
            let address = self.instruction;
            self.instruction += 1;
            if self.instruction_breakpoints.contains(address) {
                self.stop(
                    StopReason::InstructionBreakpoint,
                    Event::StopOnInstructionBreakpoint,
                );
                return LineOutcome::Stopped;
            }
        }

        let line = self.pc;
        let Some(program) = &self.program else {
            return LineOutcome::Stopped;
        };

        let result = match program.source_map.line(line) {
            Ok(text) if text.trim().is_empty() => Ok(Flow::Next),
            _ => match program.decode(line) {
                Ok(instruction) => {
                    trace!(line, shape = ?instruction.shape(), "execute");
                    self.cpu.execute(&instruction, line, &program.symbol_table)
                }
                Err(err) => Err(err),
            },
        };

        match result {
            Ok(flow) => {
                let accesses = self.cpu.take_accesses();
                let data_hit = self.data_breakpoints.check(&accesses);
                LineOutcome::Completed { flow, data_hit }
            }
            Err(err) => {
                warn!(line, error = %err, "exception");
                self.stop(
                    StopReason::Exception,
                    Event::StopOnException {
                        kind: err.kind(),
                        message: err.to_string(),
                        line,
                    },
                );
                LineOutcome::Stopped
            }
        }
    }

    /// Apply a completed line's control flow; returns false if the program halted
    fn advance(&mut self, flow: Flow) -> bool {
        match flow {
            Flow::Next => self.move_to(self.pc + 1),
            Flow::Jump(target) => self.move_to(target),
            Flow::Halt => {
                let text = format_registers(self.cpu.registers());
                self.events.emit(Event::Output { text });
                self.terminate();
                return false;
            }
        }
        true
    }

    /// Skip blank lines from the program counter, checking source breakpoints
    fn seek_statement(&mut self, check_breakpoints: bool) -> Seek {
        loop {
            let line = self.pc;
            let is_statement = match &self.program {
                Some(program) => match program.source_map.line(line) {
                    Ok(text) => !text.trim().is_empty(),
                    Err(_) => return Seek::End,
                },
                None => return Seek::End,
            };

            if check_breakpoints && self.breakpoint_hit(line) {
                return Seek::Breakpoint;
            }

            if is_statement {
                return Seek::Statement;
            }

            self.move_to(line + 1);
        }
    }

    /// Stop on a source breakpoint at `line`, if there is one
    fn breakpoint_hit(&mut self, line: usize) -> bool {
        let Some(path) = self.path.as_deref() else {
            return false;
        };
        let Some(bp) = self.breakpoints.at_line_mut(path, line) else {
            return false;
        };

        let newly_verified = bp.mark_verified().then(|| bp.clone());
        debug!(id = bp.id, line, "breakpoint hit");

        self.stop(StopReason::Breakpoint, Event::StopOnBreakpoint);
        if let Some(breakpoint) = newly_verified {
            self.events.emit(Event::BreakpointVerified { breakpoint });
        }
        true
    }

    fn move_to(&mut self, line: usize) {
        self.pc = line;
        self.instruction = self.range_of(line).start;
    }

    fn current_range(&self) -> AddressRange {
        self.range_of(self.pc)
    }

    fn range_of(&self, line: usize) -> AddressRange {
        match &self.program {
            Some(program) => program.source_map.get_address_range(line),
            None => AddressRange { start: 0, end: 0 },
        }
    }

    fn stop(&mut self, reason: StopReason, event: Event) {
        debug!(?reason, line = self.pc, instruction = self.instruction, "stopped");
        self.state = RunState::Stopped(reason);
        self.events.emit(event);
    }

    fn terminate(&mut self) {
        info!(executed = self.cpu.executed(), "program terminated");
        self.state = RunState::Terminated;
        self.events.emit(Event::End);
    }

    // ========== Source breakpoints ==========

    /// Set a source breakpoint
    ///
    /// When `path` is the loaded program the breakpoint is verified immediately
    /// (possibly moving it), emitting `breakpointVerified`.
    pub fn set_breakpoint(&mut self, path: &str, line: usize) -> Breakpoint {
        let bp = self.breakpoints.set(path, line);

        let mut verified = false;
        if self.path.as_deref() == Some(path) {
            if let Some(program) = &self.program {
                verified = bp.verify(program.source_map.lines(), &self.config);
            }
        }

        let breakpoint = bp.clone();
        debug!(path, id = breakpoint.id, line = breakpoint.line, verified, "breakpoint set");
        if verified {
            self.events.emit(Event::BreakpointVerified {
                breakpoint: breakpoint.clone(),
            });
        }
        breakpoint
    }

    /// Remove the first breakpoint on `line`
    pub fn clear_breakpoint(&mut self, path: &str, line: usize) -> Option<Breakpoint> {
        let removed = self.breakpoints.clear(path, line);
        debug!(path, line, removed = removed.is_some(), "breakpoint cleared");
        removed
    }

    /// Remove every breakpoint of `path`
    pub fn clear_breakpoints(&mut self, path: &str) {
        debug!(path, "breakpoints cleared");
        self.breakpoints.clear_all(path);
    }

    /// Breakpoints of `path`, in creation order
    pub fn breakpoints(&self, path: &str) -> &[Breakpoint] {
        self.breakpoints.for_path(path)
    }

    /// Suggested breakpoint columns on `line` of the loaded program
    pub fn breakpoint_columns(&self, line: usize) -> Vec<usize> {
        match &self.program {
            Some(program) => program
                .source_map
                .breakpoint_columns(line, self.config.breakpoint_column_min_len),
            None => Vec::new(),
        }
    }

    // ========== Instruction breakpoints ==========

    /// Stop before the instruction at `address` executes
    ///
    /// Returns false if one was already set there.
    pub fn set_instruction_breakpoint(&mut self, address: usize) -> bool {
        debug!(address, "instruction breakpoint set");
        self.instruction_breakpoints.set(address)
    }

    /// Remove every instruction breakpoint
    pub fn clear_instruction_breakpoints(&mut self) {
        self.instruction_breakpoints.clear();
    }

    // ========== Data breakpoints ==========

    /// Watch a register (`r0`..`r7`) or a label of the loaded program
    ///
    /// Returns false, recording nothing, when `name` is neither.
    pub fn set_data_breakpoint(&mut self, name: &str, access: AccessType) -> bool {
        let Some(location) = resolve_data_name(self.program.as_ref(), name) else {
            debug!(name, "data breakpoint rejected");
            return false;
        };

        debug!(name, ?location, %access, "data breakpoint set");
        self.data_breakpoints.set(name, location, access);
        true
    }

    /// Remove every data breakpoint
    pub fn clear_data_breakpoints(&mut self) {
        self.data_breakpoints.clear();
    }

    fn relocate_data_breakpoints(&mut self) {
        let program = self.program.as_ref();
        let dropped = self
            .data_breakpoints
            .relocate(|name| resolve_data_name(program, name));
        for name in dropped {
            debug!(name, "data breakpoint dropped");
        }
    }

    // ========== Inspection ==========

    /// Registers as `(name, value)` pairs in index order
    pub fn registers(&self) -> Vec<(String, i32)> {
        self.cpu
            .registers()
            .iter()
            .enumerate()
            .map(|(index, &value)| (register_name(index), value))
            .collect()
    }

    /// Defined memory cells inside the configured window
    pub fn memory(&self) -> Vec<(usize, i32)> {
        self.memory_range(0, self.config.memory_window)
    }

    /// Defined memory cells in `[start, start + len)`
    pub fn memory_range(&self, start: usize, len: usize) -> Vec<(usize, i32)> {
        self.cpu.memory().defined_cells(start, len)
    }

    /// Current source line and instruction address
    pub fn location(&self) -> ExecutionPoint {
        ExecutionPoint {
            line: self.pc,
            instruction: self.instruction,
        }
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Instruction units starting at `address`
    pub fn disassemble(&self, address: usize, count: usize) -> Vec<InstructionUnit> {
        match &self.program {
            Some(program) => disassembler::disassemble(&program.source_map, address, count),
            None => Vec::new(),
        }
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn cpu(&self) -> &CPU<LineMemory> {
        &self.cpu
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Map a watch name to a register, or to the line of a label in `program`
fn resolve_data_name(program: Option<&Program>, name: &str) -> Option<Location> {
    if let Some(index) = (0..REGISTER_COUNT).find(|&i| register_name(i) == name) {
        return Some(Location::Register(index));
    }
    program?.symbol_table.line_of(name).map(Location::Memory)
}
