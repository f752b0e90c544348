//! WASM API for the debugger.
//!
//! Provides JavaScript-callable interfaces for loading, execution control,
//! breakpoints and state inspection. Every event the debugger raises is forwarded
//! to a JavaScript callback as a JSON string once the call that raised it returns.

use std::sync::mpsc::Receiver;

use wasm_bindgen::prelude::*;

use crate::disassembler::formatter::format_unit;
use crate::{AccessType, Debugger, EngineConfig, Event, RunState, StopReason};

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

/// One row of the disassembly view
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DisassemblyLine {
    address: usize,
    line: usize,
    column: usize,
    word: String,
    text: String,
}

#[wasm_bindgen]
impl DisassemblyLine {
    #[wasm_bindgen(getter)]
    pub fn address(&self) -> usize {
        self.address
    }

    #[wasm_bindgen(getter)]
    pub fn line(&self) -> usize {
        self.line
    }

    #[wasm_bindgen(getter)]
    pub fn column(&self) -> usize {
        self.column
    }

    #[wasm_bindgen(getter)]
    pub fn word(&self) -> String {
        self.word.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.text.clone()
    }
}

/// Debugger handle for JavaScript
#[wasm_bindgen]
pub struct WasmDebugger {
    debugger: Debugger,
    events: Receiver<Event>,
    on_event: js_sys::Function,
}

#[wasm_bindgen]
impl WasmDebugger {
    /// Create a debugger; `config_json` holds optional `EngineConfig` fields
    #[wasm_bindgen(constructor)]
    pub fn new(on_event: js_sys::Function, config_json: Option<String>) -> Result<WasmDebugger, JsError> {
        let config = match config_json {
            Some(json) => serde_json::from_str::<EngineConfig>(&json)
                .map_err(|e| JsError::new(&format!("invalid configuration: {}", e)))?,
            None => EngineConfig::default(),
        };

        let mut debugger = Debugger::new(config);
        let events = debugger.subscribe();

        Ok(WasmDebugger {
            debugger,
            events,
            on_event,
        })
    }

    /// Forward queued events to the callback
    fn flush(&self) {
        for event in self.events.try_iter() {
            if let Ok(json) = serde_json::to_string(&event) {
                let _ = self.on_event.call1(&JsValue::NULL, &JsValue::from_str(&json));
            }
        }
    }

    /// Load program text
    pub fn load_source(&mut self, path: &str, source: &str) -> Result<(), JsError> {
        let result = self
            .debugger
            .load_source(path, source)
            .map_err(|e| JsError::new(&e.to_string()));
        self.flush();
        result
    }

    pub fn run(&mut self, stop_on_entry: bool) -> Result<(), JsError> {
        let result = self
            .debugger
            .run(stop_on_entry)
            .map_err(|e| JsError::new(&e.to_string()));
        self.flush();
        result
    }

    pub fn continue_execution(&mut self) -> Result<(), JsError> {
        let result = self
            .debugger
            .continue_execution()
            .map_err(|e| JsError::new(&e.to_string()));
        self.flush();
        result
    }

    pub fn step(&mut self) -> Result<(), JsError> {
        let result = self.debugger.step().map_err(|e| JsError::new(&e.to_string()));
        self.flush();
        result
    }

    pub fn step_instruction(&mut self) -> Result<(), JsError> {
        let result = self
            .debugger
            .step_instruction()
            .map_err(|e| JsError::new(&e.to_string()));
        self.flush();
        result
    }

    /// Set a source breakpoint; returns the breakpoint as JSON
    pub fn set_breakpoint(&mut self, path: &str, line: usize) -> Result<String, JsError> {
        let breakpoint = self.debugger.set_breakpoint(path, line);
        self.flush();
        serde_json::to_string(&breakpoint).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Clear the first breakpoint on a line; returns true if one was removed
    pub fn clear_breakpoint(&mut self, path: &str, line: usize) -> bool {
        self.debugger.clear_breakpoint(path, line).is_some()
    }

    pub fn clear_breakpoints(&mut self, path: &str) {
        self.debugger.clear_breakpoints(path);
    }

    pub fn set_instruction_breakpoint(&mut self, address: usize) -> bool {
        self.debugger.set_instruction_breakpoint(address)
    }

    pub fn clear_instruction_breakpoints(&mut self) {
        self.debugger.clear_instruction_breakpoints();
    }

    /// Watch a register or label; `access` is `read`, `write` or `readWrite`
    pub fn set_data_breakpoint(&mut self, name: &str, access: &str) -> Result<bool, JsError> {
        let access: AccessType = access.parse().map_err(|e: String| JsError::new(&e))?;
        Ok(self.debugger.set_data_breakpoint(name, access))
    }

    pub fn clear_data_breakpoints(&mut self) {
        self.debugger.clear_data_breakpoints();
    }

    /// Register values in index order
    pub fn registers(&self) -> Vec<i32> {
        self.debugger.registers().into_iter().map(|(_, value)| value).collect()
    }

    /// Defined memory cells inside the configured window, as JSON `[[address, value], ...]`
    pub fn memory(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.debugger.memory()).map_err(|e| JsError::new(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn line(&self) -> usize {
        self.debugger.location().line
    }

    #[wasm_bindgen(getter)]
    pub fn instruction(&self) -> usize {
        self.debugger.location().instruction
    }

    /// Run state as a short string (`idle`, `running`, `stopped:<reason>`, `terminated`)
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        match self.debugger.state() {
            RunState::Idle => "idle".to_string(),
            RunState::Running => "running".to_string(),
            RunState::Terminated => "terminated".to_string(),
            RunState::Stopped(reason) => {
                let reason = match reason {
                    StopReason::Entry => "entry",
                    StopReason::Step => "step",
                    StopReason::Breakpoint => "breakpoint",
                    StopReason::InstructionBreakpoint => "instructionBreakpoint",
                    StopReason::DataBreakpoint => "dataBreakpoint",
                    StopReason::Exception => "exception",
                    StopReason::Pause => "pause",
                };
                format!("stopped:{}", reason)
            }
        }
    }

    /// Instruction units starting at an address
    pub fn disassemble(&self, address: usize, count: usize) -> Vec<JsValue> {
        self.debugger
            .disassemble(address, count)
            .iter()
            .map(|unit| {
                JsValue::from(DisassemblyLine {
                    address: unit.address,
                    line: unit.location.line,
                    column: unit.location.column,
                    word: unit.word.clone(),
                    text: format_unit(unit),
                })
            })
            .collect()
    }
}
