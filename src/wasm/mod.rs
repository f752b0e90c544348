//! WebAssembly bindings for the lc2k engine.
//!
//! This module provides a JavaScript-callable debugger, enabling browser-based
//! stepping through line-addressed assembly programs.

#[cfg(feature = "wasm")]
pub mod api;

#[cfg(feature = "wasm")]
pub use api::WasmDebugger;
