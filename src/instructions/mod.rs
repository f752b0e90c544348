//! # Instruction Implementations
//!
//! This module contains the implementations of every executable instruction,
//! organized by category. Each instruction is a standalone function that takes a
//! mutable reference to the CPU plus its decoded fields and returns the resulting
//! [`Flow`](crate::Flow).
//!
//! Every implementation validates all of its fields and performs all of its reads
//! before its first write, so a failure never leaves partial state behind.
//!
//! ## Categories
//!
//! - **alu**: Arithmetic and logic operations (ADD, NOR)
//! - **branches**: Conditional branch (BEQ)
//! - **load_store**: Load and store (LW, SW)
//! - **control**: Jump-and-link and machine control (JALR, HALT, NOOP)

pub mod alu;
pub mod branches;
pub mod control;
pub mod load_store;
