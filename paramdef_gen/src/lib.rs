//! Paramdef layout compiler.
//!
//! Turns paramdef schemas into C++ and Rust struct declarations whose
//! in-memory layout matches the binary param rows, including packed
//! bitfield storage with generated accessors.

pub mod cmds;
pub mod codegen;
pub mod config;
pub mod paramdef;
