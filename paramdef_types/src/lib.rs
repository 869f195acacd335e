//! Paramdef Type Definitions
//!
//! This crate contains the core data model for paramdef schemas: primitive
//! field kinds, field descriptors, paramdefs and the param manifest that
//! carries detected record sizes. It provides pure data structures without
//! any file I/O or code generation logic.

pub mod manifest;
pub mod types;

// Re-export commonly used types at the crate root
pub use manifest::*;
pub use types::*;
