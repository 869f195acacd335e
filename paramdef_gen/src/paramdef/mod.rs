pub mod bitfield;
pub mod file;
pub mod heuristics;
pub mod resolved;
pub mod types;
pub mod unique;
