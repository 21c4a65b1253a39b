//! Trace text -> `Trace`.
//!
//! This layer only builds the model; it never filters or matches operations.

pub mod reader;
pub mod row;

pub use reader::{parse_trace_file, parse_trace_str};
