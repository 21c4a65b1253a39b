//! Chiplet trace analysis: rebuild per-chiplet operation queues from a
//! simulator trace and cancel matched SEND/RECV pairs.

pub mod engine;
pub mod parse;
pub mod report;
pub mod trace;

pub type Result<T> = anyhow::Result<T>;
