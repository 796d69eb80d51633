//! CLI command implementations

pub mod config;
pub mod counters;
pub mod entities;
pub mod perf;
