//! CLI command handlers

pub mod commands;

pub use commands::{classify, consolidate, inspect, ConfigArgs, RunStatus};
