//! CLI command handlers

pub mod commands;

pub use commands::{config, inspect, run, template};
