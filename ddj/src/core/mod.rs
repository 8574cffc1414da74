//! Deterministic, pure logic for naming and command synthesis.
//!
//! Core modules must be free of I/O side effects. They operate on the resolved
//! run configuration and return values that tests can compare directly.

pub mod command;
pub mod naming;
pub mod partition;
pub mod run_config;
pub mod settings;
pub mod types;
