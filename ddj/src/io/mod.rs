//! I/O adapters: settings files, directories, and container processes.

pub mod config;
pub mod dirs;
pub mod discovery;
pub mod launcher;
pub mod timezone;
