//! Driver for the DD/Java container image.
//!
//! A run turns an experiment descriptor into one container per partition of
//! the target project, each with a reproducible name and its own artifact
//! directory. The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (config, naming, command synthesis).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (settings files, directories,
//!   container processes, host timezone). Behind traits where tests need fakes.
//!
//! Orchestration modules ([`dispatch`], [`passthrough`]) coordinate core logic
//! with I/O to implement CLI commands.

pub mod core;
pub mod dispatch;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod passthrough;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
