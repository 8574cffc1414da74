//! Launching unit containers.
//!
//! The [`Launcher`] trait separates dispatch from process creation so the
//! dispatch loop can be exercised with recording launchers in tests.

use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::command::CommandLine;

/// How a started launch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The runtime invocation returned with this exit code (`None` if killed by a signal).
    Exited(Option<i32>),
    /// The operator interrupted the launch.
    Interrupted,
}

/// Starts the outer command of a unit.
///
/// An `Err` means the command could not be started at all.
pub trait Launcher {
    fn launch(&self, command: &CommandLine) -> Result<LaunchOutcome>;
}

/// Set by the Ctrl-C handler; consumed once per launch.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Install a process-wide Ctrl-C handler feeding this flag.
    ///
    /// The signal still reaches the foreground child, which ends the current
    /// launch; the driver itself keeps running.
    pub fn install() -> Result<Self> {
        let flag = Self::default();
        let handler_flag = flag.0.clone();
        ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        })
        .context("install interrupt handler")?;
        Ok(flag)
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return whether an interrupt arrived since the last call, clearing it.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Launcher that runs the command as a child process and waits for the
/// runtime invocation to return.
pub struct ProcessLauncher {
    interrupt: InterruptFlag,
}

impl ProcessLauncher {
    pub fn new(interrupt: InterruptFlag) -> Self {
        Self { interrupt }
    }
}

impl Launcher for ProcessLauncher {
    #[instrument(skip_all, fields(program = %command.program))]
    fn launch(&self, command: &CommandLine) -> Result<LaunchOutcome> {
        // Stale interrupts from before this launch must not be attributed to it.
        self.interrupt.take();
        debug!("spawning container runtime");
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .with_context(|| format!("spawn {}", command.program))?;
        if self.interrupt.take() {
            warn!("launch interrupted");
            return Ok(LaunchOutcome::Interrupted);
        }
        debug!(exit_code = ?status.code(), "container runtime returned");
        Ok(LaunchOutcome::Exited(status.code()))
    }
}
