//! Test-only helpers: deterministic configs and fake process adapters.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::command::CommandLine;
use crate::core::run_config::RunConfig;
use crate::core::settings::Settings;
use crate::core::types::ProjectId;
use crate::io::discovery::PartitionCounter;
use crate::io::launcher::{LaunchOutcome, Launcher};

/// Default run config for `project_id` (panics on an invalid id).
pub fn run_config(project_id: &str) -> RunConfig {
    RunConfig::new(ProjectId::parse(project_id).expect("valid project id"))
}

/// Default settings without the pause between launches.
pub fn fast_settings() -> Settings {
    Settings {
        launch_delay_secs: 0,
        ..Settings::default()
    }
}

/// Partition counter returning a fixed result and counting queries.
pub struct FakeCounter {
    result: std::result::Result<u32, String>,
    calls: Cell<usize>,
}

impl FakeCounter {
    pub fn returning(count: u32) -> Self {
        Self {
            result: Ok(count),
            calls: Cell::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl PartitionCounter for FakeCounter {
    fn count(&self, _project: &ProjectId) -> Result<u32> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone().map_err(|msg| anyhow!(msg))
    }
}

/// Launcher that records commands instead of running them.
///
/// Scripted outcomes are consumed in order; once exhausted every launch exits 0.
#[derive(Default)]
pub struct RecordingLauncher {
    outcomes: RefCell<VecDeque<std::result::Result<LaunchOutcome, String>>>,
    launched: RefCell<Vec<CommandLine>>,
}

impl RecordingLauncher {
    pub fn scripted(outcomes: Vec<std::result::Result<LaunchOutcome, String>>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            launched: RefCell::new(Vec::new()),
        }
    }

    pub fn launched(&self) -> Vec<CommandLine> {
        self.launched.borrow().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, command: &CommandLine) -> Result<LaunchOutcome> {
        self.launched.borrow_mut().push(command.clone());
        match self.outcomes.borrow_mut().pop_front() {
            Some(outcome) => outcome.map_err(|msg| anyhow!(msg)),
            None => Ok(LaunchOutcome::Exited(Some(0))),
        }
    }
}
