//! One-shot helper invocations: `ddj list` and `ddj update`.

use anyhow::{Context, Result};
use tracing::info;

use crate::core::command::{list_command, update_command};
use crate::core::settings::Settings;
use crate::io::launcher::{LaunchOutcome, Launcher};

/// List projects known to the worker image (all, or only `projects`).
///
/// Returns the helper's exit code.
pub fn list_projects<L: Launcher>(
    settings: &Settings,
    projects: &[String],
    launcher: &L,
) -> Result<Option<i32>> {
    let cmd = list_command(settings, projects);
    println!("{cmd}");
    let outcome = launcher.launch(&cmd).context("list projects")?;
    Ok(exit_code(outcome))
}

/// Pull the worker image; prints only in dry-run mode.
///
/// A runtime that cannot be started is reported, not propagated.
pub fn update_image<L: Launcher>(
    settings: &Settings,
    devel: bool,
    dry_run: bool,
    launcher: &L,
) -> Option<i32> {
    let cmd = update_command(settings, devel);
    println!("{cmd}");
    if dry_run {
        return Some(0);
    }
    match launcher.launch(&cmd) {
        Ok(outcome) => {
            info!(image = %settings.image_ref(devel), "image pull finished");
            exit_code(outcome)
        }
        Err(err) => {
            eprintln!("execution failed: {err:#}");
            None
        }
    }
}

fn exit_code(outcome: LaunchOutcome) -> Option<i32> {
    match outcome {
        LaunchOutcome::Exited(code) => code,
        LaunchOutcome::Interrupted => None,
    }
}
