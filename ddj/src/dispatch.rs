//! Orchestration for `ddj run`.
//!
//! A run resolves the partition set, then walks it in order: each selected
//! partition becomes one unit with a deterministic name, its own artifact
//! directory, and a container launch. Units are dispatched one at a time and
//! a failure in one unit never stops the ones after it.

use std::path::PathBuf;
use std::thread;

use anyhow::{Result, anyhow, bail};
use tracing::{debug, info, instrument, warn};

use crate::core::command::{CommandPair, HostEnv, UnitTarget, build_commands};
use crate::core::naming::container_name;
use crate::core::partition::{PartitionSet, UnitIndex};
use crate::core::run_config::RunConfig;
use crate::core::settings::Settings;
use crate::io::dirs::ensure_dir;
use crate::io::discovery::{PartitionCounter, discover_partitions};
use crate::io::launcher::{InterruptFlag, LaunchOutcome, Launcher};

/// Invocation-wide inputs shared by every unit.
#[derive(Debug, Clone, Copy)]
pub struct DispatchContext<'a> {
    pub settings: &'a Settings,
    pub host: &'a HostEnv,
    /// Print commands without creating directories or starting processes.
    pub dry_run: bool,
    /// Ctrl-C flag; an interrupt seen before the first launch aborts the run.
    pub interrupt: Option<&'a InterruptFlag>,
}

/// One unit, fully synthesized and ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionUnit {
    pub partition: u32,
    pub container_name: String,
    pub commands: CommandPair,
    pub artifact_dir: Option<PathBuf>,
}

/// Per-unit result of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// Dry run: printed only.
    Planned,
    /// The runtime invocation returned.
    Exited(Option<i32>),
    Interrupted,
    /// The runtime could not be started.
    Failed(String),
    /// The unit's artifact directory could not be provisioned.
    Skipped(String),
}

impl UnitStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            UnitStatus::Interrupted | UnitStatus::Failed(_) | UnitStatus::Skipped(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub partition: u32,
    pub container_name: String,
    /// Rendered outer command; absent when the unit was skipped before synthesis.
    pub command: Option<String>,
    /// Host directory mounted into the unit, if an output root is configured.
    pub artifact_dir: Option<PathBuf>,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Size of the partition set the units were drawn from.
    pub partitions: u32,
    pub units: Vec<UnitReport>,
}

impl DispatchReport {
    pub fn failures(&self) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.status.is_failure())
            .count()
    }
}

/// Synthesize the unit for `partition` with an already provisioned directory.
pub fn plan_unit(
    config: &RunConfig,
    ctx: &DispatchContext<'_>,
    partition: u32,
    index: UnitIndex,
    artifact_dir: Option<PathBuf>,
) -> ExecutionUnit {
    let name = container_name(config, index);
    let commands = build_commands(
        config,
        ctx.settings,
        ctx.host,
        UnitTarget {
            index,
            container_name: &name,
            artifact_dir: artifact_dir.as_deref(),
        },
    );
    ExecutionUnit {
        partition,
        container_name: name,
        commands,
        artifact_dir,
    }
}

/// Dispatch every selected unit of `config`.
///
/// Errors are returned only for conditions that stop the run before any unit
/// is dispatched: an invalid config, an unusable output root, or an interrupt
/// during discovery.
#[instrument(skip_all, fields(project = %config.project_id, dry_run = ctx.dry_run))]
pub fn dispatch<C: PartitionCounter, L: Launcher>(
    config: &RunConfig,
    ctx: &DispatchContext<'_>,
    counter: &C,
    launcher: &L,
) -> Result<DispatchReport> {
    config.validate()?;
    ctx.settings.validate()?;

    let out_root = match &config.out_dir {
        Some(dir) => Some(ensure_dir(dir, ctx.dry_run).ok_or_else(|| {
            anyhow!("cannot provision output directory \"{}\"", dir.display())
        })?),
        None => None,
    };

    let partitions = match config.example_index {
        Some(_) => PartitionSet::single(),
        None => PartitionSet::new(discover_partitions(counter, &config.project_id)),
    };
    if ctx.interrupt.is_some_and(InterruptFlag::take) {
        warn!("interrupted before dispatch");
        bail!("interrupted while querying partitions of {}", config.project_id);
    }
    info!(
        partitions = partitions.count(),
        filter = ?config.partition_filter,
        "dispatching units"
    );

    let mut units = Vec::new();
    for part in partitions.selected(config.partition_filter) {
        let index = partitions.unit_index(part, config.example_index);
        let name = container_name(config, index);

        let artifact_dir = match &out_root {
            Some(root) => match ensure_dir(&root.join(&name), ctx.dry_run) {
                Some(dir) => Some(dir),
                None => {
                    warn!(container = %name, "skipping unit without artifact directory");
                    units.push(UnitReport {
                        partition: part,
                        container_name: name,
                        command: None,
                        artifact_dir: None,
                        status: UnitStatus::Skipped("artifact directory unavailable".to_string()),
                    });
                    continue;
                }
            },
            None => None,
        };

        let unit = plan_unit(config, ctx, part, index, artifact_dir);
        let rendered = unit.commands.outer.render();
        println!("{rendered}");

        let status = if ctx.dry_run {
            UnitStatus::Planned
        } else {
            launch_unit(&unit, ctx.settings, launcher)
        };
        debug!(container = %unit.container_name, status = ?status, "unit dispatched");
        units.push(UnitReport {
            partition: part,
            container_name: unit.container_name,
            command: Some(rendered),
            artifact_dir: unit.artifact_dir,
            status,
        });
    }

    if units.is_empty() {
        warn!(
            filter = ?config.partition_filter,
            partitions = partitions.count(),
            "no partition selected"
        );
    }

    Ok(DispatchReport {
        partitions: partitions.count(),
        units,
    })
}

fn launch_unit<L: Launcher>(unit: &ExecutionUnit, settings: &Settings, launcher: &L) -> UnitStatus {
    match launcher.launch(&unit.commands.outer) {
        Ok(LaunchOutcome::Exited(code)) => {
            if code != Some(0) {
                eprintln!("{}: runtime exited with status {code:?}", unit.container_name);
            }
            // Throttle successive launches.
            thread::sleep(settings.launch_delay());
            UnitStatus::Exited(code)
        }
        Ok(LaunchOutcome::Interrupted) => {
            eprintln!("interrupted.");
            UnitStatus::Interrupted
        }
        Err(err) => {
            warn!(container = %unit.container_name, err = %format!("{err:#}"), "launch failed");
            eprintln!("execution failed: {err:#}");
            UnitStatus::Failed(format!("{err:#}"))
        }
    }
}
