//! Command synthesis for worker containers.
//!
//! Commands are built as structured values (a program plus discrete
//! arguments). Text is produced only by [`CommandLine::render`] for display;
//! execution hands the discrete arguments to the OS without a shell.

use std::fmt;
use std::path::Path;

use crate::core::partition::UnitIndex;
use crate::core::run_config::RunConfig;
use crate::core::settings::Settings;

/// Host facts sampled once per invocation and threaded into synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
    /// Value for the container's `TZ` variable, if the host has a non-UTC zone.
    pub timezone: Option<String>,
}

/// A program with discrete arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Add `flag value` as two arguments.
    pub fn opt(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.arg(flag).arg(value)
    }

    /// Render as a single shell-safe line.
    pub fn render(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| shell_escape(part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// The in-container command: worker script, best-effort log recovery, and
/// timing with output captured under the mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestCommand {
    pub script: CommandLine,
    /// Copies the last known worker log to the mount point if the script fails.
    pub fallback: CommandLine,
    /// Combined stdout/stderr destination.
    pub log_path: String,
}

impl GuestCommand {
    /// Bash text executed inside the container.
    pub fn render(&self) -> String {
        format!(
            "(time {} || {}) >& {}",
            self.script.render(),
            self.fallback.render(),
            shell_escape(&self.log_path)
        )
    }
}

/// Guest and outer command for a single unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPair {
    pub guest: GuestCommand,
    pub outer: CommandLine,
}

/// Per-unit inputs to the outer invocation.
#[derive(Debug, Clone, Copy)]
pub struct UnitTarget<'a> {
    pub index: UnitIndex,
    pub container_name: &'a str,
    /// Host directory bound to the mount point; `None` when no output root is configured.
    pub artifact_dir: Option<&'a Path>,
}

pub fn build_commands(
    config: &RunConfig,
    settings: &Settings,
    host: &HostEnv,
    target: UnitTarget<'_>,
) -> CommandPair {
    let guest = guest_command(config, settings);
    let outer = outer_command(config, settings, host, target, &guest);
    CommandPair { guest, outer }
}

/// Worker script name for the config's mode and flags.
pub fn worker_script(config: &RunConfig) -> String {
    let mode = config.mode();
    if config.decomp_only {
        format!("decomp_only_{mode}.sh")
    } else if config.plain {
        format!("batch_p_{mode}.sh")
    } else {
        format!("batch_{mode}.sh")
    }
}

pub fn guest_command(config: &RunConfig, settings: &Settings) -> GuestCommand {
    let mut script = CommandLine::new(format!(
        "{}/{}",
        settings.scripts_dir(),
        worker_script(config)
    ));

    if !config.decomp_only {
        let algo = if config.plain {
            config.algorithm.as_str().to_string()
        } else {
            config.algorithm.as_str().to_uppercase()
        };
        script.opt("-a", algo);
        if !config.plain {
            script.opt("-m", config.memory.to_string());
        }
        if config.staged_active() {
            script
                .arg("-s")
                .opt("-l", config.max_stmt_level.to_string())
                .opt("-t", format!("{:.6}", config.modified_stmt_rate_thresh));
        }
        if config.shuffle_count > 0 {
            script.opt("-u", config.shuffle_count.to_string());
        }
        if config.optout && !config.plain {
            script.arg("-x");
        }
        if config.custom_split && !config.plain {
            script.arg("-c");
        }
        if config.greedy {
            script.arg("-g");
        }
    }
    script.arg(config.project_id.stem());

    GuestCommand {
        script,
        fallback: fallback_copy(config, settings),
        log_path: format!("{}/log", settings.mount_point),
    }
}

fn fallback_copy(config: &RunConfig, settings: &Settings) -> CommandLine {
    let source = if config.decomp_only {
        format!(
            "{}/{}.decomp.log",
            settings.data_dir(),
            config.project_id.stem()
        )
    } else {
        format!("{}/DD/{}.log", settings.data_dir(), config.project_id)
    };
    let mut cp = CommandLine::new("cp");
    cp.arg(source).arg(format!("{}/", settings.mount_point));
    cp
}

pub fn outer_command(
    config: &RunConfig,
    settings: &Settings,
    host: &HostEnv,
    target: UnitTarget<'_>,
    guest: &GuestCommand,
) -> CommandLine {
    let mut cmd = CommandLine::new(&settings.container_cmd);
    cmd.arg("run");
    if !config.keep {
        cmd.arg("--rm");
    }
    cmd.arg("-t");
    if config.detach {
        cmd.arg("-d");
    }

    if let Some(tz) = &host.timezone {
        cmd.opt("-e", format!("TZ={tz}"));
    }
    cmd.opt("-e", format!("USER={}", settings.user))
        .opt("-w", &settings.home)
        .opt("-u", &settings.user);

    if let Some(part) = target.index.partition {
        cmd.opt("-e", format!("DD_PART_NUM={part}"));
    }
    if let Some(example) = target.index.example {
        cmd.opt("-e", format!("DD_EXAMPLE_NUM={example}"));
    }
    if !config.ignore_test_msg {
        cmd.opt("-e", "DD_INTERPRET_TEST_MSG=1");
    }

    if let Some(dir) = target.artifact_dir {
        cmd.opt(
            "-v",
            format!("{}:{}", dir.display(), settings.mount_point),
        );
    }

    cmd.opt("--name", target.container_name)
        .arg(settings.image_ref(config.devel))
        .arg("/bin/bash")
        .arg("-l")
        .opt("-c", guest.render());
    cmd
}

/// Helper-image query for the number of partitions of `project_id`.
pub fn nparts_query(settings: &Settings, project_id: &str) -> CommandLine {
    let mut cmd = info_command(settings);
    cmd.arg("--nparts").arg(project_id);
    cmd
}

/// Project listing through the helper image.
pub fn list_command(settings: &Settings, projects: &[String]) -> CommandLine {
    let mut cmd = info_command(settings);
    for project in projects {
        cmd.arg(project);
    }
    cmd
}

/// Pull of the worker image.
pub fn update_command(settings: &Settings, devel: bool) -> CommandLine {
    let mut cmd = CommandLine::new(&settings.container_cmd);
    cmd.arg("pull").arg(settings.image_ref(devel));
    cmd
}

fn info_command(settings: &Settings) -> CommandLine {
    let mut cmd = CommandLine::new(&settings.container_cmd);
    cmd.arg("run")
        .arg("--rm")
        .opt("-u", &settings.user)
        .arg(settings.image_ref(false))
        .arg(format!("{}/info.py", settings.scripts_dir()));
    cmd
}

/// Quote `input` for a POSIX shell unless it is made of safe characters only.
pub fn shell_escape(input: &str) -> String {
    if !input.is_empty()
        && input
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '='))
    {
        return input.to_string();
    }
    let mut escaped = String::from("'");
    for ch in input.chars() {
        if ch == '\'' {
            escaped.push_str("'\"'\"'");
        } else {
            escaped.push(ch);
        }
    }
    escaped.push('\'');
    escaped
}
