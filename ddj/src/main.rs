//! DD/Java demo driver.
//!
//! Launches the DD/Java worker image once per partition (or example) of a
//! project, naming every container deterministically so its artifacts under
//! the output root can be found again.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use ddj::core::command::HostEnv;
use ddj::core::run_config::{
    DEFAULT_MAX_STMT_LEVEL, DEFAULT_MODIFIED_STMT_RATE_THRESH, RunConfig,
};
use ddj::core::settings::Settings;
use ddj::core::types::{Algorithm, MemoryGb, ProjectId};
use ddj::dispatch::{DispatchContext, dispatch};
use ddj::exit_codes;
use ddj::io::config::{DEFAULT_SETTINGS_FILE, load_settings};
use ddj::io::discovery::ContainerPartitionCounter;
use ddj::io::launcher::{InterruptFlag, ProcessLauncher};
use ddj::io::timezone::host_timezone;
use ddj::logging;
use ddj::passthrough::{list_projects, update_image};

#[derive(Parser)]
#[command(name = "ddj", version, about = "DD/Java demo driver")]
struct Cli {
    /// Container runtime command (overrides the settings file).
    #[arg(short = 'c', long = "container-command", value_name = "CMD", global = true)]
    container_cmd: Option<String>,

    /// Settings file; missing means built-in defaults.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List projects.
    List {
        #[arg(value_name = "PROJ_ID")]
        projects: Vec<String>,
    },
    /// Update the docker image of the DD/Java demo.
    Update {
        /// Only print the command.
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Pull the experimental image.
        #[arg(short = 'x', long = "experimental")]
        devel: bool,
    },
    /// Run a demo.
    Run(RunArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlgoArg {
    Dd,
    Ddmin,
}

impl From<AlgoArg> for Algorithm {
    fn from(value: AlgoArg) -> Self {
        match value {
            AlgoArg::Dd => Algorithm::Dd,
            AlgoArg::Ddmin => Algorithm::Ddmin,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Use text diff/patch instead of AST diff/patch.
    #[arg(long)]
    plain: bool,

    /// DD algorithm.
    #[arg(short, long = "algo", value_enum, default_value = "ddmin")]
    algorithm: AlgoArg,

    /// Available memory in GB (8, 16, 32, 48 or 64).
    #[arg(short, long = "mem", value_name = "GB", default_value = "8", value_parser = parse_memory)]
    memory: MemoryGb,

    /// Enable staged DD.
    #[arg(short, long)]
    staged: bool,

    /// Group statements at levels up to N.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_STMT_LEVEL)]
    max_stmt_level: u32,

    /// Suppress level 1+ statement grouping when the modified statement rate is below R.
    #[arg(long, value_name = "R", default_value_t = DEFAULT_MODIFIED_STMT_RATE_THRESH)]
    modified_stmt_rate_thresh: f64,

    /// Shuffle delta components N times.
    #[arg(long, value_name = "N", default_value_t = 0)]
    shuffle: u32,

    /// Opt out delta components.
    #[arg(long)]
    optout: bool,

    /// Disable custom split.
    #[arg(long)]
    simple_split: bool,

    /// Try to find multiple solutions.
    #[arg(long)]
    greedy: bool,

    /// Example number.
    #[arg(short, long, value_name = "N")]
    example: Option<u32>,

    /// Part number.
    #[arg(short, long, value_name = "N")]
    part: Option<u32>,

    /// Process all examples.
    #[arg(long)]
    all: bool,

    /// Keep the container after it exits.
    #[arg(short, long)]
    keep: bool,

    /// Start containers in the background.
    #[arg(short, long)]
    detach: bool,

    /// Root directory for the results.
    #[arg(short, long, value_name = "DIR", default_value = "DDX")]
    out_dir: PathBuf,

    /// Only print commands.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Use the experimental image.
    #[arg(short = 'x', long = "experimental")]
    devel: bool,

    /// Test delta decomposition only.
    #[arg(long)]
    decomp_only: bool,

    /// Ignore test messages.
    #[arg(short, long)]
    ignore_test_msg: bool,

    #[arg(value_name = "PROJ_ID")]
    project_id: String,
}

impl RunArgs {
    fn has_selection(&self) -> bool {
        self.example.is_some() || self.part.is_some() || self.all
    }

    fn to_config(&self) -> Result<RunConfig> {
        let project_id = ProjectId::parse(&self.project_id)?;
        let config = RunConfig {
            algorithm: self.algorithm.into(),
            memory: self.memory,
            plain: self.plain,
            staged: self.staged,
            max_stmt_level: self.max_stmt_level,
            modified_stmt_rate_thresh: self.modified_stmt_rate_thresh,
            shuffle_count: self.shuffle,
            optout: self.optout,
            custom_split: !self.simple_split,
            greedy: self.greedy,
            decomp_only: self.decomp_only,
            ignore_test_msg: self.ignore_test_msg,
            devel: self.devel,
            example_index: self.example,
            partition_filter: self.part,
            out_dir: Some(self.out_dir.clone()),
            keep: self.keep,
            detach: self.detach,
            ..RunConfig::new(project_id)
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_memory(raw: &str) -> std::result::Result<MemoryGb, String> {
    let gb: u32 = raw.parse().map_err(|err| format!("{err}"))?;
    MemoryGb::from_gigabytes(gb).map_err(|err| err.to_string())
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config).context("load settings")?;
    if let Some(cmd) = cli.container_cmd {
        settings.container_cmd = cmd;
    }
    settings.validate()?;
    match cli.command {
        Command::List { projects } => cmd_list(&settings, &projects),
        Command::Update { dry_run, devel } => Ok(cmd_update(&settings, devel, dry_run)),
        Command::Run(args) => cmd_run(&settings, &args),
    }
}

fn cmd_list(settings: &Settings, projects: &[String]) -> Result<i32> {
    let launcher = ProcessLauncher::new(InterruptFlag::default());
    let code = list_projects(settings, projects, &launcher)?;
    Ok(code.unwrap_or(exit_codes::PARTIAL))
}

fn cmd_update(settings: &Settings, devel: bool, dry_run: bool) -> i32 {
    let launcher = ProcessLauncher::new(InterruptFlag::default());
    update_image(settings, devel, dry_run, &launcher).unwrap_or(exit_codes::PARTIAL)
}

fn cmd_run(settings: &Settings, args: &RunArgs) -> Result<i32> {
    if !args.has_selection() {
        println!("Specify example (-e N) or part (-p N).");
        println!("Use \"--all\" option if you want to process all examples");
        return Ok(exit_codes::USAGE);
    }
    let config = args.to_config()?;
    let host = HostEnv {
        timezone: host_timezone(),
    };
    debug!(timezone = ?host.timezone, "host environment");

    let interrupt = if args.dry_run {
        InterruptFlag::default()
    } else {
        InterruptFlag::install()?
    };
    let ctx = DispatchContext {
        settings,
        host: &host,
        dry_run: args.dry_run,
        interrupt: Some(&interrupt),
    };
    let report = dispatch(
        &config,
        &ctx,
        &ContainerPartitionCounter::new(settings),
        &ProcessLauncher::new(interrupt.clone()),
    )?;

    if report.units.is_empty() {
        if let Some(part) = config.partition_filter {
            eprintln!(
                "part {part} is out of range: {} has {} part(s)",
                config.project_id, report.partitions
            );
        }
    }
    if report.failures() > 0 {
        eprintln!(
            "{} of {} unit(s) were not launched cleanly",
            report.failures(),
            report.units.len()
        );
        return Ok(exit_codes::PARTIAL);
    }
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_run(args: &[&str]) -> RunArgs {
        let cli = Cli::parse_from(std::iter::once("ddj").chain(args.iter().copied()));
        match cli.command {
            Command::Run(run) => run,
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn run_defaults_match_config_defaults() {
        let args = parse_run(&["run", "-e", "0", "foo_d4j"]);
        let config = args.to_config().expect("config");
        let mut expected = RunConfig::new(ProjectId::parse("foo_d4j").expect("id"));
        expected.example_index = Some(0);
        expected.out_dir = Some(PathBuf::from("DDX"));
        assert_eq!(config, expected);
    }

    #[test]
    fn run_flags_map_onto_config() {
        let args = parse_run(&[
            "run",
            "--plain",
            "-a",
            "dd",
            "-m",
            "32",
            "--simple-split",
            "--shuffle",
            "2",
            "-p",
            "3",
            "-x",
            "-i",
            "-k",
            "bar_ddj",
        ]);
        let config = args.to_config().expect("config");
        assert!(config.plain && config.devel && config.ignore_test_msg && config.keep);
        assert!(!config.custom_split);
        assert_eq!(config.algorithm, Algorithm::Dd);
        assert_eq!(config.memory, MemoryGb::G32);
        assert_eq!(config.shuffle_count, 2);
        assert_eq!(config.partition_filter, Some(3));
    }

    #[test]
    fn unsupported_memory_is_rejected() {
        let result = Cli::try_parse_from(["ddj", "run", "-m", "12", "--all", "foo_d4j"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_project_id_fails_config_resolution() {
        let args = parse_run(&["run", "--all", "foo"]);
        assert!(args.to_config().is_err());
    }

    #[test]
    fn selection_is_required() {
        assert!(!parse_run(&["run", "foo_d4j"]).has_selection());
        assert!(parse_run(&["run", "--all", "foo_d4j"]).has_selection());
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::parse_from(["ddj", "list", "-c", "podman", "foo_d4j"]);
        assert_eq!(cli.container_cmd.as_deref(), Some("podman"));
        assert!(matches!(cli.command, Command::List { projects } if projects == ["foo_d4j"]));
    }
}
