//! Partition discovery through the worker image's `info.py` helper.
//!
//! The [`PartitionCounter`] trait decouples dispatch from the container
//! runtime; tests substitute counters that return canned results.

use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::core::command::nparts_query;
use crate::core::settings::Settings;
use crate::core::types::ProjectId;

/// Source of the number of partitions of a project.
pub trait PartitionCounter {
    fn count(&self, project: &ProjectId) -> Result<u32>;
}

/// Counter that runs `info.py --nparts` in a throwaway container.
pub struct ContainerPartitionCounter<'a> {
    settings: &'a Settings,
}

impl<'a> ContainerPartitionCounter<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

impl PartitionCounter for ContainerPartitionCounter<'_> {
    #[instrument(skip_all, fields(project = %project))]
    fn count(&self, project: &ProjectId) -> Result<u32> {
        let query = nparts_query(self.settings, project.as_str());
        debug!(command = %query, "querying partition count");
        let output = Command::new(&query.program)
            .args(&query.args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("run {}", query.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "partition query exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            ));
        }
        parse_partition_count(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the helper's stdout as a positive partition count.
pub fn parse_partition_count(stdout: &str) -> Result<u32> {
    let trimmed = stdout.trim();
    let count: u32 = trimmed
        .parse()
        .with_context(|| format!("invalid partition count {trimmed:?}"))?;
    if count == 0 {
        return Err(anyhow!("partition count must be positive"));
    }
    Ok(count)
}

/// Number of partitions of `project`, falling back to 1 when the query fails.
///
/// The query is attempted exactly once.
pub fn discover_partitions<C: PartitionCounter>(counter: &C, project: &ProjectId) -> u32 {
    match counter.count(project) {
        Ok(count) => {
            debug!(project = %project, count, "partitions discovered");
            count
        }
        Err(err) => {
            warn!(project = %project, err = %format!("{err:#}"), "partition query failed, assuming 1");
            eprintln!("[WARNING] {err:#}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeCounter;

    fn project() -> ProjectId {
        ProjectId::parse("foo_d4j").expect("project id")
    }

    #[test]
    fn parses_trimmed_integer_output() {
        assert_eq!(parse_partition_count("12\n").expect("count"), 12);
        assert_eq!(parse_partition_count("  3 ").expect("count"), 3);
    }

    #[test]
    fn rejects_non_integer_and_zero_output() {
        assert!(parse_partition_count("Traceback (most recent call last)").is_err());
        assert!(parse_partition_count("").is_err());
        assert!(parse_partition_count("-2").is_err());
        assert!(parse_partition_count("0").is_err());
    }

    #[test]
    fn successful_query_is_used() {
        let counter = FakeCounter::returning(4);
        assert_eq!(discover_partitions(&counter, &project()), 4);
        assert_eq!(counter.calls(), 1);
    }

    #[test]
    fn failed_query_falls_back_to_one_partition() {
        let counter = FakeCounter::failing("docker: command not found");
        assert_eq!(discover_partitions(&counter, &project()), 1);
        assert_eq!(counter.calls(), 1);
    }

    #[test]
    fn missing_runtime_falls_back_to_one_partition() {
        let settings = Settings {
            container_cmd: "ddj-test-no-such-runtime".to_string(),
            ..Settings::default()
        };
        let counter = ContainerPartitionCounter::new(&settings);
        assert!(counter.count(&project()).is_err());
        assert_eq!(discover_partitions(&counter, &project()), 1);
    }
}
