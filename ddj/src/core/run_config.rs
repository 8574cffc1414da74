//! Fully resolved description of a single `ddj run` invocation.

use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::core::types::{Algorithm, MemoryGb, Mode, ProjectId};

/// Default statement grouping depth for staged runs.
pub const DEFAULT_MAX_STMT_LEVEL: u32 = 8;
/// Default modified-statement rate below which level 1+ grouping is suppressed.
pub const DEFAULT_MODIFIED_STMT_RATE_THRESH: f64 = 0.05;
/// Custom split is on unless explicitly disabled (`--simple-split`).
pub const DEFAULT_CUSTOM_SPLIT: bool = true;

/// Experiment descriptor resolved from the command line.
///
/// Built once before any synthesis step and never mutated afterwards; every
/// downstream component takes it by shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub project_id: ProjectId,
    pub algorithm: Algorithm,
    pub memory: MemoryGb,
    /// Text-based diff/patch instead of AST diff/patch.
    pub plain: bool,
    pub staged: bool,
    pub max_stmt_level: u32,
    pub modified_stmt_rate_thresh: f64,
    pub shuffle_count: u32,
    pub optout: bool,
    pub custom_split: bool,
    pub greedy: bool,
    pub decomp_only: bool,
    pub ignore_test_msg: bool,
    /// Use the development image and the `x-` name prefix.
    pub devel: bool,
    pub example_index: Option<u32>,
    pub partition_filter: Option<u32>,
    pub out_dir: Option<PathBuf>,
    /// Keep the container after it exits (omit `--rm`).
    pub keep: bool,
    pub detach: bool,
}

impl RunConfig {
    /// Config with every facet at its default.
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            algorithm: Algorithm::default(),
            memory: MemoryGb::default(),
            plain: false,
            staged: false,
            max_stmt_level: DEFAULT_MAX_STMT_LEVEL,
            modified_stmt_rate_thresh: DEFAULT_MODIFIED_STMT_RATE_THRESH,
            shuffle_count: 0,
            optout: false,
            custom_split: DEFAULT_CUSTOM_SPLIT,
            greedy: false,
            decomp_only: false,
            ignore_test_msg: false,
            devel: false,
            example_index: None,
            partition_filter: None,
            out_dir: None,
            keep: false,
            detach: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let thresh = self.modified_stmt_rate_thresh;
        if !thresh.is_finite() || !(0.0..=1.0).contains(&thresh) {
            return Err(anyhow!(
                "modified_stmt_rate_thresh must be within [0, 1], got {thresh}"
            ));
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.project_id.mode()
    }

    /// Staged grouping only applies to full AST runs.
    pub fn staged_active(&self) -> bool {
        self.staged && !self.plain && !self.decomp_only
    }
}
