//! Stable exit codes for the `ddj` CLI.

/// Every selected unit was dispatched (or printed, in dry-run mode).
pub const OK: i32 = 0;
/// Invalid project id, settings or output root; nothing was dispatched.
pub const INVALID: i32 = 1;
/// `ddj run` was given no unit selection (`-e`, `-p` or `--all`).
pub const USAGE: i32 = 2;
/// At least one unit failed to start, was skipped or was interrupted.
pub const PARTIAL: i32 = 3;
