//! Artifact directory provisioning.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Resolve `dir` to an absolute path and make sure it exists.
///
/// Returns `None` (after printing a diagnostic) when the path cannot be
/// resolved or created; callers decide whether that is fatal. In dry-run mode
/// nothing is created and the would-be path is returned.
pub fn ensure_dir(dir: &Path, dry_run: bool) -> Option<PathBuf> {
    let path = match std::path::absolute(dir) {
        Ok(path) => path,
        Err(err) => {
            warn!(path = %dir.display(), err = %err, "cannot resolve directory");
            eprintln!("\"{}\": failed to resolve: {err}", dir.display());
            return None;
        }
    };
    if dry_run || path.is_dir() {
        return Some(path);
    }
    match fs::create_dir_all(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "created directory");
            Some(path)
        }
        Err(err) => {
            warn!(path = %path.display(), err = %err, "failed to create directory");
            eprintln!("\"{}\": failed to create: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_nested_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("DDX").join("unit");
        let path = ensure_dir(&target, false).expect("provisioned");
        assert!(path.is_absolute());
        assert!(target.is_dir());
    }

    #[test]
    fn existing_directory_is_accepted() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = ensure_dir(temp.path(), false).expect("existing dir");
        assert_eq!(path, temp.path());
    }

    #[test]
    fn dry_run_returns_path_without_creating() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("never");
        let path = ensure_dir(&target, true).expect("dry-run path");
        assert_eq!(path, target);
        assert!(!target.exists());
    }

    #[test]
    fn blocked_path_reports_unavailable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("file");
        fs::write(&file, "x").expect("write file");
        assert_eq!(ensure_dir(&file.join("child"), false), None);
    }
}
