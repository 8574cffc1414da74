//! Driver settings stored in `ddj.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::settings::Settings;

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "ddj.toml";

/// Load settings from a TOML file.
///
/// If the file is missing, returns `Settings::default()`.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!(path = %path.display(), "settings file missing, using defaults");
        let settings = Settings::default();
        settings.validate()?;
        return Ok(settings);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let settings: Settings =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    settings
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let settings = load_settings(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ddj.toml");
        fs::write(&path, "image = \"registry.local/ddj\"\n").expect("write");
        let loaded = load_settings(&path).expect("load");
        assert_eq!(loaded.image, "registry.local/ddj");
        assert_eq!(loaded.user, "ddj");
        assert_eq!(loaded.launch_delay_secs, 3);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ddj.toml");
        fs::write(&path, "home = \"relative/home\"\n").expect("write");
        let err = load_settings(&path).expect_err("relative home");
        assert!(format!("{err:#}").contains("home"));
    }
}
