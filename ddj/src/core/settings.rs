//! Driver settings: the fixed paths, image and user of the worker image.

use anyhow::{Result, anyhow};
use serde::Deserialize;

/// Settings that are constant for a whole invocation.
///
/// Stored in `ddj.toml` when the defaults need overriding. Missing fields
/// fall back to the values baked into the published worker image.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Container runtime executable (`docker`, `podman`, ...).
    pub container_cmd: String,

    /// Stable worker image reference.
    pub image: String,

    /// Tag appended to `image` for development runs when it carries no tag.
    pub devel_tag: String,

    /// User the worker runs as inside the container.
    pub user: String,

    /// Home directory of `user`; scripts and data live beneath it.
    pub home: String,

    /// In-container mount point for the per-unit artifact directory.
    pub mount_point: String,

    /// Pause between successive launches, in seconds.
    pub launch_delay_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            container_cmd: "docker".to_string(),
            image: "codecontinuum/ddj:esecfse2018".to_string(),
            devel_tag: "devel".to_string(),
            user: "ddj".to_string(),
            home: "/home/ddj".to_string(),
            mount_point: "/mnt/results".to_string(),
            launch_delay_secs: 3,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("container_cmd", &self.container_cmd),
            ("image", &self.image),
            ("devel_tag", &self.devel_tag),
            ("user", &self.user),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{field} must be non-empty"));
            }
        }
        for (field, value) in [("home", &self.home), ("mount_point", &self.mount_point)] {
            if !value.starts_with('/') {
                return Err(anyhow!(
                    "{field} must be an absolute container path, got \"{value}\""
                ));
            }
        }
        Ok(())
    }

    /// Image reference for a run; development runs get `:<devel_tag>` unless
    /// the configured image already pins a tag.
    pub fn image_ref(&self, devel: bool) -> String {
        if devel && !self.image_has_tag() {
            format!("{}:{}", self.image, self.devel_tag)
        } else {
            self.image.clone()
        }
    }

    /// A `:` before the last `/` belongs to a registry port, not a tag.
    fn image_has_tag(&self) -> bool {
        let repo = self.image.rsplit('/').next().unwrap_or(&self.image);
        repo.contains(':')
    }

    pub fn scripts_dir(&self) -> String {
        format!("{}/scripts", self.home.trim_end_matches('/'))
    }

    pub fn data_dir(&self) -> String {
        format!("{}/data", self.home.trim_end_matches('/'))
    }

    pub fn launch_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.launch_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_image_is_used_for_devel_runs() {
        let settings = Settings::default();
        assert_eq!(settings.image_ref(true), "codecontinuum/ddj:esecfse2018");
        assert_eq!(settings.image_ref(false), "codecontinuum/ddj:esecfse2018");
    }

    #[test]
    fn untagged_image_gets_devel_tag() {
        let settings = Settings {
            image: "codecontinuum/ddj".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.image_ref(true), "codecontinuum/ddj:devel");
        assert_eq!(settings.image_ref(false), "codecontinuum/ddj");
    }

    #[test]
    fn registry_port_is_not_a_tag() {
        let settings = Settings {
            image: "localhost:5000/ddj".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.image_ref(true), "localhost:5000/ddj:devel");

        let tagged = Settings {
            image: "localhost:5000/ddj:esecfse2018".to_string(),
            ..Settings::default()
        };
        assert_eq!(tagged.image_ref(true), "localhost:5000/ddj:esecfse2018");
    }

    #[test]
    fn derived_dirs_live_under_home() {
        let settings = Settings::default();
        assert_eq!(settings.scripts_dir(), "/home/ddj/scripts");
        assert_eq!(settings.data_dir(), "/home/ddj/data");
    }

    #[test]
    fn validate_rejects_relative_mount_point() {
        let settings = Settings {
            mount_point: "results".to_string(),
            ..Settings::default()
        };
        let err = settings.validate().expect_err("relative mount");
        assert!(err.to_string().contains("mount_point"));
    }
}
