//! Value types shared by naming and command synthesis.

use std::fmt;

use anyhow::{Result, anyhow};

/// Project category encoded as the `_d4j` / `_ddj` suffix of a project id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    D4j,
    Ddj,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::D4j, Mode::Ddj];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::D4j => "d4j",
            Mode::Ddj => "ddj",
        }
    }

    /// Project-id suffix selecting this mode.
    pub fn suffix(self) -> &'static str {
        match self {
            Mode::D4j => "_d4j",
            Mode::Ddj => "_ddj",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project id split into its stem and mode.
///
/// Construction fails unless the raw id ends in exactly one mode suffix, so
/// holding a `ProjectId` means the suffix has already been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId {
    raw: String,
    stem: String,
    mode: Mode,
}

impl ProjectId {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        for mode in Mode::ALL {
            if let Some(stem) = raw.strip_suffix(mode.suffix()) {
                if stem.is_empty() {
                    return Err(anyhow!("invalid project ID: \"{raw}\" (empty name)"));
                }
                return Ok(Self {
                    raw: raw.to_string(),
                    stem: stem.to_string(),
                    mode,
                });
            }
        }
        Err(anyhow!(
            "invalid project ID: \"{raw}\" (expected a `_d4j` or `_ddj` suffix)"
        ))
    }

    /// Full id as supplied, suffix included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Id with the mode suffix removed.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Delta debugging algorithm run by the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Dd,
    #[default]
    Ddmin,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Dd => "dd",
            Algorithm::Ddmin => "ddmin",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memory made available to the worker, in gigabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MemoryGb {
    #[default]
    G8,
    G16,
    G32,
    G48,
    G64,
}

impl MemoryGb {
    pub fn gigabytes(self) -> u32 {
        match self {
            MemoryGb::G8 => 8,
            MemoryGb::G16 => 16,
            MemoryGb::G32 => 32,
            MemoryGb::G48 => 48,
            MemoryGb::G64 => 64,
        }
    }

    pub fn from_gigabytes(gb: u32) -> Result<Self> {
        match gb {
            8 => Ok(MemoryGb::G8),
            16 => Ok(MemoryGb::G16),
            32 => Ok(MemoryGb::G32),
            48 => Ok(MemoryGb::G48),
            64 => Ok(MemoryGb::G64),
            other => Err(anyhow!(
                "unsupported memory size {other}G (choose 8, 16, 32, 48 or 64)"
            )),
        }
    }
}

impl fmt::Display for MemoryGb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gigabytes())
    }
}
