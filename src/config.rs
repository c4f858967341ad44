//! `pyrelease.toml` configuration.
//!
//! Looked up in the project directory first, then in the user config
//! directory. Every section is optional; a missing file means defaults.

use crate::error::{ErrorExt, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name searched for next to the target module.
pub const CONFIG_FILE_NAME: &str = "pyrelease.toml";

/// Default build commands, run in order inside the build directory.
pub const DEFAULT_BUILD_COMMANDS: &[&str] = &[
    "python setup.py sdist",
    "python setup.py bdist_wheel --universal",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub build: BuildConfig,
    pub upload: UploadConfig,
    pub dependencies: DependencyConfig,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Commands producing distributions in `dist/`.
    pub commands: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            commands: DEFAULT_BUILD_COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// `[upload]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// twine repository name for the test index
    pub test_repository: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            test_repository: "testpypi".to_string(),
        }
    }
}

/// `[dependencies]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Import names never reported as requirements.
    pub ignore: Vec<String>,

    /// Extra import name to index name conversions.
    pub conversions: BTreeMap<String, String>,
}

impl ReleaseConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read configuration from an explicit file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).fs_context("reading config", path)?;
        log::info!("Loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }

    /// Resolve configuration for a project.
    ///
    /// An explicit path wins; otherwise `<project_dir>/pyrelease.toml`, then
    /// `<config dir>/pyrelease/config.toml`; otherwise defaults.
    pub fn load(explicit: Option<&Path>, project_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in Self::candidates(project_dir) {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
            log::debug!("No config at {}", candidate.display());
        }

        Ok(Self::default())
    }

    fn candidates(project_dir: &Path) -> Vec<PathBuf> {
        let mut paths = vec![project_dir.join(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("pyrelease").join("config.toml"));
        }
        paths
    }
}
