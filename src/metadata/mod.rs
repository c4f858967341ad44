//! Package metadata inferred from a single Python module.
//!
//! [`PyPackage::inspect`] reads the target once and fills in everything a
//! release needs. Values the source does not provide come from the user's
//! configuration files, and whatever is still missing is left for the wizard
//! to ask about.

pub mod dependencies;
pub mod license;
pub mod scanner;
pub mod version;

pub use license::License;
pub use scanner::SourceScan;
pub use version::{ReleaseVersion, validate_bump, version_from_git};

use crate::config::ReleaseConfig;
use crate::error::{ErrorExt, ReleaseError, Result};
use crate::source::{self, TargetKind};
use crate::userdata::UserInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the file the wizard saves edited metadata to.
pub const SAVE_FILE_NAME: &str = "release.info";

/// Everything known about the module being released.
#[derive(Debug, Clone)]
pub struct PyPackage {
    /// The Python file being released
    pub target_file: PathBuf,

    /// Directory containing the target file
    pub package_dir: PathBuf,

    /// Importable module name, fixed by the file name
    pub module_name: String,

    /// Distribution name on the package index
    pub name: String,

    /// Version from `__version__`, git tags or the user
    pub version: Option<String>,

    /// License as written in `__license__` or chosen by the user
    pub license: Option<String>,

    /// One line summary
    pub description: String,

    pub author: Option<String>,

    pub author_email: Option<String>,

    /// Third-party requirements, index names
    pub requirements: Vec<String>,

    /// Whether the module has a `main` function to expose as a console script
    pub is_script: bool,

    pub kind: TargetKind,

    /// Configuration files the author details came from
    pub user_info: UserInfo,
}

/// Fields persisted to `release.info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRelease {
    pub name: String,
    pub version: Option<String>,
    pub license: Option<String>,
    pub description: String,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub requirements: Vec<String>,
}

impl PyPackage {
    /// Locate and inspect a target, reading author details from the home directory.
    pub fn load_package(path: &Path, config: &ReleaseConfig) -> Result<Self> {
        Self::inspect(path, config, UserInfo::discover())
    }

    /// Locate and inspect a target with the given user configuration.
    pub fn inspect(path: &Path, config: &ReleaseConfig, user_info: UserInfo) -> Result<Self> {
        let target_file = source::find_package(path)?;
        let text = std::fs::read_to_string(&target_file)
            .fs_context("reading target module", &target_file)?;

        let package_dir = target_file
            .parent()
            .map(Path::to_path_buf)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."));

        let module_name = source::module_name(&target_file)?;
        let scan = SourceScan::new(&text);

        let description = describe(&scan);
        let requirements = dependencies::find_requirements(
            &scan,
            &module_name,
            &package_dir,
            &config.dependencies,
        );

        let author = scan
            .dunder("__author__")
            .or_else(|| user_info.author().map(String::from));
        let author_email = scan
            .dunder("__email__")
            .or_else(|| scan.dunder("__author_email__"))
            .or_else(|| user_info.author_email().map(String::from));

        let is_script = scan.has_main();
        if is_script {
            log::info!("Package has a main function.");
        } else {
            log::info!("Package does not have a main function.");
        }

        Ok(Self {
            kind: TargetKind::of(&target_file),
            name: module_name.clone(),
            version: scan.dunder("__version__"),
            license: scan.dunder("__license__"),
            description,
            author,
            author_email,
            requirements,
            is_script,
            module_name,
            package_dir,
            target_file,
            user_info,
        })
    }

    pub fn is_single_file(&self) -> bool {
        self.kind == TargetKind::SingleFile
    }

    /// Whether a `data` folder sits next to the target.
    pub fn is_data_files(&self) -> bool {
        self.package_dir.join("data").is_dir()
    }

    /// Whether a `docs` folder sits next to the target.
    pub fn is_docs(&self) -> bool {
        self.package_dir.join("docs").is_dir()
    }

    /// Project page on the package index.
    pub fn url(&self) -> String {
        format!("https://pypi.org/project/{}/", self.name)
    }

    /// Version to release, `0.0.0` when nothing is known.
    pub fn release_version(&self) -> &str {
        self.version.as_deref().unwrap_or("0.0.0")
    }

    /// Resolved license, MIT when unset or unknown.
    pub fn resolved_license(&self) -> License {
        License::resolve(self.license.as_deref())
    }

    /// Fill a missing version from the latest git tag of the package directory.
    pub async fn fill_version_from_git(&mut self) {
        if self.version.is_none() {
            self.version = version_from_git(&self.package_dir).await;
        }
    }

    /// Set a new version; it may not be lower than the current one.
    pub fn set_version(&mut self, new: &str) -> Result<&str> {
        let version = validate_bump(self.version.as_deref(), new)?;
        log::info!("Version set to {}", version);
        self.version = Some(version);
        Ok(self.release_version())
    }

    /// Set the distribution name, keeping only characters valid in one.
    pub fn set_name(&mut self, raw: &str) -> Result<&str> {
        let name = sanitize_name(raw);
        if name.is_empty() {
            return Err(ReleaseError::InvalidPackage {
                reason: format!("'{raw}' contains no usable name characters"),
            });
        }
        self.name = name;
        Ok(&self.name)
    }

    /// Set the license by key or alias; `None` clears it (MIT is used).
    pub fn set_license(&mut self, raw: Option<&str>) -> Result<()> {
        self.license = match raw.map(str::trim).filter(|r| !r.is_empty()) {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("none") => None,
            Some(r) => Some(r.parse::<License>()?.key().to_string()),
        };
        Ok(())
    }

    /// Append requirements, skipping duplicates and empty entries.
    pub fn add_requirements<'a>(&mut self, extra: impl IntoIterator<Item = &'a str>) {
        for dep in extra.into_iter().map(str::trim).filter(|d| !d.is_empty()) {
            if !self.requirements.iter().any(|r| r == dep) {
                self.requirements.push(dep.to_string());
            }
        }
    }

    pub fn to_saved(&self) -> SavedRelease {
        SavedRelease {
            name: self.name.clone(),
            version: self.version.clone(),
            license: self.license.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            author_email: self.author_email.clone(),
            requirements: self.requirements.clone(),
        }
    }

    pub fn apply_saved(&mut self, saved: SavedRelease) {
        self.name = saved.name;
        self.version = saved.version;
        self.license = saved.license;
        self.description = saved.description;
        self.author = saved.author;
        self.author_email = saved.author_email;
        self.requirements = saved.requirements;
    }

    /// Write the editable fields to `path` as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_saved())?;
        std::fs::write(path, json).fs_context("writing release info", path)?;
        log::info!("Saved release info to {}", path.display());
        Ok(())
    }

    /// Load fields saved by [`PyPackage::save`].
    ///
    /// A corrupt file is logged and leaves the package untouched; the return
    /// value says whether anything was applied.
    pub fn load(&mut self, path: &Path) -> Result<bool> {
        log::info!("Loading from save file.");
        let text = std::fs::read_to_string(path).fs_context("reading release info", path)?;
        match serde_json::from_str::<SavedRelease>(&text) {
            Ok(saved) => {
                self.apply_saved(saved);
                log::info!("Loaded successfully.");
                Ok(true)
            }
            Err(e) => {
                log::warn!("Save file may be corrupted: {}", e);
                Ok(false)
            }
        }
    }
}

impl fmt::Display for PyPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let none = "None";
        writeln!(f, "target_file: {}", self.target_file.display())?;
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "module_name: {}", self.module_name)?;
        writeln!(f, "version: {}", self.version.as_deref().unwrap_or(none))?;
        writeln!(f, "license: {}", self.license.as_deref().unwrap_or(none))?;
        writeln!(f, "description: {}", self.description)?;
        writeln!(f, "author: {}", self.author.as_deref().unwrap_or(none))?;
        writeln!(f, "author_email: {}", self.author_email.as_deref().unwrap_or(none))?;
        writeln!(f, "requirements: {}", self.requirements.join(", "))?;
        writeln!(f, "is_script: {}", self.is_script)?;
        write!(f, "is_single_file: {}", self.is_single_file())
    }
}

/// Short description: docstring of the first `__all__` entry, else the module docstring.
fn describe(scan: &SourceScan<'_>) -> String {
    scan.all_names()
        .first()
        .and_then(|first| scan.definition_docstring(first))
        .or_else(|| scan.module_docstring())
        .unwrap_or_default()
}

/// Keep ASCII alphanumerics, `-`, `_` and `.`, trimming separators at the ends.
fn sanitize_name(raw: &str) -> String {
    let kept: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    kept.trim_matches(|c| matches!(c, '-' | '_' | '.')).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn package_from(source: &str) -> (tempfile::TempDir, PyPackage) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.py");
        fs::write(&file, source).unwrap();
        let package =
            PyPackage::inspect(&file, &ReleaseConfig::default(), UserInfo::default()).unwrap();
        (dir, package)
    }

    #[test]
    fn author_from_source_beats_user_config() {
        let (_dir, package) = package_from("__author__ = 'Source Author'\n__email__ = 's@example.com'\n");
        assert_eq!(package.author.as_deref(), Some("Source Author"));
        assert_eq!(package.author_email.as_deref(), Some("s@example.com"));
    }

    #[test]
    fn description_falls_back_to_module_docstring() {
        let (_dir, package) = package_from("\"\"\"Pads strings on the left.\"\"\"\n\ndef pad():\n    pass\n");
        assert_eq!(package.description, "Pads strings on the left.");
        assert!(!package.is_script);
    }

    #[test]
    fn set_name_sanitizes() {
        let (_dir, mut package) = package_from("");
        assert_eq!(package.set_name("  my cool_lib! ").unwrap(), "mycool_lib");
        assert!(package.set_name("!!!").is_err());
        assert_eq!(package.module_name, "sample");
    }

    #[test]
    fn set_license_normalizes_and_clears() {
        let (_dir, mut package) = package_from("");
        package.set_license(Some("apache-2.0")).unwrap();
        assert_eq!(package.license.as_deref(), Some("APACHE-2"));
        package.set_license(Some("None")).unwrap();
        assert_eq!(package.license, None);
        assert_eq!(package.resolved_license(), License::Mit);
        assert!(package.set_license(Some("beerware")).is_err());
    }

    #[test]
    fn set_version_rejects_downgrade() {
        let (_dir, mut package) = package_from("__version__ = '1.2.0'\n");
        assert!(package.set_version("1.1").is_err());
        assert_eq!(package.version.as_deref(), Some("1.2.0"));
        assert_eq!(package.set_version("1.3").unwrap(), "1.3");
    }

    #[test]
    fn add_requirements_skips_duplicates() {
        let (_dir, mut package) = package_from("import requests\n");
        package.add_requirements("requests  attrs".split(' '));
        assert_eq!(package.requirements, vec!["requests", "attrs"]);
    }

    #[test]
    fn save_and_load_release_info() {
        let (dir, mut package) = package_from("__version__ = '0.1.0'\n");
        package.description = "Edited".into();
        let path = dir.path().join(SAVE_FILE_NAME);
        package.save(&path).unwrap();

        let (_other, mut fresh) = package_from("");
        assert!(fresh.load(&path).unwrap());
        assert_eq!(fresh.description, "Edited");
        assert_eq!(fresh.version.as_deref(), Some("0.1.0"));
        assert_eq!(fresh.name, "sample");
    }

    #[test]
    fn corrupt_release_info_is_ignored() {
        let (dir, mut package) = package_from("__version__ = '0.1.0'\n");
        let path = dir.path().join(SAVE_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(!package.load(&path).unwrap());
        assert_eq!(package.version.as_deref(), Some("0.1.0"));
    }
}
