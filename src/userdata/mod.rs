//! Author details from the user's tool configuration files.
//!
//! `~/.pypirc`, `~/.gitconfig` and `~/.hgrc` are read when present. Author and
//! email resolve in that order, first hit wins.

mod ini;

pub use ini::IniFile;

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.*?)\s*<([^>]+)>\s*$").expect("static regex"));

/// Which configuration file a [`ConfigSource`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    PyPiRc,
    GitConfig,
    HgRc,
}

impl ConfigKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ConfigKind::PyPiRc => ".pypirc",
            ConfigKind::GitConfig => ".gitconfig",
            ConfigKind::HgRc => ".hgrc",
        }
    }

    /// What the file is used for, shown by the wizard.
    pub fn purpose(self) -> &'static str {
        match self {
            ConfigKind::PyPiRc => "Used for uploading to PyPI. Needed if you want to upload.",
            ConfigKind::GitConfig => "Used for interacting with git.",
            ConfigKind::HgRc => "Used for interacting with mercurial.",
        }
    }
}

/// Author details found in one configuration file.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub kind: ConfigKind,
    pub path: PathBuf,
    pub author: Option<String>,
    pub author_email: Option<String>,
}

impl ConfigSource {
    /// Read `.pypirc`: `[pypi] username` and `email`.
    ///
    /// API-token uploads use the literal username `__token__`, which is not a
    /// person and is skipped.
    pub fn pypirc(path: &Path) -> Option<Self> {
        let ini = read_ini(path)?;
        Some(Self {
            kind: ConfigKind::PyPiRc,
            path: path.to_path_buf(),
            author: ini
                .get("pypi", "username")
                .filter(|u| *u != "__token__")
                .map(String::from),
            author_email: ini.get("pypi", "email").map(String::from),
        })
    }

    /// Read `.gitconfig`: `[user] name` and `email`.
    pub fn gitconfig(path: &Path) -> Option<Self> {
        let ini = read_ini(path)?;
        Some(Self {
            kind: ConfigKind::GitConfig,
            path: path.to_path_buf(),
            author: ini.get("user", "name").map(String::from),
            author_email: ini.get("user", "email").map(String::from),
        })
    }

    /// Read `.hgrc`: `[ui] username = Name <email>`.
    pub fn hgrc(path: &Path) -> Option<Self> {
        let ini = read_ini(path)?;
        let (author, author_email) = match ini.get("ui", "username") {
            Some(username) => split_address(username),
            None => (None, None),
        };
        Some(Self {
            kind: ConfigKind::HgRc,
            path: path.to_path_buf(),
            author,
            author_email,
        })
    }
}

/// All configuration files found for the current user.
#[derive(Debug, Clone, Default)]
pub struct UserInfo {
    pub sources: Vec<ConfigSource>,
    pypirc_present: bool,
}

impl UserInfo {
    /// Read configuration files from the user's home directory.
    pub fn discover() -> Self {
        match dirs::home_dir() {
            Some(home) => Self::from_home(&home),
            None => {
                log::warn!("No home directory; skipping user configuration files");
                Self::default()
            }
        }
    }

    /// Read configuration files from `home`.
    pub fn from_home(home: &Path) -> Self {
        let pypirc_path = home.join(ConfigKind::PyPiRc.file_name());
        let gitconfig_path = home.join(ConfigKind::GitConfig.file_name());
        let hgrc_path = home.join(ConfigKind::HgRc.file_name());

        let sources: Vec<ConfigSource> = [
            ConfigSource::pypirc(&pypirc_path),
            ConfigSource::gitconfig(&gitconfig_path),
            ConfigSource::hgrc(&hgrc_path),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !sources.iter().any(|s| s.kind == ConfigKind::GitConfig) {
            log::info!("No .gitconfig found.");
        }

        Self {
            pypirc_present: pypirc_path.is_file(),
            sources,
        }
    }

    pub fn author(&self) -> Option<&str> {
        self.sources.iter().find_map(|s| s.author.as_deref())
    }

    pub fn author_email(&self) -> Option<&str> {
        self.sources.iter().find_map(|s| s.author_email.as_deref())
    }

    /// Whether `~/.pypirc` exists; uploads to the real index need it.
    pub fn has_pypirc(&self) -> bool {
        self.pypirc_present
    }
}

fn read_ini(path: &Path) -> Option<IniFile> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            log::debug!("Read user config {}", path.display());
            Some(IniFile::parse(&text))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            None
        }
    }
}

/// Split `Name <email>` into its parts. A bare address is taken as the email.
fn split_address(raw: &str) -> (Option<String>, Option<String>) {
    if let Some(caps) = ADDRESS_RE.captures(raw) {
        let name = caps[1].trim();
        let name = (!name.is_empty()).then(|| name.to_string());
        return (name, Some(caps[2].trim().to_string()));
    }
    if raw.contains('@') && !raw.contains(' ') {
        return (None, Some(raw.trim().to_string()));
    }
    (Some(raw.trim().to_string()), None)
}
