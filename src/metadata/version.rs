//! Release version parsing and ordering.

use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+(?:\.\d+)*)((?:[-._+]?[A-Za-z][A-Za-z0-9.+_-]*)?)$").expect("static regex")
});

/// A dotted numeric version with an optional pre/post release suffix.
///
/// Ordering looks at the numeric release part only, padding with zeros, so
/// `1.0` and `1.0.0` compare equal and `1.2rc1` equals `1.2`.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    release: Vec<u64>,
    suffix: String,
}

impl ReleaseVersion {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let caps = VERSION_RE.captures(raw).ok_or_else(|| ReleaseError::InvalidVersion {
            given: raw.to_string(),
            reason: "expected a dotted numeric version such as 0.1.0".to_string(),
        })?;

        let release = caps[1]
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|e| ReleaseError::InvalidVersion {
                    given: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            release,
            suffix: caps[2].to_string(),
        })
    }

    fn component(&self, idx: usize) -> u64 {
        self.release.get(idx).copied().unwrap_or(0)
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        write!(f, "{}{}", release.join("."), self.suffix)
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

/// Check that `new` is a valid version not lower than `current`.
///
/// Returns the normalized text of `new`. An unparseable `current` is ignored.
pub fn validate_bump(current: Option<&str>, new: &str) -> Result<String> {
    let next = ReleaseVersion::parse(new)?;

    if let Some(current) = current {
        match ReleaseVersion::parse(current) {
            Ok(current) if next < current => {
                return Err(ReleaseError::InvalidVersion {
                    given: new.trim().to_string(),
                    reason: format!(
                        "must be higher than, or equal to the current version {current}"
                    ),
                });
            }
            Ok(_) => {}
            Err(e) => log::warn!("Ignoring unparseable current version: {}", e),
        }
    }

    Ok(next.to_string())
}

/// Highest tag of the git repository containing `dir`.
///
/// Returns `None` when git is missing, `dir` is not a repository, there are no
/// tags or the last tag is not a version.
pub async fn version_from_git(dir: &Path) -> Option<String> {
    let output = tokio::process::Command::new("git")
        .args(["tag", "--sort", "version:refname"])
        .current_dir(dir)
        .output()
        .await;

    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            log::debug!(
                "git tag failed in {}: {}",
                dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        Err(e) => {
            log::debug!("git not available: {}", e);
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let tag = stdout.lines().map(str::trim).rfind(|l| !l.is_empty())?;

    match ReleaseVersion::parse(tag) {
        Ok(version) => {
            log::info!("Using version {} from git tag {}", version, tag);
            Some(version.to_string())
        }
        Err(_) => {
            log::debug!("Latest git tag {} is not a version", tag);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        assert_eq!(ReleaseVersion::parse("0.1.1").unwrap().to_string(), "0.1.1");
        assert_eq!(ReleaseVersion::parse("v2.0").unwrap().to_string(), "2.0");
        assert_eq!(ReleaseVersion::parse("1.2rc1").unwrap().to_string(), "1.2rc1");
        assert_eq!(ReleaseVersion::parse("1.0.post2").unwrap().to_string(), "1.0.post2");
    }

    #[test]
    fn rejects_garbage() {
        assert!(ReleaseVersion::parse("").is_err());
        assert!(ReleaseVersion::parse("one").is_err());
        assert!(ReleaseVersion::parse("1..2").is_err());
    }

    #[test]
    fn ordering_pads_with_zeros() {
        let a = ReleaseVersion::parse("1.0").unwrap();
        let b = ReleaseVersion::parse("1.0.0").unwrap();
        let c = ReleaseVersion::parse("1.0.1").unwrap();
        assert_eq!(a, b);
        assert!(c > a);
        assert!(ReleaseVersion::parse("0.10").unwrap() > ReleaseVersion::parse("0.9").unwrap());
    }

    #[test]
    fn bump_must_not_go_backwards() {
        assert_eq!(validate_bump(Some("0.1.1"), "0.2.0").unwrap(), "0.2.0");
        assert_eq!(validate_bump(Some("0.1.1"), "0.1.1").unwrap(), "0.1.1");
        assert!(matches!(
            validate_bump(Some("0.1.1"), "0.1.0"),
            Err(ReleaseError::InvalidVersion { .. })
        ));
        assert_eq!(validate_bump(None, " 1.0 ").unwrap(), "1.0");
    }

    #[tokio::test]
    async fn git_fallback_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(version_from_git(dir.path()).await, None);
    }

    #[tokio::test]
    async fn git_fallback_takes_highest_tag() {
        if which::which("git").is_err() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let git = |args: &[&str]| {
            let status = std::process::Command::new("git")
                .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
                .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
                .args(args)
                .current_dir(dir.path())
                .output()
                .unwrap()
                .status;
            assert!(status.success(), "git {args:?} failed");
        };
        git(&["init", "-q"]);
        git(&["commit", "-q", "--allow-empty", "-m", "initial"]);
        for tag in ["v0.9.0", "v0.10.0", "v0.2.0"] {
            git(&["tag", tag]);
        }

        assert_eq!(version_from_git(dir.path()).await.as_deref(), Some("0.10.0"));
    }
}
