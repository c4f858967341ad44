//! External tool detection and availability checking.
//!
//! Results are cached so repeated checks during a run don't spawn processes.

use std::path::PathBuf;
use std::sync::LazyLock;

/// Python interpreter used for `setup.py` commands.
///
/// `python3` is preferred over `python`; a candidate only counts when
/// `--version` runs successfully.
pub static PYTHON: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    for candidate in ["python3", "python"] {
        match which::which(candidate) {
            Ok(path) => match std::process::Command::new(&path).arg("--version").output() {
                Ok(output) if output.status.success() => {
                    // python 2 reports its version on stderr
                    let version = if output.stdout.is_empty() {
                        String::from_utf8_lossy(&output.stderr).trim().to_string()
                    } else {
                        String::from_utf8_lossy(&output.stdout).trim().to_string()
                    };
                    log::info!("✓ {} available: {}", path.display(), version);
                    return Some(path);
                }
                Ok(output) => {
                    log::warn!(
                        "{} found but --version failed (exit code: {:?})",
                        path.display(),
                        output.status.code()
                    );
                }
                Err(e) => {
                    log::warn!("{} found but failed to execute: {}", path.display(), e);
                }
            },
            Err(e) => log::debug!("{} not found in PATH: {}", candidate, e),
        }
    }
    None
});

/// Check if twine is available for uploads.
pub static HAS_TWINE: LazyLock<bool> = LazyLock::new(|| tool_on_path("twine"));

/// Check if restview is available for readme previews.
pub static HAS_RESTVIEW: LazyLock<bool> = LazyLock::new(|| tool_on_path("restview"));

/// Program that opens files and URLs with the desktop default handler.
pub static OPENER: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(windows) {
        &["explorer"]
    } else {
        &["xdg-open", "gio"]
    };
    candidates.iter().find_map(|c| which::which(c).ok())
});

/// Name or path to run in place of a leading `python` in build commands.
pub fn python_program() -> String {
    PYTHON
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "python".to_string())
}

fn tool_on_path(name: &str) -> bool {
    match which::which(name) {
        Ok(path) => {
            log::debug!("Found {} at: {}", name, path.display());
            true
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", name, e);
            false
        }
    }
}
