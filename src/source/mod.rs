//! Target module resolution

use crate::error::{ReleaseError, Result};
use std::path::{Path, PathBuf};

/// What kind of module the target file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A standalone `name.py`
    SingleFile,
    /// A package directory's `__init__.py`
    Package,
}

impl TargetKind {
    pub fn of(target: &Path) -> Self {
        if target.file_name().is_some_and(|n| n == "__init__.py") {
            Self::Package
        } else {
            Self::SingleFile
        }
    }
}

/// Locate the Python file to release.
///
/// A `.py` path is taken as is. For a directory the candidates are, in order:
/// `<dir>/<dirname>.py`, the same with `_` replaced by `-`, `<dir>/__init__.py`
/// and `<dir>/<dirname>/__init__.py`.
pub fn find_package(what: &Path) -> Result<PathBuf> {
    if what.extension().is_some_and(|ext| ext == "py") {
        if !what.is_file() {
            return Err(invalid(format!("{} does not exist", what.display())));
        }
        log::info!("Target is a python file - ({})", what.display());
        return Ok(what.to_path_buf());
    }

    if !what.is_dir() {
        log::warn!("No valid package found! ({})", what.display());
        return Err(invalid(format!(
            "{} is neither a .py file nor a directory",
            what.display()
        )));
    }

    let folder_name = folder_name(what)?;
    let candidates = [
        what.join(format!("{folder_name}.py")),
        what.join(format!("{}.py", folder_name.replace('_', "-"))),
        what.join("__init__.py"),
        what.join(&folder_name).join("__init__.py"),
    ];

    for candidate in candidates {
        if candidate.is_file() {
            log::info!("Found target module - ({})", candidate.display());
            return Ok(candidate);
        }
        log::debug!("Not found: {}", candidate.display());
    }

    log::warn!("No valid package found! ({})", what.display());
    Err(invalid(format!(
        "no {folder_name}.py or __init__.py found in {}",
        what.display()
    )))
}

/// Importable module name of a target file.
///
/// `leftpad.py` gives `leftpad`; `leftpad/__init__.py` gives `leftpad`.
pub fn module_name(target: &Path) -> Result<String> {
    match TargetKind::of(target) {
        TargetKind::Package => {
            let parent = target
                .parent()
                .ok_or_else(|| invalid(format!("{} has no parent", target.display())))?;
            folder_name(parent)
        }
        TargetKind::SingleFile => target
            .file_stem()
            .and_then(|s| s.to_str())
            .map(String::from)
            .ok_or_else(|| invalid(format!("cannot derive a name from {}", target.display()))),
    }
}

/// Name of a directory, resolving `.` and relative paths against the cwd.
fn folder_name(dir: &Path) -> Result<String> {
    use path_absolutize::Absolutize;

    let absolute = dir.absolutize()?;
    absolute
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .ok_or_else(|| invalid(format!("cannot derive a name from {}", dir.display())))
}

fn invalid(reason: String) -> ReleaseError {
    ReleaseError::InvalidPackage { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn py_file_is_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("leftpad.py");
        fs::write(&file, "").unwrap();
        assert_eq!(find_package(&file).unwrap(), file);
        assert_eq!(module_name(&file).unwrap(), "leftpad");
    }

    #[test]
    fn missing_py_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_package(&dir.path().join("nope.py")).is_err());
    }

    #[test]
    fn directory_prefers_same_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("croutonlib");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("croutonlib.py"), "").unwrap();
        fs::write(root.join("__init__.py"), "").unwrap();
        assert_eq!(find_package(&root).unwrap(), root.join("croutonlib.py"));
    }

    #[test]
    fn directory_accepts_dashed_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("file_name");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("file-name.py"), "").unwrap();
        assert_eq!(find_package(&root).unwrap(), root.join("file-name.py"));
    }

    #[test]
    fn nested_package_init() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(root.join("proj")).unwrap();
        fs::write(root.join("proj").join("__init__.py"), "").unwrap();
        let found = find_package(&root).unwrap();
        assert_eq!(found, root.join("proj").join("__init__.py"));
        assert_eq!(TargetKind::of(&found), TargetKind::Package);
        assert_eq!(module_name(&found).unwrap(), "proj");
    }

    #[test]
    fn name_strips_suffix_exactly() {
        // a character-wise strip would eat the trailing 'p' and 'y'
        assert_eq!(module_name(Path::new("happy.py")).unwrap(), "happy");
    }

    #[test]
    fn empty_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_package(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidPackage { .. }));
    }
}
