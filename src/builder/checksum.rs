//! Distribution artifact listing and checksums.

use crate::error::{ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// A file produced by the build commands.
#[derive(Debug, Clone)]
pub struct DistArtifact {
    pub path: PathBuf,
    pub size: u64,
    /// Hex-encoded SHA-256
    pub checksum: String,
}

impl DistArtifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Files matching `pattern`, sorted, directories skipped.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern)
        .map_err(|e| crate::error::ReleaseError::Generic(format!("bad pattern {pattern}: {e}")))?;

    let mut files: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Every file in `dist_dir` with its size and checksum.
pub async fn collect_artifacts(dist_dir: &Path) -> Result<Vec<DistArtifact>> {
    if !dist_dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = dist_dir.join("*");
    let mut artifacts = Vec::new();
    for path in expand_glob(&pattern.to_string_lossy())? {
        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = calculate_file_sha256(&path).await?;
        artifacts.push(DistArtifact {
            path,
            size,
            checksum,
        });
    }
    Ok(artifacts)
}

/// Calculates SHA256 checksum of a single file.
///
/// Reads the file in 8KB chunks to handle large files efficiently.
pub async fn calculate_file_sha256(file_path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abc.txt");
        std::fs::write(&file, "abc").unwrap();
        assert_eq!(
            calculate_file_sha256(&file).await.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn artifacts_are_sorted_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        std::fs::create_dir_all(dist.join("nested")).unwrap();
        std::fs::write(dist.join("pkg-0.1.0.tar.gz"), "sdist").unwrap();
        std::fs::write(dist.join("pkg-0.1.0-py3-none-any.whl"), "wheel").unwrap();

        let artifacts = collect_artifacts(&dist).await.unwrap();
        let names: Vec<_> = artifacts.iter().map(DistArtifact::file_name).collect();
        assert_eq!(names, vec!["pkg-0.1.0-py3-none-any.whl", "pkg-0.1.0.tar.gz"]);
        assert_eq!(artifacts[1].size, 5);
    }

    #[tokio::test]
    async fn missing_dist_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_artifacts(&dir.path().join("dist")).await.unwrap().is_empty());
    }
}
