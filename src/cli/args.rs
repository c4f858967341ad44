//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation of
//! flag combinations that clap cannot express on its own.

use crate::error::CliError;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Zero configuration releases for single-file Python modules
#[derive(Parser, Debug)]
#[command(
    name = "pyrelease",
    version,
    disable_version_flag = true,
    about = "Zero configuration releases for single-file Python modules",
    long_about = "Gathers metadata from a Python module, writes README.rst, LICENSE.md,
MANIFEST.in, requirements.txt and setup.py, builds the distributions and uploads
them to PyPI with twine.

Usage:
  pyrelease                      # wizard for the module in the current directory
  pyrelease mytool.py -G -T      # build and upload to the test index, no questions
  pyrelease . --show             # print what was detected as JSON

Exit code 0 = every step succeeded."
)]
pub struct Args {
    /// Python file, or directory containing the module to release
    #[arg(value_name = "PROJECT", default_value = ".")]
    pub project: PathBuf,

    /// Build and upload in one go without asking for metadata
    #[arg(short = 'G', long)]
    pub giver: bool,

    /// Upload to the PyPI test server
    #[arg(short = 'T', long = "test-pypi")]
    pub test_pypi: bool,

    /// Show build tool output and debug logging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Directory the release is written to
    ///
    /// Defaults to `<name>.<version>` in the current directory.
    #[arg(short = 't', long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Configuration file, instead of pyrelease.toml lookup
    #[arg(long, value_name = "PATH", env = "PYRELEASE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the detected metadata as JSON and exit
    #[arg(long)]
    pub show: bool,

    /// Stop after writing the packaging files
    #[arg(long)]
    pub files_only: bool,

    /// Build distributions but do not upload them
    #[arg(long)]
    pub no_upload: bool,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        if self.project.as_os_str().is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "Project path cannot be empty".to_string(),
            });
        }

        if let Some(target) = &self.target {
            if target.is_file() {
                return Err(CliError::InvalidArguments {
                    reason: format!("Target {} is a file, expected a directory", target.display()),
                });
            }
        }

        if self.show {
            let conflicts: Vec<String> = [
                (self.giver, "--giver"),
                (self.files_only, "--files-only"),
                (self.no_upload, "--no-upload"),
            ]
            .into_iter()
            .filter_map(|(set, name)| set.then(|| name.to_string()))
            .collect();
            if !conflicts.is_empty() {
                let mut arguments = vec!["--show".to_string()];
                arguments.extend(conflicts);
                return Err(CliError::ConflictingArguments { arguments });
            }
        }

        if self.test_pypi && !self.uploads() {
            return Err(CliError::ConflictingArguments {
                arguments: vec![
                    "--test-pypi".to_string(),
                    if self.files_only { "--files-only" } else { "--no-upload" }.to_string(),
                ],
            });
        }

        Ok(())
    }

    /// Whether any upload can happen in this run.
    pub fn uploads(&self) -> bool {
        !(self.files_only || self.no_upload)
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
    target: Option<PathBuf>,
    test_pypi: bool,
    files_only: bool,
    no_upload: bool,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, false),
            target: args.target.clone(),
            test_pypi: args.test_pypi,
            files_only: args.files_only,
            no_upload: args.no_upload,
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    pub fn target(&self) -> Option<&std::path::Path> {
        self.target.as_deref()
    }

    pub fn test_pypi(&self) -> bool {
        self.test_pypi
    }

    pub fn files_only(&self) -> bool {
        self.files_only
    }

    pub fn no_upload(&self) -> bool {
        self.no_upload
    }

    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&["pyrelease"]);
        assert_eq!(args.project, PathBuf::from("."));
        assert!(!args.giver && !args.test_pypi && !args.verbose);
        assert!(args.uploads());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn short_flags() {
        let args = parse(&["pyrelease", "tool.py", "-G", "-T", "-V", "-t", "out"]);
        assert_eq!(args.project, PathBuf::from("tool.py"));
        assert!(args.giver && args.test_pypi && args.verbose);
        assert_eq!(args.target, Some(PathBuf::from("out")));
    }

    #[test]
    fn show_conflicts_with_building() {
        let args = parse(&["pyrelease", "--show", "-G"]);
        assert!(matches!(
            args.validate(),
            Err(CliError::ConflictingArguments { arguments }) if arguments == ["--show", "--giver"]
        ));
    }

    #[test]
    fn test_server_needs_upload() {
        let args = parse(&["pyrelease", "-T", "--no-upload"]);
        assert!(args.validate().is_err());
        assert!(!args.uploads());
    }

    #[test]
    fn target_must_not_be_a_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = parse(&["pyrelease", "-t", file.path().to_str().unwrap()]);
        assert!(matches!(
            args.validate(),
            Err(CliError::InvalidArguments { .. })
        ));
    }
}
