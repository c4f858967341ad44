//! Command line interface for pyrelease.
//!
//! This module provides argument parsing, logging setup and the two ways of
//! running a release: the interactive wizard and giver mode.

mod args;
pub mod giver;
mod launch;
mod output;
pub mod prompt;
pub mod wizard;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};

use crate::config::ReleaseConfig;
use crate::error::{ErrorExt, Result};
use crate::metadata::PyPackage;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    run_with(args, &mut TerminalPrompter).await
}

/// Run with already parsed arguments and a given source of answers.
pub async fn run_with(args: Args, prompter: &mut dyn Prompter) -> Result<i32> {
    args.validate()?;
    init_logging(&args)?;

    let runtime = RuntimeConfig::from(&args);
    let config = ReleaseConfig::load(args.config.as_deref(), &project_dir(&args.project))?;

    let mut package = PyPackage::load_package(&args.project, &config)?;
    package.fill_version_from_git().await;
    log::debug!("Inspected package:\n{}", package);

    if args.show {
        println!("{}", serde_json::to_string_pretty(&PackageReport::from(&package))?);
        return Ok(0);
    }

    if args.giver {
        giver::run(package, config, &runtime, prompter).await
    } else {
        wizard::run(package, config, &runtime, prompter).await
    }
}

/// Set up `env_logger`: warnings by default, debug for this crate with
/// `--verbose`, `RUST_LOG` wins over both.
fn init_logging(args: &Args) -> Result<()> {
    let default_filter = if args.verbose {
        "warn,pyrelease=debug"
    } else {
        "warn"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path).fs_context("creating log file", path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // a logger may already be installed when embedded or under test
    if let Err(e) = builder.try_init() {
        log::debug!("Logger already initialized: {}", e);
    }
    Ok(())
}

fn project_dir(project: &Path) -> PathBuf {
    if project.is_dir() {
        return project.to_path_buf();
    }
    project
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// What `--show` prints.
#[derive(Debug, Serialize)]
struct PackageReport<'a> {
    target_file: String,
    name: &'a str,
    module_name: &'a str,
    version: Option<&'a str>,
    license: &'static str,
    description: &'a str,
    author: Option<&'a str>,
    author_email: Option<&'a str>,
    requirements: &'a [String],
    is_script: bool,
    is_single_file: bool,
    url: String,
    config_files: Vec<String>,
}

impl<'a> From<&'a PyPackage> for PackageReport<'a> {
    fn from(package: &'a PyPackage) -> Self {
        Self {
            target_file: package.target_file.display().to_string(),
            name: &package.name,
            module_name: &package.module_name,
            version: package.version.as_deref(),
            license: package.resolved_license().key(),
            description: &package.description,
            author: package.author.as_deref(),
            author_email: package.author_email.as_deref(),
            requirements: &package.requirements,
            is_script: package.is_script,
            is_single_file: package.is_single_file(),
            url: package.url(),
            config_files: package
                .user_info
                .sources
                .iter()
                .map(|s| s.path.display().to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_dir_of_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(project_dir(dir.path()), dir.path());
        assert_eq!(project_dir(Path::new("tool.py")), PathBuf::from("."));
        assert_eq!(
            project_dir(&dir.path().join("tool.py")),
            dir.path().to_path_buf()
        );
    }
}
