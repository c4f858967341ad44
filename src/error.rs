//! Error types for release operations.
//!
//! This module defines all error types with actionable error messages.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem operation failed on a specific path
    #[error("{context} {}: {source}", path.display())]
    Fs {
        /// What was being done
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Template registration errors
    #[error("Template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    /// Template rendering errors
    #[error("Render error: {0}")]
    Render(#[from] Box<handlebars::RenderError>),

    /// The target is not something we can release
    #[error("Invalid package: {reason}")]
    InvalidPackage {
        /// Why the target was rejected
        reason: String,
    },

    /// A version was not accepted
    #[error("Invalid version '{given}': {reason}")]
    InvalidVersion {
        /// Version the user gave
        given: String,
        /// Why it was rejected
        reason: String,
    },

    /// License name not in the supported set
    #[error("Unknown license '{0}'. Supported: APACHE-2, GPL-3, BSD-2, BSD-3, LGPL-2, LGPL-3, MIT, UNLICENSE")]
    UnknownLicense(String),

    /// Operation not supported for this kind of target
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// External program could not be started
    #[error("Failed to run {command}: {source}")]
    CommandFailed {
        /// Program name
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// The user aborted the wizard
    #[error("Aborted")]
    Aborted,

    /// Generic errors from anyhow, printed with their context chain
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),

    /// Anything else
    #[error("{0}")]
    Generic(String),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Conflicting arguments
    #[error("Conflicting arguments: {arguments:?}")]
    ConflictingArguments {
        /// Arguments that conflict
        arguments: Vec<String>,
    },
}

impl From<handlebars::TemplateError> for ReleaseError {
    fn from(e: handlebars::TemplateError) -> Self {
        Self::Template(Box::new(e))
    }
}

impl From<handlebars::RenderError> for ReleaseError {
    fn from(e: handlebars::RenderError) -> Self {
        Self::Render(Box::new(e))
    }
}

/// Attach operation and path context to I/O results.
pub trait ErrorExt<T> {
    /// Wrap an I/O error with a description of what was being done to `path`.
    fn fs_context(self, context: &str, path: &Path) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &str, path: &Path) -> Result<T> {
        self.map_err(|source| ReleaseError::Fs {
            context: context.to_string(),
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Return early with a [`ReleaseError::Generic`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::ReleaseError::Generic(format!($($arg)*)))
    };
}
