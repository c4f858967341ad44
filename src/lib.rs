//! Zero configuration releases for single-file Python modules.
//!
//! This library provides the pieces of a release:
//! - locating the module to release (`source`)
//! - inferring its metadata from the source text (`metadata`)
//! - reading author details from `~/.pypirc`, `~/.gitconfig` and `~/.hgrc` (`userdata`)
//! - rendering packaging files and driving the build and upload tools (`builder`)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod source;
pub mod userdata;
pub mod utils;

// Re-export commonly used types
pub use builder::{Builder, Repository};
pub use config::ReleaseConfig;
pub use error::{CliError, ReleaseError, Result};
pub use metadata::PyPackage;
