//! Release building.
//!
//! Renders the packaging files for a single-file module, runs the build
//! toolchain and drives twine.
//!
//! # Module Structure
//!
//! - `orchestrator` - [`Builder`], the step-by-step release builder
//! - `templates` - handlebars templates for README, setup.py and MANIFEST.in
//! - `licenses` - license texts
//! - `migrate` - writing confirmed metadata back into the copied module
//! - `command` - external command execution
//! - `checksum` - dist artifact listing and SHA-256
//! - `tool_detection` - cached lookups of python, twine, restview and the opener

pub mod checksum;
pub mod command;
pub mod licenses;
pub mod migrate;
mod orchestrator;
pub mod templates;
pub mod tool_detection;

pub use checksum::DistArtifact;
pub use orchestrator::{Builder, Repository, TEST_PYPI_UPLOAD_URL};
