//! Main release builder.
//!
//! This module provides the [`Builder`] that turns a [`PyPackage`] into a
//! release directory, runs the build toolchain in it and hands the results
//! to twine.

use super::checksum::{self, DistArtifact};
use super::command::{self, CommandSpec, OutputMode, NOT_FOUND_EXIT_CODE};
use super::migrate::migrate_attribute;
use super::templates::TemplateRenderer;
use super::tool_detection;
use crate::config::ReleaseConfig;
use crate::error::{ErrorExt, ReleaseError, Result};
use crate::metadata::PyPackage;
use crate::utils::fs;
use chrono::Datelike;
use std::path::{Path, PathBuf};

/// Legacy upload endpoint of the test index, used for registration.
pub const TEST_PYPI_UPLOAD_URL: &str = "https://test.pypi.org/legacy/";

/// Package index to upload to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repository {
    PyPi,
    TestPyPi,
}

impl Repository {
    /// Project page for `name` on this index.
    pub fn project_url(self, name: &str) -> String {
        match self {
            Repository::PyPi => format!("https://pypi.org/project/{name}/"),
            Repository::TestPyPi => format!("https://test.pypi.org/project/{name}/"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Repository::PyPi => "PyPI",
            Repository::TestPyPi => "PyPI TEST server",
        }
    }
}

/// Builds a release directory for a single-file module.
///
/// # Build Order
///
/// [`Builder::make_all`] writes README.rst, LICENSE.md, MANIFEST.in,
/// requirements.txt and setup.py, then copies the module and its data
/// folder. Build commands and uploads are separate steps so the wizard can
/// pause between them.
#[derive(Debug)]
pub struct Builder {
    package: PyPackage,
    build_dir: PathBuf,
    config: ReleaseConfig,
    renderer: TemplateRenderer,
    use_test_server: bool,
    verbose: bool,
    errors: Vec<String>,
}

impl Builder {
    /// Creates a builder.
    ///
    /// Without an explicit `build_dir` the release goes to
    /// `<cwd>/<name>.<version>`.
    pub fn new(package: PyPackage, build_dir: Option<&Path>, config: ReleaseConfig) -> Result<Self> {
        let build_dir = match build_dir {
            Some(dir) => absolute(dir)?,
            None => absolute(Path::new(&default_dir_name(&package)))?,
        };

        Ok(Self {
            package,
            build_dir,
            config,
            renderer: TemplateRenderer::new()?,
            use_test_server: false,
            verbose: false,
            errors: Vec::new(),
        })
    }

    pub fn package(&self) -> &PyPackage {
        &self.package
    }

    pub fn package_mut(&mut self) -> &mut PyPackage {
        &mut self.package
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn set_build_dir(&mut self, dir: &Path) -> Result<()> {
        self.build_dir = absolute(dir)?;
        Ok(())
    }

    pub fn use_test_server(&self) -> bool {
        self.use_test_server
    }

    pub fn set_use_test_server(&mut self, test: bool) {
        self.use_test_server = test;
    }

    /// Show build tool output instead of capturing it.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Errors recorded by builds and uploads.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// True when no build or upload recorded an error.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Repository selected by the test-server switch.
    pub fn repository(&self) -> Repository {
        if self.use_test_server {
            Repository::TestPyPi
        } else {
            Repository::PyPi
        }
    }

    /// Creates the build directory if needed.
    pub async fn create_build_dir(&self) -> Result<&Path> {
        log::info!("Creating dir - ({})", self.build_dir.display());
        fs::create_dir_all(&self.build_dir, false).await?;
        Ok(&self.build_dir)
    }

    /// Writes README.rst and returns its text.
    pub async fn build_readme(&self) -> Result<String> {
        let text = self.renderer.readme(&self.package)?;
        self.write("README.rst", &text).await?;
        log::info!("Readme built..");
        Ok(text)
    }

    /// Writes LICENSE.md for the package license, MIT by default.
    pub async fn build_license(&self) -> Result<String> {
        let year = chrono::Local::now().year();
        let text = self.renderer.license(&self.package, year)?;
        self.write("LICENSE.md", &text).await?;
        log::info!("License built.. ({})", self.package.resolved_license());
        Ok(text)
    }

    /// Writes MANIFEST.in.
    pub async fn build_manifest(&self) -> Result<String> {
        let text = self.renderer.manifest(&self.package)?;
        self.write("MANIFEST.in", &text).await?;
        log::info!("MANIFEST built..");
        Ok(text)
    }

    /// Writes requirements.txt, one requirement per line.
    pub async fn build_requirements(&self) -> Result<String> {
        let text = self.renderer.requirements(&self.package);
        self.write("requirements.txt", &text).await?;
        log::info!("requirements.txt built..");
        Ok(text)
    }

    /// Writes setup.py. Only single-file modules are supported.
    pub async fn build_setup(&self) -> Result<String> {
        self.require_single_file()?;
        let text = self.renderer.setup_py(&self.package)?;
        self.write("setup.py", &text).await?;
        log::info!("setup.py built..");
        Ok(text)
    }

    /// Copies the module and its data folder into the build directory.
    ///
    /// The copied module gets the confirmed version, license and author
    /// written back into its dunder attributes.
    pub async fn build_package(&self) -> Result<PathBuf> {
        self.require_single_file()?;

        let file_name = self.package.target_file.file_name().ok_or_else(|| {
            ReleaseError::InvalidPackage {
                reason: format!("{} has no file name", self.package.target_file.display()),
            }
        })?;
        let dest = self.build_dir.join(file_name);
        log::info!(
            "{} file is being copied to {}",
            self.package.target_file.display(),
            self.build_dir.display()
        );
        fs::copy_file(&self.package.target_file, &dest).await?;

        if let Some(version) = &self.package.version {
            migrate_attribute(&dest, "__version__", version).await?;
        }
        if let Some(license) = &self.package.license {
            migrate_attribute(&dest, "__license__", license).await?;
        }
        if let Some(author) = &self.package.author {
            migrate_attribute(&dest, "__author__", author).await?;
        }

        if self.package.is_data_files() {
            let data = self.package.package_dir.join("data");
            let data_dest = self.build_dir.join("data");
            log::info!("Copying: ({}) - To: ({})", data.display(), data_dest.display());
            fs::copy_dir(&data, &data_dest).await?;
        }

        Ok(dest)
    }

    /// Creates the build directory and writes every packaging file.
    ///
    /// Returns the written paths in build order.
    pub async fn make_all(&self) -> Result<Vec<PathBuf>> {
        log::info!("Running make_all");
        self.create_build_dir().await?;
        self.build_readme().await?;
        self.build_license().await?;
        self.build_manifest().await?;
        self.build_requirements().await?;
        self.build_setup().await?;
        let module = self.build_package().await?;
        log::info!("Finished running make_all.");

        let mut written: Vec<PathBuf> = [
            "README.rst",
            "LICENSE.md",
            "MANIFEST.in",
            "requirements.txt",
            "setup.py",
        ]
        .iter()
        .map(|f| self.build_dir.join(f))
        .collect();
        written.push(module);
        Ok(written)
    }

    /// Configured build commands with `python` resolved.
    pub fn commands(&self) -> Result<Vec<CommandSpec>> {
        let python = tool_detection::python_program();
        self.config
            .build
            .commands
            .iter()
            .map(|line| CommandSpec::parse(line).map(|spec| spec.with_python(&python)))
            .collect()
    }

    /// Runs every build command in the build directory.
    ///
    /// Failures are recorded, not returned; check [`Builder::success`].
    pub async fn build_distros(&mut self) -> Result<()> {
        let mode = if self.verbose {
            OutputMode::Inherit
        } else {
            OutputMode::Capture
        };

        for spec in self.commands()? {
            let code = command::execute(&spec, &self.build_dir, mode).await?;
            if code != 0 {
                let msg = format!("({}) - Build command failed: {}", code, spec);
                log::error!("{}", msg);
                self.errors.push(msg);
            }
        }
        Ok(())
    }

    /// Distribution files in `<build_dir>/dist` with sizes and checksums.
    pub async fn artifacts(&self) -> Result<Vec<DistArtifact>> {
        checksum::collect_artifacts(&self.build_dir.join("dist")).await
    }

    /// Registers the package with the test index.
    pub async fn register_test_package(&mut self) -> Result<i32> {
        log::info!("Registering project with the PyPI TESTING server..");
        let spec = CommandSpec::new(
            tool_detection::python_program(),
            ["setup.py", "register", "-r", TEST_PYPI_UPLOAD_URL],
        );
        let code = command::execute(&spec, &self.build_dir, OutputMode::Inherit).await?;
        self.parse_response(code);
        Ok(code)
    }

    /// Uploads `dist/*` with twine.
    ///
    /// The real index requires `~/.pypirc`; without it nothing runs and an
    /// error is recorded. Returns the twine exit code when it ran.
    pub async fn upload(&mut self, repository: Repository) -> Result<Option<i32>> {
        if repository == Repository::PyPi && !self.package.user_info.has_pypirc() {
            let msg = "No .pypirc found. Please see \
                       https://packaging.python.org/en/latest/specifications/pypirc/ \
                       for more info."
                .to_string();
            log::warn!("{}", msg);
            self.errors.push(msg);
            return Ok(None);
        }

        let pattern = self.build_dir.join("dist").join("*");
        let files = checksum::expand_glob(&pattern.to_string_lossy())?;
        if files.is_empty() {
            let msg = format!("No distributions found in {}", self.build_dir.join("dist").display());
            log::warn!("{}", msg);
            self.errors.push(msg);
            return Ok(None);
        }

        if !*tool_detection::HAS_TWINE {
            log::warn!("twine not found on PATH; the upload will fail");
        }

        let mut args: Vec<String> = vec!["upload".to_string()];
        args.extend(
            files
                .iter()
                .map(|f| f.strip_prefix(&self.build_dir).unwrap_or(f).display().to_string()),
        );
        if repository == Repository::TestPyPi {
            args.push("-r".to_string());
            args.push(self.config.upload.test_repository.clone());
        }

        log::info!("Uploading Project to {}..", repository.label());
        let spec = CommandSpec::new("twine", args);
        let code = command::execute(&spec, &self.build_dir, OutputMode::Inherit).await?;
        log::debug!("Result: {}", code);
        self.parse_response(code);
        Ok(Some(code))
    }

    /// Records an error for a nonzero exit code of an upload tool.
    pub fn parse_response(&mut self, code: i32) {
        let msg = match code {
            0 => return,
            NOT_FOUND_EXIT_CODE => format!("({code}) - Twine not installed.. Cancelled."),
            400 => format!("({code}) - Needs to upgrade version.."),
            401 => format!("({code}) - Invalid login credentials."),
            _ => format!("({code}) - Upload tool reported an error."),
        };
        log::warn!("{}", msg);
        self.errors.push(msg);
    }

    /// Opens README.rst in restview; kill the child to end the preview.
    pub async fn preview_readme(&self) -> Result<tokio::process::Child> {
        let readme = self.build_dir.join("README.rst");
        if !readme.is_file() {
            self.build_readme().await?;
        }
        if !*tool_detection::HAS_RESTVIEW {
            log::warn!("restview not found on PATH");
        }

        log::info!("Opening README.rst in restview.");
        tokio::process::Command::new("restview")
            .arg("README.rst")
            .current_dir(&self.build_dir)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ReleaseError::CommandFailed {
                command: "restview".to_string(),
                source,
            })
    }

    fn require_single_file(&self) -> Result<()> {
        if self.package.is_single_file() {
            return Ok(());
        }
        log::error!("Package is more than one file.");
        Err(ReleaseError::Unsupported(
            "only single file modules can be released".to_string(),
        ))
    }

    async fn write(&self, file: &str, text: &str) -> Result<()> {
        fs::write_file(&self.build_dir.join(file), text).await
    }
}

fn default_dir_name(package: &PyPackage) -> String {
    format!("{}.{}", package.name, package.release_version())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    use path_absolutize::Absolutize;
    Ok(path
        .absolutize()
        .fs_context("resolving build directory", path)?
        .into_owned())
}
