//! Interactive release wizard.
//!
//! Walks the user through confirming the inferred metadata, writes the
//! packaging files, builds the distributions and uploads them. Every
//! question goes through a [`Prompter`].

use super::prompt::Prompter;
use super::{OutputManager, RuntimeConfig, launch};
use crate::builder::{Builder, DistArtifact, Repository, tool_detection};
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::metadata::{License, PyPackage, SAVE_FILE_NAME};

/// Run the full wizard and return the process exit code.
pub async fn run(
    mut package: PyPackage,
    config: ReleaseConfig,
    runtime: &RuntimeConfig,
    prompter: &mut dyn Prompter,
) -> Result<i32> {
    let out = runtime.output();

    out.title("PyRelease wizard")?;
    out.success(&format!(
        "This wizard will help you set up {} for release on PyPI. \
         Press ctrl-c at any time to exit.",
        package.name
    ))?;

    check_pypirc(&package, runtime, prompter, out)?;
    offer_saved_release(&mut package, prompter, out)?;
    collect_metadata(&mut package, prompter, out)?;

    out.progress("Loading builder.")?;
    let mut builder = Builder::new(package, runtime.target(), config)?;
    builder.set_verbose(runtime.is_verbose());
    choose_build_dir(&mut builder, prompter)?;

    out.section("PyRelease is ready to build your package.")?;
    prompter.pause("Press enter to continue.")?;
    render_files(&builder, out).await?;

    let save_path = builder.package().package_dir.join(SAVE_FILE_NAME);
    match builder.package().save(&save_path) {
        Ok(()) => out.verbose(&format!("Saved answers to {}", save_path.display()))?,
        Err(e) => out.warn(&format!("Could not save {}: {}", SAVE_FILE_NAME, e))?,
    }

    preview_readme(&builder, prompter, out).await?;

    if runtime.files_only() {
        out.success(&format!("Files written to {}", builder.build_dir().display()))?;
        return Ok(0);
    }

    out.section("PyRelease is ready to build your package distros.")?;
    prompter.pause("Press enter to start the build.")?;
    build_and_report(&mut builder, out).await?;

    out.text("Have a look at your new package.")?;
    open_or_warn(&builder.build_dir().display().to_string(), out)?;

    if runtime.no_upload() {
        return finish(&builder, out);
    }

    out.section("PyRelease is ready to upload your package!")?;
    prompter.pause("Press enter to continue.")?;

    let use_test = runtime.test_pypi()
        || prompter.confirm(
            "Use test PyPI server? It's a good idea to check your project there first",
            false,
        )?;
    builder.set_use_test_server(use_test);

    if use_test {
        register_package(&mut builder, prompter, out).await?;
    }
    upload_and_view(&mut builder, prompter, out).await?;

    if builder.use_test_server()
        && prompter.confirm("Ready for upload to the real PyPI?", false)?
    {
        builder.set_use_test_server(false);
        upload_and_view(&mut builder, prompter, out).await?;
    }

    finish(&builder, out)
}

/// Warn when `~/.pypirc` is missing and let the user bail out.
pub fn check_pypirc(
    package: &PyPackage,
    runtime: &RuntimeConfig,
    prompter: &mut dyn Prompter,
    out: &OutputManager,
) -> Result<()> {
    if package.user_info.has_pypirc() || runtime.files_only() {
        return Ok(());
    }
    out.warn(
        "No .pypirc file found. You need one to upload to PyPI, see \
         https://packaging.python.org/en/latest/specifications/pypirc/",
    )?;
    if prompter.confirm("Continue without .pypirc?", true)? {
        Ok(())
    } else {
        Err(ReleaseError::Aborted)
    }
}

/// Offer to restore answers saved by an earlier run.
pub fn offer_saved_release(
    package: &mut PyPackage,
    prompter: &mut dyn Prompter,
    out: &OutputManager,
) -> Result<()> {
    let path = package.package_dir.join(SAVE_FILE_NAME);
    if !path.is_file() {
        return Ok(());
    }
    if prompter.confirm("Found a saved release.info, load it?", true)? && !package.load(&path)? {
        out.warn(&format!("{} looks corrupted, ignoring it.", path.display()))?;
    }
    Ok(())
}

/// Ask the user to confirm or correct every metadata field.
pub fn collect_metadata(
    package: &mut PyPackage,
    prompter: &mut dyn Prompter,
    out: &OutputManager,
) -> Result<()> {
    loop {
        let current = package.version.clone().unwrap_or_else(|| "0.1.0".to_string());
        let answer = prompter.prompt("Version", &current)?;
        match package.set_version(&answer) {
            Ok(_) => break,
            Err(e) => out.warn(&format!(
                "{}. Choose a version higher than, or equal to, the current one.",
                e
            ))?,
        }
    }

    list_config_sources(package, out)?;

    loop {
        let current = package.name.clone();
        let answer = prompter.prompt("Release name", &current)?;
        match package.set_name(&answer) {
            Ok(_) => break,
            Err(e) => out.warn(&e.to_string())?,
        }
    }

    let current = package.description.clone();
    package.description = prompter.prompt("Short description", &current)?;

    let current = package.author.clone().unwrap_or_default();
    package.author = non_empty(prompter.prompt("Author", &current)?);

    let current = package.author_email.clone().unwrap_or_default();
    package.author_email = non_empty(prompter.prompt("E-mail", &current)?);

    out.section(&format!(
        "PyRelease has analyzed {} and found these dependencies.",
        package.name
    ))?;
    list_dependencies(package, out)?;
    if prompter.confirm("Add dependencies to list?", false)? {
        loop {
            let extra = prompter.prompt("Dependencies to append, separated by spaces", "")?;
            package.add_requirements(extra.split([' ', ',']));
            list_dependencies(package, out)?;
            if prompter.confirm("Is this correct?", true)? {
                break;
            }
        }
    }

    let known = package
        .license
        .as_deref()
        .is_some_and(|l| l.parse::<License>().is_ok());
    if !known {
        choose_license(package, prompter, out)?;
    }
    out.highlight(&format!("Using license: {}", package.resolved_license()))?;
    Ok(())
}

fn choose_license(
    package: &mut PyPackage,
    prompter: &mut dyn Prompter,
    out: &OutputManager,
) -> Result<()> {
    match &package.license {
        Some(raw) => out.warn(&format!(
            "License {raw:?} is not recognized. MIT is used unless you pick another one."
        ))?,
        None => out.text("No license was found. MIT is used unless you pick another one.")?,
    }
    if !prompter.confirm("Choose a license?", true)? {
        return Ok(());
    }
    for license in License::ALL {
        out.indent(&format!("{:<10} {}", license.key(), license.display_name()))?;
    }
    loop {
        let answer = prompter.prompt("License", License::Mit.key())?;
        match package.set_license(Some(&answer)) {
            Ok(()) => return Ok(()),
            Err(e) => out.warn(&e.to_string())?,
        }
    }
}

fn list_config_sources(package: &PyPackage, out: &OutputManager) -> Result<()> {
    if package.user_info.sources.is_empty() {
        return Ok(());
    }
    out.section("PyRelease located these config files")?;
    for source in &package.user_info.sources {
        out.highlight(&format!(" * Detected a {} file.", source.kind.file_name()))?;
        out.indent(source.kind.purpose())?;
        out.indent(&format!(
            "Username: {}",
            source.author.as_deref().unwrap_or("None")
        ))?;
        out.indent(&format!(
            "Email: {}",
            source.author_email.as_deref().unwrap_or("None")
        ))?;
    }
    Ok(())
}

fn list_dependencies(package: &PyPackage, out: &OutputManager) -> Result<()> {
    if package.requirements.is_empty() {
        out.indent("(none)")?;
    }
    for dep in &package.requirements {
        out.highlight(&format!("    {}", dep))?;
    }
    Ok(())
}

fn choose_build_dir(builder: &mut Builder, prompter: &mut dyn Prompter) -> Result<()> {
    let current = builder.build_dir().display().to_string();
    let answer = prompter.prompt("Build directory", &current)?;
    if answer != current {
        builder.set_build_dir(std::path::Path::new(&answer))?;
    }
    Ok(())
}

/// Write every packaging file, one step at a time.
pub async fn render_files(builder: &Builder, out: &OutputManager) -> Result<()> {
    builder.create_build_dir().await?;

    out.progress("Building README.rst")?;
    builder.build_readme().await?;
    out.progress("Building LICENSE.md")?;
    builder.build_license().await?;
    out.progress("Building MANIFEST.in")?;
    builder.build_manifest().await?;
    out.progress("Building requirements.txt")?;
    builder.build_requirements().await?;
    out.progress("Building setup.py")?;
    builder.build_setup().await?;
    out.progress("Creating package")?;
    builder.build_package().await?;

    out.success("Package files created successfully!")?;
    Ok(())
}

async fn preview_readme(
    builder: &Builder,
    prompter: &mut dyn Prompter,
    out: &OutputManager,
) -> Result<()> {
    if !prompter.confirm("Preview README.rst file?", false)? {
        return Ok(());
    }
    if !*tool_detection::HAS_RESTVIEW {
        out.warn("restview is not installed, skipping the preview.")?;
        return Ok(());
    }

    let mut child = builder.preview_readme().await?;
    out.text("The preview is served by restview.")?;
    prompter.pause("Press enter to end the preview.")?;
    if let Err(e) = child.kill().await {
        log::warn!("Failed to stop restview: {}", e);
    }
    Ok(())
}

/// Run the build commands and list what they produced.
pub async fn build_and_report(builder: &mut Builder, out: &OutputManager) -> Result<()> {
    for spec in builder.commands()? {
        out.verbose(&format!("Will run: {}", spec))?;
    }
    builder.build_distros().await?;
    if builder.success() {
        out.success("Builds finished without error.")?;
    } else {
        out.warn("There were errors during the build, run with -V for details.")?;
    }
    report_artifacts(&builder.artifacts().await?, out)
}

fn report_artifacts(artifacts: &[DistArtifact], out: &OutputManager) -> Result<()> {
    if artifacts.is_empty() {
        out.warn("No distributions were produced.")?;
        return Ok(());
    }
    out.section("Distributions")?;
    for artifact in artifacts {
        out.indent(&format!(
            "{}  ({} bytes)  sha256:{}",
            artifact.file_name(),
            artifact.size,
            artifact.checksum
        ))?;
    }
    Ok(())
}

/// Offer registration with the test index before the first upload there.
pub async fn register_package(
    builder: &mut Builder,
    prompter: &mut dyn Prompter,
    out: &OutputManager,
) -> Result<()> {
    out.text(
        "To upload to the test server the package must be registered there first. \
         Skip this if you have already registered it.",
    )?;
    if prompter.confirm("Register package?", false)? {
        out.success("Enter your PyPI TEST server password to register your package.")?;
        if builder.register_test_package().await? == 0 {
            out.success("Registration complete.")?;
        }
    }
    Ok(())
}

async fn upload_and_view(
    builder: &mut Builder,
    prompter: &mut dyn Prompter,
    out: &OutputManager,
) -> Result<()> {
    let repository = builder.repository();
    let errors_before = builder.errors().len();

    out.progress(&format!("Starting twine, uploading to {}.", repository.label()))?;
    builder.upload(repository).await?;

    if builder.errors().len() == errors_before {
        out.success("Upload completed successfully!")?;
        view_on_index(builder.package(), repository, out)?;
        prompter.pause("Press enter to continue.")?;
    } else {
        for error in &builder.errors()[errors_before..] {
            out.error(error)?;
        }
    }
    Ok(())
}

/// Print the project page and open it.
pub fn view_on_index(package: &PyPackage, repository: Repository, out: &OutputManager) -> Result<()> {
    let url = repository.project_url(&package.name);
    out.text("Here, have a look at your new package.")?;
    out.highlight(&url)?;
    open_or_warn(&url, out)
}

pub(super) fn open_or_warn(target: &str, out: &OutputManager) -> Result<()> {
    if let Err(e) = launch::open(target) {
        log::debug!("launch failed: {:?}", e);
        out.warn(&format!("Could not open {}: {}", target, e))?;
    }
    Ok(())
}

/// Summarize recorded errors and pick the exit code.
pub fn finish(builder: &Builder, out: &OutputManager) -> Result<i32> {
    if builder.success() {
        out.success("All done.")?;
        return Ok(0);
    }
    out.error("Release finished with errors:")?;
    for error in builder.errors() {
        out.error(&format!("  {}", error))?;
    }
    Ok(1)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty() && trimmed != "None").then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::ScriptedPrompter;
    use crate::userdata::UserInfo;
    use clap::Parser;

    fn package(source: &str) -> (tempfile::TempDir, PyPackage) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tool.py");
        std::fs::write(&file, source).unwrap();
        let package =
            PyPackage::inspect(&file, &ReleaseConfig::default(), UserInfo::default()).unwrap();
        (dir, package)
    }

    #[test]
    fn metadata_answers_are_applied() {
        let (_dir, mut pkg) = package("\"\"\"Does things.\"\"\"\n__version__ = '0.2.0'\nimport requests\n");
        let mut prompter = ScriptedPrompter::new([
            "0.1.0",       // lower than current, asked again
            "0.3.0",
            "my tool!",    // sanitized
            "",            // keep description
            "Jane Doe",
            "jane@example.com",
            "y",           // add dependencies
            "click, rich",
            "y",           // correct
            "y",           // choose license
            "nope",        // unknown, asked again
            "bsd-3",
        ]);
        let out = OutputManager::new(false, true);

        collect_metadata(&mut pkg, &mut prompter, &out).unwrap();

        assert_eq!(pkg.version.as_deref(), Some("0.3.0"));
        assert_eq!(pkg.name, "mytool");
        assert_eq!(pkg.description, "Does things.");
        assert_eq!(pkg.author.as_deref(), Some("Jane Doe"));
        assert_eq!(pkg.author_email.as_deref(), Some("jane@example.com"));
        assert_eq!(pkg.requirements, vec!["requests", "click", "rich"]);
        assert_eq!(pkg.license.as_deref(), Some("BSD-3"));
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn known_license_is_not_asked() {
        let (_dir, mut pkg) = package("__license__ = 'MIT'\n");
        let mut prompter = ScriptedPrompter::new(["", "", "", "", "", "n"]);
        let out = OutputManager::new(false, true);

        collect_metadata(&mut pkg, &mut prompter, &out).unwrap();
        assert_eq!(pkg.version.as_deref(), Some("0.1.0"));
        assert_eq!(pkg.author, None);
        assert!(!prompter.asked.iter().any(|q| q.contains("license")));
    }

    #[test]
    fn unrecognized_license_is_asked() {
        let (_dir, mut pkg) = package("__license__ = 'Apache License 2.0'\n");
        let mut prompter = ScriptedPrompter::new(["", "", "", "", "", "n", "y", "gpl-3"]);
        let out = OutputManager::new(false, true);

        collect_metadata(&mut pkg, &mut prompter, &out).unwrap();
        assert_eq!(pkg.license.as_deref(), Some("GPL-3"));
        assert_eq!(pkg.resolved_license(), License::Gpl3);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn running_out_of_answers_aborts() {
        let (_dir, mut pkg) = package("x = 1\n");
        let mut prompter = ScriptedPrompter::new(["1.0"]);
        let out = OutputManager::new(false, true);
        assert!(matches!(
            collect_metadata(&mut pkg, &mut prompter, &out),
            Err(ReleaseError::Aborted)
        ));
    }

    #[tokio::test]
    async fn files_only_run_writes_release() {
        let (dir, pkg) = package("\"\"\"Tool.\"\"\"\n__version__ = '1.0.0'\n__license__ = 'MIT'\n\ndef main():\n    pass\n");
        let target = dir.path().join("out");
        let args = crate::cli::Args::try_parse_from([
            "pyrelease",
            "--files-only",
            "-t",
            target.to_str().unwrap(),
        ])
        .unwrap();
        let runtime = RuntimeConfig::from(&args);
        let mut prompter = ScriptedPrompter::new([
            "", "", "", "", "", "n", // metadata
            "",                      // build directory
            "",                      // pause
            "n",                     // preview
        ]);

        let code = run(pkg, ReleaseConfig::default(), &runtime, &mut prompter).await.unwrap();

        assert_eq!(code, 0);
        for file in ["README.rst", "LICENSE.md", "MANIFEST.in", "requirements.txt", "setup.py", "tool.py"] {
            assert!(target.join(file).is_file(), "{file} missing");
        }
        assert!(dir.path().join(SAVE_FILE_NAME).is_file());
        assert_eq!(prompter.remaining(), 0);
    }
}
