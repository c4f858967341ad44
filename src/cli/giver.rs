//! Giver mode: build and upload in one go.

use super::prompt::Prompter;
use super::{RuntimeConfig, wizard};
use crate::builder::Builder;
use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::metadata::PyPackage;

/// Release with the inferred metadata, asking nothing about it.
pub async fn run(
    package: PyPackage,
    config: ReleaseConfig,
    runtime: &RuntimeConfig,
    prompter: &mut dyn Prompter,
) -> Result<i32> {
    let out = runtime.output();

    let mut builder = Builder::new(package, runtime.target(), config)?;
    builder.set_verbose(runtime.is_verbose());
    builder.set_use_test_server(runtime.test_pypi());

    let mode = if runtime.test_pypi() {
        "Giver Mode TEST SERVER"
    } else {
        "Giver Mode"
    };
    out.title(mode)?;
    out.progress(&format!(
        "Preparing {} {} in {}",
        builder.package().name,
        builder.package().release_version(),
        builder.build_dir().display()
    ))?;

    for path in builder.make_all().await? {
        out.indent(&path.display().to_string())?;
    }
    out.success("Done.")?;

    if runtime.files_only() {
        return Ok(0);
    }

    prompter.pause("Press enter to start the build.")?;
    wizard::build_and_report(&mut builder, out).await?;

    if runtime.no_upload() {
        return wizard::finish(&builder, out);
    }

    let repository = builder.repository();
    out.success(&format!("Build finished. Uploading to {}.", repository.label()))?;
    if builder.use_test_server() {
        wizard::register_package(&mut builder, prompter, out).await?;
    }

    out.progress("Starting twine.")?;
    builder.upload(repository).await?;

    if builder.success() {
        out.success("Upload complete.")?;
        out.text("Check out your release on PyPI")?;
        out.highlight(&repository.project_url(&builder.package().name))?;
    }
    wizard::finish(&builder, out)
}
