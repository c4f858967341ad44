//! Opening folders and URLs with the desktop default handler.

use crate::builder::tool_detection::OPENER;
use crate::error::Result;
use anyhow::{Context, anyhow};

/// Open `target` (a path or URL) without waiting for the handler to exit.
pub fn open(target: &str) -> Result<()> {
    Ok(spawn_opener(target)?)
}

fn spawn_opener(target: &str) -> anyhow::Result<()> {
    let opener = OPENER
        .as_ref()
        .ok_or_else(|| anyhow!("no program found to open {}", target))?;

    let mut command = std::process::Command::new(opener);
    // gio needs a subcommand, the others take the target directly
    if opener.file_stem().is_some_and(|s| s == "gio") {
        command.arg("open");
    }
    command
        .arg(target)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("failed to launch {} for {}", opener.display(), target))?;

    log::info!("Opened {} with {}", target, opener.display());
    Ok(())
}
