//! External command execution.
//!
//! Commands run without a shell; the program is looked up on `PATH`. A
//! program that cannot be found reports exit code 127, as a shell would.

use crate::error::{ReleaseError, Result};
use std::fmt;
use std::path::Path;
use std::process::Stdio;

/// Exit code reported when the program does not exist.
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a configured command line on whitespace.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(program) = parts.next() else {
            crate::bail!("empty command in configuration");
        };
        Ok(Self::new(program, parts))
    }

    /// Replace a leading `python`/`python3` with the detected interpreter.
    pub fn with_python(mut self, python: &str) -> Self {
        if matches!(self.program.as_str(), "python" | "python3") {
            self.program = python.to_string();
        }
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// What to do with the child's standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Share the terminal; needed for tools that prompt, such as twine.
    Inherit,
    /// Capture output and only log it.
    Capture,
}

/// Run `spec` in `cwd` and return its exit code.
pub async fn execute(spec: &CommandSpec, cwd: &Path, mode: OutputMode) -> Result<i32> {
    log::info!("Executing command - {}", spec);

    let mut command = tokio::process::Command::new(&spec.program);
    command.args(&spec.args).current_dir(cwd);

    let result = match mode {
        OutputMode::Inherit => command.status().await.map(|status| (status, None)),
        OutputMode::Capture => command
            .stdin(Stdio::null())
            .output()
            .await
            .map(|output| (output.status, Some(output))),
    };

    let (status, output) = match result {
        Ok(ok) => ok,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} not found", spec.program);
            return Ok(NOT_FOUND_EXIT_CODE);
        }
        Err(source) => {
            return Err(ReleaseError::CommandFailed {
                command: spec.to_string(),
                source,
            });
        }
    };

    // killed by a signal when there is no code
    let code = status.code().unwrap_or(1);

    if let Some(output) = output {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            log::debug!("[{}] {}", spec.program, line);
        }
        for line in stderr.lines() {
            if code == 0 {
                log::debug!("[{}] {}", spec.program, line);
            } else {
                log::warn!("[{}] {}", spec.program, line);
            }
        }
    }

    log::info!("Done. ({} exited with {})", spec.program, code);
    Ok(code)
}
