//! Colored terminal output.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Prints user-facing status lines.
///
/// Verbose lines only show with `verbose`; everything except errors is
/// silenced by `quiet`.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    choice: ColorChoice,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let choice = if std::env::var_os("NO_COLOR").is_some() {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Self {
            verbose,
            quiet,
            choice,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Plain text line.
    pub fn text(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(self.choice);
        writeln!(stdout, "{}", message)
    }

    /// Bold banner for the start of a run.
    pub fn title(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let rule = "=".repeat(title.chars().count() + 4);
        let mut stdout = StandardStream::stdout(self.choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        writeln!(stdout, "{}", rule)?;
        writeln!(stdout, "  {}", title)?;
        writeln!(stdout, "{}", rule)?;
        stdout.reset()
    }

    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose || self.quiet {
            return Ok(());
        }
        self.colored(Color::White, false, "  ", message)
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored(Color::Yellow, true, "⚠ ", message)
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored(Color::Green, true, "✓ ", message)
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.colored(Color::Cyan, false, "→ ", message)
    }

    /// Highlighted value such as a URL or a list entry.
    pub fn highlight(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(self.choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(stdout, "{}", message)?;
        stdout.reset()
    }

    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(self.choice);
        writeln!(stdout)?;
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
        writeln!(stdout, "{}", title)?;
        stdout.reset()
    }

    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(self.choice);
        writeln!(stdout, "    {}", message)
    }

    /// Error line on stderr; shown even when quiet.
    pub fn error(&self, message: &str) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(self.choice);
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(stderr, "✗ ")?;
        stderr.reset()?;
        writeln!(stderr, "{}", message)
    }

    fn colored(&self, color: Color, bold: bool, marker: &str, message: &str) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.choice);
        stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        write!(stdout, "{}", marker)?;
        stdout.reset()?;
        writeln!(stdout, "{}", message)
    }
}
