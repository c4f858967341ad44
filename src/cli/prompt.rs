//! Interactive questions.
//!
//! The wizard only talks to the user through [`Prompter`], so it can be
//! driven by a script in tests.

use crate::error::{ReleaseError, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of answers to wizard questions.
pub trait Prompter {
    /// Ask for a line of text; an empty answer takes `default`.
    fn prompt(&mut self, message: &str, default: &str) -> Result<String>;

    /// Ask a yes/no question; an empty answer takes `default`.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Wait until the user is ready to go on.
    fn pause(&mut self, message: &str) -> Result<()>;
}

/// Reads answers from standard input.
///
/// End of input aborts the wizard.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_answer(&self, question: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            return Err(ReleaseError::Aborted);
        }
        Ok(line.trim().to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&mut self, message: &str, default: &str) -> Result<String> {
        let question = if default.is_empty() {
            format!("{}: ", message)
        } else {
            format!("{} [{}]: ", message, default)
        };
        let answer = self.read_answer(&question)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.read_answer(&format!("{} [{}]: ", message, hint))?;
            match parse_yes_no(&answer, default) {
                Some(choice) => return Ok(choice),
                None => println!("Error: invalid input"),
            }
        }
    }

    fn pause(&mut self, message: &str) -> Result<()> {
        self.read_answer(&format!("{} ", message)).map(|_| ())
    }
}

/// Answers taken from a fixed list, for tests and scripted runs.
///
/// Running out of answers aborts, like end of input on a terminal. Every
/// question asked is recorded.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Answers not consumed yet.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or(ReleaseError::Aborted)
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str, default: &str) -> Result<String> {
        let answer = self.next(message)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let answer = self.next(message)?;
        parse_yes_no(&answer, default).ok_or_else(|| {
            ReleaseError::Generic(format!("scripted answer '{answer}' is not yes or no"))
        })
    }

    fn pause(&mut self, message: &str) -> Result<()> {
        self.next(message).map(|_| ())
    }
}

fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_parsing() {
        assert_eq!(parse_yes_no("", true), Some(true));
        assert_eq!(parse_yes_no(" YES ", false), Some(true));
        assert_eq!(parse_yes_no("n", true), Some(false));
        assert_eq!(parse_yes_no("maybe", true), None);
    }

    #[test]
    fn scripted_defaults_and_abort() {
        let mut p = ScriptedPrompter::new(["", "custom", "y"]);
        assert_eq!(p.prompt("Version", "0.1.0").unwrap(), "0.1.0");
        assert_eq!(p.prompt("Name", "pkg").unwrap(), "custom");
        assert!(p.confirm("Proceed?", false).unwrap());
        assert!(matches!(p.pause("Press enter"), Err(ReleaseError::Aborted)));
        assert_eq!(p.asked, vec!["Version", "Name", "Proceed?", "Press enter"]);
    }
}
