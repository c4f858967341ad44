//! Heuristic scanning of Python source text.
//!
//! Nothing here parses Python. Statements are recognised by looking at
//! column-zero lines outside triple-quoted strings, which is enough for the
//! module-level attributes, imports and docstrings a release needs.

use regex::Regex;
use std::sync::LazyLock;

static ALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^__all__\s*=\s*[\[(](.*?)[\])]").expect("static regex")
});

static ALL_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^__all__\s*=").expect("static regex"));

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).expect("static regex"));

/// A Python module's text with its top-level statement lines indexed.
#[derive(Debug)]
pub struct SourceScan<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    /// indices into `lines` of column-zero statements outside strings
    top_level: Vec<usize>,
}

impl<'a> SourceScan<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut top_level = Vec::new();
        let mut open: Option<&'static str> = None;

        for (idx, line) in lines.iter().enumerate() {
            if open.is_none() && is_statement_start(line) {
                top_level.push(idx);
            }
            open = track_triple_quotes(line, open);
        }

        Self {
            text,
            lines,
            top_level,
        }
    }

    /// Top-level statement lines, in source order.
    pub fn statements(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.top_level.iter().map(|&i| self.lines[i])
    }

    /// Value of a module-level `__name__ = "literal"` assignment.
    pub fn dunder(&self, name: &str) -> Option<String> {
        let re = Regex::new(&format!(
            r#"^{}\s*=\s*[rRuU]?(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#,
            regex::escape(name)
        ))
        .ok()?;

        self.statements()
            .find_map(|line| re.captures(line))
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|value| unescape_quotes(value.as_str()).trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Names listed in `__all__`, if assigned as a literal list or tuple.
    ///
    /// Only a top-level assignment counts; the literal may span lines.
    pub fn all_names(&self) -> Vec<String> {
        let Some(line) = self.statements().find(|l| ALL_START_RE.is_match(l)) else {
            return Vec::new();
        };
        // statement lines are slices of `text`
        let offset = line.as_ptr() as usize - self.text.as_ptr() as usize;

        ALL_RE
            .captures(&self.text[offset..])
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
            .map(|caps| {
                QUOTED_RE
                    .captures_iter(&caps[1])
                    .filter_map(|c| c.get(1).or_else(|| c.get(2)))
                    .map(|m| m.as_str().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First line of the module docstring.
    pub fn module_docstring(&self) -> Option<String> {
        let first = self.lines.iter().position(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })?;
        docstring_from(&self.lines[first..])
    }

    /// First line of the docstring of a top-level `def` or `class`.
    pub fn definition_docstring(&self, name: &str) -> Option<String> {
        let def_re = Regex::new(&format!(
            r"^(?:async\s+def|def|class)\s+{}\b",
            regex::escape(name)
        ))
        .ok()?;

        let def_idx = *self
            .top_level
            .iter()
            .find(|&&i| def_re.is_match(self.lines[i]))?;

        // the signature may span lines; the body starts after the line that
        // closes it with ':'. Anything after that ':' is a one-line body.
        let mut depth = 0i32;
        let mut body_start = None;
        for i in def_idx..self.lines.len() {
            let code = strip_comment(self.lines[i]);
            for c in code.chars() {
                match c {
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth -= 1,
                    _ => {}
                }
            }
            if depth > 0 {
                continue;
            }
            if code.trim_end().ends_with(':') {
                body_start = Some(i + 1);
            }
            break;
        }
        let body_start = body_start?;

        let first_body = (body_start..self.lines.len())
            .find(|&i| !self.lines[i].trim().is_empty())?;

        docstring_from(&self.lines[first_body..])
    }

    /// Whether the module defines something called `main`.
    pub fn has_main(&self) -> bool {
        self.text.contains("def main")
    }
}

fn is_statement_start(line: &str) -> bool {
    match line.chars().next() {
        None => false,
        Some(c) if c.is_whitespace() => false,
        Some('#') => false,
        Some(_) => true,
    }
}

/// Undo backslash escapes of quotes and backslashes.
fn unescape_quotes(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(next @ ('\'' | '"' | '\\'))) => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Update the open triple-quote state after reading `line`.
fn track_triple_quotes(line: &str, mut open: Option<&'static str>) -> Option<&'static str> {
    let mut rest = line;
    loop {
        match open {
            Some(delim) => match rest.find(delim) {
                Some(pos) => {
                    rest = &rest[pos + 3..];
                    open = None;
                }
                None => return open,
            },
            None => {
                let dq = rest.find("\"\"\"");
                let sq = rest.find("'''");
                let (pos, delim) = match (dq, sq) {
                    (Some(d), Some(s)) if s < d => (s, "'''"),
                    (Some(d), _) => (d, "\"\"\""),
                    (None, Some(s)) => (s, "'''"),
                    (None, None) => return None,
                };
                if strip_comment(&rest[..pos]).len() < pos {
                    // delimiter sits inside a comment
                    return None;
                }
                rest = &rest[pos + 3..];
                open = Some(delim);
            }
        }
    }
}

/// Extract the first non-empty line of a string literal starting `lines`.
fn docstring_from(lines: &[&str]) -> Option<String> {
    let joined = lines.join("\n");
    let body = joined
        .trim_start()
        .trim_start_matches(['r', 'R', 'u', 'U']);

    let delim = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|d| body.starts_with(d))?;

    let inner = &body[delim.len()..];
    let end = inner.find(delim)?;

    inner[..end]
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(String::from)
}
