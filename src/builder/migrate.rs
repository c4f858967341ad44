//! Rewriting module-level dunder attributes in a copied module.

use crate::error::{ErrorExt, Result};
use regex::Regex;
use std::path::Path;

/// Replace the literal of `attr = '...'` in `text`.
///
/// Only column-zero assignments are touched; quoting style is preserved.
/// Returns `None` when nothing changed.
pub fn rewrite_attribute(text: &str, attr: &str, value: &str) -> Option<String> {
    let re = Regex::new(&format!(
        r#"^({}\s*=\s*[rRuU]?)(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#,
        regex::escape(attr)
    ))
    .ok()?;

    let mut changed = false;
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let Some(caps) = re.captures(line) else {
            out.push_str(line);
            continue;
        };
        let (quote, current) = match (caps.get(2), caps.get(3)) {
            (Some(m), _) => ("\"", m.as_str()),
            (None, Some(m)) => ("'", m.as_str()),
            (None, None) => {
                out.push_str(line);
                continue;
            }
        };
        let escaped = escape_for(value, quote);
        if current == escaped {
            out.push_str(line);
            continue;
        }
        let whole = caps.get(0).map_or(0, |m| m.end());
        out.push_str(&caps[1]);
        out.push_str(quote);
        out.push_str(&escaped);
        out.push_str(quote);
        out.push_str(&line[whole..]);
        changed = true;
    }

    changed.then_some(out)
}

fn escape_for(value: &str, quote: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(quote, &format!("\\{quote}"))
}

/// Update `attr` in the file at `path` when its value differs.
pub async fn migrate_attribute(path: &Path, attr: &str, value: &str) -> Result<bool> {
    let text = tokio::fs::read_to_string(path)
        .await
        .fs_context("reading module for attribute update", path)?;

    match rewrite_attribute(&text, attr, value) {
        Some(updated) => {
            tokio::fs::write(path, updated)
                .await
                .fs_context("writing module attribute update", path)?;
            log::info!("Updated {} to {:?} in {}", attr, value, path.display());
            Ok(true)
        }
        None => Ok(false),
    }
}
