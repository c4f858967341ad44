//! Minimal INI reader for `.pypirc`, `.gitconfig` and `.hgrc`.
//!
//! Sections are `[name]` (git subsections such as `[remote "origin"]` are kept
//! verbatim), entries are `key = value` or `key: value`, and lines starting
//! with `#` or `;` are comments. Keys are case-insensitive and a later
//! duplicate replaces an earlier one.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct IniFile {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniFile {
    pub fn parse(text: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some(section) = current.as_ref() else {
                log::debug!("Ignoring entry outside any section: {}", line);
                continue;
            };

            let Some(split) = line.find(['=', ':']) else {
                continue;
            };
            let key = line[..split].trim().to_ascii_lowercase();
            let value = line[split + 1..].trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);

            if let Some(entries) = sections.get_mut(section) {
                entries.insert(key, value.to_string());
            }
        }

        Self { sections }
    }

    /// Value of `key` in `section`, if present and non-empty.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(&key.to_ascii_lowercase()))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gitconfig_style() {
        let ini = IniFile::parse(
            "[user]\n\tname = My Name Is\n\temail = me@example.com\n[remote \"origin\"]\n\turl = git@github.com:pygame/solarwolf.git\n",
        );
        assert_eq!(ini.get("user", "name"), Some("My Name Is"));
        assert_eq!(ini.get("user", "EMAIL"), Some("me@example.com"));
        assert_eq!(
            ini.get("remote \"origin\"", "url"),
            Some("git@github.com:pygame/solarwolf.git")
        );
    }

    #[test]
    fn colon_separator_comments_and_duplicates() {
        let ini = IniFile::parse("; top\n[pypi]\nusername: first\n# note\nusername = second\nemail =\n");
        assert_eq!(ini.get("pypi", "username"), Some("second"));
        assert_eq!(ini.get("pypi", "email"), None);
        assert_eq!(ini.get("testpypi", "username"), None);
    }

    #[test]
    fn entries_before_a_section_are_dropped() {
        let ini = IniFile::parse("orphan = 1\n[ui]\nusername = A <a@b.c>\n");
        assert_eq!(ini.get("ui", "username"), Some("A <a@b.c>"));
    }
}
