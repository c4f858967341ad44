//! Packaging file templates and rendering.
//!
//! Templates are handlebars strings rendered with HTML escaping disabled.
//! Values that end up inside Python source are turned into Python string
//! literals before rendering, so templates never quote them.

use crate::error::Result;
use crate::metadata::PyPackage;
use handlebars::Handlebars;
use serde::Serialize;

pub const README_RST: &str = r#"{{name}}
{{rule}}


.. image:: https://img.shields.io/pypi/v/{{name}}.svg
        :target: {{url}}


{{description}}


* Documentation: {{url}}
* License: {{license_name}}


Installation
============

To install {{name}}, run this command in your terminal:

.. code-block:: console

    $ pip install {{name}}

If you don't have `pip`_ installed, this `Python installation guide`_ can guide
you through the process.

.. _pip: https://pip.pypa.io
.. _Python installation guide: https://packaging.python.org/en/latest/tutorials/installing-packages/


Usage
=====

To use {{name}} in a project::

    import {{module}}
{{#if is_script}}

Or run it from the command line:

.. code-block:: console

    $ {{name}}
{{/if}}


Credits
=======

* {{author}} {{author_email}}


This package was created with PyRelease.
"#;

pub const SETUP_PY: &str = r#"from os import path
from setuptools import setup

SETUP_DIR = path.abspath(path.dirname(__file__))

# Get the long description from the README file
with open(path.join(SETUP_DIR, 'README.rst')) as f:
    long_description = f.read()


setup(
    name={{name}},
    version={{version}},
    description={{description}},
    long_description=long_description,
    url={{url}},
    author={{author}},
    author_email={{author_email}},
    license={{license}},
    classifiers=[
        'Development Status :: 3 - Alpha',
        'Intended Audience :: Developers',
        'Topic :: Software Development :: Build Tools',
        {{license_classifier}},
        'Programming Language :: Python :: 3',
    ],
    py_modules=[{{module}}],
    install_requires={{install_requires}},
{{#if console_script}}
    entry_points={
        'console_scripts': [
            {{console_script}},
        ],
    },
{{/if}}
)
"#;

pub const MANIFEST_IN: &str = r#"include README.rst
include LICENSE.md
include requirements.txt
{{#if data}}
recursive-include data *
{{/if}}
{{#if docs}}
include docs/*
{{/if}}
"#;

#[derive(Serialize)]
struct ReadmeContext<'a> {
    name: &'a str,
    rule: String,
    url: String,
    description: &'a str,
    license_name: &'static str,
    module: &'a str,
    is_script: bool,
    author: &'a str,
    author_email: &'a str,
}

#[derive(Serialize)]
struct SetupContext {
    name: String,
    version: String,
    description: String,
    url: String,
    author: String,
    author_email: String,
    license: String,
    license_classifier: String,
    module: String,
    install_requires: String,
    console_script: Option<String>,
}

#[derive(Serialize)]
struct ManifestContext {
    data: bool,
    docs: bool,
}

#[derive(Serialize)]
struct LicenseContext<'a> {
    year: String,
    author: &'a str,
    name: &'a str,
}

/// Renders every packaging file from a [`PyPackage`].
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string("README.rst", README_RST)?;
        handlebars.register_template_string("setup.py", SETUP_PY)?;
        handlebars.register_template_string("MANIFEST.in", MANIFEST_IN)?;
        Ok(Self { handlebars })
    }

    pub fn readme(&self, package: &PyPackage) -> Result<String> {
        let data = ReadmeContext {
            name: &package.name,
            rule: "=".repeat(package.name.chars().count().max(3)),
            url: package.url(),
            description: &package.description,
            license_name: package.resolved_license().display_name(),
            module: &package.module_name,
            is_script: package.is_script,
            author: package.author.as_deref().unwrap_or_default(),
            author_email: package.author_email.as_deref().unwrap_or_default(),
        };
        Ok(self.handlebars.render("README.rst", &data)?)
    }

    pub fn setup_py(&self, package: &PyPackage) -> Result<String> {
        let license = package.resolved_license();
        let console_script = package.is_script.then(|| {
            python_literal(&format!("{}={}:main", package.name, package.module_name))
        });

        let data = SetupContext {
            name: python_literal(&package.name),
            version: python_literal(package.release_version()),
            description: python_literal(&package.description),
            url: python_literal(&package.url()),
            author: python_literal(package.author.as_deref().unwrap_or_default()),
            author_email: python_literal(package.author_email.as_deref().unwrap_or_default()),
            license: python_literal(license.key()),
            license_classifier: python_literal(license.classifier()),
            module: python_literal(&package.module_name),
            install_requires: python_list(&package.requirements),
            console_script,
        };
        Ok(self.handlebars.render("setup.py", &data)?)
    }

    pub fn manifest(&self, package: &PyPackage) -> Result<String> {
        let data = ManifestContext {
            data: package.is_data_files(),
            docs: package.is_docs(),
        };
        Ok(self.handlebars.render("MANIFEST.in", &data)?)
    }

    /// License text for the package's license, MIT when unset or unknown.
    pub fn license(&self, package: &PyPackage, year: i32) -> Result<String> {
        let data = LicenseContext {
            year: year.to_string(),
            author: package.author.as_deref().unwrap_or_default(),
            name: &package.name,
        };
        Ok(self
            .handlebars
            .render_template(package.resolved_license().template(), &data)?)
    }

    /// One requirement per line.
    pub fn requirements(&self, package: &PyPackage) -> String {
        let mut text = package.requirements.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Single-quoted Python string literal.
pub fn python_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Python list literal of strings.
pub fn python_list(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| python_literal(v)).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_escape_quotes() {
        assert_eq!(python_literal("it's"), r"'it\'s'");
        assert_eq!(python_literal(r"a\b"), r"'a\\b'");
        assert_eq!(python_literal("two\nlines"), r"'two\nlines'");
    }

    #[test]
    fn list_literal() {
        assert_eq!(python_list(&[]), "[]");
        assert_eq!(
            python_list(&["click".to_string(), "requests".to_string()]),
            "['click', 'requests']"
        );
    }
}
