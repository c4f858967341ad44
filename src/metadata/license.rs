//! Supported licenses.

use crate::builder::licenses;
use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// A license PyRelease can write a LICENSE file for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum License {
    Apache2,
    Gpl3,
    Bsd2,
    Bsd3,
    Lgpl2,
    Lgpl3,
    #[default]
    Mit,
    Unlicense,
}

impl License {
    pub const ALL: [License; 8] = [
        License::Apache2,
        License::Gpl3,
        License::Bsd2,
        License::Bsd3,
        License::Lgpl2,
        License::Lgpl3,
        License::Mit,
        License::Unlicense,
    ];

    /// Canonical key, as written back into `__license__`.
    pub fn key(self) -> &'static str {
        match self {
            License::Apache2 => "APACHE-2",
            License::Gpl3 => "GPL-3",
            License::Bsd2 => "BSD-2",
            License::Bsd3 => "BSD-3",
            License::Lgpl2 => "LGPL-2",
            License::Lgpl3 => "LGPL-3",
            License::Mit => "MIT",
            License::Unlicense => "UNLICENSE",
        }
    }

    /// Human readable name for the readme.
    pub fn display_name(self) -> &'static str {
        match self {
            License::Apache2 => "Apache License 2.0",
            License::Gpl3 => "GNU General Public License v3",
            License::Bsd2 => "BSD 2-Clause License",
            License::Bsd3 => "BSD 3-Clause License",
            License::Lgpl2 => "GNU Lesser General Public License v2.1",
            License::Lgpl3 => "GNU Lesser General Public License v3",
            License::Mit => "MIT License",
            License::Unlicense => "The Unlicense",
        }
    }

    /// Trove classifier for `setup.py`.
    pub fn classifier(self) -> &'static str {
        match self {
            License::Apache2 => "License :: OSI Approved :: Apache Software License",
            License::Gpl3 => "License :: OSI Approved :: GNU General Public License v3 (GPLv3)",
            License::Bsd2 | License::Bsd3 => "License :: OSI Approved :: BSD License",
            License::Lgpl2 => {
                "License :: OSI Approved :: GNU Lesser General Public License v2 (LGPLv2)"
            }
            License::Lgpl3 => {
                "License :: OSI Approved :: GNU Lesser General Public License v3 (LGPLv3)"
            }
            License::Mit => "License :: OSI Approved :: MIT License",
            License::Unlicense => "License :: Public Domain",
        }
    }

    /// Handlebars template of the license text.
    pub fn template(self) -> &'static str {
        match self {
            License::Apache2 => licenses::APACHE_2,
            License::Gpl3 => licenses::GPL_3,
            License::Bsd2 => licenses::BSD_2,
            License::Bsd3 => licenses::BSD_3,
            License::Lgpl2 => licenses::LGPL_2,
            License::Lgpl3 => licenses::LGPL_3,
            License::Mit => licenses::MIT,
            License::Unlicense => licenses::UNLICENSE,
        }
    }

    /// Resolve an optional license string, falling back to MIT.
    pub fn resolve(raw: Option<&str>) -> License {
        match raw.map(License::from_str) {
            Some(Ok(license)) => license,
            Some(Err(_)) => {
                log::warn!("Unknown license {:?}, using MIT", raw);
                License::Mit
            }
            None => License::Mit,
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for License {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_'))
            .collect();

        let license = match normalized.as_str() {
            "APACHE-2" | "APACHE2" | "APACHE-2.0" | "APACHE2.0" | "APACHE" => License::Apache2,
            "GPL-3" | "GPL3" | "GPL-3.0" | "GPLV3" | "GPL-3.0-ONLY" | "GPL-3.0-OR-LATER" => {
                License::Gpl3
            }
            "BSD-2" | "BSD2" | "BSD-2-CLAUSE" => License::Bsd2,
            "BSD-3" | "BSD3" | "BSD-3-CLAUSE" | "BSD" => License::Bsd3,
            "LGPL-2" | "LGPL2" | "LGPL-2.1" | "LGPLV2" | "LGPL-2.1-ONLY" => License::Lgpl2,
            "LGPL-3" | "LGPL3" | "LGPL-3.0" | "LGPLV3" | "LGPL-3.0-ONLY" => License::Lgpl3,
            "MIT" => License::Mit,
            "UNLICENSE" | "UNLICENSED" | "PUBLICDOMAIN" => License::Unlicense,
            _ => return Err(ReleaseError::UnknownLicense(s.trim().to_string())),
        };
        Ok(license)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_keys_round_trip() {
        for license in License::ALL {
            assert_eq!(license.key().parse::<License>().unwrap(), license);
        }
    }

    #[test]
    fn spdx_aliases() {
        assert_eq!("Apache-2.0".parse::<License>().unwrap(), License::Apache2);
        assert_eq!("gplv3".parse::<License>().unwrap(), License::Gpl3);
        assert_eq!("BSD-2-Clause".parse::<License>().unwrap(), License::Bsd2);
        assert_eq!("lgpl-2.1".parse::<License>().unwrap(), License::Lgpl2);
        assert!("WTFPL".parse::<License>().is_err());
    }

    #[test]
    fn unknown_or_missing_is_mit() {
        assert_eq!(License::resolve(None), License::Mit);
        assert_eq!(License::resolve(Some("proprietary")), License::Mit);
        assert_eq!(License::resolve(Some("BSD-3")), License::Bsd3);
    }
}
