// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Options of the Node environment plugin.
//!
//! Option values follow JavaScript truthiness: `false`, `null`, `0`, `NaN`
//! and `""` switch a substitution off, the mode names select a mock, and any
//! other value selects the build-root-relative path.
//!
//! ```json
//! { "__filename": true, "__dirname": "mock_absolute" }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BundleError, Result};

/// A configuration value as written by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum RawOption {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl RawOption {
    fn is_truthy(&self) -> bool {
        match self {
            RawOption::Bool(b) => *b,
            RawOption::Number(n) => *n != 0.0 && !n.is_nan(),
            RawOption::Text(s) => !s.is_empty(),
            RawOption::Null => false,
        }
    }

    /// Interpret a command-line value the way it would read in JSON.
    fn parse_cli(value: &str) -> Self {
        match value {
            "true" => RawOption::Bool(true),
            "false" => RawOption::Bool(false),
            "null" => RawOption::Null,
            _ => value
                .parse::<f64>()
                .map(RawOption::Number)
                .unwrap_or_else(|_| RawOption::Text(value.to_string())),
        }
    }
}

/// How `__filename` is substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawOption", into = "RawOption")]
pub enum FilenameOption {
    /// Leave `__filename` alone
    #[default]
    Off,
    /// Always `"/index.js"`
    Mock,
    /// Path of the module relative to the build root
    Relative,
}

impl From<RawOption> for FilenameOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Text(s) if s == "mock" => FilenameOption::Mock,
            raw if raw.is_truthy() => FilenameOption::Relative,
            _ => FilenameOption::Off,
        }
    }
}

impl From<FilenameOption> for RawOption {
    fn from(option: FilenameOption) -> Self {
        match option {
            FilenameOption::Off => RawOption::Bool(false),
            FilenameOption::Mock => RawOption::Text("mock".to_string()),
            FilenameOption::Relative => RawOption::Bool(true),
        }
    }
}

/// How `__dirname` is substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawOption", into = "RawOption")]
pub enum DirnameOption {
    /// Leave `__dirname` alone
    #[default]
    Off,
    /// Always `"/"`
    Mock,
    /// The runtime `__dirname` joined with the relative module context
    MockAbsolute,
    /// Context of the module relative to the build root
    Relative,
}

impl From<RawOption> for DirnameOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Text(s) if s == "mock" => DirnameOption::Mock,
            RawOption::Text(s) if s == "mock_absolute" => DirnameOption::MockAbsolute,
            raw if raw.is_truthy() => DirnameOption::Relative,
            _ => DirnameOption::Off,
        }
    }
}

impl From<DirnameOption> for RawOption {
    fn from(option: DirnameOption) -> Self {
        match option {
            DirnameOption::Off => RawOption::Bool(false),
            DirnameOption::Mock => RawOption::Text("mock".to_string()),
            DirnameOption::MockAbsolute => RawOption::Text("mock_absolute".to_string()),
            DirnameOption::Relative => RawOption::Bool(true),
        }
    }
}

/// Options of the Node environment plugin. Unset options are off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStuffOptions {
    /// Substitution mode of `__filename`
    #[serde(rename = "__filename")]
    pub filename: FilenameOption,

    /// Substitution mode of `__dirname`
    #[serde(rename = "__dirname")]
    pub dirname: DirnameOption,
}

impl NodeStuffOptions {
    /// Parse options from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let format = path.extension().and_then(|ext| ext.to_str());
        match format {
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?),
            Some("toml") => Self::from_toml_str(&std::fs::read_to_string(path)?),
            _ => Err(BundleError::UnsupportedConfigFile(path.to_path_buf())),
        }
    }

    /// Set an option from its command-line text, e.g. `("__dirname", "mock")`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let raw = RawOption::parse_cli(value);
        match key {
            "__filename" => self.filename = raw.into(),
            "__dirname" => self.dirname = raw.into(),
            _ => return Err(BundleError::config(format!("Unknown option '{}'", key))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!RawOption::Bool(false).is_truthy());
        assert!(!RawOption::Null.is_truthy());
        assert!(!RawOption::Number(0.0).is_truthy());
        assert!(!RawOption::Number(f64::NAN).is_truthy());
        assert!(!RawOption::Text(String::new()).is_truthy());
        assert!(RawOption::Number(-1.0).is_truthy());
        assert!(RawOption::Text("yes".to_string()).is_truthy());
    }

    #[test]
    fn test_json_modes() {
        let options =
            NodeStuffOptions::from_json_str(r#"{"__filename": "mock", "__dirname": "mock_absolute"}"#)
                .unwrap();
        assert_eq!(options.filename, FilenameOption::Mock);
        assert_eq!(options.dirname, DirnameOption::MockAbsolute);

        let options =
            NodeStuffOptions::from_json_str(r#"{"__filename": 1, "__dirname": "anything"}"#).unwrap();
        assert_eq!(options.filename, FilenameOption::Relative);
        assert_eq!(options.dirname, DirnameOption::Relative);
    }

    #[test]
    fn test_json_falsy_values() {
        for value in ["false", "null", "0", "\"\""] {
            let text = format!(r#"{{"__filename": {value}, "__dirname": {value}}}"#);
            let options = NodeStuffOptions::from_json_str(&text).unwrap();
            assert_eq!(options, NodeStuffOptions::default(), "{value}");
        }
    }

    #[test]
    fn test_filename_has_no_absolute_mock() {
        let options = NodeStuffOptions::from_json_str(r#"{"__filename": "mock_absolute"}"#).unwrap();
        assert_eq!(options.filename, FilenameOption::Relative);
    }

    #[test]
    fn test_missing_fields_default_off() {
        let options = NodeStuffOptions::from_json_str("{}").unwrap();
        assert_eq!(options, NodeStuffOptions::default());
    }

    #[test]
    fn test_toml() {
        let options = NodeStuffOptions::from_toml_str("__filename = true\n__dirname = \"mock\"\n").unwrap();
        assert_eq!(options.filename, FilenameOption::Relative);
        assert_eq!(options.dirname, DirnameOption::Mock);
    }

    #[test]
    fn test_serialize_round_trips_modes() {
        let options = NodeStuffOptions {
            filename: FilenameOption::Mock,
            dirname: DirnameOption::Relative,
        };
        let text = serde_json::to_string(&options).unwrap();
        assert_eq!(text, r#"{"__filename":"mock","__dirname":true}"#);
    }

    #[test]
    fn test_set_from_cli_text() {
        let mut options = NodeStuffOptions::default();
        options.set("__dirname", "mock_absolute").unwrap();
        options.set("__filename", "true").unwrap();
        assert_eq!(options.dirname, DirnameOption::MockAbsolute);
        assert_eq!(options.filename, FilenameOption::Relative);

        options.set("__filename", "0").unwrap();
        assert_eq!(options.filename, FilenameOption::Off);

        assert!(matches!(
            options.set("__module", "true"),
            Err(BundleError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            NodeStuffOptions::from_json_str("{"),
            Err(BundleError::Json(_))
        ));
    }
}
