// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the bundler

use crate::dependency::DependencyKind;
use spacey_syntax::Span;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bundler operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Errors that abort the build of a single module or the loading of a configuration
#[derive(Debug, Error)]
pub enum BundleError {
    /// Two dependencies of one module claim overlapping source ranges
    #[error("Conflicting replacements in module '{module}': {first} overlaps {second}")]
    RangeConflict {
        /// Module identifier
        module: String,
        /// Range claimed first
        first: Span,
        /// Range that was rejected
        second: Span,
    },

    /// The module source could not be walked
    #[error("{0}")]
    Syntax(#[from] spacey_syntax::Error),

    /// No template registered for a dependency kind
    #[error("No dependency template registered for {0:?} dependencies")]
    MissingTemplate(DependencyKind),

    /// No module factory registered for a dependency kind
    #[error("No module factory registered for {0:?} dependencies")]
    MissingFactory(DependencyKind),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file: {0}")]
    UnsupportedConfigFile(PathBuf),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BundleError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true for errors that abort only the module being built.
    pub fn is_module_fatal(&self) -> bool {
        matches!(
            self,
            Self::RangeConflict { .. }
                | Self::Syntax(_)
                | Self::MissingTemplate(_)
                | Self::MissingFactory(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_conflict_names_module_and_ranges() {
        let err = BundleError::RangeConflict {
            module: "/project/src/a.js".to_string(),
            first: Span::new(0, 12),
            second: Span::new(4, 8),
        };
        assert_eq!(
            err.to_string(),
            "Conflicting replacements in module '/project/src/a.js': 0..12 overlaps 4..8"
        );
        assert!(err.is_module_fatal());
    }

    #[test]
    fn test_config_error() {
        let err = BundleError::config("bad value");
        assert_eq!(err.to_string(), "Configuration error: bad value");
        assert!(!err.is_module_fatal());
    }
}
