// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Advisory module warnings

use spacey_syntax::SourceLocation;
use std::fmt;

/// Why a warning was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A recognized construct the bundler deliberately does not support
    UnsupportedFeature,
}

/// A warning attached to a module. Warnings never abort the build.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Identifier of the module the warning belongs to
    pub module: String,
    /// Warning kind
    pub kind: WarningKind,
    /// Human readable message
    pub message: String,
    /// Where in the module the construct appeared
    pub loc: Option<SourceLocation>,
}

impl Warning {
    /// An unsupported-feature warning
    pub fn unsupported_feature(
        module: impl Into<String>,
        message: impl Into<String>,
        loc: Option<SourceLocation>,
    ) -> Self {
        Self {
            module: module.into(),
            kind: WarningKind::UnsupportedFeature,
            message: message.into(),
            loc,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module)?;
        if let Some(loc) = &self.loc {
            write!(f, " {}", loc)?;
        }
        write!(f, "\n{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacey_syntax::Position;

    #[test]
    fn test_display_with_location() {
        let warning = Warning::unsupported_feature(
            "/project/src/a.js",
            "not supported",
            Some(SourceLocation {
                start: Position::new(3, 4),
                end: Position::new(3, 22),
            }),
        );
        assert_eq!(warning.to_string(), "/project/src/a.js 3:4-22\nnot supported");
    }

    #[test]
    fn test_display_without_location() {
        let warning = Warning::unsupported_feature("/a.js", "not supported", None);
        assert_eq!(warning.to_string(), "/a.js\nnot supported");
        assert_eq!(warning.kind, WarningKind::UnsupportedFeature);
    }
}
