// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-syntax
//!
//! The JavaScript front end of the Spacey bundler.
//!
//! ## Overview
//!
//! This crate turns module source text into the stream of syntax events the
//! bundler's parser hooks are dispatched on:
//! - A scanner for ECMAScript tokens (strings, templates, regular expressions,
//!   comments)
//! - Syntax nodes with byte spans and line/column locations
//! - A walker reporting scopes, declarations and free member chains
//!
//! ## Quick Start
//!
//! ```rust
//! use spacey_syntax::{walk, SyntaxEvent};
//!
//! let events = walk("module.exports = __dirname;").unwrap();
//! let paths: Vec<String> = events
//!     .iter()
//!     .filter_map(|event| match event {
//!         SyntaxEvent::Expression(expr) => Some(expr.dotted_path()),
//!         _ => None,
//!     })
//!     .collect();
//! assert_eq!(paths, vec!["module.exports", "__dirname"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod lexer;
mod walk;

// Re-exports for convenience
pub use ast::{
    DeclarationKind, Expression, ExpressionKind, Identifier, LineIndex, MemberExpression,
    Position, ScopeKind, SourceLocation, SyntaxEvent,
};
pub use lexer::Span;
pub use walk::walk;

/// Errors that can occur while walking source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Syntax error during scanning or walking
    SyntaxError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SyntaxError(msg) => write!(f, "SyntaxError: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SyntaxError("Unexpected end of input".to_string());
        assert_eq!(err.to_string(), "SyntaxError: Unexpected end of input");
    }
}
