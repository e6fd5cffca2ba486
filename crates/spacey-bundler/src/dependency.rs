// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Dependencies and the factory/template pairs that consume them
//!
//! A dependency records something the parser found in a module. The module
//! factory registered for its kind decides whether the dependency pulls in
//! another module; the template registered for its kind rewrites the module
//! source during code generation.

use crate::error::Result;
use crate::module::Module;
use spacey_syntax::{SourceLocation, Span};

/// Kinds of dependencies the bundler knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    /// Replace a source range with constant text
    Const,
}

/// A source-range replacement produced while parsing a module.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    /// Which factory/template pair handles the dependency
    pub kind: DependencyKind,
    /// The exact range of the replaced expression
    pub span: Span,
    /// Replacement source text
    pub expression: String,
    /// Location of the replaced expression
    pub loc: Option<SourceLocation>,
}

impl Dependency {
    /// A constant replacement of `span` with `expression`.
    pub fn constant(
        expression: impl Into<String>,
        span: Span,
        loc: Option<SourceLocation>,
    ) -> Self {
        Self {
            kind: DependencyKind::Const,
            span,
            expression: expression.into(),
            loc,
        }
    }
}

/// Creates the modules a dependency refers to.
pub trait ModuleFactory: Send + Sync {
    /// Returns the module required by `dependency`, if any.
    fn create(&self, dependency: &Dependency) -> Result<Option<Module>>;
}

/// Factory for dependencies that never refer to another module.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFactory;

impl ModuleFactory for NullFactory {
    fn create(&self, _dependency: &Dependency) -> Result<Option<Module>> {
        Ok(None)
    }
}

/// Renders a dependency into the module source.
pub trait DependencyTemplate: Send + Sync {
    /// Apply `dependency` to `source`.
    fn apply(&self, dependency: &Dependency, source: &mut ReplaceSource<'_>);
}

/// Template writing the constant text over the dependency range.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstTemplate;

impl DependencyTemplate for ConstTemplate {
    fn apply(&self, dependency: &Dependency, source: &mut ReplaceSource<'_>) {
        source.replace(dependency.span, dependency.expression.clone());
    }
}

/// Original source plus pending range replacements.
#[derive(Debug, Clone)]
pub struct ReplaceSource<'a> {
    original: &'a str,
    replacements: Vec<(Span, String)>,
}

impl<'a> ReplaceSource<'a> {
    /// Wrap the original text
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            replacements: Vec::new(),
        }
    }

    /// Replace `span` with `text`. An empty span inserts.
    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.replacements.push((span, text.into()));
    }

    /// Produce the rewritten text. Replacements are applied by start offset;
    /// one that starts inside an already replaced range is skipped.
    pub fn render(&self) -> String {
        let mut ordered: Vec<&(Span, String)> = self.replacements.iter().collect();
        ordered.sort_by_key(|(span, _)| (span.start, span.end));

        let mut output = String::with_capacity(self.original.len());
        let mut cursor = 0;
        for (span, text) in ordered {
            if span.start < cursor || span.end > self.original.len() {
                continue;
            }
            output.push_str(&self.original[cursor..span.start]);
            output.push_str(text);
            cursor = span.end;
        }
        output.push_str(&self.original[cursor..]);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_source_applies_in_offset_order() {
        let mut source = ReplaceSource::new("a = require.main; b = require.extensions;");
        source.replace(Span::new(22, 40), "(void 0)");
        source.replace(Span::new(4, 16), "__spacey_require__.c[0]");
        assert_eq!(
            source.render(),
            "a = __spacey_require__.c[0]; b = (void 0);"
        );
    }

    #[test]
    fn test_replace_source_insert() {
        let mut source = ReplaceSource::new("ab");
        source.replace(Span::new(1, 1), "-");
        assert_eq!(source.render(), "a-b");
    }

    #[test]
    fn test_replace_source_without_replacements() {
        assert_eq!(ReplaceSource::new("x").render(), "x");
    }

    #[test]
    fn test_const_template() {
        let dep = Dependency::constant("(void 0)", Span::new(0, 3), None);
        let mut source = ReplaceSource::new("foo;");
        ConstTemplate.apply(&dep, &mut source);
        assert_eq!(source.render(), "(void 0);");
    }

    #[test]
    fn test_null_factory_creates_nothing() {
        let dep = Dependency::constant("x", Span::new(0, 1), None);
        assert!(NullFactory.create(&dep).unwrap().is_none());
    }
}
