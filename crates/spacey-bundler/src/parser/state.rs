// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Per-module parse state handed to every hook

use crate::compiler::BuildContext;
use crate::dependency::Dependency;
use crate::diagnostics::Warning;
use crate::error::Result;
use crate::module::Module;
use crate::parser::hooks::Flow;
use crate::parser::scope::Scope;
use spacey_syntax::{SourceLocation, Span};
use std::collections::BTreeMap;
use tracing::trace;

/// State of one module's parse.
///
/// The state borrows its module; it never owns it. Bindings stay private to
/// the state until [`ParseState::finish`] commits them, so a failed parse
/// leaves no bindings behind.
pub struct ParseState<'a> {
    build: &'a BuildContext,
    module: Option<&'a mut Module>,
    scope: Scope,
    variables: BTreeMap<String, String>,
}

impl<'a> ParseState<'a> {
    /// Start parsing `module` (or detached source when `None`).
    pub fn new(build: &'a BuildContext, module: Option<&'a mut Module>) -> Self {
        Self {
            build,
            module,
            scope: Scope::new(),
            variables: BTreeMap::new(),
        }
    }

    /// Build-wide read-only settings
    pub fn build(&self) -> &BuildContext {
        self.build
    }

    /// The module being parsed, if any
    pub fn module(&self) -> Option<&Module> {
        self.module.as_deref()
    }

    /// Declared names of the module
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Declared names of the module, for the walker
    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    /// Bind `name` to expression source text in the current scope.
    pub fn add_variable(&mut self, name: impl Into<String>, expression: impl Into<String>) {
        let name = name.into();
        let expression = expression.into();
        trace!(name = %name, expression = %expression, depth = self.scope.depth, "binding variable");
        self.variables.insert(name, expression);
    }

    /// The expression bound to `name`
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// All bindings made so far
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Replace the expression at `span` with `text` during code generation.
    ///
    /// Declines without a module to attach the replacement to.
    pub fn emit_replacement(
        &mut self,
        text: impl Into<String>,
        span: Span,
        loc: Option<SourceLocation>,
    ) -> Result<Flow> {
        let Some(module) = self.module.as_deref_mut() else {
            return Ok(Flow::Declined);
        };
        module.add_dependency(Dependency::constant(text, span, loc))?;
        Ok(Flow::Handled)
    }

    /// Record an unsupported-construct warning on the module.
    ///
    /// Returns false when there is no module to warn on.
    pub fn warn_unsupported(&mut self, message: &str, loc: Option<SourceLocation>) -> bool {
        let Some(module) = self.module.as_deref_mut() else {
            return false;
        };
        let warning = Warning::unsupported_feature(module.identifier(), message, loc);
        module.warn(warning);
        true
    }

    /// End the parse, committing the bindings to the module.
    pub fn finish(self) {
        if let Some(module) = self.module {
            module.commit_variables(self.variables);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> BuildContext {
        BuildContext::new("/project")
    }

    #[test]
    fn test_bindings_commit_on_finish() {
        let build = build();
        let mut module = Module::new("/project/a.js");
        let mut state = ParseState::new(&build, Some(&mut module));
        state.add_variable("__dirname", "\"\"");
        assert_eq!(state.variable("__dirname"), Some("\"\""));
        state.finish();
        assert_eq!(module.variables().get("__dirname").map(String::as_str), Some("\"\""));
    }

    #[test]
    fn test_discarded_state_commits_nothing() {
        let build = build();
        let mut module = Module::new("/project/a.js");
        {
            let mut state = ParseState::new(&build, Some(&mut module));
            state.add_variable("__dirname", "\"\"");
        }
        assert!(module.variables().is_empty());
    }

    #[test]
    fn test_replacement_without_module_declines() {
        let build = build();
        let mut state = ParseState::new(&build, None);
        let flow = state
            .emit_replacement("(void 0)", Span::new(0, 4), None)
            .unwrap();
        assert_eq!(flow, Flow::Declined);
        assert!(!state.warn_unsupported("nope", None));
    }

    #[test]
    fn test_replacement_and_warning_land_on_module() {
        let build = build();
        let mut module = Module::new("/project/a.js");
        let mut state = ParseState::new(&build, Some(&mut module));
        assert_eq!(
            state.emit_replacement("x", Span::new(0, 4), None).unwrap(),
            Flow::Handled
        );
        assert!(state.warn_unsupported("nope", None));
        state.finish();
        assert_eq!(module.dependencies().len(), 1);
        assert_eq!(module.warnings()[0].module, "/project/a.js");
    }
}
