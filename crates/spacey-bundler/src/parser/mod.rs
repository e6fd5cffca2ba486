// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module parsing and the hooks plugins attach to it.
//!
//! ## Structure
//!
//! - `javascript` - The parser driving the syntax walker
//! - `hooks` - Pattern-keyed handler registry with first-handled-wins dispatch
//! - `binder` - Helpers binding free names to build-time values
//! - `state` - Per-module parse state handed to handlers
//! - `scope` - Declared names used for shadowing
//! - `evaluated` - Static evaluation results
//!
//! ## Usage
//!
//! ```rust
//! use spacey_bundler::compiler::BuildContext;
//! use spacey_bundler::module::Module;
//! use spacey_bundler::parser::{JavascriptParser, ParseState};
//!
//! let mut parser = JavascriptParser::new();
//! parser.hooks_mut().set_constant("__dirname", "/");
//!
//! let build = BuildContext::new("/project");
//! let mut module = Module::new("/project/src/a.js");
//! let mut state = ParseState::new(&build, Some(&mut module));
//! parser.parse("console.log(__dirname);", &mut state).unwrap();
//! state.finish();
//!
//! assert_eq!(module.variables()["__dirname"], "\"/\"");
//! ```

mod binder;
mod evaluated;
mod hooks;
mod javascript;
mod scope;
mod state;

pub use evaluated::{EvaluatedExpression, EvaluatedValue};
pub use hooks::{EvaluateHandler, ExpressionHandler, Flow, HookKind, PatternKey, Recognizer};
pub use javascript::JavascriptParser;
pub use scope::{Local, Scope};
pub use state::ParseState;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::BuildContext;
    use crate::module::Module;
    use spacey_syntax::Span;

    #[test]
    fn test_parameter_shadows_only_inside_its_function() {
        let mut parser = JavascriptParser::new();
        parser.hooks_mut().on_expression("require.main", |state, expr| {
            state.emit_replacement("MAIN", expr.span, Some(expr.loc))
        });

        let source = "function f(require) { require.main; }\nrequire.main;";
        let build = BuildContext::new("/project");
        let mut module = Module::new("/project/a.js");
        let mut state = ParseState::new(&build, Some(&mut module));
        parser.parse(source, &mut state).unwrap();
        state.finish();

        let spans: Vec<Span> = module.dependencies().iter().map(|d| d.span).collect();
        let start = source.rfind("require.main").unwrap();
        assert_eq!(spans, vec![Span::new(start, start + "require.main".len())]);
    }

    #[test]
    fn test_unanswered_evaluation_is_unknown() {
        let parser = JavascriptParser::new();
        let build = BuildContext::new("/project");
        let mut state = ParseState::new(&build, None);
        let results = parser.evaluate_source("process.env", &mut state).unwrap();
        assert_eq!(results, vec![EvaluatedExpression::unknown(Span::new(0, 11))]);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let parser = JavascriptParser::new();
        let build = BuildContext::new("/project");
        let mut state = ParseState::new(&build, None);
        assert!(parser.parse("}", &mut state).is_err());
    }
}
