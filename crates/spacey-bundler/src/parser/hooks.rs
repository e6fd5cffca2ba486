// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Pattern-keyed parser hooks
//!
//! Plugins register handlers under a dotted free-variable path such as
//! `require.main`. When the walker finds a member chain, the recognizer
//! offers the chain and then each shorter prefix to the handlers registered
//! for that exact path. Handlers for one path run in registration order and
//! the first that handles the expression wins.

use crate::error::Result;
use crate::parser::evaluated::EvaluatedExpression;
use crate::parser::state::ParseState;
use spacey_syntax::Expression;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// When a hook runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKind {
    /// The expression is met in expression position
    Expression,
    /// The expression is statically evaluated
    EvaluateIdentifier,
}

/// A hook kind together with the dotted path it fires on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternKey {
    /// Hook kind
    pub kind: HookKind,
    /// Dotted free-variable path, e.g. `module.hot`
    pub path: String,
}

impl PatternKey {
    /// Create a key
    pub fn new(kind: HookKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            HookKind::Expression => write!(f, "expression {}", self.path),
            HookKind::EvaluateIdentifier => write!(f, "evaluate Identifier {}", self.path),
        }
    }
}

/// Outcome of an expression handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// The expression was claimed; no further handler sees it
    Handled,
    /// Let the next handler (or the default walk) see the expression
    Declined,
}

impl Flow {
    /// Did the handler claim the expression?
    pub fn is_handled(self) -> bool {
        self == Flow::Handled
    }
}

/// Handler run when a pattern is met in expression position.
pub type ExpressionHandler =
    dyn Fn(&mut ParseState<'_>, &Expression) -> Result<Flow> + Send + Sync;

/// Handler producing the static value of a pattern.
pub type EvaluateHandler =
    dyn Fn(&ParseState<'_>, &Expression) -> Option<EvaluatedExpression> + Send + Sync;

/// Registry of parser hooks keyed by pattern.
#[derive(Default)]
pub struct Recognizer {
    expression: HashMap<String, Vec<Box<ExpressionHandler>>>,
    evaluate: HashMap<String, Vec<Box<EvaluateHandler>>>,
}

impl Recognizer {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an expression handler for `path`.
    pub fn on_expression<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&mut ParseState<'_>, &Expression) -> Result<Flow> + Send + Sync + 'static,
    {
        self.expression
            .entry(path.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Register an evaluation handler for `path`.
    pub fn on_evaluate_identifier<F>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(&ParseState<'_>, &Expression) -> Option<EvaluatedExpression> + Send + Sync + 'static,
    {
        self.evaluate
            .entry(path.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Is any handler registered under `key`?
    pub fn contains(&self, key: &PatternKey) -> bool {
        match key.kind {
            HookKind::Expression => self.expression.contains_key(&key.path),
            HookKind::EvaluateIdentifier => self.evaluate.contains_key(&key.path),
        }
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<PatternKey> {
        let mut keys: Vec<PatternKey> = self
            .expression
            .keys()
            .map(|path| PatternKey::new(HookKind::Expression, path.clone()))
            .chain(
                self.evaluate
                    .keys()
                    .map(|path| PatternKey::new(HookKind::EvaluateIdentifier, path.clone())),
            )
            .collect();
        keys.sort();
        keys
    }

    /// Offer `expr` and its shorter prefixes to the expression handlers.
    ///
    /// Nothing fires when the root name is declared by the module.
    pub fn dispatch_expression(
        &self,
        state: &mut ParseState<'_>,
        expr: &Expression,
    ) -> Result<Flow> {
        if state.scope().is_local(expr.root_name()) {
            trace!(root = expr.root_name(), "shadowed by local declaration");
            return Ok(Flow::Declined);
        }
        for candidate in expr.prefixes() {
            let path = candidate.dotted_path();
            let Some(handlers) = self.expression.get(&path) else {
                continue;
            };
            for handler in handlers {
                if handler(state, candidate)?.is_handled() {
                    trace!(path = %path, span = %candidate.span, "expression handled");
                    return Ok(Flow::Handled);
                }
            }
        }
        Ok(Flow::Declined)
    }

    /// Statically evaluate `expr` through the handlers for its exact path.
    pub fn evaluate_identifier(
        &self,
        state: &ParseState<'_>,
        expr: &Expression,
    ) -> Option<EvaluatedExpression> {
        if state.scope().is_local(expr.root_name()) {
            return None;
        }
        self.evaluate
            .get(&expr.dotted_path())?
            .iter()
            .find_map(|handler| handler(state, expr))
    }
}

impl fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recognizer")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::BuildContext;
    use spacey_syntax::{Identifier, LineIndex, Span};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ident(name: &str, start: usize) -> Identifier {
        let span = Span::new(start, start + name.len());
        Identifier {
            name: name.to_string(),
            span,
            loc: LineIndex::new("").location(Span::new(0, 0)),
        }
    }

    /// `require.main.filename` with spans laid out as in the source text
    fn chain() -> Expression {
        let require = Expression::identifier(ident("require", 0));
        let main = Expression::member(require, ident("main", 8));
        Expression::member(main, ident("filename", 13))
    }

    #[test]
    fn test_longest_prefix_wins_with_its_own_span() {
        let mut hooks = Recognizer::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        hooks.on_expression("require.main", move |_, expr| {
            log.lock().unwrap().push(expr.span);
            Ok(Flow::Handled)
        });
        hooks.on_expression("require", |_, _| panic!("shorter prefix must not fire"));

        let build = BuildContext::new("/");
        let mut state = ParseState::new(&build, None);
        assert_eq!(
            hooks.dispatch_expression(&mut state, &chain()).unwrap(),
            Flow::Handled
        );
        assert_eq!(*seen.lock().unwrap(), vec![Span::new(0, 12)]);
    }

    #[test]
    fn test_declined_handler_falls_through() {
        let mut hooks = Recognizer::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let first = Arc::clone(&calls);
        let second = Arc::clone(&calls);
        hooks.on_expression("require.main", move |_, _| {
            first.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Declined)
        });
        hooks.on_expression("require", move |_, _| {
            second.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Handled)
        });

        let build = BuildContext::new("/");
        let mut state = ParseState::new(&build, None);
        assert!(
            hooks
                .dispatch_expression(&mut state, &chain())
                .unwrap()
                .is_handled()
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_shadowed_root_is_not_dispatched() {
        let mut hooks = Recognizer::new();
        hooks.on_expression("require.main", |_, _| panic!("shadowed"));

        let build = BuildContext::new("/");
        let mut state = ParseState::new(&build, None);
        state.scope_mut().begin_scope();
        state.scope_mut().declare("require");
        assert_eq!(
            hooks.dispatch_expression(&mut state, &chain()).unwrap(),
            Flow::Declined
        );
    }

    #[test]
    fn test_evaluate_matches_exact_path_only() {
        let mut hooks = Recognizer::new();
        hooks.on_evaluate_identifier("require.main", |_, expr| {
            Some(EvaluatedExpression::boolean(true, expr.span))
        });

        let build = BuildContext::new("/");
        let state = ParseState::new(&build, None);
        let full = chain();
        assert!(hooks.evaluate_identifier(&state, &full).is_none());
        let main = full.object().unwrap();
        assert_eq!(
            hooks.evaluate_identifier(&state, main),
            Some(EvaluatedExpression::boolean(true, Span::new(0, 12)))
        );
    }

    #[test]
    fn test_keys_are_sorted() {
        let mut hooks = Recognizer::new();
        hooks.on_evaluate_identifier("module.hot", |_, _| None);
        hooks.on_expression("module", |_, _| Ok(Flow::Declined));
        hooks.on_expression("__dirname", |_, _| Ok(Flow::Declined));
        let keys: Vec<String> = hooks.keys().iter().map(ToString::to_string).collect();
        assert_eq!(
            keys,
            vec![
                "expression __dirname",
                "expression module",
                "evaluate Identifier module.hot"
            ]
        );
        assert!(hooks.contains(&PatternKey::new(HookKind::Expression, "module")));
        assert!(!hooks.contains(&PatternKey::new(HookKind::EvaluateIdentifier, "module")));
    }
}
