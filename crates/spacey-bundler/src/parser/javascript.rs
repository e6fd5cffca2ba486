// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The parser that feeds walked source to the hook registry.

use crate::error::Result;
use crate::parser::evaluated::EvaluatedExpression;
use crate::parser::hooks::Recognizer;
use crate::parser::state::ParseState;
use spacey_syntax::{DeclarationKind, Expression, ScopeKind, SyntaxEvent};
use tracing::trace;

/// Walks module source and dispatches what it finds to the registered hooks.
#[derive(Debug, Default)]
pub struct JavascriptParser {
    hooks: Recognizer,
}

impl JavascriptParser {
    /// Create a parser with no hooks
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered hooks
    pub fn hooks(&self) -> &Recognizer {
        &self.hooks
    }

    /// Registered hooks, for plugins
    pub fn hooks_mut(&mut self) -> &mut Recognizer {
        &mut self.hooks
    }

    /// Parse `source`, recording replacements and bindings in `state`.
    pub fn parse(&self, source: &str, state: &mut ParseState<'_>) -> Result<()> {
        self.walk(source, state, |state, expr| {
            if !self.hooks.dispatch_expression(state, expr)?.is_handled() {
                trace!(path = %expr.dotted_path(), "walked without handler");
            }
            Ok(())
        })
    }

    /// Statically evaluate `expr`. Unanswered queries are unknown.
    pub fn evaluate_expression(
        &self,
        state: &ParseState<'_>,
        expr: &Expression,
    ) -> EvaluatedExpression {
        self.hooks
            .evaluate_identifier(state, expr)
            .unwrap_or_else(|| EvaluatedExpression::unknown(expr.span))
    }

    /// Statically evaluate every free expression of `source` in order.
    pub fn evaluate_source(
        &self,
        source: &str,
        state: &mut ParseState<'_>,
    ) -> Result<Vec<EvaluatedExpression>> {
        let mut results = Vec::new();
        self.walk(source, state, |state, expr| {
            results.push(self.evaluate_expression(state, expr));
            Ok(())
        })?;
        Ok(results)
    }

    fn walk<'a>(
        &self,
        source: &str,
        state: &mut ParseState<'a>,
        mut visit: impl FnMut(&mut ParseState<'a>, &Expression) -> Result<()>,
    ) -> Result<()> {
        for event in spacey_syntax::walk(source)? {
            match event {
                SyntaxEvent::EnterScope(_, ScopeKind::Block) => state.scope_mut().begin_scope(),
                SyntaxEvent::EnterScope(_, ScopeKind::Function) => {
                    state.scope_mut().begin_function_scope()
                }
                SyntaxEvent::ExitScope(_) => {
                    state.scope_mut().end_scope();
                }
                SyntaxEvent::Declare(id, DeclarationKind::Lexical) => {
                    state.scope_mut().declare(id.name)
                }
                SyntaxEvent::Declare(id, DeclarationKind::Var) => {
                    state.scope_mut().declare_var(id.name)
                }
                SyntaxEvent::Expression(expr) => visit(state, &expr)?,
            }
        }
        Ok(())
    }
}
