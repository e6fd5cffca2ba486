// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Token-level walk that reports scopes, declarations and free expressions.
//!
//! The walker does not build a full program tree. It recognizes the
//! constructs that decide whether a name is free (`var`/`let`/`const`/`class`
//! bindings, function, method, catch and arrow parameters, block scopes) and emits
//! every free identifier or static member chain in expression position.
//!
//! `var` and function declarations are tagged so the consumer can hoist them
//! to the enclosing function body.
//!
//! Known gaps: destructuring patterns do not declare their names, and the
//! parameters of an arrow function with an expression body are not scoped.

use crate::Error;
use crate::ast::{DeclarationKind, Expression, Identifier, LineIndex, ScopeKind, SyntaxEvent};
use crate::lexer::{Scanner, Token, TokenKind};
use std::collections::{HashMap, HashSet};

/// Walks `source` and returns its syntax events in source order.
pub fn walk(source: &str) -> Result<Vec<SyntaxEvent>, Error> {
    Walker::new(source)?.run()
}

/// A body announced by a function, method, arrow or catch head.
struct Body {
    kind: ScopeKind,
    params: Vec<Identifier>,
}

struct Walker<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    index: LineIndex<'a>,
    events: Vec<SyntaxEvent>,
    depth: usize,
    /// Pending bodies, keyed by the token index of their `{`
    bodies: HashMap<usize, Body>,
    /// Token indices already consumed as declarations
    declared: HashSet<usize>,
}

impl<'a> Walker<'a> {
    fn new(source: &'a str) -> Result<Self, Error> {
        let index = LineIndex::new(source);
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = scanner.next_token();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Invalid => {
                    let pos = index.position(token.span.start);
                    return Err(Error::SyntaxError(format!(
                        "Invalid or unexpected token ({}:{})",
                        pos.line, pos.column
                    )));
                }
                _ => tokens.push(token),
            }
        }

        Ok(Self {
            source,
            tokens,
            index,
            events: Vec::new(),
            depth: 0,
            bodies: HashMap::new(),
            declared: HashSet::new(),
        })
    }

    fn run(mut self) -> Result<Vec<SyntaxEvent>, Error> {
        let mut i = 0;
        while i < self.tokens.len() {
            i = self.step(i)?;
        }

        if self.depth > 0 {
            return Err(Error::SyntaxError("Unexpected end of input".to_string()));
        }

        Ok(self.events)
    }

    /// Handles the token at `i` and returns the index of the next unvisited token.
    fn step(&mut self, i: usize) -> Result<usize, Error> {
        let span = self.tokens[i].span;

        match &self.tokens[i].kind {
            TokenKind::LeftBrace => {
                self.depth += 1;
                let body = self.bodies.remove(&i);
                let kind = body.as_ref().map_or(ScopeKind::Block, |body| body.kind);
                self.events.push(SyntaxEvent::EnterScope(span, kind));
                for param in body.into_iter().flat_map(|body| body.params) {
                    self.events
                        .push(SyntaxEvent::Declare(param, DeclarationKind::Lexical));
                }
                Ok(i + 1)
            }
            TokenKind::RightBrace => {
                if self.depth == 0 {
                    let pos = self.index.position(span.start);
                    return Err(Error::SyntaxError(format!(
                        "Unexpected token '}}' ({}:{})",
                        pos.line, pos.column
                    )));
                }
                self.depth -= 1;
                self.events.push(SyntaxEvent::ExitScope(span));
                Ok(i + 1)
            }
            TokenKind::Var => {
                self.declarators(i, DeclarationKind::Var);
                Ok(i + 1)
            }
            TokenKind::Let | TokenKind::Const => {
                self.declarators(i, DeclarationKind::Lexical);
                Ok(i + 1)
            }
            TokenKind::Class => {
                if self.is_identifier(i + 1) {
                    self.declare(i + 1, DeclarationKind::Lexical);
                }
                Ok(i + 1)
            }
            TokenKind::Function => {
                let mut j = i + 1;
                if self.kind_at(j) == Some(&TokenKind::Operator) {
                    // function* generator
                    j += 1;
                }
                if self.is_identifier(j) {
                    self.declare(j, DeclarationKind::Var);
                    j += 1;
                }
                if self.kind_at(j) == Some(&TokenKind::LeftParen) {
                    if let Some(close) = self.matching_paren(j) {
                        self.collect_params(j, close, Some((close + 1, ScopeKind::Function)));
                    }
                }
                Ok(i + 1)
            }
            TokenKind::Catch => {
                if self.kind_at(i + 1) == Some(&TokenKind::LeftParen) {
                    if let Some(close) = self.matching_paren(i + 1) {
                        self.collect_params(i + 1, close, Some((close + 1, ScopeKind::Block)));
                    }
                }
                Ok(i + 1)
            }
            TokenKind::LeftParen => {
                if let Some(close) = self.matching_paren(i) {
                    if self.kind_at(close + 1) == Some(&TokenKind::Arrow) {
                        let body = (self.kind_at(close + 2) == Some(&TokenKind::LeftBrace))
                            .then_some((close + 2, ScopeKind::Function));
                        self.collect_params(i, close, body);
                    }
                }
                Ok(i + 1)
            }
            TokenKind::Dot | TokenKind::QuestionDot => {
                // Property of an arbitrary object, never a free name
                if self.identifier_name(i + 1).is_some() {
                    Ok(i + 2)
                } else {
                    Ok(i + 1)
                }
            }
            TokenKind::Identifier(_) if !self.declared.contains(&i) => {
                if let Some(close) = self.method_head(i) {
                    self.collect_params(i + 1, close, Some((close + 1, ScopeKind::Function)));
                    return Ok(i + 1);
                }
                Ok(self.expression(i))
            }
            _ => Ok(i + 1),
        }
    }

    /// Declares the names bound by the declaration list after `keyword`.
    ///
    /// The list ends at a top-level `;`, at the bracket closing the enclosing
    /// construct, or at a line break that ends the statement.
    fn declarators(&mut self, keyword: usize, kind: DeclarationKind) {
        let mut nesting = 0usize;
        let mut at_start = true;

        for j in keyword + 1..self.tokens.len() {
            if at_start {
                if self.is_identifier(j) {
                    self.declare(j, kind);
                }
                at_start = false;
            } else if nesting == 0 && self.line_break_ends_statement(j) {
                break;
            }

            match self.tokens[j].kind {
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    nesting += 1
                }
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    if nesting == 0 {
                        break;
                    }
                    nesting -= 1;
                }
                TokenKind::Semicolon if nesting == 0 => break,
                TokenKind::Comma if nesting == 0 => at_start = true,
                _ => {}
            }
        }
    }

    /// True when a line break before token `j` terminates the statement.
    fn line_break_ends_statement(&self, j: usize) -> bool {
        let prev = &self.tokens[j - 1];
        let next = &self.tokens[j];
        if !self.source[prev.span.end..next.span.start].contains('\n') {
            return false;
        }
        let prev_ends_operand =
            prev.kind == TokenKind::RightBrace || !prev.kind.allows_regexp_after();
        let next_starts_statement = match &next.kind {
            TokenKind::Identifier(_) | TokenKind::Number(_) | TokenKind::String(_) => true,
            TokenKind::In | TokenKind::Instanceof => false,
            kind => kind.is_keyword(),
        };
        prev_ends_operand && next_starts_statement
    }

    /// Returns the closing paren of a method head `name(...) {` in an object
    /// literal or class body.
    fn method_head(&self, name: usize) -> Option<usize> {
        if name == 0 || self.kind_at(name + 1) != Some(&TokenKind::LeftParen) {
            return None;
        }
        let prev = &self.tokens[name - 1];
        let member_position = match &prev.kind {
            TokenKind::LeftBrace
            | TokenKind::RightBrace
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Static
            | TokenKind::Async => true,
            TokenKind::Operator => &self.source[prev.span.start..prev.span.end] == "*",
            TokenKind::Identifier(accessor) => accessor == "get" || accessor == "set",
            _ => false,
        };
        if !member_position {
            return None;
        }
        let close = self.matching_paren(name + 1)?;
        (self.kind_at(close + 1) == Some(&TokenKind::LeftBrace)).then_some(close)
    }

    /// Emits the identifier or member chain starting at `i`.
    fn expression(&mut self, i: usize) -> usize {
        if self.kind_at(i + 1) == Some(&TokenKind::Arrow) {
            // Single arrow parameter
            if self.kind_at(i + 2) == Some(&TokenKind::LeftBrace) {
                let params = vec![self.identifier(i)];
                self.bodies.insert(
                    i + 2,
                    Body {
                        kind: ScopeKind::Function,
                        params,
                    },
                );
            }
            return i + 1;
        }

        let after_key_boundary = i > 0
            && matches!(
                self.tokens[i - 1].kind,
                TokenKind::LeftBrace | TokenKind::Comma
            );
        if after_key_boundary && self.kind_at(i + 1) == Some(&TokenKind::Colon) {
            // Object literal key
            return i + 1;
        }

        let mut expr = Expression::identifier(self.identifier(i));
        let mut j = i + 1;
        while self.kind_at(j) == Some(&TokenKind::Dot) && self.identifier_name(j + 1).is_some() {
            expr = Expression::member(expr, self.identifier(j + 1));
            j += 2;
        }

        self.events.push(SyntaxEvent::Expression(expr));
        j
    }

    /// Declares the parameters between `open` and `close`.
    ///
    /// With a `body` brace index the parameters are declared in that body's
    /// scope; otherwise they are only kept from being reported as free names.
    fn collect_params(&mut self, open: usize, close: usize, body: Option<(usize, ScopeKind)>) {
        let mut nesting = 0usize;
        let mut params = Vec::new();

        for j in open + 1..close {
            match self.tokens[j].kind {
                TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::LeftBrace => nesting += 1,
                TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace => {
                    nesting = nesting.saturating_sub(1)
                }
                TokenKind::Identifier(_) if nesting == 0 => {
                    let starts_param = matches!(
                        self.tokens[j - 1].kind,
                        TokenKind::LeftParen | TokenKind::Comma | TokenKind::Ellipsis
                    );
                    let ends_param = j + 1 == close
                        || matches!(
                            self.tokens[j + 1].kind,
                            TokenKind::Comma | TokenKind::Equal
                        );
                    if starts_param && ends_param && self.declared.insert(j) {
                        params.push(self.identifier(j));
                    }
                }
                _ => {}
            }
        }

        if let Some((brace, kind)) = body {
            if self.kind_at(brace) == Some(&TokenKind::LeftBrace) {
                self.bodies.insert(brace, Body { kind, params });
            }
        }
    }

    fn declare(&mut self, i: usize, kind: DeclarationKind) {
        if self.declared.insert(i) {
            let id = self.identifier(i);
            self.events.push(SyntaxEvent::Declare(id, kind));
        }
    }

    fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (j, token) in self.tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(j);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn kind_at(&self, i: usize) -> Option<&TokenKind> {
        self.tokens.get(i).map(|token| &token.kind)
    }

    fn is_identifier(&self, i: usize) -> bool {
        matches!(self.kind_at(i), Some(TokenKind::Identifier(_)))
    }

    /// Returns the name of an identifier or keyword usable as a property name.
    fn identifier_name(&self, i: usize) -> Option<&'a str> {
        let token = self.tokens.get(i)?;
        match &token.kind {
            TokenKind::Identifier(_) | TokenKind::True | TokenKind::False | TokenKind::Null => {
                Some(&self.source[token.span.start..token.span.end])
            }
            kind if kind.is_keyword() => Some(&self.source[token.span.start..token.span.end]),
            _ => None,
        }
    }

    fn identifier(&self, i: usize) -> Identifier {
        let span = self.tokens[i].span;
        Identifier {
            name: self.source[span.start..span.end].to_string(),
            span,
            loc: self.index.location(span),
        }
    }
}
