// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Syntax nodes produced by the expression walker.
//!
//! Only the node shapes the bundler hooks into are modelled: free identifiers
//! and static member chains built from them. Shapes follow ESTree, and every
//! node carries both a byte [`Span`] and a line/column [`SourceLocation`].

use crate::lexer::Span;
use std::fmt;

/// A line/column position. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Line number (1-based)
    pub line: u32,
    /// Column in characters (0-based)
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// The start and end position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Position of the first character
    pub start: Position,
    /// Position just past the last character
    pub end: Position,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Indexes the line starts of `source`.
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(pos, _)| pos + 1),
        );
        Self {
            source,
            line_starts,
        }
    }

    /// Returns the position of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset.min(self.source.len())]
            .chars()
            .count();
        Position::new(line as u32 + 1, column as u32)
    }

    /// Returns the location of a span.
    pub fn location(&self, span: Span) -> SourceLocation {
        SourceLocation {
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }
}

/// An identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
    /// The span of the name
    pub span: Span,
    /// The location of the name
    pub loc: SourceLocation,
}

/// A static member access `object.property`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    /// The object being accessed
    pub object: Box<Expression>,
    /// The property name
    pub property: Identifier,
}

/// The shape of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// Identifier reference
    Identifier(Identifier),
    /// Member access expression
    Member(MemberExpression),
}

/// An expression node with its source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The node shape
    pub kind: ExpressionKind,
    /// The byte range of the whole expression
    pub span: Span,
    /// The line/column range of the whole expression
    pub loc: SourceLocation,
}

impl Expression {
    /// Wraps an identifier reference.
    pub fn identifier(id: Identifier) -> Self {
        Self {
            span: id.span,
            loc: id.loc,
            kind: ExpressionKind::Identifier(id),
        }
    }

    /// Builds `object.property`.
    pub fn member(object: Expression, property: Identifier) -> Self {
        let span = object.span.to(property.span);
        let loc = SourceLocation {
            start: object.loc.start,
            end: property.loc.end,
        };
        Self {
            kind: ExpressionKind::Member(MemberExpression {
                object: Box::new(object),
                property,
            }),
            span,
            loc,
        }
    }

    /// Returns the dotted name of the chain, e.g. `require.main`.
    pub fn dotted_path(&self) -> String {
        match &self.kind {
            ExpressionKind::Identifier(id) => id.name.clone(),
            ExpressionKind::Member(member) => {
                format!("{}.{}", member.object.dotted_path(), member.property.name)
            }
        }
    }

    /// Returns the name of the free identifier at the root of the chain.
    pub fn root_name(&self) -> &str {
        match &self.kind {
            ExpressionKind::Identifier(id) => &id.name,
            ExpressionKind::Member(member) => member.object.root_name(),
        }
    }

    /// Returns the object of a member expression.
    pub fn object(&self) -> Option<&Expression> {
        match &self.kind {
            ExpressionKind::Identifier(_) => None,
            ExpressionKind::Member(member) => Some(&member.object),
        }
    }

    /// Returns the chain itself followed by each shorter prefix, longest first.
    ///
    /// For `a.b.c` this yields `a.b.c`, `a.b`, `a`.
    pub fn prefixes(&self) -> impl Iterator<Item = &Expression> {
        std::iter::successors(Some(self), |expr| expr.object())
    }
}

/// What a `{` opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Plain block, class body, object literal or catch body
    Block,
    /// Body of a function, method or arrow function
    Function,
}

/// How a name is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `let`, `const`, `class` and parameters, bound in the current block
    Lexical,
    /// `var` and function declarations, hoisted to the enclosing function
    Var,
}

/// An event emitted by the walker, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxEvent {
    /// A `{` opened a block
    EnterScope(Span, ScopeKind),
    /// A `}` closed the innermost block
    ExitScope(Span),
    /// A binding declared by the module
    Declare(Identifier, DeclarationKind),
    /// A free identifier or member chain in expression position
    Expression(Expression),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(index: &LineIndex<'_>, name: &str, start: usize) -> Identifier {
        let span = Span::new(start, start + name.len());
        Identifier {
            name: name.to_string(),
            span,
            loc: index.location(span),
        }
    }

    #[test]
    fn test_line_index_positions() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.position(0), Position::new(1, 0));
        assert_eq!(index.position(1), Position::new(1, 1));
        assert_eq!(index.position(3), Position::new(2, 0));
        assert_eq!(index.position(7), Position::new(4, 0));
        assert_eq!(index.position(9), Position::new(4, 2));
    }

    #[test]
    fn test_line_index_counts_characters() {
        let index = LineIndex::new("é.x");
        assert_eq!(index.position(3), Position::new(1, 2));
    }

    #[test]
    fn test_member_chain() {
        let source = "require.main.filename";
        let index = LineIndex::new(source);
        let expr = Expression::member(
            Expression::member(
                Expression::identifier(ident(&index, "require", 0)),
                ident(&index, "main", 8),
            ),
            ident(&index, "filename", 13),
        );

        assert_eq!(expr.dotted_path(), "require.main.filename");
        assert_eq!(expr.root_name(), "require");
        assert_eq!(expr.span, Span::new(0, 21));

        let prefixes: Vec<_> = expr
            .prefixes()
            .map(|prefix| (prefix.dotted_path(), prefix.span))
            .collect();
        assert_eq!(
            prefixes,
            vec![
                ("require.main.filename".to_string(), Span::new(0, 21)),
                ("require.main".to_string(), Span::new(0, 12)),
                ("require".to_string(), Span::new(0, 7)),
            ]
        );
    }

    #[test]
    fn test_location_display() {
        let index = LineIndex::new("x\n  __dirname");
        let loc = index.location(Span::new(4, 13));
        assert_eq!(loc.to_string(), "2:2-11");
    }
}
