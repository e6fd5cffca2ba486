// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The scanner that produces tokens from source text.

use super::{Span, Token, TokenKind};

/// A scanner that tokenizes JavaScript source code.
///
/// The scanner tracks just enough context to tell regular expressions from
/// divisions and to resume template literals after a `${...}` substitution.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// Kind of the last significant token
    last_kind: Option<TokenKind>,
    /// Whether a `/` at the current position starts a regular expression
    regexp_allowed: bool,
    /// One entry per open `(`: true when it opens an `if`/`while`/`for`/`with` head
    paren_heads: Vec<bool>,
    /// Open brace counts, one entry per pending template substitution
    template_braces: Vec<usize>,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            last_kind: None,
            regexp_allowed: true,
            paren_heads: Vec::new(),
            template_braces: Vec::new(),
        };
        scanner.skip_hashbang();
        scanner
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        self.regexp_allowed = match &token.kind {
            TokenKind::LeftParen => {
                self.paren_heads.push(matches!(
                    self.last_kind,
                    Some(TokenKind::If | TokenKind::While | TokenKind::For | TokenKind::With)
                ));
                true
            }
            // The statement after a control head may start with a regexp
            TokenKind::RightParen => self.paren_heads.pop().unwrap_or(false),
            // Postfix `++`/`--` end an operand, prefix ones start one
            TokenKind::Operator if self.is_update_operator(token.span) => self.regexp_allowed,
            kind => kind.allows_regexp_after(),
        };
        self.last_kind = Some(token.kind.clone());
        token
    }

    fn is_update_operator(&self, span: Span) -> bool {
        matches!(&self.source[span.start..span.end], "++" | "--")
    }

    fn scan(&mut self) -> Token {
        if !self.skip_whitespace_and_comments() {
            return Token::new(TokenKind::Invalid, Span::new(self.current_pos, self.source.len()));
        }

        let start = self.current_pos;

        let Some((_pos, ch)) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::new(start, start));
        };

        let kind = match ch {
            '{' => {
                if let Some(depth) = self.template_braces.last_mut() {
                    *depth += 1;
                }
                TokenKind::LeftBrace
            }
            '}' => match self.template_braces.last_mut() {
                Some(0) => {
                    self.template_braces.pop();
                    self.scan_template()
                }
                Some(depth) => {
                    *depth -= 1;
                    TokenKind::RightBrace
                }
                None => TokenKind::RightBrace,
            },
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,

            '.' => self.scan_dot(),
            '=' => self.scan_equal(),
            '?' => self.scan_question(),
            '/' if self.regexp_allowed => self.scan_regexp(),
            '+' | '-' | '*' | '/' | '%' | '<' | '>' | '!' | '&' | '|' | '^' | '~' => {
                self.scan_operator()
            }

            // String literals
            '"' | '\'' => self.scan_string(ch),

            // Template literals
            '`' => self.scan_template(),

            '0'..='9' => self.scan_number(ch),

            // Identifiers and keywords
            _ if is_id_start(ch) => self.scan_identifier(ch),

            // Private identifiers
            '#' => self.scan_private_identifier(),

            _ => TokenKind::Invalid,
        };

        Token::new(kind, Span::new(start, self.current_pos))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn skip_hashbang(&mut self) {
        if self.source.starts_with("#!") {
            while let Some(ch) = self.peek() {
                if ch == '\n' || ch == '\r' {
                    break;
                }
                self.advance();
            }
        }
    }

    /// Skips whitespace and comments. Returns false on an unterminated block comment.
    fn skip_whitespace_and_comments(&mut self) -> bool {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        while let Some(ch) = self.peek() {
                            if ch == '\n' || ch == '\r' {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        let mut prev = ' ';
                        loop {
                            match self.advance() {
                                None => return false,
                                Some((_, '/')) if prev == '*' => break,
                                Some((_, ch)) => prev = ch,
                            }
                        }
                    }
                    _ => return true,
                },
                _ => return true,
            }
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        match self.peek() {
            Some('.') if self.peek_next() == Some('.') => {
                self.advance();
                self.advance();
                TokenKind::Ellipsis
            }
            Some(ch) if ch.is_ascii_digit() => self.scan_number('.'),
            _ => TokenKind::Dot,
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        match self.peek() {
            Some('>') => {
                self.advance();
                TokenKind::Arrow
            }
            Some('=') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                }
                TokenKind::Operator
            }
            _ => TokenKind::Equal,
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        match self.peek() {
            Some('?') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                }
                TokenKind::Operator
            }
            // `a?.5:b` is a conditional, not optional chaining
            Some('.') if !self.peek_next().is_some_and(|ch| ch.is_ascii_digit()) => {
                self.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        }
    }

    /// Consumes the rest of a punctuator operator; the walker only needs its span.
    fn scan_operator(&mut self) -> TokenKind {
        while let Some(ch) = self.peek() {
            match ch {
                '+' | '-' | '*' | '%' | '<' | '>' | '&' | '|' | '^' | '=' => {
                    self.advance();
                }
                _ => break,
            }
        }
        TokenKind::Operator
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                None | Some((_, '\n')) => return TokenKind::Invalid,
                Some((_, ch)) if ch == quote => break,
                Some((_, '\\')) => {
                    if let Some((_, escaped)) = self.advance() {
                        match escaped {
                            'n' => value.push('\n'),
                            'r' => value.push('\r'),
                            't' => value.push('\t'),
                            '0' => value.push('\0'),
                            // Line continuation
                            '\n' => {}
                            _ => value.push(escaped),
                        }
                    }
                }
                Some((_, ch)) => value.push(ch),
            }
        }

        TokenKind::String(value)
    }

    /// Scans a template chunk up to the closing backtick or the next `${`.
    fn scan_template(&mut self) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return TokenKind::Invalid,
                Some((_, '`')) => break,
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    self.template_braces.push(0);
                    break;
                }
                Some((_, '\\')) => {
                    if let Some((_, escaped)) = self.advance() {
                        match escaped {
                            'n' => value.push('\n'),
                            'r' => value.push('\r'),
                            't' => value.push('\t'),
                            _ => value.push(escaped),
                        }
                    }
                }
                Some((_, ch)) => value.push(ch),
            }
        }

        TokenKind::Template(value)
    }

    fn scan_regexp(&mut self) -> TokenKind {
        let mut pattern = String::new();
        let mut in_class = false;

        loop {
            match self.advance() {
                None | Some((_, '\n')) => return TokenKind::Invalid,
                Some((_, '/')) if !in_class => break,
                Some((_, '\\')) => {
                    pattern.push('\\');
                    match self.advance() {
                        Some((_, '\n')) | None => return TokenKind::Invalid,
                        Some((_, escaped)) => pattern.push(escaped),
                    }
                }
                Some((_, ch)) => {
                    match ch {
                        '[' => in_class = true,
                        ']' => in_class = false,
                        _ => {}
                    }
                    pattern.push(ch);
                }
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::RegExp { pattern, flags }
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut value = String::from(first);
        let mut prev = first;

        // Covers decimal, hex/octal/binary, separators, exponents and BigInt suffixes
        while let Some(ch) = self.peek() {
            let exponent_sign = (ch == '+' || ch == '-') && (prev == 'e' || prev == 'E')
                && !value.starts_with("0x")
                && !value.starts_with("0X");
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                value.push(ch);
                prev = ch;
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Number(value)
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::keyword(&name).unwrap_or(TokenKind::Identifier(name))
    }

    fn scan_private_identifier(&mut self) -> TokenKind {
        let mut name = String::new();

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if name.is_empty() {
            TokenKind::Invalid
        } else {
            TokenKind::PrivateIdentifier(name)
        }
    }
}

/// Checks if a character can start an identifier.
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|token| token.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut scanner = Scanner::new("{ } ( )");
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftParen));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightParen));
    }

    #[test]
    fn test_member_chain_tokens() {
        assert_eq!(
            kinds("require.main"),
            vec![
                TokenKind::Identifier("require".to_string()),
                TokenKind::Dot,
                TokenKind::Identifier("main".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14 0xff 1e-3 .5"),
            vec![
                TokenKind::Number("42".to_string()),
                TokenKind::Number("3.14".to_string()),
                TokenKind::Number("0xff".to_string()),
                TokenKind::Number("1e-3".to_string()),
                TokenKind::Number(".5".to_string()),
            ]
        );
    }

    #[test]
    fn test_strings() {
        let mut scanner = Scanner::new(r#""hello" 'wor\'ld'"#);
        assert!(matches!(scanner.next_token().kind, TokenKind::String(s) if s == "hello"));
        assert!(matches!(scanner.next_token().kind, TokenKind::String(s) if s == "wor'ld"));
    }

    #[test]
    fn test_unterminated_string_is_invalid() {
        let mut scanner = Scanner::new("'abc");
        assert_eq!(scanner.next_token().kind, TokenKind::Invalid);
    }

    #[test]
    fn test_keywords() {
        let mut scanner = Scanner::new("function const let var");
        assert!(matches!(scanner.next_token().kind, TokenKind::Function));
        assert!(matches!(scanner.next_token().kind, TokenKind::Const));
        assert!(matches!(scanner.next_token().kind, TokenKind::Let));
        assert!(matches!(scanner.next_token().kind, TokenKind::Var));
    }

    #[test]
    fn test_identifiers() {
        let mut scanner = Scanner::new("foo _bar $baz");
        assert!(matches!(scanner.next_token().kind, TokenKind::Identifier(s) if s == "foo"));
        assert!(matches!(scanner.next_token().kind, TokenKind::Identifier(s) if s == "_bar"));
        assert!(matches!(scanner.next_token().kind, TokenKind::Identifier(s) if s == "$baz"));
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("a // __dirname\n/* __filename */ b"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Identifier("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_is_invalid() {
        let mut scanner = Scanner::new("a /* open");
        scanner.next_token();
        assert_eq!(scanner.next_token().kind, TokenKind::Invalid);
    }

    #[test]
    fn test_division_vs_regexp() {
        assert_eq!(
            kinds("6 / 2"),
            vec![
                TokenKind::Number("6".to_string()),
                TokenKind::Operator,
                TokenKind::Number("2".to_string()),
            ]
        );
        assert_eq!(
            kinds("x = /a'[/]b/g"),
            vec![
                TokenKind::Identifier("x".to_string()),
                TokenKind::Equal,
                TokenKind::RegExp {
                    pattern: "a'[/]b".to_string(),
                    flags: "g".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_division_after_postfix_update() {
        assert_eq!(
            kinds("i++ / 2 / j--/3"),
            vec![
                TokenKind::Identifier("i".to_string()),
                TokenKind::Operator,
                TokenKind::Operator,
                TokenKind::Number("2".to_string()),
                TokenKind::Operator,
                TokenKind::Identifier("j".to_string()),
                TokenKind::Operator,
                TokenKind::Operator,
                TokenKind::Number("3".to_string()),
            ]
        );
    }

    #[test]
    fn test_division_after_prefix_update() {
        assert_eq!(kinds("x = ++i / 2")[4], TokenKind::Operator);
    }

    #[test]
    fn test_regexp_after_control_head() {
        assert_eq!(
            kinds("if (x) /}/.test(y)")[4],
            TokenKind::RegExp {
                pattern: "}".to_string(),
                flags: String::new(),
            }
        );
        assert_eq!(
            kinds("while (f(a)) /b/g.exec(c)")[7],
            TokenKind::RegExp {
                pattern: "b".to_string(),
                flags: "g".to_string(),
            }
        );
        assert_eq!(kinds("(a) / 2")[3], TokenKind::Operator);
        assert_eq!(kinds("f(if_) / 2")[4], TokenKind::Operator);
    }

    #[test]
    fn test_template_substitution_resumes_template() {
        assert_eq!(
            kinds("`a${ {b} }c`"),
            vec![
                TokenKind::Template("a".to_string()),
                TokenKind::LeftBrace,
                TokenKind::Identifier("b".to_string()),
                TokenKind::RightBrace,
                TokenKind::Template("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_chaining_vs_conditional() {
        assert_eq!(kinds("a?.b")[1], TokenKind::QuestionDot);
        assert_eq!(kinds("a?.5:b")[1], TokenKind::Question);
    }

    #[test]
    fn test_hashbang_is_skipped() {
        assert_eq!(
            kinds("#!/usr/bin/env node\nx"),
            vec![TokenKind::Identifier("x".to_string())]
        );
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<Token> = Scanner::new("  foo.bar").collect();
        assert_eq!(tokens[0].span, Span::new(2, 5));
        assert_eq!(tokens[1].span, Span::new(5, 6));
        assert_eq!(tokens[2].span, Span::new(6, 9));
    }
}
