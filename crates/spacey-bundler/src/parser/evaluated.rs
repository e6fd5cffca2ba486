// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Statically known values of expressions

use spacey_syntax::Span;

/// What is known about an expression at build time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluatedValue {
    /// A string
    String(String),
    /// A boolean
    Boolean(bool),
    /// Nothing is known
    Unknown,
}

/// The static value of the expression covering `range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedExpression {
    /// The value
    pub value: EvaluatedValue,
    /// The range of the evaluated expression
    pub range: Span,
}

impl EvaluatedExpression {
    /// A known string
    pub fn string(value: impl Into<String>, range: Span) -> Self {
        Self {
            value: EvaluatedValue::String(value.into()),
            range,
        }
    }

    /// A known boolean
    pub fn boolean(value: bool, range: Span) -> Self {
        Self {
            value: EvaluatedValue::Boolean(value),
            range,
        }
    }

    /// Nothing known
    pub fn unknown(range: Span) -> Self {
        Self {
            value: EvaluatedValue::Unknown,
            range,
        }
    }

    /// Is the value known?
    pub fn is_known(&self) -> bool {
        !matches!(self.value, EvaluatedValue::Unknown)
    }

    /// The string value, if the expression is a known string
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            EvaluatedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean value, if the expression is a known boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            EvaluatedValue::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let s = EvaluatedExpression::string("/project/src", Span::new(0, 9));
        assert_eq!(s.as_str(), Some("/project/src"));
        assert_eq!(s.as_bool(), None);
        assert!(s.is_known());

        let b = EvaluatedExpression::boolean(false, Span::new(0, 10));
        assert_eq!(b.as_bool(), Some(false));
        assert_eq!(b.as_str(), None);

        assert!(!EvaluatedExpression::unknown(Span::new(0, 1)).is_known());
    }
}
