// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compile-time values embedded as JavaScript source literals

use std::fmt;

/// A value that can be written into generated code as a literal.
///
/// Only strings, booleans and numbers have a literal form; anything else
/// has no `From` conversion and is rejected at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// String literal, encoded with JSON escaping
    String(String),
    /// `true` / `false`
    Boolean(bool),
    /// Numeric literal
    Number(f64),
}

impl LiteralValue {
    /// Encode the value as JavaScript source text.
    pub fn to_source(&self) -> String {
        match self {
            LiteralValue::String(s) => serde_json::Value::String(s.clone()).to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Number(n) if n.is_nan() => "NaN".to_string(),
            LiteralValue::Number(n) if n.is_infinite() => {
                if n.is_sign_positive() { "Infinity" } else { "-Infinity" }.to_string()
            }
            LiteralValue::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::String(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Boolean(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Number(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        LiteralValue::Number(value.into())
    }
}

impl From<u32> for LiteralValue {
    fn from(value: u32) -> Self {
        LiteralValue::Number(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literals_are_json_escaped() {
        assert_eq!(LiteralValue::from("src/a.js").to_source(), r#""src/a.js""#);
        assert_eq!(
            LiteralValue::from("say \"hi\"\n").to_source(),
            r#""say \"hi\"\n""#
        );
        assert_eq!(LiteralValue::from(r"C:\x").to_source(), r#""C:\\x""#);
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(LiteralValue::from(true).to_source(), "true");
        assert_eq!(LiteralValue::from(false).to_source(), "false");
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(LiteralValue::from(42).to_source(), "42");
        assert_eq!(LiteralValue::from(3.0).to_source(), "3");
        assert_eq!(LiteralValue::from(0.5).to_source(), "0.5");
        assert_eq!(LiteralValue::from(-7).to_source(), "-7");
        assert_eq!(LiteralValue::from(f64::NAN).to_source(), "NaN");
        assert_eq!(LiteralValue::from(f64::NEG_INFINITY).to_source(), "-Infinity");
    }
}
