// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Quoting primitives for literals and identifiers.
//!
//! All SQL text produced by this crate goes through [`quote_literal`] or
//! [`quote_identifier`]. Text wrapped in an [`Expr`] is treated as
//! already-valid SQL and passed through untouched.

use std::fmt;

/// A fragment of SQL that must never be escaped or re-quoted, such as a
/// function call used where a literal value is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr(String);

impl Expr {
    /// Wraps `sql` as a raw expression.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// Returns the raw SQL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input accepted by the quoting primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlValue<'a> {
    /// Caller text, always escaped.
    Text(&'a str),
    /// Pre-validated SQL, passed through verbatim.
    Expr(&'a str),
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for SqlValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a Expr> for SqlValue<'a> {
    fn from(value: &'a Expr) -> Self {
        Self::Expr(&value.0)
    }
}

/// Renders `value` as a single-quoted string literal.
///
/// Backslashes, both quote characters and NUL are backslash-escaped, which
/// is how the warehouse parses escapes inside `'...'` literals. The result
/// is a single literal token for any input.
pub fn quote_literal<'a>(value: impl Into<SqlValue<'a>>) -> String {
    match value.into() {
        SqlValue::Expr(sql) => sql.to_string(),
        SqlValue::Text(text) => {
            let mut quoted = String::with_capacity(text.len() + 2);
            quoted.push('\'');
            for c in text.chars() {
                match c {
                    '\'' | '"' | '\\' => {
                        quoted.push('\\');
                        quoted.push(c);
                    }
                    '\0' => quoted.push_str("\\0"),
                    _ => quoted.push(c),
                }
            }
            quoted.push('\'');
            quoted
        }
    }
}

/// Renders `value` as a double-quoted identifier, doubling embedded `"`.
pub fn quote_identifier<'a>(value: impl Into<SqlValue<'a>>) -> String {
    match value.into() {
        SqlValue::Expr(sql) => sql.to_string(),
        SqlValue::Text(text) => format!("\"{}\"", text.replace('"', "\"\"")),
    }
}

/// Builds a dotted object name such as `"schema"."table"`.
///
/// The result is an [`Expr`] so it can be handed to the statement builder
/// without being quoted a second time.
pub fn qualified<I, S>(parts: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = parts
        .into_iter()
        .map(|part| quote_identifier(part.as_ref()))
        .collect();
    Expr(parts.join("."))
}
