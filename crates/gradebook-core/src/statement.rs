//! Statements: one unit of SQL work
//!
//! SQL text uses `%s` positional placeholders; the parameter list binds them
//! in order. A statement is immutable once built and is moved into the
//! connection manager's queue, which consumes it exactly once.

use crate::value::Value;
use std::fmt;

/// Positional placeholder used in statement text
pub const PLACEHOLDER: &str = "%s";

/// Whether executing a statement produces a row set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    WithOutput,
    WithoutOutput,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::WithOutput => f.write_str("with_output"),
            Output::WithoutOutput => f.write_str("without_output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    parameters: Vec<Value>,
    output: Output,
}

impl Statement {
    pub fn new(sql: impl Into<String>, parameters: Vec<Value>, output: Output) -> Self {
        Self {
            sql: sql.into(),
            parameters,
            output,
        }
    }

    /// A statement whose rows are wanted (SELECT)
    pub fn with_output(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self::new(sql, parameters, Output::WithOutput)
    }

    /// A statement executed for its effect (INSERT/UPDATE/DELETE/DDL)
    pub fn without_output(sql: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self::new(sql, parameters, Output::WithoutOutput)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    pub fn output(&self) -> Output {
        self.output
    }

    pub fn expects_rows(&self) -> bool {
        self.output == Output::WithOutput
    }

    /// Number of `%s` placeholders outside quoted identifiers and literals
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        render_placeholders(&self.sql, |_| {
            count += 1;
            String::new()
        });
        count
    }
}

/// Rewrite every `%s` placeholder through `render(index)`
///
/// Text inside double-quoted identifiers and single-quoted literals is
/// copied verbatim, so a `%s` that is part of a quoted name is not a
/// placeholder.
pub fn render_placeholders(sql: &str, mut render: impl FnMut(usize) -> String) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;
    let mut index = 0;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                // A doubled quote is an escaped quote and does not close.
                out.push(c);
                if c == q {
                    if chars.peek() == Some(&q) {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else {
                        quote = None;
                    }
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                    out.push(c);
                } else if c == '%' && chars.peek() == Some(&'s') {
                    chars.next();
                    out.push_str(&render(index));
                    index += 1;
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}
