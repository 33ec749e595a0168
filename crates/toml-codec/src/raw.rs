//! Raw parse vocabulary, rendered for diagnostics.
//!
//! These types describe what a TOML front end sees *before* table
//! resolution: dotted keys as segment lists, inline tables as ordered
//! (possibly duplicated) key/value pairs, and header lines tagged with their
//! source line. The codec never builds or validates them; it only turns them
//! back into text so parse and resolution errors can quote the input.

use crate::render::{quote_ml_string, quote_string, render_float, render_key, render_value};
use crate::value::Value;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use std::fmt;

/// A dotted key as written: one or more segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawKey(Vec<String>);

impl RawKey {
    /// A single-segment key.
    pub fn new(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// A key from its segments; `None` when `segments` is empty.
    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Option<Self> {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self(segments))
        }
    }

    /// Append a segment: `a.b` + `c` → `a.b.c`.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_key(&self.0))
    }
}

/// An unresolved value. Inline tables keep their entries in source order,
/// duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub enum RawVal {
    Integer(BigInt),
    Float(f64),
    Bool(bool),
    String(String),
    Array(Vec<RawVal>),
    Table(Vec<(RawKey, RawVal)>),
    TimeOfDay(NaiveTime),
    Day(NaiveDate),
    LocalTime(NaiveDateTime),
    ZonedTime(DateTime<FixedOffset>),
}

/// One top-level statement of a TOML document, tagged with its 1-based
/// source line.
#[derive(Debug, Clone, PartialEq)]
pub enum RawExpr {
    /// `key = value`
    KeyValue {
        line: usize,
        key: RawKey,
        value: RawVal,
    },
    /// `[key]`
    TableHeader { line: usize, key: RawKey },
    /// `[[key]]`
    ArrayTableHeader { line: usize, key: RawKey },
}

impl RawExpr {
    pub fn line(&self) -> usize {
        match self {
            RawExpr::KeyValue { line, .. }
            | RawExpr::TableHeader { line, .. }
            | RawExpr::ArrayTableHeader { line, .. } => *line,
        }
    }
}

/// Lexical tokens of TOML source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Comma,
    Equals,
    Period,
    SquareOpen,
    SquareClose,
    DoubleSquareOpen,
    DoubleSquareClose,
    CurlyOpen,
    CurlyClose,
    Newline,
    BareKey(String),
    String(String),
    MlString(String),
    Integer(BigInt),
    Float(f64),
    True,
    False,
    OffsetDateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
    /// A lexical error with its description.
    Error(String),
    Eof,
}

/// Render a raw value inline, inline tables as `{a.b = 1, a.c = 2}`.
pub fn render_raw_val(value: &RawVal) -> String {
    let mut out = String::new();
    push_raw_val(value, &mut out);
    out
}

fn push_raw_val(value: &RawVal, out: &mut String) {
    match value {
        RawVal::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_raw_val(item, out);
            }
            out.push(']');
        }
        RawVal::Table(entries) => {
            out.push('{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&key.to_string());
                out.push_str(" = ");
                push_raw_val(item, out);
            }
            out.push('}');
        }
        RawVal::Integer(n) => out.push_str(&n.to_string()),
        RawVal::Float(x) => out.push_str(&render_float(*x)),
        RawVal::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        RawVal::String(s) => out.push_str(&quote_string(s)),
        RawVal::TimeOfDay(t) => out.push_str(&render_value(&Value::TimeOfDay(*t))),
        RawVal::Day(d) => out.push_str(&render_value(&Value::Day(*d))),
        RawVal::LocalTime(t) => out.push_str(&render_value(&Value::LocalTime(*t))),
        RawVal::ZonedTime(t) => out.push_str(&render_value(&Value::ZonedTime(*t))),
    }
}

/// Render a statement as it would appear on its source line.
pub fn render_expr(expr: &RawExpr) -> String {
    match expr {
        RawExpr::KeyValue { key, value, .. } => format!("{} = {}", key, render_raw_val(value)),
        RawExpr::TableHeader { key, .. } => format!("[{}]", key),
        RawExpr::ArrayTableHeader { key, .. } => format!("[[{}]]", key),
    }
}

/// Describe a token for an "unexpected ..." parse error.
pub fn render_token(token: &Token) -> String {
    match token {
        Token::Comma => "','".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Period => "'.'".to_string(),
        Token::SquareOpen => "'['".to_string(),
        Token::SquareClose => "']'".to_string(),
        Token::DoubleSquareOpen => "'[['".to_string(),
        Token::DoubleSquareClose => "']]'".to_string(),
        Token::CurlyOpen => "'{'".to_string(),
        Token::CurlyClose => "'}'".to_string(),
        Token::Newline => "end-of-line".to_string(),
        Token::BareKey(key) => format!("bare key: {}", key),
        Token::String(s) => format!("string: {}", quote_string(s)),
        Token::MlString(s) => format!("multi-line string: {}", quote_ml_string(s)),
        Token::Integer(n) => format!("integer: {}", n),
        Token::Float(x) => format!("float: {}", render_float(*x)),
        Token::True => "true literal".to_string(),
        Token::False => "false literal".to_string(),
        Token::OffsetDateTime(_) => "offset date-time".to_string(),
        Token::LocalDateTime(_) => "local date-time".to_string(),
        Token::LocalDate(_) => "local date".to_string(),
        Token::LocalTime(_) => "local time".to_string(),
        Token::Error(message) => format!("lexical error: {}", message),
        Token::Eof => "end-of-input".to_string(),
    }
}

impl fmt::Display for RawVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_raw_val(self))
    }
}

impl fmt::Display for RawExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_expr(self))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_token(self))
    }
}
