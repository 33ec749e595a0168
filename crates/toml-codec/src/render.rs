//! Canonical TOML renderer: semantic values → minimal, re-parseable text.
//!
//! Two forms are produced:
//!
//! - **Inline** ([`render_value`]): a single-line value as it appears on the
//!   right of `=`, also used to quote values inside diagnostics.
//! - **Document** ([`render_document`]): a whole table laid out with
//!   assignments, dotted keys and `[section]` / `[[array]]` headers.
//!
//! # Layout rules
//!
//! A value is *always simple* when it is a scalar, a table with exactly one
//! entry whose value is always simple, or an array that is empty or not made
//! only of tables. Always-simple entries are written as `key = value`, with
//! chains of single-entry tables collapsed into one dotted key
//! (`a.b.c = 1`). Everything else becomes a section, written after all the
//! assignments of the same table:
//!
//! - a table gets a `[path]` header only when it is empty or has at least one
//!   simple entry; a table holding nothing but sub-sections is left implicit;
//! - an array of tables gets one `[[path]]` block per element.
//!
//! Keys are emitted in table insertion order.

use crate::value::{Table, Value};
use unicode_general_category::{get_general_category, GeneralCategory};

/// True when `key` may be written without quotes: non-empty and made only of
/// ASCII letters, digits, `-` and `_`.
pub fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Render one key segment, bare when possible and quoted otherwise.
pub fn render_simple_key(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        quote_string(key)
    }
}

/// Render a dotted key: each segment bare or quoted on its own, joined by `.`.
pub fn render_key<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(|k| render_simple_key(k.as_ref()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a basic (single-line) TOML string literal.
///
/// `"`, `\`, backspace, form feed, newline, carriage return and tab use their
/// short escapes; other non-printable characters use `\uXXXX` or
/// `\UXXXXXXXX`.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if !is_printable(c) => push_unicode_escape(c, &mut out),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a multi-line basic string literal. Newlines are kept literally;
/// everything else is escaped as in [`quote_string`].
pub fn quote_ml_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 7);
    out.push_str("\"\"\"\n");
    for ch in s.chars() {
        match ch {
            '\n' => out.push('\n'),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if !is_printable(c) => push_unicode_escape(c, &mut out),
            c => out.push(c),
        }
    }
    out.push_str("\"\"\"");
    out
}

fn push_unicode_escape(c: char, out: &mut String) {
    let code = u32::from(c);
    if code <= 0xFFFF {
        out.push_str(&format!("\\u{:04X}", code));
    } else {
        out.push_str(&format!("\\U{:08X}", code));
    }
}

/// Characters that may appear raw in a quoted string. Controls, format
/// characters, line and paragraph separators, surrogates, private-use and
/// unassigned code points are escaped.
fn is_printable(c: char) -> bool {
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}

/// Render a float so that it reads back as a float: `nan`, `inf`, `-inf`, or
/// the shortest decimal that round-trips, always with a `.` or exponent.
pub fn render_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x == f64::INFINITY {
        "inf".to_string()
    } else if x == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        // Debug keeps the fractional part on whole numbers: 1.0, not 1.
        format!("{:?}", x)
    }
}

/// Render a value in inline form.
pub fn render_value(value: &Value) -> String {
    let mut out = String::new();
    push_value(value, &mut out);
    out
}

fn push_value(value: &Value, out: &mut String) {
    match value {
        Value::Integer(n) => out.push_str(&n.to_string()),
        Value::Float(x) => out.push_str(&render_float(*x)),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::String(s) => out.push_str(&quote_string(s)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_value(item, out);
            }
            out.push(']');
        }
        Value::Table(table) => {
            out.push('{');
            for (i, (key, item)) in table.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_assignment(key, item, out);
            }
            out.push('}');
        }
        Value::TimeOfDay(t) => out.push_str(&t.format("%H:%M:%S%.f").to_string()),
        Value::Day(d) => out.push_str(&d.format("%Y-%m-%d").to_string()),
        Value::LocalTime(t) => out.push_str(&t.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        Value::ZonedTime(t) => out.push_str(&t.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string()),
    }
}

/// Render `key = value`, folding single-entry tables into a dotted key.
pub fn render_assignment(key: &str, value: &Value) -> String {
    let mut out = String::new();
    push_assignment(key, value, &mut out);
    out
}

fn push_assignment(key: &str, value: &Value, out: &mut String) {
    let mut path = vec![key];
    let mut value = value;
    while let Value::Table(table) = value {
        match table.first() {
            Some((k, v)) if table.len() == 1 => {
                path.push(k);
                value = v;
            }
            _ => break,
        }
    }
    out.push_str(&render_key(&path));
    out.push_str(" = ");
    push_value(value, out);
}

/// True when `value` can be written as a single `key = value` line at any
/// nesting level without changing the document's meaning.
pub fn is_always_simple(value: &Value) -> bool {
    match value {
        Value::Table(table) => table.len() == 1 && table.values().all(is_always_simple),
        Value::Array(items) => items.is_empty() || !items.iter().all(Value::is_table),
        _ => true,
    }
}

/// Render a table as a complete TOML document.
///
/// Every line, including the last, ends with `\n`; each section header other
/// than the first line of output is preceded by a blank line. An empty table
/// renders as the empty string.
pub fn render_document(table: &Table) -> String {
    tracing::trace!(entries = table.len(), "rendering document");
    let mut out = String::new();
    let mut path = Vec::new();
    push_table_body(&mut path, table, &mut out);
    out
}

fn push_table_body<'a>(path: &mut Vec<&'a str>, table: &'a Table, out: &mut String) {
    let (simple, sections): (Vec<_>, Vec<_>) =
        table.iter().partition(|(_, value)| is_always_simple(value));

    for (key, value) in simple {
        push_assignment(key, value, out);
        out.push('\n');
    }

    for (key, value) in sections {
        path.push(key);
        push_section(path, value, out);
        path.pop();
    }
}

/// Render one non-simple entry of a table.
///
/// # Panics
///
/// Panics if `value` is an array holding a non-table element or is a scalar.
/// The partition in [`push_table_body`] only routes tables and all-table
/// arrays here.
fn push_section<'a>(path: &mut Vec<&'a str>, value: &'a Value, out: &mut String) {
    match value {
        Value::Table(table) => {
            if table.is_empty() || table.values().any(is_always_simple) {
                push_header(path, "[", "]", out);
            }
            push_table_body(path, table, out);
        }
        Value::Array(items) => {
            for item in items {
                let Value::Table(table) = item else {
                    panic!(
                        "array of tables at {} contains a {}",
                        render_key(path.as_slice()),
                        item.type_name()
                    );
                };
                push_header(path, "[[", "]]", out);
                push_table_body(path, table, out);
            }
        }
        other => panic!(
            "{} at {} cannot be rendered as a section",
            other.type_name(),
            render_key(path.as_slice())
        ),
    }
}

fn push_header(path: &[&str], open: &str, close: &str, out: &mut String) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(open);
    out.push_str(&render_key(path));
    out.push_str(close);
    out.push('\n');
}
