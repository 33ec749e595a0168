//! Tagged JSON bridge: the interchange format of the toml-test suite.
//!
//! Tables become JSON objects and arrays become JSON arrays; every scalar
//! becomes `{"type": <tag>, "value": <text>}` so no type information is lost:
//!
//! | TOML type        | tag              | text                         |
//! |------------------|------------------|------------------------------|
//! | integer          | `integer`        | decimal                      |
//! | float            | `float`          | decimal, `nan`, `inf`, `-inf`|
//! | boolean          | `bool`           | `true` / `false`             |
//! | string           | `string`         | the string itself            |
//! | offset date-time | `datetime`       | RFC 3339                     |
//! | local date-time  | `datetime-local` | `YYYY-MM-DDTHH:MM:SS[.f]`    |
//! | local date       | `date-local`     | `YYYY-MM-DD`                 |
//! | local time       | `time-local`     | `HH:MM:SS[.f]`               |
//!
//! # Example
//! ```
//! use toml_codec::{json::{from_tagged_json_str, to_tagged_json}, Value};
//!
//! let value = Value::table([("answer", Value::from(42))]);
//! let json = to_tagged_json(&value);
//! assert_eq!(json.to_string(), r#"{"answer":{"type":"integer","value":"42"}}"#);
//! assert_eq!(from_tagged_json_str(&json.to_string()).unwrap(), value);
//! ```

use crate::error::{CodecError, Result};
use crate::render::render_float;
use crate::value::{Table, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use serde_json::{json, Map, Value as JsonValue};

const LOCAL_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";
const LOCAL_DATE: &str = "%Y-%m-%d";
const LOCAL_TIME: &str = "%H:%M:%S%.f";

/// Convert a semantic value into tagged JSON.
pub fn to_tagged_json(value: &Value) -> JsonValue {
    match value {
        Value::Table(table) => JsonValue::Object(
            table
                .iter()
                .map(|(key, item)| (key.clone(), to_tagged_json(item)))
                .collect(),
        ),
        Value::Array(items) => JsonValue::Array(items.iter().map(to_tagged_json).collect()),
        Value::Integer(n) => tagged("integer", n.to_string()),
        Value::Float(x) => tagged("float", render_float(*x)),
        Value::Bool(b) => tagged("bool", b.to_string()),
        Value::String(s) => tagged("string", s.clone()),
        Value::ZonedTime(t) => tagged("datetime", t.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string()),
        Value::LocalTime(t) => tagged("datetime-local", t.format(LOCAL_DATE_TIME).to_string()),
        Value::Day(d) => tagged("date-local", d.format(LOCAL_DATE).to_string()),
        Value::TimeOfDay(t) => tagged("time-local", t.format(LOCAL_TIME).to_string()),
    }
}

fn tagged(kind: &str, text: String) -> JsonValue {
    json!({ "type": kind, "value": text })
}

/// Parse a JSON string and convert it from tagged JSON.
pub fn from_tagged_json_str(json: &str) -> Result<Value> {
    let parsed: JsonValue = serde_json::from_str(json)?;
    from_tagged_json(&parsed)
}

/// Convert tagged JSON back into a semantic value.
///
/// An object with exactly the string members `type` and `value` is a tagged
/// scalar; any other object is a table.
pub fn from_tagged_json(json: &JsonValue) -> Result<Value> {
    convert(json, "")
}

fn convert(json: &JsonValue, path: &str) -> Result<Value> {
    match json {
        JsonValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| convert(item, &format!("{}/{}", path, i)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        JsonValue::Object(map) => match tagged_scalar(map) {
            Some((kind, text)) => parse_scalar(kind, text, path),
            None => map
                .iter()
                .map(|(key, item)| Ok((key.clone(), convert(item, &format!("{}/{}", path, key))?)))
                .collect::<Result<Table>>()
                .map(Value::Table),
        },
        other => Err(tagged_error(
            path,
            format!("expected object or array, got {}", other),
        )),
    }
}

fn tagged_scalar(map: &Map<String, JsonValue>) -> Option<(&str, &str)> {
    if map.len() != 2 {
        return None;
    }
    let kind = map.get("type")?.as_str()?;
    let text = map.get("value")?.as_str()?;
    Some((kind, text))
}

fn parse_scalar(kind: &str, text: &str, path: &str) -> Result<Value> {
    let invalid = || tagged_error(path, format!("invalid {} value: {:?}", kind, text));
    match kind {
        "integer" => text.parse::<BigInt>().map(Value::Integer).map_err(|_| invalid()),
        "float" => parse_float(text).map(Value::Float).ok_or_else(invalid),
        "bool" => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        "string" => Ok(Value::String(text.to_string())),
        "datetime" => DateTime::parse_from_rfc3339(text)
            .map(Value::ZonedTime)
            .map_err(|_| invalid()),
        "datetime-local" => NaiveDateTime::parse_from_str(text, LOCAL_DATE_TIME)
            .map(Value::LocalTime)
            .map_err(|_| invalid()),
        "date-local" => NaiveDate::parse_from_str(text, LOCAL_DATE)
            .map(Value::Day)
            .map_err(|_| invalid()),
        "time-local" => NaiveTime::parse_from_str(text, LOCAL_TIME)
            .map(Value::TimeOfDay)
            .map_err(|_| invalid()),
        _ => Err(tagged_error(path, format!("unknown type tag: {:?}", kind))),
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "nan" | "+nan" | "-nan" => Some(f64::NAN),
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        _ => text.parse().ok(),
    }
}

fn tagged_error(path: &str, message: String) -> CodecError {
    CodecError::TaggedJson {
        path: if path.is_empty() { "/".to_string() } else { path.to_string() },
        message,
    }
}
