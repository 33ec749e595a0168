//! Semantic TOML values: the fully resolved value tree every other module
//! reads or writes.
//!
//! A [`Value`] never carries source positions and never contains duplicate
//! table keys; producing it from text (lexing, parsing, table merging) is the
//! job of a front end outside this crate.
//!
//! [`Table`] is an insertion-ordered map so the canonical renderer can emit
//! keys in the order they were built. Equality between tables ignores that
//! order: lookups are by key only.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use num_bigint::BigInt;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A TOML table: unique string keys in insertion order.
pub type Table = IndexMap<String, Value>;

/// A resolved TOML value.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(BigInt),
    Float(f64),
    Bool(bool),
    String(String),
    Array(Vec<Value>),
    Table(Table),
    /// Local time of day, e.g. `07:32:00`.
    TimeOfDay(NaiveTime),
    /// Local calendar date, e.g. `1979-05-27`.
    Day(NaiveDate),
    /// Local date and time without an offset.
    LocalTime(NaiveDateTime),
    /// Date and time with a fixed UTC offset.
    ZonedTime(DateTime<FixedOffset>),
}

impl Value {
    /// Build a table value from key/value pairs, keeping their order.
    /// A repeated key keeps its first position and its last value.
    pub fn table<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Table(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build an array value from anything convertible into values.
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Name of this value's TOML type, as used in type-error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
            Value::TimeOfDay(_) => "local time",
            Value::Day(_) => "local date",
            Value::LocalTime(_) => "local date-time",
            Value::ZonedTime(_) => "offset date-time",
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }
}

/// Equality key for offset date-times: the local clock reading and the
/// offset in whole minutes. Two instants that are the same moment in
/// different zones are *not* equal.
fn zoned_key(t: &DateTime<FixedOffset>) -> (NaiveDateTime, i32) {
    (t.naive_local(), t.offset().local_minus_utc() / 60)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::TimeOfDay(a), Value::TimeOfDay(b)) => a == b,
            (Value::Day(a), Value::Day(b)) => a == b,
            (Value::LocalTime(a), Value::LocalTime(b)) => a == b,
            (Value::ZonedTime(a), Value::ZonedTime(b)) => zoned_key(a) == zoned_key(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::render_value(self))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Integer(BigInt::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::TimeOfDay(t)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Day(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::LocalTime(t)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::ZonedTime(t)
    }
}

/// Serializes the natural, untagged shape: tables as maps, arrays as
/// sequences, temporal values as their TOML text. Integers outside the
/// `i64` range are emitted as decimal strings.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(n) => match i64::try_from(n) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.collect_str(n),
            },
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Table(table) => {
                let mut map = serializer.serialize_map(Some(table.len()))?;
                for (key, value) in table {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::TimeOfDay(_) | Value::Day(_) | Value::LocalTime(_) | Value::ZonedTime(_) => {
                serializer.collect_str(self)
            }
        }
    }
}
