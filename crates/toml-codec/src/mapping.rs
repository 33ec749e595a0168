//! Structural mapping between application types and TOML values.
//!
//! A type maps in one of two modes:
//!
//! - **Table mapping**: named fields ↔ table keys, the field name being the
//!   key. Decoding requires a table; each declared field is looked up and
//!   decoded under `in_key(name)`. Encoding yields a table of exactly the
//!   declared fields in declaration order.
//! - **Array mapping**: fields in declaration order ↔ array positions.
//!   Decoding requires an array of exactly the declared length; each element
//!   is decoded under `in_index(i)`. Encoding yields the array of fields.
//!
//! [`table_mapping!`](crate::table_mapping) and
//! [`array_mapping!`](crate::array_mapping) derive both directions from a
//! single field list. Hand-written impls use [`parse_table`] /
//! [`parse_array`]; the macros expand to the same drivers, with table
//! mappings reading a bare [`Table`] in place through
//! [`FromValue::from_table`].
//!
//! ```
//! use toml_codec::{decode, encode, table_mapping, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Fruit {
//!     color: String,
//!     shape: String,
//! }
//!
//! table_mapping! { Fruit { color, shape } }
//!
//! let value = Value::table([("color", Value::from("red")), ("shape", Value::from("round"))]);
//! let fruit = Fruit { color: "red".into(), shape: "round".into() };
//! assert_eq!(decode::<Fruit>(&value).value(), Some(&fruit));
//! assert_eq!(Value::Table(encode(&fruit)), value);
//! ```

use crate::decoder::{Decoded, DecodeOptions, Decoder, Outcome, UnknownKeys};
use crate::render::render_document;
use crate::value::{Table, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

/// Types that can be decoded from a TOML value.
pub trait FromValue: Sized {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self>;

    /// Decode from a bare table. The default wraps a clone of `table` in a
    /// [`Value`]; table mappings and maps override it to read in place.
    fn from_table(table: &Table, dec: &mut Decoder) -> Decoded<Self> {
        Self::from_value(&Value::Table(table.clone()), dec)
    }
}

/// Types that can be encoded as a TOML value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Types that encode as a table, and so can be rendered as a document.
pub trait ToTable {
    fn to_table(&self) -> Table;
}

/// Decode `value` as `T` from an empty scope with default options.
pub fn decode<T: FromValue>(value: &Value) -> Outcome<T> {
    Decoder::run(|dec| T::from_value(value, dec))
}

pub fn decode_with<T: FromValue>(options: DecodeOptions, value: &Value) -> Outcome<T> {
    Decoder::run_with(options, |dec| T::from_value(value, dec))
}

/// Decode a top-level document table as `T` through
/// [`FromValue::from_table`], so mapped types never copy the document.
pub fn decode_table<T: FromValue>(table: &Table) -> Outcome<T> {
    Decoder::run(|dec| T::from_table(table, dec))
}

pub fn encode<T: ToTable + ?Sized>(value: &T) -> Table {
    value.to_table()
}

/// Encode `value` and render it as a canonical TOML document.
pub fn to_toml_string<T: ToTable + ?Sized>(value: &T) -> String {
    render_document(&value.to_table())
}

// ============================================================================
// Table mapping
// ============================================================================

/// Field-by-field reader over one table. Tracks which keys were consumed so
/// [`TableParser::finish`] can apply the unknown-key policy.
pub struct TableParser<'a> {
    dec: &'a mut Decoder,
    table: &'a Table,
    used: Vec<bool>,
}

impl<'a> TableParser<'a> {
    pub fn new(dec: &'a mut Decoder, table: &'a Table) -> Self {
        Self {
            dec,
            table,
            used: vec![false; table.len()],
        }
    }

    /// The underlying decoder, for warnings or custom checks at table scope.
    pub fn decoder(&mut self) -> &mut Decoder {
        self.dec
    }

    /// Decode a required field. An absent key fails with `missing key`
    /// scoped under the key.
    pub fn req_key<T: FromValue>(&mut self, key: &str) -> Decoded<T> {
        let table = self.table;
        match table.get_full(key) {
            Some((index, _, value)) => {
                self.used[index] = true;
                self.dec.in_key(key, |dec| T::from_value(value, dec))
            }
            None => self.dec.in_key(key, |dec| dec.fail("missing key")),
        }
    }

    /// Decode an optional field; an absent key yields `None`.
    pub fn opt_key<T: FromValue>(&mut self, key: &str) -> Decoded<Option<T>> {
        let table = self.table;
        match table.get_full(key) {
            Some((index, _, value)) => {
                self.used[index] = true;
                self.dec
                    .in_key(key, |dec| T::from_value(value, dec))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    /// Apply the run's [`UnknownKeys`] policy to every key no field consumed,
    /// in table order.
    pub fn finish(self) -> Decoded<()> {
        let policy = self.dec.options().unknown_keys;
        for ((key, _), used) in self.table.iter().zip(&self.used) {
            if *used {
                continue;
            }
            match policy {
                UnknownKeys::Ignore => {}
                UnknownKeys::Warn => self.dec.in_key(key, |dec| {
                    dec.warn("unexpected key");
                    Ok(())
                })?,
                UnknownKeys::Reject => self.dec.in_key(key, |dec| dec.fail("unexpected key"))?,
            }
        }
        Ok(())
    }
}

/// Decode `value` as a table: run `body` over its fields, then apply the
/// unknown-key policy. A non-table fails with a type error at this scope.
pub fn parse_table<T>(
    value: &Value,
    dec: &mut Decoder,
    body: impl FnOnce(&mut TableParser<'_>) -> Decoded<T>,
) -> Decoded<T> {
    match value {
        Value::Table(table) => parse_table_entries(table, dec, body),
        other => dec.type_error("table", other),
    }
}

/// [`parse_table`] over a table already known to be one.
pub fn parse_table_entries<T>(
    table: &Table,
    dec: &mut Decoder,
    body: impl FnOnce(&mut TableParser<'_>) -> Decoded<T>,
) -> Decoded<T> {
    let mut parser = TableParser::new(dec, table);
    let result = body(&mut parser)?;
    parser.finish()?;
    Ok(result)
}

// ============================================================================
// Array mapping
// ============================================================================

/// Positional reader over an array whose length was already checked.
pub struct ArrayParser<'a> {
    dec: &'a mut Decoder,
    items: &'a [Value],
    position: usize,
}

impl<'a> ArrayParser<'a> {
    pub fn decoder(&mut self) -> &mut Decoder {
        self.dec
    }

    /// Decode the next element under `in_index(position)`.
    pub fn element<T: FromValue>(&mut self) -> Decoded<T> {
        let index = self.position;
        let items = self.items;
        match items.get(index) {
            Some(value) => {
                self.position += 1;
                self.dec.in_index(index, |dec| T::from_value(value, dec))
            }
            None => self.dec.in_index(index, |dec| dec.fail("missing element")),
        }
    }
}

/// Decode `value` as an array of exactly `arity` elements and run `body`
/// over them. Wrong shape or wrong length fails at this scope.
pub fn parse_array<T>(
    value: &Value,
    dec: &mut Decoder,
    arity: usize,
    body: impl FnOnce(&mut ArrayParser<'_>) -> Decoded<T>,
) -> Decoded<T> {
    match value {
        Value::Array(items) if items.len() == arity => body(&mut ArrayParser {
            dec,
            items,
            position: 0,
        }),
        Value::Array(items) => dec.fail(format!(
            "expected array of length {}, got length {}",
            arity,
            items.len()
        )),
        other => dec.type_error("array", other),
    }
}

/// Derive [`FromValue`], [`ToValue`] and [`ToTable`] for a struct with named
/// fields, mapping each field to the table key of the same name.
///
/// Field markers:
/// - `#[optional] f`: `f: Option<T>`; absent key decodes as `None`, `None`
///   is left out when encoding.
/// - `#[default] f` / `#[default(expr)] f`: absent key decodes as
///   `Default::default()` / `expr`; always encoded.
///
/// ```
/// use toml_codec::{table_mapping, to_toml_string};
///
/// struct Server {
///     host: String,
///     port: u16,
///     tags: Option<Vec<String>>,
///     workers: u32,
/// }
///
/// table_mapping! {
///     Server { host, port, #[optional] tags, #[default(4)] workers }
/// }
///
/// let server = Server { host: "localhost".into(), port: 8080, tags: None, workers: 4 };
/// assert_eq!(to_toml_string(&server), "host = \"localhost\"\nport = 8080\nworkers = 4\n");
/// ```
#[macro_export]
macro_rules! table_mapping {
    (@get $tp:ident, $field:ident) => {
        $tp.req_key(stringify!($field))?
    };
    (@get $tp:ident, $field:ident, optional) => {
        $tp.opt_key(stringify!($field))?
    };
    (@get $tp:ident, $field:ident, default) => {
        $tp.opt_key(stringify!($field))?.unwrap_or_default()
    };
    (@get $tp:ident, $field:ident, default, $default:expr) => {
        $tp.opt_key(stringify!($field))?.unwrap_or_else(|| $default)
    };
    (@put $table:ident, $value:expr, $field:ident, optional) => {
        if let Some(value) = $value {
            $table.insert(
                stringify!($field).to_string(),
                $crate::ToValue::to_value(value),
            );
        }
    };
    (@put $table:ident, $value:expr, $field:ident $(, $kind:ident)?) => {
        $table.insert(
            stringify!($field).to_string(),
            $crate::ToValue::to_value($value),
        );
    };
    ($ty:ident { $( $(#[$kind:ident $(($default:expr))?])? $field:ident ),* $(,)? }) => {
        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
                dec: &mut $crate::Decoder,
            ) -> $crate::Decoded<Self> {
                match value {
                    $crate::Value::Table(table) => {
                        <Self as $crate::FromValue>::from_table(table, dec)
                    }
                    other => dec.type_error("table", other),
                }
            }

            fn from_table(
                table: &$crate::Table,
                dec: &mut $crate::Decoder,
            ) -> $crate::Decoded<Self> {
                $crate::mapping::parse_table_entries(table, dec, |tp| {
                    Ok($ty {
                        $( $field: $crate::table_mapping!(@get tp, $field $(, $kind $(, $default)?)?), )*
                    })
                })
            }
        }

        impl $crate::ToTable for $ty {
            fn to_table(&self) -> $crate::Table {
                let mut table = $crate::Table::new();
                $( $crate::table_mapping!(@put table, &self.$field, $field $(, $kind)?); )*
                table
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Table($crate::ToTable::to_table(self))
            }
        }
    };
}

/// Derive [`FromValue`] and [`ToValue`] for a struct whose fields map to
/// array positions in declaration order.
///
/// Tuple structs list their field indices, named structs their field names:
///
/// ```
/// use toml_codec::{array_mapping, decode, ToValue, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Answer(i64, String);
/// array_mapping! { Answer(0, 1) }
///
/// #[derive(Debug, PartialEq)]
/// struct Point { x: f64, y: f64 }
/// array_mapping! { Point { x, y } }
///
/// let value = Value::array([Value::from(42), Value::from("forty-two")]);
/// assert_eq!(decode::<Answer>(&value).value(), Some(&Answer(42, "forty-two".into())));
/// assert_eq!(Point { x: 1.0, y: 2.5 }.to_value().to_string(), "[1.0, 2.5]");
/// ```
#[macro_export]
macro_rules! array_mapping {
    (@count) => { 0usize };
    (@count $head:tt $($tail:tt)*) => { 1usize + $crate::array_mapping!(@count $($tail)*) };
    (@element $ap:ident, $_position:tt) => { $ap.element()? };
    ($ty:ident ( $($index:tt),* $(,)? )) => {
        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
                dec: &mut $crate::Decoder,
            ) -> $crate::Decoded<Self> {
                $crate::mapping::parse_array(
                    value,
                    dec,
                    $crate::array_mapping!(@count $($index)*),
                    |ap| Ok($ty( $( $crate::array_mapping!(@element ap, $index) ),* )),
                )
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Array(vec![ $( $crate::ToValue::to_value(&self.$index) ),* ])
            }
        }
    };
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::FromValue for $ty {
            fn from_value(
                value: &$crate::Value,
                dec: &mut $crate::Decoder,
            ) -> $crate::Decoded<Self> {
                $crate::mapping::parse_array(
                    value,
                    dec,
                    $crate::array_mapping!(@count $($field)*),
                    |ap| Ok($ty { $( $field: ap.element()?, )* }),
                )
            }
        }

        impl $crate::ToValue for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::Array(vec![ $( $crate::ToValue::to_value(&self.$field) ),* ])
            }
        }
    };
}

// ============================================================================
// Standard implementations
// ============================================================================

impl FromValue for Value {
    fn from_value(value: &Value, _dec: &mut Decoder) -> Decoded<Self> {
        Ok(value.clone())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl FromValue for bool {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => dec.type_error("boolean", other),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => dec.type_error("string", other),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for char {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => dec.fail("expected single character"),
                }
            }
            other => dec.type_error("string", other),
        }
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
                    match value {
                        Value::Integer(n) => <$ty>::try_from(n).or_else(|_| {
                            dec.fail(concat!("integer out of range for ", stringify!($ty)))
                        }),
                        other => dec.type_error("integer", other),
                    }
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Integer(BigInt::from(*self))
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl FromValue for BigInt {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::Integer(n) => Ok(n.clone()),
            other => dec.type_error("integer", other),
        }
    }
}

impl ToValue for BigInt {
    fn to_value(&self) -> Value {
        Value::Integer(self.clone())
    }
}

/// Floats also accept integers, widened to the nearest `f64`.
impl FromValue for f64 {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Integer(n) => match n.to_f64() {
                Some(x) if x.is_finite() => Ok(x),
                _ => dec.fail("integer out of range for f64"),
            },
            other => dec.type_error("float", other),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        f64::from_value(value, dec).map(|x| x as f32)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

macro_rules! impl_temporal {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
                    match value {
                        Value::$variant(t) => Ok(*t),
                        other => dec.type_error($name, other),
                    }
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }
            }
        )*
    };
}

impl_temporal! {
    NaiveTime => TimeOfDay, "local time";
    NaiveDate => Day, "local date";
    NaiveDateTime => LocalTime, "local date-time";
    DateTime<FixedOffset> => ZonedTime, "offset date-time";
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        T::from_value(value, dec).map(Some)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| dec.in_index(i, |dec| T::from_value(item, dec)))
                .collect(),
            other => dec.type_error("array", other),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

fn decode_entries<T: FromValue, M: FromIterator<(String, T)>>(
    table: &Table,
    dec: &mut Decoder,
) -> Decoded<M> {
    table
        .iter()
        .map(|(key, item)| {
            dec.in_key(key, |dec| T::from_value(item, dec))
                .map(|decoded| (key.clone(), decoded))
        })
        .collect()
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::Table(table) => decode_entries(table, dec),
            other => dec.type_error("table", other),
        }
    }

    fn from_table(table: &Table, dec: &mut Decoder) -> Decoded<Self> {
        decode_entries(table, dec)
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        match value {
            Value::Table(table) => decode_entries(table, dec),
            other => dec.type_error("table", other),
        }
    }

    fn from_table(table: &Table, dec: &mut Decoder) -> Decoded<Self> {
        decode_entries(table, dec)
    }
}

impl<T: ToValue> ToTable for IndexMap<String, T> {
    fn to_table(&self) -> Table {
        self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect()
    }
}

impl<T: ToValue> ToTable for BTreeMap<String, T> {
    fn to_table(&self) -> Table {
        self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect()
    }
}

impl<T: ToValue> ToValue for IndexMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Table(self.to_table())
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Table(self.to_table())
    }
}

macro_rules! impl_tuple {
    ($arity:literal: $($name:ident $index:tt),*) => {
        impl<$($name: FromValue),*> FromValue for ($($name,)*) {
            fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
                parse_array(value, dec, $arity, |ap| Ok(($(ap.element::<$name>()?,)*)))
            }
        }

        impl<$($name: ToValue),*> ToValue for ($($name,)*) {
            fn to_value(&self) -> Value {
                Value::Array(vec![$(self.$index.to_value()),*])
            }
        }
    };
}

impl_tuple!(2: A 0, B 1);
impl_tuple!(3: A 0, B 1, C 2);
impl_tuple!(4: A 0, B 1, C 2, D 3);
