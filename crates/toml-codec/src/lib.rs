//! # toml-codec
//!
//! Two-way codec between typed Rust values and TOML, built around the
//! resolved TOML value tree.
//!
//! Decoding runs validation logic over a [`Value`] while tracking *where* in
//! the tree it is, so every failure and warning reads like
//! `type error. wanted: integer got: string in top.server.port`. Encoding
//! turns typed values back into a [`Value`], and the canonical renderer
//! prints it as minimal TOML that prefers dotted keys over section headers.
//!
//! Lexing, parsing and table resolution are left to a TOML front end; this
//! crate starts from (and ends at) the resolved value.
//!
//! ## Quick start
//!
//! ```rust
//! use toml_codec::{decode, table_mapping, to_toml_string, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Fruit {
//!     color: String,
//!     shape: String,
//! }
//!
//! table_mapping! { Fruit { color, shape } }
//!
//! let value = Value::table([
//!     ("color", Value::from("red")),
//!     ("shape", Value::from(42)),
//! ]);
//! let outcome = decode::<Fruit>(&value);
//! assert_eq!(
//!     outcome.errors()[0].to_string(),
//!     "type error. wanted: string got: integer in top.shape"
//! );
//!
//! let fruit = Fruit { color: "red".into(), shape: "round".into() };
//! assert_eq!(to_toml_string(&fruit), "color = \"red\"\nshape = \"round\"\n");
//! ```
//!
//! ## Modules
//!
//! - [`value`]: `Value` / `Table`, the resolved TOML tree
//! - [`decoder`]: scoped, warning-accumulating decoder with ordered choice
//! - [`mapping`]: `FromValue` / `ToValue`, table and array mappings
//! - [`render`]: canonical TOML text for values, keys and documents
//! - [`raw`]: unresolved parse vocabulary rendered for diagnostics
//! - [`json`]: toml-test tagged JSON bridge
//! - [`error`]: Error types

pub mod decoder;
pub mod error;
pub mod json;
pub mod mapping;
pub mod raw;
pub mod render;
pub mod value;

pub use decoder::{
    Alternatives, DecodeOptions, Decoded, Decoder, Failure, Message, Outcome, Scope, UnknownKeys,
};
pub use error::CodecError;
pub use mapping::{
    decode, decode_table, decode_with, encode, to_toml_string, ArrayParser, FromValue,
    TableParser, ToTable, ToValue,
};
pub use render::{render_document, render_value};
pub use value::{Table, Value};
