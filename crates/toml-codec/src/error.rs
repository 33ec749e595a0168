//! Error types for toml-codec operations that fail as a whole.
//!
//! Decode diagnostics are not errors in this sense: they are [`Message`]s
//! collected by the [`Decoder`](crate::Decoder) and returned inside an
//! [`Outcome`](crate::Outcome). `CodecError::Decode` exists so an outcome can
//! be folded into an ordinary `Result` at an application boundary.
//!
//! [`Message`]: crate::decoder::Message

use thiserror::Error;

/// Errors produced by the tagged-JSON bridge and by `Outcome::into_result`.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The input string was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The JSON was well formed but does not describe a tagged TOML value.
    /// `path` is a JSON-pointer-like location of the offending node.
    #[error("tagged JSON error at {path}: {message}")]
    TaggedJson { path: String, message: String },

    /// A decoder run failed. Each entry is a rendered, scoped message.
    #[error("decode failed: {}", messages.join("; "))]
    Decode { messages: Vec<String> },
}

/// Convenience alias used throughout toml-codec.
pub type Result<T> = std::result::Result<T, CodecError>;
