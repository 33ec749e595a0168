//! Diagnostic decoder: validation and extraction over a [`Value`] with
//! scoped failures, scoped warnings and prioritized choice.
//!
//! A decoding step is any function `FnOnce(&mut Decoder) -> Decoded<T>`.
//! Steps are sequenced with `?`: the second runs only when the first
//! succeeded, and a failure propagates unchanged. [`Decoder::run`] executes a
//! step from an empty scope and packages the result as an [`Outcome`].
//!
//! # Key design decisions
//!
//! - **Scope is a stack.** [`Decoder::with_scope`] pushes a segment for the
//!   duration of one sub-step and pops it afterwards, success or not. A
//!   message captures the stack as it is when the message is raised, so a
//!   deeply nested failure carries its full path.
//! - **Warnings are an append-only log**, kept across the whole run. The only
//!   exception is a failed alternative inside a choice: the log is rewound to
//!   where that alternative started.
//! - **Choice merges failures.** [`Alternatives`] tries branches in order,
//!   stops at the first success and, when all fail, concatenates every
//!   branch's messages in attempt order. [`Failure::empty`] is the identity
//!   of this merge.
//!
//! # Example
//! ```
//! use toml_codec::{Decoder, Outcome};
//!
//! let outcome: Outcome<i64> = Decoder::run(|dec| {
//!     dec.in_key("port", |dec| {
//!         dec.warn("port is deprecated");
//!         Ok(8080)
//!     })
//! });
//! assert_eq!(outcome.warnings()[0].to_string(), "port is deprecated in top.port");
//! ```

use crate::error::{CodecError, Result};
use crate::render::render_simple_key;
use crate::value::Value;
use std::fmt;

/// One step of a scope path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Descent into a table entry; renders as `.key`, quoted when needed.
    Key(String),
    /// Descent into an array element; renders as `[i]`.
    Index(usize),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Key(key) => write!(f, ".{}", render_simple_key(key)),
            Scope::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A warning or error together with the scope it was raised in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub scope: Vec<Scope>,
    pub message: String,
}

/// Renders as `"<message> in top<scope>"`, e.g. `bad in top.server[0]`.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in top", self.message)?;
        for segment in &self.scope {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// The error half of a decoding step: one message per failed attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    messages: Vec<Message>,
}

impl Failure {
    /// The failure that loses to every real attempt.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Concatenate two failures, `self`'s messages first.
    pub fn merge(mut self, other: Failure) -> Failure {
        self.messages.extend(other.messages);
        self
    }
}

/// Result of a single decoding step.
pub type Decoded<T> = std::result::Result<T, Failure>;

/// What a table mapping does with keys no declared field consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Accept silently.
    Ignore,
    /// Record an `unexpected key` warning per key.
    #[default]
    Warn,
    /// Fail with an `unexpected key` error per key.
    Reject,
}

/// Run-wide switches for a decoder.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub unknown_keys: UnknownKeys,
}

impl DecodeOptions {
    /// Options that turn every unknown table key into an error.
    pub fn strict() -> Self {
        Self {
            unknown_keys: UnknownKeys::Reject,
        }
    }
}

/// Final result of [`Decoder::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// At least one error; no value and no warnings.
    Failure { errors: Vec<Message> },
    /// The decoded value and every warning recorded on the winning path.
    Success { warnings: Vec<Message>, value: T },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success { value, .. } => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn warnings(&self) -> &[Message] {
        match self {
            Outcome::Success { warnings, .. } => warnings,
            Outcome::Failure { .. } => &[],
        }
    }

    pub fn errors(&self) -> &[Message] {
        match self {
            Outcome::Success { .. } => &[],
            Outcome::Failure { errors } => errors,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success { warnings, value } => Outcome::Success {
                warnings,
                value: f(value),
            },
            Outcome::Failure { errors } => Outcome::Failure { errors },
        }
    }

    /// Convert into a `Result`, keeping warnings next to the value and
    /// rendering errors into [`CodecError::Decode`].
    pub fn into_result(self) -> Result<(T, Vec<Message>)> {
        match self {
            Outcome::Success { warnings, value } => Ok((value, warnings)),
            Outcome::Failure { errors } => Err(CodecError::Decode {
                messages: errors.iter().map(ToString::to_string).collect(),
            }),
        }
    }
}

/// The run context threaded through decoding steps.
#[derive(Debug)]
pub struct Decoder {
    scope: Vec<Scope>,
    warnings: Vec<Message>,
    options: DecodeOptions,
}

impl Decoder {
    /// Run a decoding step from an empty scope with default options.
    pub fn run<T>(step: impl FnOnce(&mut Decoder) -> Decoded<T>) -> Outcome<T> {
        Self::run_with(DecodeOptions::default(), step)
    }

    /// Run a decoding step from an empty scope with the given options.
    ///
    /// A failure that carries no message (a choice with no alternatives)
    /// is reported as `no alternatives matched in top`.
    pub fn run_with<T>(
        options: DecodeOptions,
        step: impl FnOnce(&mut Decoder) -> Decoded<T>,
    ) -> Outcome<T> {
        let mut dec = Decoder {
            scope: Vec::new(),
            warnings: Vec::new(),
            options,
        };
        match step(&mut dec) {
            Ok(value) => {
                tracing::debug!(warnings = dec.warnings.len(), "decode succeeded");
                Outcome::Success {
                    warnings: dec.warnings,
                    value,
                }
            }
            Err(failure) => {
                let mut errors = failure.into_messages();
                if errors.is_empty() {
                    errors.push(Message {
                        scope: Vec::new(),
                        message: "no alternatives matched".to_string(),
                    });
                }
                tracing::debug!(errors = errors.len(), "decode failed");
                Outcome::Failure { errors }
            }
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// The scope path at this point of the run, outermost first.
    pub fn scope(&self) -> &[Scope] {
        &self.scope
    }

    /// Run `step` with `segment` appended to the scope path.
    pub fn with_scope<T>(
        &mut self,
        segment: Scope,
        step: impl FnOnce(&mut Decoder) -> Decoded<T>,
    ) -> Decoded<T> {
        self.scope.push(segment);
        let result = step(self);
        self.scope.pop();
        result
    }

    pub fn in_key<T>(
        &mut self,
        key: &str,
        step: impl FnOnce(&mut Decoder) -> Decoded<T>,
    ) -> Decoded<T> {
        self.with_scope(Scope::Key(key.to_string()), step)
    }

    pub fn in_index<T>(
        &mut self,
        index: usize,
        step: impl FnOnce(&mut Decoder) -> Decoded<T>,
    ) -> Decoded<T> {
        self.with_scope(Scope::Index(index), step)
    }

    fn message(&self, message: impl Into<String>) -> Message {
        Message {
            scope: self.scope.clone(),
            message: message.into(),
        }
    }

    /// Record a warning at the current scope. Decoding continues.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = self.message(message);
        self.warnings.push(message);
    }

    /// A single-message failure at the current scope.
    pub fn failure(&self, message: impl Into<String>) -> Failure {
        Failure {
            messages: vec![self.message(message)],
        }
    }

    /// Abort the current step with a message at the current scope.
    pub fn fail<T>(&self, message: impl Into<String>) -> Decoded<T> {
        Err(self.failure(message))
    }

    /// Fail with the standard shape-mismatch message.
    pub fn type_error<T>(&self, wanted: &str, got: &Value) -> Decoded<T> {
        self.fail(format!(
            "type error. wanted: {} got: {}",
            wanted,
            got.type_name()
        ))
    }

    /// Try `first`; if it fails, try `second` from the same starting point.
    /// If both fail, the failure lists are concatenated.
    pub fn first_of<T>(
        &mut self,
        first: impl FnOnce(&mut Decoder) -> Decoded<T>,
        second: impl FnOnce(&mut Decoder) -> Decoded<T>,
    ) -> Decoded<T> {
        self.alternatives().or(first).or(second).finish()
    }

    /// Start an ordered choice among any number of alternatives.
    pub fn alternatives<T>(&mut self) -> Alternatives<'_, T> {
        Alternatives {
            dec: self,
            state: Err(Failure::empty()),
        }
    }
}

/// Builder for an ordered choice; see [`Decoder::alternatives`].
///
/// ```
/// use toml_codec::{Decoder, Value};
///
/// let value = Value::from("8080");
/// let outcome = Decoder::run(|dec| {
///     dec.alternatives()
///         .or(|dec| match &value {
///             Value::Integer(_) => Ok(1),
///             other => dec.type_error("integer", other),
///         })
///         .or(|dec| match &value {
///             Value::String(_) => Ok(2),
///             other => dec.type_error("string", other),
///         })
///         .finish()
/// });
/// assert_eq!(outcome.value(), Some(&2));
/// ```
pub struct Alternatives<'d, T> {
    dec: &'d mut Decoder,
    state: Decoded<T>,
}

impl<T> Alternatives<'_, T> {
    /// Try `step` unless an earlier alternative already succeeded.
    pub fn or(mut self, step: impl FnOnce(&mut Decoder) -> Decoded<T>) -> Self {
        self.state = match self.state {
            Ok(value) => Ok(value),
            Err(earlier) => {
                let mark = self.dec.warnings.len();
                match step(&mut *self.dec) {
                    Ok(value) => Ok(value),
                    Err(later) => {
                        self.dec.warnings.truncate(mark);
                        tracing::trace!(
                            errors = later.messages.len(),
                            "alternative failed"
                        );
                        Err(earlier.merge(later))
                    }
                }
            }
        };
        self
    }

    pub fn finish(self) -> Decoded<T> {
        self.state
    }
}
