//! Failure taxonomy shared by every stage of the pipeline.
//!
//! None of these is fatal: each one becomes a `false` return plus a failure
//! line. A panic raised by the callable itself is the only thing that escapes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{ConversionError, ValueType};

/// A detected comparison or signature failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("{target} is not a callable function")]
    NotCallable { target: String },
    #[error("{function} declares {declared} parameter(s) but {given} argument(s) were given")]
    InputArity {
        function: String,
        declared: usize,
        given: usize,
    },
    #[error("{function} parameter {index} is declared {declared} but the given argument is {given}")]
    InputType {
        function: String,
        index: usize,
        declared: ValueType,
        given: ValueType,
    },
    /// The argument has the declared top-level type but its content does not
    /// fit: an out-of-range narrow integer or a mistyped element.
    #[error("{function} parameter {index} {detail}")]
    InputValue {
        function: String,
        index: usize,
        detail: ConversionError,
    },
    #[error("{function} returns {actual} value(s) but {expected} were expected")]
    OutputArity {
        function: String,
        actual: usize,
        expected: usize,
    },
    #[error("{function} returned an error: {message}")]
    TrailingError { function: String, message: String },
    #[error("{function} output {index} has type {actual} but expected type {expected}")]
    OutputType {
        function: String,
        index: usize,
        actual: ValueType,
        expected: ValueType,
    },
    #[error("{function} output {index} returned {actual} but expected {expected}")]
    ValueMismatch {
        function: String,
        index: usize,
        actual: String,
        expected: String,
    },
}

/// Machine-readable label for a [`Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotCallable,
    InputArity,
    InputType,
    InputValue,
    OutputArity,
    TrailingError,
    OutputType,
    ValueMismatch,
    /// Every candidate of a multi-case comparison was rejected. Never
    /// produced by [`Failure::kind`].
    NoMatch,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotCallable => "not_callable",
            Self::InputArity => "input_arity",
            Self::InputType => "input_type",
            Self::InputValue => "input_value",
            Self::OutputArity => "output_arity",
            Self::TrailingError => "trailing_error",
            Self::OutputType => "output_type",
            Self::ValueMismatch => "value_mismatch",
            Self::NoMatch => "no_match",
        }
    }
}

impl Failure {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotCallable { .. } => FailureKind::NotCallable,
            Self::InputArity { .. } => FailureKind::InputArity,
            Self::InputType { .. } => FailureKind::InputType,
            Self::InputValue { .. } => FailureKind::InputValue,
            Self::OutputArity { .. } => FailureKind::OutputArity,
            Self::TrailingError { .. } => FailureKind::TrailingError,
            Self::OutputType { .. } => FailureKind::OutputType,
            Self::ValueMismatch { .. } => FailureKind::ValueMismatch,
        }
    }
}
