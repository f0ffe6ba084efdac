//! Result matching against one expectation or a list of candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Failure;
use crate::format::format_value;
use crate::value::Value;

/// How strictly results are compared against expectations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Types and values must both match.
    #[default]
    Exact,
    /// Only the runtime types must match.
    TypeOnly,
}

impl CompareMode {
    #[must_use]
    pub const fn from_type_only(type_only: bool) -> Self {
        if type_only { Self::TypeOnly } else { Self::Exact }
    }

    #[must_use]
    pub const fn is_type_only(self) -> bool {
        matches!(self, Self::TypeOnly)
    }

    /// Parse a mode label with loose casing.
    #[must_use]
    pub fn from_str_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exact" | "value" | "strict" => Some(Self::Exact),
            "type-only" | "type_only" | "typeonly" | "type" => Some(Self::TypeOnly),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::TypeOnly => "type_only",
        }
    }
}

/// Compare `results` against one expected sequence.
///
/// Checks run in order: result count, trailing error-like value, then per
/// position the runtime type and (in exact mode) the value.
pub fn match_expected(
    function: &str,
    results: &[Value],
    expected: &[Value],
    mode: CompareMode,
) -> Result<(), Failure> {
    if expected.len() != results.len() {
        return Err(Failure::OutputArity {
            function: function.to_owned(),
            actual: results.len(),
            expected: expected.len(),
        });
    }

    if let Some(message) = results.last().and_then(Value::error_message) {
        return Err(Failure::TrailingError {
            function: function.to_owned(),
            message: message.to_owned(),
        });
    }

    for (index, (actual, want)) in results.iter().zip(expected).enumerate() {
        if actual.value_type() != want.value_type() {
            return Err(Failure::OutputType {
                function: function.to_owned(),
                index,
                actual: actual.value_type(),
                expected: want.value_type(),
            });
        }
        if mode.is_type_only() {
            continue;
        }
        if actual != want {
            return Err(Failure::ValueMismatch {
                function: function.to_owned(),
                index,
                actual: format_value(actual),
                expected: format_value(want),
            });
        }
    }

    Ok(())
}

/// Why one candidate in a multi-case comparison was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseDiagnostic {
    /// 1-based candidate number.
    pub case: usize,
    #[serde(serialize_with = "serialize_failure")]
    pub failure: Failure,
}

fn serialize_failure<S: serde::Serializer>(failure: &Failure, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(failure)
}

impl fmt::Display for CaseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output case {}: {}", self.case, self.failure)
    }
}

/// Compare `results` against candidates in order, stopping at the first match.
///
/// Returns the 1-based number of the matching candidate, or one diagnostic per
/// rejected candidate. Every failure kind, type mismatches included, rejects
/// only the candidate it was found in.
pub fn match_any(
    function: &str,
    results: &[Value],
    candidates: &[Vec<Value>],
    mode: CompareMode,
) -> Result<usize, Vec<CaseDiagnostic>> {
    let mut diagnostics = Vec::new();
    for (i, expected) in candidates.iter().enumerate() {
        match match_expected(function, results, expected, mode) {
            Ok(()) => return Ok(i + 1),
            Err(failure) => diagnostics.push(CaseDiagnostic {
                case: i + 1,
                failure,
            }),
        }
    }
    Err(diagnostics)
}
