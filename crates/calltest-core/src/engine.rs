//! The invocation-and-comparison pipeline.
//!
//! `evaluate_*` run validator → invoker → matcher and return a structured
//! verdict without printing. [`Engine`] adds the console line and collapses
//! the verdict to a `bool`.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::callable::Callable;
use crate::console::{ColorChoice, Console};
use crate::error::{Failure, FailureKind};
use crate::format::format_values;
use crate::invoke::invoke;
use crate::matcher::{CaseDiagnostic, CompareMode, match_any, match_expected};
use crate::validate::validate_call;
use crate::value::Value;

/// A successful comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassRecord {
    pub function: String,
    pub results: Vec<Value>,
    pub arguments: Vec<Value>,
    /// 1-based candidate that matched, for multi-case comparisons.
    pub matched_case: Option<usize>,
}

impl PassRecord {
    /// Human-readable pass line body.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} function outputs {} with {} as arguments and run successfully.",
            self.function,
            format_values(&self.results),
            format_values(&self.arguments)
        )
    }
}

/// Why a multi-case comparison failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultiCaseError {
    /// The call itself was rejected before any candidate was tried.
    #[error(transparent)]
    Call(#[from] Failure),
    /// Every candidate was rejected.
    #[error("{function} matched none of {count} output case(s)", count = .diagnostics.len())]
    NoMatch {
        function: String,
        diagnostics: Vec<CaseDiagnostic>,
    },
}

impl MultiCaseError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Call(failure) => failure.kind(),
            Self::NoMatch { .. } => FailureKind::NoMatch,
        }
    }
}

/// Validate, invoke, and compare against one expected sequence.
pub fn evaluate_single(
    callable: &dyn Callable,
    expected: &[Value],
    args: &[Value],
    mode: CompareMode,
) -> Result<PassRecord, Failure> {
    let descriptor = callable.descriptor();
    validate_call(&descriptor, args)?;
    let results = invoke(callable, args)?;
    match_expected(&descriptor.name, &results, expected, mode)?;
    Ok(PassRecord {
        function: descriptor.name,
        results,
        arguments: args.to_vec(),
        matched_case: None,
    })
}

/// Validate, invoke once, and compare against candidates in order.
pub fn evaluate_multi_case(
    callable: &dyn Callable,
    candidates: &[Vec<Value>],
    args: &[Value],
    mode: CompareMode,
) -> Result<PassRecord, MultiCaseError> {
    let descriptor = callable.descriptor();
    validate_call(&descriptor, args)?;
    let results = invoke(callable, args)?;
    match match_any(&descriptor.name, &results, candidates, mode) {
        Ok(case) => Ok(PassRecord {
            function: descriptor.name,
            results,
            arguments: args.to_vec(),
            matched_case: Some(case),
        }),
        Err(diagnostics) => Err(MultiCaseError::NoMatch {
            function: descriptor.name,
            diagnostics,
        }),
    }
}

/// Runs comparisons and writes one verdict per call to a [`Console`].
///
/// Holds no state between calls besides the output sink.
#[derive(Debug)]
pub struct Engine<W> {
    console: Console<W>,
}

impl Engine<std::io::Stdout> {
    /// Engine writing to standard output with automatic color detection.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Console::stdout(ColorChoice::Auto))
    }
}

impl<W: Write> Engine<W> {
    #[must_use]
    pub const fn new(console: Console<W>) -> Self {
        Self { console }
    }

    /// Engine over an arbitrary writer.
    #[must_use]
    pub const fn with_writer(writer: W, color: ColorChoice) -> Self {
        Self::new(Console::new(writer, color))
    }

    /// Single-expectation check; prints a pass or fail line.
    pub fn run_single(
        &mut self,
        callable: &dyn Callable,
        expected: &[Value],
        args: &[Value],
        mode: CompareMode,
    ) -> bool {
        let verdict = evaluate_single(callable, expected, args, mode);
        self.report_single(&verdict)
    }

    /// Multi-candidate check; prints a pass line or one failure block.
    pub fn run_multi_case(
        &mut self,
        callable: &dyn Callable,
        candidates: &[Vec<Value>],
        args: &[Value],
        mode: CompareMode,
    ) -> bool {
        let verdict = evaluate_multi_case(callable, candidates, args, mode);
        self.report_multi_case(&verdict)
    }

    /// Print a single-case verdict.
    pub fn report_single(&mut self, verdict: &Result<PassRecord, Failure>) -> bool {
        match verdict {
            Ok(record) => {
                self.report_pass(record);
                true
            }
            Err(failure) => {
                self.report_failure(failure);
                false
            }
        }
    }

    /// Print a multi-case verdict.
    pub fn report_multi_case(&mut self, verdict: &Result<PassRecord, MultiCaseError>) -> bool {
        match verdict {
            Ok(record) => {
                self.report_pass(record);
                true
            }
            Err(MultiCaseError::Call(failure)) => {
                self.report_failure(failure);
                false
            }
            Err(MultiCaseError::NoMatch {
                function,
                diagnostics,
            }) => {
                let entries: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
                self.console
                    .fail_block(&format!("FAIL: {function} error logs:"), &entries);
                false
            }
        }
    }

    pub fn report_pass(&mut self, record: &PassRecord) {
        self.console.pass(&format!("PASS: {}", record.summary()));
    }

    pub fn report_failure(&mut self, failure: &Failure) {
        self.console.fail(&format!("FAIL: {failure}"));
    }

    pub fn flush(&mut self) {
        self.console.flush();
    }

    #[must_use]
    pub fn into_writer(self) -> W {
        self.console.into_inner()
    }
}
