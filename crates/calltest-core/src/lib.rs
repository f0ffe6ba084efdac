//! Dynamic call-and-compare engine for calltest.
//!
//! This crate provides:
//! - Value model: runtime-tagged values with nominal type identity
//! - Callable adapter: typed Rust functions behind a dynamic call interface
//! - Validator, invoker and matchers: the single- and multi-case pipelines
//! - Console: green/red verdict lines
//! - Registry and suite: explicit registration and sequencing of calls

#![forbid(unsafe_code)]

pub mod callable;
pub mod console;
pub mod engine;
pub mod error;
pub mod format;
pub mod invoke;
pub mod matcher;
pub mod registry;
pub mod suite;
pub mod validate;
pub mod value;

pub use callable::{Callable, CallableDescriptor, Function, IntoReturn, function};
pub use console::{ColorChoice, Console};
pub use engine::{Engine, MultiCaseError, PassRecord, evaluate_multi_case, evaluate_single};
pub use error::{Failure, FailureKind};
pub use matcher::{CaseDiagnostic, CompareMode};
pub use registry::Registry;
pub use suite::{Expectation, Suite, SuiteSummary, TestCall};
pub use value::{ConversionError, FromValue, IntoValue, TypeShape, Value, ValueType};

/// Check one call against one expected result sequence, printing the verdict
/// to standard output.
pub fn run_single(
    callable: &dyn Callable,
    expected: &[Value],
    args: &[Value],
    type_only: bool,
) -> bool {
    Engine::stdout().run_single(callable, expected, args, CompareMode::from_type_only(type_only))
}

/// Check one call against several acceptable result sequences, printing the
/// verdict to standard output.
pub fn run_multi_case(
    callable: &dyn Callable,
    expected_sets: &[Vec<Value>],
    args: &[Value],
    type_only: bool,
) -> bool {
    Engine::stdout().run_multi_case(
        callable,
        expected_sets,
        args,
        CompareMode::from_type_only(type_only),
    )
}
