//! Ordered list of test calls, run deliberately against a [`Registry`].

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::matcher::CompareMode;
use crate::registry::Registry;
use crate::value::Value;

/// What a call is expected to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Exactly one acceptable result sequence.
    Single(Vec<Value>),
    /// Any one of several acceptable result sequences.
    AnyOf(Vec<Vec<Value>>),
}

impl Expectation {
    /// Number of candidate sequences.
    #[must_use]
    pub fn case_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::AnyOf(cases) => cases.len(),
        }
    }
}

/// One registered function call with its expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCall {
    pub function: String,
    pub args: Vec<Value>,
    pub expectation: Expectation,
    #[serde(default)]
    pub mode: CompareMode,
}

impl TestCall {
    #[must_use]
    pub fn single(function: impl Into<String>, expected: Vec<Value>, args: Vec<Value>) -> Self {
        Self {
            function: function.into(),
            args,
            expectation: Expectation::Single(expected),
            mode: CompareMode::Exact,
        }
    }

    #[must_use]
    pub fn any_of(
        function: impl Into<String>,
        candidates: Vec<Vec<Value>>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            function: function.into(),
            args,
            expectation: Expectation::AnyOf(candidates),
            mode: CompareMode::Exact,
        }
    }

    /// Compare types only.
    #[must_use]
    pub const fn type_only(mut self) -> Self {
        self.mode = CompareMode::TypeOnly;
        self
    }

    /// Resolve, run, and report this call through `engine`.
    pub fn run<W: Write>(&self, registry: &Registry, engine: &mut Engine<W>) -> bool {
        let callable = match registry.get(&self.function) {
            Ok(callable) => callable,
            Err(failure) => {
                engine.report_failure(&failure);
                return false;
            }
        };
        match &self.expectation {
            Expectation::Single(expected) => {
                engine.run_single(callable, expected, &self.args, self.mode)
            }
            Expectation::AnyOf(candidates) => {
                engine.run_multi_case(callable, candidates, &self.args, self.mode)
            }
        }
    }
}

/// Pass/fail counts for one suite run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl SuiteSummary {
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Calls run in insertion order, one after another.
#[derive(Debug, Default, Clone)]
pub struct Suite {
    calls: Vec<TestCall>,
}

impl Suite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, call: TestCall) -> &mut Self {
        self.calls.push(call);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Run every call. A failing call never stops the ones after it.
    pub fn run<W: Write>(&self, registry: &Registry, engine: &mut Engine<W>) -> SuiteSummary {
        let passed = self
            .calls
            .iter()
            .filter(|call| call.run(registry, engine))
            .count();
        engine.flush();
        SuiteSummary {
            total: self.calls.len(),
            passed,
            failed: self.calls.len() - passed,
        }
    }
}
