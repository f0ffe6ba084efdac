//! Test execution engine.

use std::io::Write;
use std::time::Instant;

use calltest_core::format::{NOTHING, format_values};
use calltest_core::{
    CompareMode, Engine, Expectation, Failure, MultiCaseError, PassRecord, Registry,
    evaluate_multi_case, evaluate_single,
};
use serde_json::json;

use crate::error::HarnessError;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Mode for cases that do not set `type_only`.
    pub default_mode: CompareMode,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>, default_mode: CompareMode) -> Self {
        Self {
            campaign: campaign.into(),
            default_mode,
        }
    }

    /// Run all fixtures in a set, printing one verdict per case.
    pub fn run<W: Write>(
        &self,
        set: &FixtureSet,
        registry: &Registry,
        engine: &mut Engine<W>,
    ) -> Result<Vec<VerificationResult>, HarnessError> {
        self.run_inner(set, registry, engine, None)
    }

    /// Like [`TestRunner::run`], also emitting one structured event per case
    /// plus suite start/end events.
    pub fn run_logged<W: Write>(
        &self,
        set: &FixtureSet,
        registry: &Registry,
        engine: &mut Engine<W>,
        emitter: &mut LogEmitter,
    ) -> Result<Vec<VerificationResult>, HarnessError> {
        self.run_inner(set, registry, engine, Some(emitter))
    }

    fn run_inner<W: Write>(
        &self,
        set: &FixtureSet,
        registry: &Registry,
        engine: &mut Engine<W>,
        mut emitter: Option<&mut LogEmitter>,
    ) -> Result<Vec<VerificationResult>, HarnessError> {
        // Malformed cases abort before anything runs.
        set.validate()?;

        if let Some(log) = emitter.as_deref_mut() {
            log.set_suite(&set.suite);
            log.emit_entry(
                LogEntry::new("", LogLevel::Info, "suite_start").with_details(json!({
                    "campaign": self.campaign,
                    "cases": set.cases.len(),
                    "default_mode": self.default_mode.as_str(),
                })),
            )?;
        }

        let mut results = Vec::with_capacity(set.cases.len());
        for case in &set.cases {
            let started = Instant::now();
            let result = execute_case(case, registry, engine, self.default_mode)?;
            let elapsed = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            if let Some(log) = emitter.as_deref_mut() {
                log.emit_entry(verdict_entry(case, &result, elapsed))?;
            }
            results.push(result);
        }
        engine.flush();

        if let Some(log) = emitter {
            let passed = results.iter().filter(|r| r.passed).count();
            let level = if passed == results.len() {
                LogLevel::Info
            } else {
                LogLevel::Warn
            };
            log.emit_entry(LogEntry::new("", level, "suite_end").with_details(json!({
                "total": results.len(),
                "passed": passed,
                "failed": results.len() - passed,
            })))?;
            log.flush()?;
        }
        Ok(results)
    }
}

fn verdict_entry(case: &FixtureCase, result: &VerificationResult, elapsed_us: u64) -> LogEntry {
    let case_count = case
        .expectation()
        .map_or(0, |expectation| expectation.case_count());
    let mut entry = LogEntry::new("", LogLevel::Info, "call_verdict")
        .with_call(&case.name, &case.function)
        .with_mode(result.mode)
        .with_cases(case_count, result.matched_case)
        .with_duration_us(elapsed_us);
    if result.passed {
        entry = entry.with_outcome(Outcome::Pass);
    } else {
        entry.level = LogLevel::Warn;
        entry = entry.with_outcome(Outcome::Fail);
        if let Some(kind) = result.failure_kind {
            entry = entry.with_failure_kind(kind);
        }
        if !result.diagnostics.is_empty() {
            entry = entry.with_details(json!({ "diagnostics": result.diagnostics }));
        }
    }
    entry
}

fn render_expectation(expectation: &Expectation) -> String {
    match expectation {
        Expectation::Single(expected) => format_values(expected),
        Expectation::AnyOf(cases) if cases.is_empty() => NOTHING.to_owned(),
        Expectation::AnyOf(cases) => cases
            .iter()
            .map(|case| format_values(case))
            .collect::<Vec<_>>()
            .join(" | "),
    }
}

fn execute_case<W: Write>(
    case: &FixtureCase,
    registry: &Registry,
    engine: &mut Engine<W>,
    default_mode: CompareMode,
) -> Result<VerificationResult, HarnessError> {
    let mode = case.mode(default_mode);
    let base = |expected: String| VerificationResult {
        case_name: case.name.clone(),
        function: case.function.clone(),
        mode,
        passed: false,
        expected,
        actual: String::new(),
        failure_kind: None,
        matched_case: None,
        diagnostics: Vec::new(),
    };

    let callable = match registry.get(&case.function) {
        Ok(callable) => callable,
        Err(failure) => {
            engine.report_failure(&failure);
            let expected = render_expectation(&case.expectation()?);
            return Ok(failed(base(expected), &failure));
        }
    };

    let call = case.to_test_call(Some(&callable.descriptor()), default_mode)?;
    let result = base(render_expectation(&call.expectation));
    Ok(match &call.expectation {
        Expectation::Single(expected) => {
            let verdict = evaluate_single(callable, expected, &call.args, call.mode);
            engine.report_single(&verdict);
            match verdict {
                Ok(record) => passed(result, &record),
                Err(failure) => failed(result, &failure),
            }
        }
        Expectation::AnyOf(candidates) => {
            let verdict = evaluate_multi_case(callable, candidates, &call.args, call.mode);
            engine.report_multi_case(&verdict);
            match verdict {
                Ok(record) => passed(result, &record),
                Err(err) => {
                    let diagnostics = match &err {
                        MultiCaseError::NoMatch { diagnostics, .. } => {
                            diagnostics.iter().map(ToString::to_string).collect()
                        }
                        MultiCaseError::Call(_) => Vec::new(),
                    };
                    VerificationResult {
                        actual: err.to_string(),
                        failure_kind: Some(err.kind()),
                        diagnostics,
                        ..result
                    }
                }
            }
        }
    })
}

fn passed(result: VerificationResult, record: &PassRecord) -> VerificationResult {
    VerificationResult {
        passed: true,
        actual: format_values(&record.results),
        matched_case: record.matched_case,
        ..result
    }
}

fn failed(result: VerificationResult, failure: &Failure) -> VerificationResult {
    VerificationResult {
        actual: failure.to_string(),
        failure_kind: Some(failure.kind()),
        ..result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use calltest_core::{ColorChoice, FailureKind};

    fn set(json: &str) -> FixtureSet {
        FixtureSet::from_json(json).expect("valid fixture")
    }

    #[test]
    fn verdicts_follow_the_engine() {
        let set = set(r#"{
            "version": "1",
            "suite": "unit",
            "cases": [
                {"name": "ok", "function": "sum", "args": [2, 3], "expected": [5]},
                {"name": "bad", "function": "sum", "args": [2, 3], "expected": [6]},
                {"name": "missing", "function": "product", "args": [2, 3], "expected": [6]},
                {"name": "swap", "function": "swap", "args": [1, 2],
                 "expected_cases": [[1, 2], [2, 1]]}
            ]
        }"#);
        let mut engine = Engine::with_writer(Vec::new(), ColorChoice::Never);
        let results = TestRunner::new("unit", CompareMode::Exact)
            .run(&set, &catalog::builtin(), &mut engine)
            .expect("run");

        let passed: Vec<bool> = results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, vec![true, false, false, true]);
        assert_eq!(results[0].actual, "5");
        assert_eq!(results[1].failure_kind, Some(FailureKind::ValueMismatch));
        assert_eq!(results[2].failure_kind, Some(FailureKind::NotCallable));
        assert_eq!(results[3].matched_case, Some(2));
        assert_eq!(results[3].expected, "1, 2 | 2, 1");

        let text = String::from_utf8(engine.into_writer()).expect("utf8");
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn no_match_collects_one_diagnostic_per_candidate() {
        let set = set(r#"{
            "version": "1",
            "suite": "unit",
            "cases": [
                {"name": "none", "function": "sort_pair", "args": [2, 1],
                 "expected_cases": [[2, 1], [1]]}
            ]
        }"#);
        let mut engine = Engine::with_writer(Vec::new(), ColorChoice::Never);
        let results = TestRunner::new("unit", CompareMode::Exact)
            .run(&set, &catalog::builtin(), &mut engine)
            .expect("run");
        assert_eq!(results[0].failure_kind, Some(FailureKind::NoMatch));
        assert_eq!(results[0].diagnostics.len(), 2);
        assert!(results[0].diagnostics[0].starts_with("output case 1:"));
    }

    #[test]
    fn malformed_case_aborts_before_running() {
        let set = set(r#"{
            "version": "1",
            "suite": "unit",
            "cases": [
                {"name": "ok", "function": "sum", "args": [2, 3], "expected": [5]},
                {"name": "neither", "function": "sum", "args": [2, 3]}
            ]
        }"#);
        let mut engine = Engine::with_writer(Vec::new(), ColorChoice::Never);
        let err = TestRunner::new("unit", CompareMode::Exact)
            .run(&set, &catalog::builtin(), &mut engine)
            .expect_err("invalid case");
        assert!(err.to_string().contains("neither"));
        assert!(engine.into_writer().is_empty());
    }

    #[test]
    fn default_mode_applies_to_unset_cases_only() {
        let set = set(r#"{
            "version": "1",
            "suite": "unit",
            "cases": [
                {"name": "loose", "function": "sum", "args": [2, 3], "expected": [0]},
                {"name": "strict", "function": "sum", "args": [2, 3], "expected": [0],
                 "type_only": false}
            ]
        }"#);
        let mut engine = Engine::with_writer(Vec::new(), ColorChoice::Never);
        let results = TestRunner::new("unit", CompareMode::TypeOnly)
            .run(&set, &catalog::builtin(), &mut engine)
            .expect("run");
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[1].mode, CompareMode::Exact);
    }
}
