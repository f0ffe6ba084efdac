//! Per-case verdicts and their aggregate.

use calltest_core::{CompareMode, FailureKind};
use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Name of the test case.
    pub case_name: String,
    /// Function under test.
    pub function: String,
    pub mode: CompareMode,
    /// Whether the case passed.
    pub passed: bool,
    /// Expected result sequence(s), rendered.
    pub expected: String,
    /// Actual results on a pass, the failure message otherwise.
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// 1-based candidate that matched, for multi-case expectations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_case: Option<usize>,
    /// One line per rejected candidate when no candidate matched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    /// Total cases run.
    pub total: usize,
    /// Cases passed.
    pub passed: usize,
    /// Cases failed.
    pub failed: usize,
    /// Individual results.
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if all cases passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed results grouped by failure kind, in first-seen order.
    #[must_use]
    pub fn failures_by_kind(&self) -> Vec<(FailureKind, usize)> {
        let mut counts: Vec<(FailureKind, usize)> = Vec::new();
        for kind in self.results.iter().filter_map(|r| r.failure_kind) {
            match counts.iter_mut().find(|(seen, _)| *seen == kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((kind, 1)),
            }
        }
        counts
    }
}
