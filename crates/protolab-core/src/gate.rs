//! # Release Gate
//!
//! Decides whether a prototype may enter READY.
//!
//! The gate takes the test cases and the readiness already computed for them;
//! it never recomputes readiness itself. Every check runs, and the reasons are
//! reported in a fixed order that callers render verbatim:
//!
//! | Order | Reason | Fires when |
//! |-------|--------|------------|
//! | 1 | `NO_TESTS` | there are no test cases |
//! | 2 | `READINESS_TOO_LOW` | readiness < 80 |
//! | 3 | `HAS_FAIL` | any test case has result FAIL |
//!
//! An empty test set always yields both `NO_TESTS` and `READINESS_TOO_LOW`.

use crate::primitives::READINESS_THRESHOLD;
use crate::{TestCase, TestResult};
use std::fmt;

// =============================================================================
// REASON CODES
// =============================================================================

/// Machine-readable reason the gate denied a transition.
///
/// Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReasonCode {
    NoTests,
    ReadinessTooLow,
    HasFail,
}

impl ReasonCode {
    /// Wire spelling of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::NoTests => "NO_TESTS",
            ReasonCode::ReadinessTooLow => "READINESS_TOO_LOW",
            ReasonCode::HasFail => "HAS_FAIL",
        }
    }

    /// Fixed user-facing sentence for the code.
    #[must_use]
    pub fn sentence(&self) -> &'static str {
        match self {
            ReasonCode::NoTests => "At least one test case is required",
            ReasonCode::ReadinessTooLow => "Readiness must be at least 80%",
            ReasonCode::HasFail => "There are failing tests",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DECISION
// =============================================================================

/// Outcome of a gate evaluation.
///
/// `allowed` is true iff `reasons` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub allowed: bool,
    pub reasons: Vec<ReasonCode>,
}

impl GateDecision {
    fn from_reasons(reasons: Vec<ReasonCode>) -> Self {
        Self {
            allowed: reasons.is_empty(),
            reasons,
        }
    }

    /// Reason sentences joined with ". ", in evaluation order.
    ///
    /// Empty when the gate allowed the transition.
    #[must_use]
    pub fn message(&self) -> String {
        self.reasons
            .iter()
            .map(ReasonCode::sentence)
            .collect::<Vec<_>>()
            .join(". ")
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Evaluate the release gate for `tests` at the given `readiness`.
#[must_use]
pub fn evaluate(tests: &[TestCase], readiness: u8) -> GateDecision {
    evaluate_results(tests.iter().map(|t| t.result), readiness)
}

/// Evaluate the release gate from results alone.
#[must_use]
pub fn evaluate_results<I>(results: I, readiness: u8) -> GateDecision
where
    I: IntoIterator<Item = TestResult>,
{
    let mut count = 0usize;
    let mut has_fail = false;
    for result in results {
        count = count.saturating_add(1);
        has_fail |= result == TestResult::Fail;
    }

    let mut reasons = Vec::with_capacity(3);
    if count == 0 {
        reasons.push(ReasonCode::NoTests);
    }
    if readiness < READINESS_THRESHOLD {
        reasons.push(ReasonCode::ReadinessTooLow);
    }
    if has_fail {
        reasons.push(ReasonCode::HasFail);
    }

    GateDecision::from_reasons(reasons)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use TestResult::{Fail, NotRun, Pass};

    #[test]
    fn empty_set_reports_two_reasons() {
        let decision = evaluate_results(Vec::new(), 0);
        assert!(!decision.allowed);
        assert_eq!(
            decision.reasons,
            vec![ReasonCode::NoTests, ReasonCode::ReadinessTooLow]
        );
    }

    #[test]
    fn all_pass_is_allowed() {
        let decision = evaluate_results(vec![Pass, Pass, Pass, Pass], 100);
        assert!(decision.allowed);
        assert!(decision.reasons.is_empty());
        assert_eq!(decision.message(), "");
    }

    #[test]
    fn fail_and_low_readiness() {
        let decision = evaluate_results(vec![Pass, Fail], 50);
        assert!(!decision.allowed);
        assert_eq!(
            decision.reasons,
            vec![ReasonCode::ReadinessTooLow, ReasonCode::HasFail]
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(evaluate_results(vec![Pass, Pass, Pass, Pass, NotRun], 80).allowed);
        assert!(!evaluate_results(vec![Pass, Pass, Pass, NotRun], 79).allowed);
    }

    #[test]
    fn fail_blocks_even_at_full_readiness() {
        // Caller-supplied readiness is trusted as-is.
        let decision = evaluate_results(vec![Pass, Fail], 100);
        assert_eq!(decision.reasons, vec![ReasonCode::HasFail]);
    }

    #[test]
    fn message_joins_sentences_in_order() {
        let decision = evaluate_results(Vec::new(), 0);
        assert_eq!(
            decision.message(),
            "At least one test case is required. Readiness must be at least 80%"
        );

        let decision = evaluate_results(vec![Fail], 0);
        assert_eq!(
            decision.message(),
            "Readiness must be at least 80%. There are failing tests"
        );
    }

    #[test]
    fn reason_codes_have_wire_spelling() {
        assert_eq!(ReasonCode::NoTests.to_string(), "NO_TESTS");
        assert_eq!(ReasonCode::ReadinessTooLow.to_string(), "READINESS_TOO_LOW");
        assert_eq!(ReasonCode::HasFail.to_string(), "HAS_FAIL");
    }
}
