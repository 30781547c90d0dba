//! # Property-Based Tests
//!
//! Invariants of the readiness calculator and the release gate,
//! checked with proptest over arbitrary result sets.

use protolab_core::{ReasonCode, TestResult, gate, readiness_of};
use proptest::collection::vec;
use proptest::prelude::*;

fn any_result() -> impl Strategy<Value = TestResult> {
    prop_oneof![
        Just(TestResult::NotRun),
        Just(TestResult::Pass),
        Just(TestResult::Fail),
    ]
}

fn pass_count(results: &[TestResult]) -> usize {
    results.iter().filter(|r| **r == TestResult::Pass).count()
}

// =============================================================================
// READINESS
// =============================================================================

proptest! {
    /// Readiness always lands in [0, 100].
    #[test]
    fn readiness_is_bounded(results in vec(any_result(), 0..200)) {
        let r = readiness_of(results.iter().copied());
        prop_assert!(r <= 100);
    }

    /// Reordering the test cases never changes readiness.
    #[test]
    fn readiness_ignores_order(results in vec(any_result(), 1..64)) {
        let forward = readiness_of(results.iter().copied());
        let backward = readiness_of(results.iter().rev().copied());

        let mut sorted = results.clone();
        sorted.sort();
        let by_kind = readiness_of(sorted);

        prop_assert_eq!(forward, backward);
        prop_assert_eq!(forward, by_kind);
    }

    /// Readiness equals 100·pass/total rounded half up.
    #[test]
    fn readiness_rounds_half_up(results in vec(any_result(), 1..500)) {
        let pass = pass_count(&results);
        let total = results.len();
        let r = usize::from(readiness_of(results.iter().copied()));

        // r is the nearest integer, ties going up: |100·pass - r·total| ≤ total/2
        let exact = 100 * pass;
        let scaled = r * total;
        let diff = exact.abs_diff(scaled);
        prop_assert!(2 * diff <= total);
        if 2 * diff == total {
            prop_assert!(scaled > exact);
        }
    }

    /// Only PASS results move readiness; FAIL and NOT_RUN weigh the same.
    #[test]
    fn fail_and_not_run_are_equivalent(results in vec(any_result(), 1..64)) {
        let swapped: Vec<TestResult> = results
            .iter()
            .map(|r| match r {
                TestResult::Fail => TestResult::NotRun,
                TestResult::NotRun => TestResult::Fail,
                TestResult::Pass => TestResult::Pass,
            })
            .collect();
        prop_assert_eq!(
            readiness_of(results.iter().copied()),
            readiness_of(swapped)
        );
    }
}

// =============================================================================
// RELEASE GATE
// =============================================================================

proptest! {
    /// allowed ⟺ non-empty ∧ readiness ≥ 80 ∧ no FAIL.
    #[test]
    fn gate_matches_predicate(
        results in vec(any_result(), 0..32),
        readiness in 0u8..=100
    ) {
        let decision = gate::evaluate_results(results.iter().copied(), readiness);
        let expected = !results.is_empty()
            && readiness >= 80
            && !results.contains(&TestResult::Fail);

        prop_assert_eq!(decision.allowed, expected);
        prop_assert_eq!(decision.allowed, decision.reasons.is_empty());
    }

    /// Reasons are emitted without duplicates, in NO_TESTS, READINESS_TOO_LOW, HAS_FAIL order.
    #[test]
    fn gate_reasons_are_ordered(
        results in vec(any_result(), 0..32),
        readiness in 0u8..=100
    ) {
        let decision = gate::evaluate_results(results, readiness);
        prop_assert!(decision.reasons.windows(2).all(|w| w[0] < w[1]));
    }

    /// With readiness computed from the same set, a FAIL always blocks release
    /// and an empty set always reports two reasons.
    #[test]
    fn gate_with_derived_readiness(results in vec(any_result(), 0..32)) {
        let readiness = readiness_of(results.iter().copied());
        let decision = gate::evaluate_results(results.iter().copied(), readiness);

        if results.is_empty() {
            prop_assert_eq!(
                decision.reasons.clone(),
                vec![ReasonCode::NoTests, ReasonCode::ReadinessTooLow]
            );
        }
        if results.contains(&TestResult::Fail) {
            prop_assert!(decision.reasons.contains(&ReasonCode::HasFail));
        }
        if results.iter().all(|r| *r == TestResult::Pass) && !results.is_empty() {
            prop_assert!(decision.allowed);
        }
    }
}
