//! # Readiness Calculator
//!
//! Maps the test cases of one prototype to an integer percentage in
//! `[0, 100]`: the share of test cases whose result is PASS.
//!
//! ## Rounding
//!
//! Round-half-up, computed with integers only:
//!
//! ```text
//! readiness = (200 * passed + total) / (2 * total)
//! ```
//!
//! which equals `floor(100 * passed / total + 0.5)`. One passing test out of
//! eight (12.5%) therefore reports 13.

use crate::primitives::READINESS_MAX;
use crate::{TestCase, TestResult};

/// Readiness of a set of test cases.
///
/// Returns 0 for an empty set. The result does not depend on input order.
#[must_use]
pub fn readiness(tests: &[TestCase]) -> u8 {
    readiness_of(tests.iter().map(|t| t.result))
}

/// Readiness of a sequence of results.
///
/// Same rule as [`readiness`], for callers that only hold the results.
#[must_use]
pub fn readiness_of<I>(results: I) -> u8
where
    I: IntoIterator<Item = TestResult>,
{
    let (passed, total) = results
        .into_iter()
        .fold((0u64, 0u64), |(passed, total), result| {
            let passed = if result == TestResult::Pass {
                passed.saturating_add(1)
            } else {
                passed
            };
            (passed, total.saturating_add(1))
        });

    percent_half_up(passed, total)
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
fn percent_half_up(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    // Widened so `200 * part + whole` fits for any u64 input.
    let numerator = u128::from(part) * 200 + u128::from(whole);
    let denominator = u128::from(whole) * 2;
    let percent = numerator / denominator;
    percent.min(u128::from(READINESS_MAX)) as u8
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn results(pass: usize, fail: usize, not_run: usize) -> Vec<TestResult> {
        let mut out = vec![TestResult::Pass; pass];
        out.extend(vec![TestResult::Fail; fail]);
        out.extend(vec![TestResult::NotRun; not_run]);
        out
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(readiness(&[]), 0);
        assert_eq!(readiness_of(Vec::new()), 0);
    }

    #[test]
    fn all_pass_is_hundred() {
        assert_eq!(readiness_of(results(7, 0, 0)), 100);
    }

    #[test]
    fn all_fail_is_zero() {
        assert_eq!(readiness_of(results(0, 5, 0)), 0);
    }

    #[test]
    fn not_run_counts_against_readiness() {
        assert_eq!(readiness_of(results(4, 0, 1)), 80);
        assert_eq!(readiness_of(results(3, 0, 1)), 75);
    }

    #[test]
    fn half_rounds_up() {
        // 1/8 = 12.5%
        assert_eq!(readiness_of(results(1, 0, 7)), 13);
        // 3/8 = 37.5%
        assert_eq!(readiness_of(results(3, 5, 0)), 38);
    }

    #[test]
    fn thirds_round_to_nearest() {
        assert_eq!(readiness_of(results(1, 0, 2)), 33);
        assert_eq!(readiness_of(results(2, 1, 0)), 67);
    }

    #[test]
    fn just_below_half_rounds_down() {
        // 1/201 = 0.4975%
        assert_eq!(readiness_of(results(1, 0, 200)), 0);
    }

    #[test]
    fn percent_helper_bounds() {
        assert_eq!(percent_half_up(0, 0), 0);
        assert_eq!(percent_half_up(5, 5), 100);
        assert_eq!(percent_half_up(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn percent_helper_large_counts() {
        let whole = u64::MAX / 100;
        assert_eq!(percent_half_up(whole, whole), 100);
        assert_eq!(percent_half_up(whole / 2, whole), 50);
        assert_eq!(percent_half_up(0, whole), 0);
        assert_eq!(percent_half_up(u64::MAX / 2, u64::MAX), 50);
    }
}
