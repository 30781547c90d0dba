//! # Lifecycle Scenarios
//!
//! End-to-end walks through the registry, run against both backends.

#![allow(clippy::unwrap_used, clippy::panic)]

use protolab_core::{
    ProtolabError, PrototypeId, ReasonCode, Registry, Status, TestResult, Validator,
};
use tempfile::TempDir;

// =============================================================================
// HELPERS
// =============================================================================

fn backends() -> Vec<(Registry, Option<TempDir>)> {
    let temp = tempfile::tempdir().expect("temp dir");
    let redb = Registry::with_redb(temp.path().join("lifecycle.redb")).expect("open redb");
    vec![(Registry::new(), None), (redb, Some(temp))]
}

fn create(registry: &mut Registry, name: &str) -> PrototypeId {
    let input = Validator::new_prototype(
        Some(name),
        Some("Industrial"),
        Some("Alessandro Verdi"),
        Some("2026-08-01"),
    )
    .expect("valid prototype");
    registry.create(input).expect("create").id
}

fn add_tests(registry: &mut Registry, id: &PrototypeId, results: &[TestResult]) {
    for (i, result) in results.iter().enumerate() {
        let title = format!("Check {}", i);
        let input = Validator::new_test_case(Some(id.as_str()), Some(&title), Some("FUNCTIONAL"))
            .expect("valid test case");
        let test = registry.create_test_case(input).expect("create test");
        registry
            .update_test_result(&test.id, *result)
            .expect("set result");
    }
}

fn advance_to(registry: &mut Registry, id: &PrototypeId, target: Status) {
    while registry.get(id).expect("get").prototype.status != target {
        registry.advance(id).expect("advance");
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn design_without_tests_advances_to_build() {
    for (mut registry, _guard) in backends() {
        let id = create(&mut registry, "Robotic Arm Joint");
        let updated = registry.advance(&id).expect("advance");
        assert_eq!(updated.status, Status::Build);
    }
}

#[test]
fn test_with_readiness_80_advances_to_ready() {
    use TestResult::{NotRun, Pass};
    for (mut registry, _guard) in backends() {
        let id = create(&mut registry, "Thermal Shield v2");
        add_tests(&mut registry, &id, &[Pass, Pass, Pass, Pass, NotRun]);
        advance_to(&mut registry, &id, Status::Test);

        assert_eq!(registry.get(&id).expect("get").readiness, 80);
        let updated = registry.advance(&id).expect("advance");
        assert_eq!(updated.status, Status::Ready);
    }
}

#[test]
fn ready_cannot_advance() {
    for (mut registry, _guard) in backends() {
        let id = create(&mut registry, "Radiation Hardened PCB");
        add_tests(&mut registry, &id, &[TestResult::Pass]);
        advance_to(&mut registry, &id, Status::Ready);

        let err = registry.advance(&id).expect_err("terminal");
        assert!(matches!(err, ProtolabError::InvalidTransition(Status::Ready)));
        assert_eq!(err.to_string(), "Prototype is already READY");
        assert_eq!(
            registry.get(&id).expect("get").prototype.status,
            Status::Ready
        );
    }
}

#[test]
fn gate_blocks_failing_prototype() {
    use TestResult::{Fail, Pass};
    for (mut registry, _guard) in backends() {
        let id = create(&mut registry, "LiDAR Sensor Module");
        add_tests(&mut registry, &id, &[Pass, Fail]);
        advance_to(&mut registry, &id, Status::Test);

        match registry.advance(&id) {
            Err(ProtolabError::GateRejected(decision)) => {
                assert_eq!(
                    decision.reasons,
                    vec![ReasonCode::ReadinessTooLow, ReasonCode::HasFail]
                );
                assert_eq!(
                    decision.message(),
                    "Readiness must be at least 80%. There are failing tests"
                );
            }
            other => panic!("expected gate rejection, got {other:?}"),
        }
        assert_eq!(
            registry.get(&id).expect("get").prototype.status,
            Status::Test
        );
    }
}

#[test]
fn fixing_results_unblocks_release() {
    use TestResult::{Fail, Pass};
    for (mut registry, _guard) in backends() {
        let id = create(&mut registry, "Thermal Shield v2");
        add_tests(&mut registry, &id, &[Pass, Pass, Pass, Pass, Fail]);
        advance_to(&mut registry, &id, Status::Test);
        assert!(registry.advance(&id).is_err());

        let failing = registry
            .get(&id)
            .expect("get")
            .tests
            .into_iter()
            .find(|t| t.result == Fail)
            .expect("failing test");
        registry
            .update_test_result(&failing.id, Pass)
            .expect("fix result");

        assert_eq!(registry.advance(&id).expect("advance").status, Status::Ready);
    }
}

#[test]
fn deleting_prototype_removes_its_tests() {
    for (mut registry, _guard) in backends() {
        let doomed = create(&mut registry, "Thermal Shield v2");
        let kept = create(&mut registry, "LiDAR Sensor Module");
        add_tests(&mut registry, &doomed, &[TestResult::Pass; 3]);
        add_tests(&mut registry, &kept, &[TestResult::NotRun]);

        assert!(registry.delete(&doomed).expect("delete"));
        assert!(registry.get(&doomed).expect_err("gone").is_not_found());

        let metrics = registry.metrics().expect("metrics");
        assert_eq!(metrics.prototype_count, 1);
        assert_eq!(metrics.test_case_count, 1);
    }
}

#[test]
fn results_stay_editable_after_ready() {
    for (mut registry, _guard) in backends() {
        let id = create(&mut registry, "Radiation Hardened PCB");
        add_tests(&mut registry, &id, &[TestResult::Pass]);
        advance_to(&mut registry, &id, Status::Ready);

        let test_id = registry.get(&id).expect("get").tests[0].id.clone();
        registry
            .update_test_result(&test_id, TestResult::Fail)
            .expect("update");

        let view = registry.get(&id).expect("get");
        assert_eq!(view.prototype.status, Status::Ready);
        assert_eq!(view.readiness, 0);
    }
}

#[test]
fn rounding_examples() {
    use TestResult::{NotRun, Pass};
    let cases: [(&[TestResult], u8); 3] = [
        (&[Pass, NotRun, NotRun, NotRun, NotRun, NotRun, NotRun, NotRun], 13),
        (&[Pass, NotRun, NotRun], 33),
        (&[Pass, Pass, NotRun], 67),
    ];
    for (mut registry, _guard) in backends() {
        for (results, expected) in cases {
            let id = create(&mut registry, "Rounding Rig");
            add_tests(&mut registry, &id, results);
            assert_eq!(registry.get(&id).expect("get").readiness, expected);
        }
    }
}
