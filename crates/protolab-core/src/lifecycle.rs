//! # Lifecycle Controller
//!
//! Moves a prototype one step along DESIGN → BUILD → TEST → READY.
//!
//! There is no operation that sets a status directly. Entering READY is
//! the only guarded step: readiness is recomputed from the stored test
//! cases and the release gate must allow it. A rejected or failed advance
//! leaves the record untouched.

use crate::gate::{self, GateDecision};
use crate::readiness::readiness;
use crate::store::PrototypeStore;
use crate::{Prototype, PrototypeId, ProtolabError, Status};

/// Advance a prototype to its next status.
///
/// # Errors
///
/// - `PrototypeNotFound` if no prototype has this id
/// - `InvalidTransition` if it is already READY
/// - `GateRejected` if TEST → READY is blocked by the gate
pub fn advance<S>(store: &mut S, id: &PrototypeId) -> Result<Prototype, ProtolabError>
where
    S: PrototypeStore + ?Sized,
{
    let current = store
        .get_prototype(id)?
        .ok_or_else(|| ProtolabError::PrototypeNotFound(id.clone()))?;

    let Some(next) = current.status.next() else {
        return Err(ProtolabError::InvalidTransition(current.status));
    };

    if next == Status::Ready {
        let decision = release_check(store, id)?;
        if !decision.allowed {
            return Err(ProtolabError::GateRejected(decision));
        }
    }

    store
        .set_status(id, next)?
        .ok_or_else(|| ProtolabError::PrototypeNotFound(id.clone()))
}

/// Evaluate the release gate against the stored test cases of a prototype.
///
/// Does not look at the prototype's current status.
pub fn release_check<S>(store: &S, id: &PrototypeId) -> Result<GateDecision, ProtolabError>
where
    S: PrototypeStore + ?Sized,
{
    let tests = store.tests_for(id)?;
    Ok(gate::evaluate(&tests, readiness(&tests)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::gate::ReasonCode;
    use crate::store::MemoryStore;
    use crate::{Area, TestCase, TestCaseId, TestResult, TestType};

    fn seeded(status: Status, results: &[TestResult]) -> (MemoryStore, PrototypeId) {
        let mut store = MemoryStore::new();
        let id = PrototypeId::generate();
        store
            .insert_prototype(Prototype {
                id: id.clone(),
                name: "Thermal Shield v2".to_string(),
                area: Area::Space,
                owner: "Marco Rossi".to_string(),
                target_date: "2026-06-15".to_string(),
                status,
            })
            .expect("insert");
        for (i, result) in results.iter().enumerate() {
            store
                .insert_test_case(TestCase {
                    id: TestCaseId::generate(),
                    prototype_id: id.clone(),
                    title: format!("Check {}", i),
                    test_type: TestType::Functional,
                    result: *result,
                })
                .expect("insert test");
        }
        (store, id)
    }

    #[test]
    fn ungated_steps_ignore_tests() {
        let (mut store, id) = seeded(Status::Design, &[TestResult::Fail]);
        assert_eq!(advance(&mut store, &id).expect("advance").status, Status::Build);
        assert_eq!(advance(&mut store, &id).expect("advance").status, Status::Test);
    }

    #[test]
    fn ready_is_terminal() {
        let (mut store, id) = seeded(Status::Ready, &[TestResult::Pass]);
        let err = advance(&mut store, &id).expect_err("terminal");
        assert!(matches!(err, ProtolabError::InvalidTransition(Status::Ready)));
    }

    #[test]
    fn unknown_prototype() {
        let mut store = MemoryStore::new();
        let err = advance(&mut store, &PrototypeId::new("nope")).expect_err("missing");
        assert!(err.is_not_found());
    }

    #[test]
    fn gate_rejection_leaves_status() {
        let (mut store, id) = seeded(Status::Test, &[]);
        let err = advance(&mut store, &id).expect_err("gated");
        match err {
            ProtolabError::GateRejected(decision) => assert_eq!(
                decision.reasons,
                vec![ReasonCode::NoTests, ReasonCode::ReadinessTooLow]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        let stored = store.get_prototype(&id).expect("get").expect("present");
        assert_eq!(stored.status, Status::Test);
    }

    #[test]
    fn gate_allows_at_threshold() {
        use TestResult::{NotRun, Pass};
        let (mut store, id) = seeded(Status::Test, &[Pass, Pass, Pass, Pass, NotRun]);
        assert_eq!(advance(&mut store, &id).expect("advance").status, Status::Ready);
    }

    #[test]
    fn release_check_reports_fail() {
        use TestResult::{Fail, Pass};
        let (store, id) = seeded(Status::Build, &[Pass, Pass, Pass, Pass, Pass, Fail]);
        let decision = release_check(&store, &id).expect("check");
        assert_eq!(decision.reasons, vec![ReasonCode::HasFail]);
    }
}
