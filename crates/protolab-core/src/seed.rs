//! # Demo Seed
//!
//! A small demo portfolio, one prototype per lifecycle status.
//!
//! Seeding writes records directly through the store, so the statuses are
//! set as listed rather than reached through `advance`. It only runs on an
//! empty store.

use crate::store::PrototypeStore;
use crate::{
    Area, Prototype, PrototypeId, ProtolabError, Status, TestCase, TestCaseId, TestResult,
    TestType,
};

struct DemoPrototype {
    name: &'static str,
    area: Area,
    owner: &'static str,
    target_date: &'static str,
    status: Status,
    tests: &'static [(&'static str, TestType, TestResult)],
}

const DEMO: [DemoPrototype; 4] = [
    DemoPrototype {
        name: "Thermal Shield v2",
        area: Area::Space,
        owner: "Marco Rossi",
        target_date: "2026-06-15",
        status: Status::Test,
        tests: &[
            ("Thermal resistance at 200C", TestType::Environmental, TestResult::Pass),
            ("Vibration stress test", TestType::Environmental, TestResult::Pass),
            ("UV degradation check", TestType::Functional, TestResult::NotRun),
            ("Shield integration with chassis", TestType::Integration, TestResult::Pass),
        ],
    },
    DemoPrototype {
        name: "LiDAR Sensor Module",
        area: Area::Automotive,
        owner: "Elena Bianchi",
        target_date: "2026-04-20",
        status: Status::Build,
        tests: &[
            ("Range accuracy test", TestType::Functional, TestResult::NotRun),
            ("Rain interference test", TestType::Environmental, TestResult::NotRun),
        ],
    },
    DemoPrototype {
        name: "Robotic Arm Joint",
        area: Area::Industrial,
        owner: "Alessandro Verdi",
        target_date: "2026-08-01",
        status: Status::Design,
        tests: &[],
    },
    DemoPrototype {
        name: "Radiation Hardened PCB",
        area: Area::Space,
        owner: "Giulia Neri",
        target_date: "2026-03-10",
        status: Status::Ready,
        tests: &[
            ("Radiation tolerance 50krad", TestType::Environmental, TestResult::Pass),
            ("Signal integrity check", TestType::Functional, TestResult::Pass),
            ("Power module integration", TestType::Integration, TestResult::Pass),
            ("Thermal cycling -40C to 85C", TestType::Environmental, TestResult::Pass),
            ("EMI compliance test", TestType::Functional, TestResult::Pass),
        ],
    },
];

/// Insert the demo portfolio if the store holds no prototypes.
///
/// Returns the number of prototypes inserted (0 when the store was not empty).
pub fn seed_demo<S>(store: &mut S) -> Result<usize, ProtolabError>
where
    S: PrototypeStore + ?Sized,
{
    if store.prototype_count()? > 0 {
        return Ok(0);
    }

    for demo in &DEMO {
        let id = PrototypeId::generate();
        store.insert_prototype(Prototype {
            id: id.clone(),
            name: demo.name.to_string(),
            area: demo.area,
            owner: demo.owner.to_string(),
            target_date: demo.target_date.to_string(),
            status: demo.status,
        })?;

        for (title, test_type, result) in demo.tests {
            store.insert_test_case(TestCase {
                id: TestCaseId::generate(),
                prototype_id: id.clone(),
                title: (*title).to_string(),
                test_type: *test_type,
                result: *result,
            })?;
        }
    }

    Ok(DEMO.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::readiness::readiness;
    use crate::store::MemoryStore;

    #[test]
    fn seeds_empty_store_once() {
        let mut store = MemoryStore::new();
        assert_eq!(seed_demo(&mut store).expect("seed"), 4);
        assert_eq!(store.prototype_count().expect("count"), 4);
        assert_eq!(store.test_case_count().expect("count"), 11);

        assert_eq!(seed_demo(&mut store).expect("seed again"), 0);
        assert_eq!(store.prototype_count().expect("count"), 4);
    }

    #[test]
    fn demo_readiness() {
        let mut store = MemoryStore::new();
        seed_demo(&mut store).expect("seed");

        for prototype in store.list_prototypes().expect("list") {
            let tests = store.tests_for(&prototype.id).expect("tests");
            let expected = match prototype.name.as_str() {
                "Thermal Shield v2" => 75,
                "LiDAR Sensor Module" | "Robotic Arm Joint" => 0,
                "Radiation Hardened PCB" => 100,
                other => panic!("unexpected demo prototype {other}"),
            };
            assert_eq!(readiness(&tests), expected, "{}", prototype.name);
        }
    }
}
