//! # Registry Module
//!
//! The service facade every outer surface (HTTP, CLI) talks to.
//!
//! A `Registry` owns one store and exposes the operations of the tracker:
//! prototype CRUD, status advance, test case CRUD and portfolio metrics.
//! Reads return `PrototypeView`s with readiness derived on the spot.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage

use crate::gate::GateDecision;
use crate::lifecycle;
use crate::metrics::PortfolioMetrics;
use crate::readiness::readiness;
use crate::seed;
use crate::storage::RedbStore;
use crate::store::{MemoryStore, PrototypeStore};
use crate::validation::{NewPrototype, NewTestCase, PrototypePatch};
use crate::{Prototype, PrototypeId, PrototypeView, ProtolabError, TestCase, TestCaseId, TestResult};
use std::path::Path;

/// Storage backend for a Registry.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory maps (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// Entry point for all tracker operations.
#[derive(Debug, Default)]
pub struct Registry {
    backend: StorageBackend,
}

impl Registry {
    /// Create a registry with an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, ProtolabError> {
        let redb = RedbStore::open(path)?;
        Ok(Self {
            backend: StorageBackend::Persistent(redb),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    fn store(&self) -> &dyn PrototypeStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    fn store_mut(&mut self) -> &mut dyn PrototypeStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(redb) => redb,
        }
    }

    fn view_of(&self, prototype: Prototype) -> Result<PrototypeView, ProtolabError> {
        let tests = self.store().tests_for(&prototype.id)?;
        Ok(PrototypeView {
            readiness: readiness(&tests),
            prototype,
            tests,
        })
    }

    // =========================================================================
    // PROTOTYPES
    // =========================================================================

    /// Every prototype with its test cases and readiness, in creation order.
    pub fn list(&self) -> Result<Vec<PrototypeView>, ProtolabError> {
        self.store()
            .list_prototypes()?
            .into_iter()
            .map(|prototype| self.view_of(prototype))
            .collect()
    }

    /// One prototype with its test cases and readiness.
    pub fn get(&self, id: &PrototypeId) -> Result<PrototypeView, ProtolabError> {
        let prototype = self
            .store()
            .get_prototype(id)?
            .ok_or_else(|| ProtolabError::PrototypeNotFound(id.clone()))?;
        self.view_of(prototype)
    }

    /// Create a prototype in status DESIGN.
    pub fn create(&mut self, input: NewPrototype) -> Result<Prototype, ProtolabError> {
        let prototype = input.into_prototype();
        self.store_mut().insert_prototype(prototype.clone())?;
        Ok(prototype)
    }

    /// Apply a field edit. An empty patch returns the record unchanged.
    pub fn edit(
        &mut self,
        id: &PrototypeId,
        patch: &PrototypePatch,
    ) -> Result<Prototype, ProtolabError> {
        let updated = if patch.is_empty() {
            self.store().get_prototype(id)?
        } else {
            self.store_mut().update_prototype(id, patch)?
        };
        updated.ok_or_else(|| ProtolabError::PrototypeNotFound(id.clone()))
    }

    /// Advance a prototype one lifecycle step.
    pub fn advance(&mut self, id: &PrototypeId) -> Result<Prototype, ProtolabError> {
        lifecycle::advance(self.store_mut(), id)
    }

    /// Evaluate the release gate for a prototype without changing it.
    pub fn release_check(&self, id: &PrototypeId) -> Result<GateDecision, ProtolabError> {
        if self.store().get_prototype(id)?.is_none() {
            return Err(ProtolabError::PrototypeNotFound(id.clone()));
        }
        lifecycle::release_check(self.store(), id)
    }

    /// Delete a prototype and its test cases. Returns whether it existed.
    pub fn delete(&mut self, id: &PrototypeId) -> Result<bool, ProtolabError> {
        self.store_mut().delete_prototype(id)
    }

    // =========================================================================
    // TEST CASES
    // =========================================================================

    /// Attach a new test case (result NOT_RUN) to an existing prototype.
    pub fn create_test_case(&mut self, input: NewTestCase) -> Result<TestCase, ProtolabError> {
        let test = input.into_test_case();
        self.store_mut().insert_test_case(test.clone())?;
        Ok(test)
    }

    /// Record the outcome of a test case, whatever its prototype's status.
    pub fn update_test_result(
        &mut self,
        id: &TestCaseId,
        result: TestResult,
    ) -> Result<TestCase, ProtolabError> {
        self.store_mut()
            .set_test_result(id, result)?
            .ok_or_else(|| ProtolabError::TestCaseNotFound(id.clone()))
    }

    /// Delete a test case. Returns whether it existed.
    pub fn delete_test_case(&mut self, id: &TestCaseId) -> Result<bool, ProtolabError> {
        self.store_mut().delete_test_case(id)
    }

    // =========================================================================
    // PORTFOLIO
    // =========================================================================

    /// Counts over the whole portfolio.
    pub fn metrics(&self) -> Result<PortfolioMetrics, ProtolabError> {
        Ok(PortfolioMetrics::from_views(&self.list()?))
    }

    /// Insert the demo portfolio if empty. Returns the number of prototypes added.
    pub fn seed_demo(&mut self) -> Result<usize, ProtolabError> {
        seed::seed_demo(self.store_mut())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::validation::Validator;
    use crate::{Area, Status};
    use tempfile::tempdir;

    fn create(registry: &mut Registry, name: &str) -> Prototype {
        let input = Validator::new_prototype(
            Some(name),
            Some("Space"),
            Some("Giulia Neri"),
            Some("2026-03-10"),
        )
        .expect("valid");
        registry.create(input).expect("create")
    }

    fn add_test(registry: &mut Registry, owner: &PrototypeId, result: TestResult) -> TestCase {
        let input = Validator::new_test_case(Some(owner.as_str()), Some("Check"), Some("FUNCTIONAL"))
            .expect("valid");
        let test = registry.create_test_case(input).expect("create test");
        registry
            .update_test_result(&test.id, result)
            .expect("set result")
    }

    #[test]
    fn create_starts_in_design() {
        let mut registry = Registry::new();
        let p = create(&mut registry, "Radiation Hardened PCB");
        assert_eq!(p.status, Status::Design);

        let view = registry.get(&p.id).expect("get");
        assert_eq!(view.readiness, 0);
        assert!(view.tests.is_empty());
    }

    #[test]
    fn readiness_is_derived_on_read() {
        let mut registry = Registry::new();
        let p = create(&mut registry, "Thermal Shield v2");
        let t = add_test(&mut registry, &p.id, TestResult::Pass);
        add_test(&mut registry, &p.id, TestResult::Fail);
        assert_eq!(registry.get(&p.id).expect("get").readiness, 50);

        registry
            .update_test_result(&t.id, TestResult::Fail)
            .expect("update");
        assert_eq!(registry.get(&p.id).expect("get").readiness, 0);
    }

    #[test]
    fn empty_edit_returns_current_record() {
        let mut registry = Registry::new();
        let p = create(&mut registry, "Robotic Arm Joint");

        let unchanged = registry
            .edit(&p.id, &PrototypePatch::default())
            .expect("edit");
        assert_eq!(unchanged, p);

        let missing = registry.edit(&PrototypeId::new("nope"), &PrototypePatch::default());
        assert!(matches!(missing, Err(ProtolabError::PrototypeNotFound(_))));
    }

    #[test]
    fn edit_changes_fields_not_status() {
        let mut registry = Registry::new();
        let p = create(&mut registry, "LiDAR Sensor Module");
        registry.advance(&p.id).expect("advance");

        let patch = Validator::prototype_patch(None, Some("Automotive"), None, None)
            .expect("valid patch");
        let edited = registry.edit(&p.id, &patch).expect("edit");
        assert_eq!(edited.area, Area::Automotive);
        assert_eq!(edited.status, Status::Build);
    }

    #[test]
    fn test_case_for_missing_prototype() {
        let mut registry = Registry::new();
        let input = Validator::new_test_case(Some("missing"), Some("Orphan"), Some("INTEGRATION"))
            .expect("valid shape");
        let err = registry.create_test_case(input).expect_err("no owner");
        assert!(matches!(err, ProtolabError::PrototypeNotFound(_)));
    }

    #[test]
    fn unknown_test_case_update() {
        let mut registry = Registry::new();
        let err = registry
            .update_test_result(&TestCaseId::new("nope"), TestResult::Pass)
            .expect_err("missing");
        assert!(matches!(err, ProtolabError::TestCaseNotFound(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut registry = Registry::new();
        let p = create(&mut registry, "Thermal Shield v2");
        let t = add_test(&mut registry, &p.id, TestResult::Pass);

        assert!(registry.delete(&p.id).expect("delete"));
        assert!(!registry.delete(&p.id).expect("delete again"));
        assert!(!registry.delete_test_case(&t.id).expect("cascaded"));
        assert!(registry.list().expect("list").is_empty());
    }

    #[test]
    fn release_check_requires_prototype() {
        let registry = Registry::new();
        let err = registry
            .release_check(&PrototypeId::new("nope"))
            .expect_err("missing");
        assert!(err.is_not_found());
    }

    #[test]
    fn persistent_registry_roundtrip() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("registry.redb");

        let id = {
            let mut registry = Registry::with_redb(&db_path).expect("open");
            assert!(registry.is_persistent());
            match registry.backend() {
                StorageBackend::Persistent(redb) => assert_eq!(redb.path(), db_path.as_path()),
                StorageBackend::InMemory(_) => panic!("expected redb backend"),
            }
            assert_eq!(registry.seed_demo().expect("seed"), 4);
            let p = create(&mut registry, "Sample Rig");
            add_test(&mut registry, &p.id, TestResult::Pass);
            p.id
        };

        let registry = Registry::with_redb(&db_path).expect("reopen");
        assert_eq!(registry.list().expect("list").len(), 5);
        assert_eq!(registry.get(&id).expect("get").readiness, 100);

        let metrics = registry.metrics().expect("metrics");
        assert_eq!(metrics.prototype_count, 5);
        assert_eq!(metrics.test_case_count, 12);
        assert_eq!(metrics.by_status.design, 2);
        assert_eq!(metrics.releasable, 0);
    }
}
