//! # Prototype Store
//!
//! The persistence collaborator of the lifecycle rules.
//!
//! This module defines the `PrototypeStore` trait and its in-memory
//! implementation. The redb-backed implementation lives in `storage`.
//! All in-memory structures use `BTreeMap` so listings are deterministic
//! (ids are ULIDs, so key order is creation order).

use crate::validation::PrototypePatch;
use crate::{Prototype, PrototypeId, ProtolabError, Status, TestCase, TestCaseId, TestResult};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// PROTOTYPESTORE TRAIT
// =============================================================================

/// Storage operations the registry and lifecycle controller rely on.
///
/// Every mutating method is a single atomic write. Lookups of missing ids
/// return `Ok(None)`; only `insert_test_case` turns a missing owner into an
/// error, so that the existence check and the insert share one write.
pub trait PrototypeStore {
    /// Insert a new prototype record.
    fn insert_prototype(&mut self, prototype: Prototype) -> Result<(), ProtolabError>;

    /// Lookup a prototype by id.
    fn get_prototype(&self, id: &PrototypeId) -> Result<Option<Prototype>, ProtolabError>;

    /// All prototypes in id order.
    fn list_prototypes(&self) -> Result<Vec<Prototype>, ProtolabError>;

    /// Apply a field patch. Returns the updated record, or `None` if absent.
    fn update_prototype(
        &mut self,
        id: &PrototypeId,
        patch: &PrototypePatch,
    ) -> Result<Option<Prototype>, ProtolabError>;

    /// Overwrite the status field only. Returns the updated record, or `None` if absent.
    fn set_status(
        &mut self,
        id: &PrototypeId,
        status: Status,
    ) -> Result<Option<Prototype>, ProtolabError>;

    /// Delete a prototype and all its test cases. Returns whether it existed.
    fn delete_prototype(&mut self, id: &PrototypeId) -> Result<bool, ProtolabError>;

    /// Insert a test case.
    ///
    /// Fails with `PrototypeNotFound` if its owner does not exist.
    fn insert_test_case(&mut self, test: TestCase) -> Result<(), ProtolabError>;

    /// Lookup a test case by id.
    fn get_test_case(&self, id: &TestCaseId) -> Result<Option<TestCase>, ProtolabError>;

    /// Test cases of one prototype in id order. Empty if the prototype is unknown.
    fn tests_for(&self, prototype: &PrototypeId) -> Result<Vec<TestCase>, ProtolabError>;

    /// Overwrite the result of a test case. Returns the updated record, or `None` if absent.
    fn set_test_result(
        &mut self,
        id: &TestCaseId,
        result: TestResult,
    ) -> Result<Option<TestCase>, ProtolabError>;

    /// Delete a test case. Returns whether it existed.
    fn delete_test_case(&mut self, id: &TestCaseId) -> Result<bool, ProtolabError>;

    /// Get the total number of prototypes.
    fn prototype_count(&self) -> Result<usize, ProtolabError>;

    /// Get the total number of test cases.
    fn test_case_count(&self) -> Result<usize, ProtolabError>;
}

// =============================================================================
// IN-MEMORY IMPLEMENTATION
// =============================================================================

/// Volatile store backed by ordered maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Prototype records: PrototypeId -> Prototype
    prototypes: BTreeMap<PrototypeId, Prototype>,

    /// Test case records: TestCaseId -> TestCase
    test_cases: BTreeMap<TestCaseId, TestCase>,

    /// Ownership index: PrototypeId -> {TestCaseId}
    by_prototype: BTreeMap<PrototypeId, BTreeSet<TestCaseId>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrototypeStore for MemoryStore {
    fn insert_prototype(&mut self, prototype: Prototype) -> Result<(), ProtolabError> {
        self.by_prototype.entry(prototype.id.clone()).or_default();
        self.prototypes.insert(prototype.id.clone(), prototype);
        Ok(())
    }

    fn get_prototype(&self, id: &PrototypeId) -> Result<Option<Prototype>, ProtolabError> {
        Ok(self.prototypes.get(id).cloned())
    }

    fn list_prototypes(&self) -> Result<Vec<Prototype>, ProtolabError> {
        Ok(self.prototypes.values().cloned().collect())
    }

    fn update_prototype(
        &mut self,
        id: &PrototypeId,
        patch: &PrototypePatch,
    ) -> Result<Option<Prototype>, ProtolabError> {
        Ok(self.prototypes.get_mut(id).map(|prototype| {
            patch.apply(prototype);
            prototype.clone()
        }))
    }

    fn set_status(
        &mut self,
        id: &PrototypeId,
        status: Status,
    ) -> Result<Option<Prototype>, ProtolabError> {
        Ok(self.prototypes.get_mut(id).map(|prototype| {
            prototype.status = status;
            prototype.clone()
        }))
    }

    fn delete_prototype(&mut self, id: &PrototypeId) -> Result<bool, ProtolabError> {
        if let Some(owned) = self.by_prototype.remove(id) {
            for test_id in owned {
                self.test_cases.remove(&test_id);
            }
        }
        Ok(self.prototypes.remove(id).is_some())
    }

    fn insert_test_case(&mut self, test: TestCase) -> Result<(), ProtolabError> {
        if !self.prototypes.contains_key(&test.prototype_id) {
            return Err(ProtolabError::PrototypeNotFound(test.prototype_id));
        }
        self.by_prototype
            .entry(test.prototype_id.clone())
            .or_default()
            .insert(test.id.clone());
        self.test_cases.insert(test.id.clone(), test);
        Ok(())
    }

    fn get_test_case(&self, id: &TestCaseId) -> Result<Option<TestCase>, ProtolabError> {
        Ok(self.test_cases.get(id).cloned())
    }

    fn tests_for(&self, prototype: &PrototypeId) -> Result<Vec<TestCase>, ProtolabError> {
        let tests = self
            .by_prototype
            .get(prototype)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.test_cases.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tests)
    }

    fn set_test_result(
        &mut self,
        id: &TestCaseId,
        result: TestResult,
    ) -> Result<Option<TestCase>, ProtolabError> {
        Ok(self.test_cases.get_mut(id).map(|test| {
            test.result = result;
            test.clone()
        }))
    }

    fn delete_test_case(&mut self, id: &TestCaseId) -> Result<bool, ProtolabError> {
        let Some(test) = self.test_cases.remove(id) else {
            return Ok(false);
        };
        if let Some(owned) = self.by_prototype.get_mut(&test.prototype_id) {
            owned.remove(id);
        }
        Ok(true)
    }

    fn prototype_count(&self) -> Result<usize, ProtolabError> {
        Ok(self.prototypes.len())
    }

    fn test_case_count(&self) -> Result<usize, ProtolabError> {
        Ok(self.test_cases.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
