//! # redb-backed Prototype Storage
//!
//! A disk-backed `PrototypeStore` using the redb embedded database:
//! - ACID transactions, one per mutating call
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! Records are postcard-encoded. Ownership of test cases is kept in a
//! multimap so a prototype's tests can be listed and cascaded without a
//! full scan.

use crate::store::PrototypeStore;
use crate::validation::PrototypePatch;
use crate::{Prototype, PrototypeId, ProtolabError, Status, TestCase, TestCaseId, TestResult};
use redb::{
    Database, MultimapTableDefinition, ReadableDatabase,
    ReadableTable, ReadableTableMetadata, TableDefinition,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Table for prototypes: PrototypeId -> serialized Prototype bytes
const PROTOTYPES: TableDefinition<&str, &[u8]> = TableDefinition::new("prototypes");

/// Table for test cases: TestCaseId -> serialized TestCase bytes
const TEST_CASES: TableDefinition<&str, &[u8]> = TableDefinition::new("test_cases");

/// Ownership index: PrototypeId -> {TestCaseId}
const TESTS_BY_PROTOTYPE: MultimapTableDefinition<&str, &str> =
    MultimapTableDefinition::new("tests_by_prototype");

fn io_err(e: impl std::fmt::Display) -> ProtolabError {
    ProtolabError::IoError(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtolabError> {
    postcard::to_allocvec(value).map_err(|e| ProtolabError::SerializationError(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtolabError> {
    postcard::from_bytes(bytes).map_err(|e| ProtolabError::DeserializationError(e.to_string()))
}

/// A disk-backed prototype store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Where the database lives, for diagnostics.
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProtolabError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(PROTOTYPES).map_err(io_err)?;
            let _ = write_txn.open_table(TEST_CASES).map_err(io_err)?;
            let _ = write_txn
                .open_multimap_table(TESTS_BY_PROTOTYPE)
                .map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Path of the underlying database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-modify-write a prototype inside one transaction.
    fn modify_prototype(
        &mut self,
        id: &PrototypeId,
        change: impl FnOnce(&mut Prototype),
    ) -> Result<Option<Prototype>, ProtolabError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let updated = {
            let mut table = write_txn.open_table(PROTOTYPES).map_err(io_err)?;
            let current = table
                .get(id.as_str())
                .map_err(io_err)?
                .map(|data| data.value().to_vec());
            match current {
                Some(bytes) => {
                    let mut prototype: Prototype = decode(&bytes)?;
                    change(&mut prototype);
                    let encoded = encode(&prototype)?;
                    table
                        .insert(id.as_str(), encoded.as_slice())
                        .map_err(io_err)?;
                    Some(prototype)
                }
                None => None,
            }
        };
        if updated.is_some() {
            write_txn.commit().map_err(io_err)?;
        }
        Ok(updated)
    }
}

// =============================================================================
// PROTOTYPESTORE TRAIT IMPLEMENTATION
// =============================================================================

impl PrototypeStore for RedbStore {
    fn insert_prototype(&mut self, prototype: Prototype) -> Result<(), ProtolabError> {
        let encoded = encode(&prototype)?;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(PROTOTYPES).map_err(io_err)?;
            table
                .insert(prototype.id.as_str(), encoded.as_slice())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn get_prototype(&self, id: &PrototypeId) -> Result<Option<Prototype>, ProtolabError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(PROTOTYPES).map_err(io_err)?;
        match table.get(id.as_str()).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn list_prototypes(&self) -> Result<Vec<Prototype>, ProtolabError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(PROTOTYPES).map_err(io_err)?;

        let mut prototypes = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            prototypes.push(decode(value.value())?);
        }
        Ok(prototypes)
    }

    fn update_prototype(
        &mut self,
        id: &PrototypeId,
        patch: &PrototypePatch,
    ) -> Result<Option<Prototype>, ProtolabError> {
        self.modify_prototype(id, |prototype| patch.apply(prototype))
    }

    fn set_status(
        &mut self,
        id: &PrototypeId,
        status: Status,
    ) -> Result<Option<Prototype>, ProtolabError> {
        self.modify_prototype(id, |prototype| prototype.status = status)
    }

    fn delete_prototype(&mut self, id: &PrototypeId) -> Result<bool, ProtolabError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let existed = {
            let mut index = write_txn
                .open_multimap_table(TESTS_BY_PROTOTYPE)
                .map_err(io_err)?;
            let mut owned = Vec::new();
            for entry in index.remove_all(id.as_str()).map_err(io_err)? {
                owned.push(entry.map_err(io_err)?.value().to_string());
            }

            let mut tests = write_txn.open_table(TEST_CASES).map_err(io_err)?;
            for test_id in &owned {
                tests.remove(test_id.as_str()).map_err(io_err)?;
            }

            let mut prototypes = write_txn.open_table(PROTOTYPES).map_err(io_err)?;
            prototypes.remove(id.as_str()).map_err(io_err)?.is_some()
        };
        write_txn.commit().map_err(io_err)?;
        Ok(existed)
    }

    fn insert_test_case(&mut self, test: TestCase) -> Result<(), ProtolabError> {
        let encoded = encode(&test)?;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let prototypes = write_txn.open_table(PROTOTYPES).map_err(io_err)?;
            let owner_exists = prototypes
                .get(test.prototype_id.as_str())
                .map_err(io_err)?
                .is_some();
            if !owner_exists {
                // Dropping the transaction aborts it.
                return Err(ProtolabError::PrototypeNotFound(test.prototype_id));
            }
        }
        {
            let mut tests = write_txn.open_table(TEST_CASES).map_err(io_err)?;
            tests
                .insert(test.id.as_str(), encoded.as_slice())
                .map_err(io_err)?;
        }
        {
            let mut index = write_txn
                .open_multimap_table(TESTS_BY_PROTOTYPE)
                .map_err(io_err)?;
            index
                .insert(test.prototype_id.as_str(), test.id.as_str())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn get_test_case(&self, id: &TestCaseId) -> Result<Option<TestCase>, ProtolabError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(TEST_CASES).map_err(io_err)?;
        match table.get(id.as_str()).map_err(io_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn tests_for(&self, prototype: &PrototypeId) -> Result<Vec<TestCase>, ProtolabError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let index = read_txn
            .open_multimap_table(TESTS_BY_PROTOTYPE)
            .map_err(io_err)?;
        let table = read_txn.open_table(TEST_CASES).map_err(io_err)?;

        let mut tests = Vec::new();
        for entry in index.get(prototype.as_str()).map_err(io_err)? {
            let test_id = entry.map_err(io_err)?;
            if let Some(data) = table.get(test_id.value()).map_err(io_err)? {
                tests.push(decode(data.value())?);
            }
        }
        Ok(tests)
    }

    fn set_test_result(
        &mut self,
        id: &TestCaseId,
        result: TestResult,
    ) -> Result<Option<TestCase>, ProtolabError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let updated = {
            let mut table = write_txn.open_table(TEST_CASES).map_err(io_err)?;
            let current = table
                .get(id.as_str())
                .map_err(io_err)?
                .map(|data| data.value().to_vec());
            match current {
                Some(bytes) => {
                    let mut test: TestCase = decode(&bytes)?;
                    test.result = result;
                    let encoded = encode(&test)?;
                    table
                        .insert(id.as_str(), encoded.as_slice())
                        .map_err(io_err)?;
                    Some(test)
                }
                None => None,
            }
        };
        if updated.is_some() {
            write_txn.commit().map_err(io_err)?;
        }
        Ok(updated)
    }

    fn delete_test_case(&mut self, id: &TestCaseId) -> Result<bool, ProtolabError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let existed = {
            let mut tests = write_txn.open_table(TEST_CASES).map_err(io_err)?;
            let removed = tests
                .remove(id.as_str())
                .map_err(io_err)?
                .map(|data| data.value().to_vec());
            match removed {
                Some(bytes) => {
                    let test: TestCase = decode(&bytes)?;
                    let mut index = write_txn
                        .open_multimap_table(TESTS_BY_PROTOTYPE)
                        .map_err(io_err)?;
                    index
                        .remove(test.prototype_id.as_str(), id.as_str())
                        .map_err(io_err)?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit().map_err(io_err)?;
        Ok(existed)
    }

    fn prototype_count(&self) -> Result<usize, ProtolabError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(PROTOTYPES).map_err(io_err)?;
        let count = table.len().map_err(io_err)?;
        Ok(count as usize)
    }

    fn test_case_count(&self) -> Result<usize, ProtolabError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(TEST_CASES).map_err(io_err)?;
        let count = table.len().map_err(io_err)?;
        Ok(count as usize)
    }
}
