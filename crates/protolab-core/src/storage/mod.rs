//! # Storage Module
//!
//! Disk-backed implementations of `PrototypeStore`.

mod redb_store;

pub use redb_store::RedbStore;
