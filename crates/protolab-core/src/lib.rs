//! # protolab-core
//!
//! The readiness engine for Protolab - THE LOGIC.
//!
//! This crate tracks hardware prototypes through a fixed lifecycle
//! (DESIGN → BUILD → TEST → READY) and decides when a prototype may be
//! released, based on the outcomes of its test cases.
//!
//! ## Layout
//!
//! - `readiness` and `gate` are pure functions over test cases
//! - `lifecycle` applies the transition table and consults the gate
//! - `store` / `storage` persist records (in-memory or redb)
//! - `registry` is the facade used by the HTTP server and the CLI
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Integer arithmetic only
//! - Readiness is never stored; it is derived on every read

// =============================================================================
// MODULES
// =============================================================================

pub mod gate;
pub mod lifecycle;
pub mod metrics;
pub mod primitives;
pub mod readiness;
pub mod registry;
pub mod seed;
pub mod storage;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Area, FieldError, ProtolabError, Prototype, PrototypeId, PrototypeView, Status, TestCase,
    TestCaseId, TestResult, TestType, ValidationErrors,
};

// =============================================================================
// RE-EXPORTS: Rules & Services
// =============================================================================

pub use gate::{GateDecision, ReasonCode};
pub use metrics::{PortfolioMetrics, StatusCounts};
pub use readiness::{readiness, readiness_of};
pub use registry::{Registry, StorageBackend};
pub use storage::RedbStore;
pub use store::{MemoryStore, PrototypeStore};
pub use validation::{NewPrototype, NewTestCase, PrototypePatch, Validator};
