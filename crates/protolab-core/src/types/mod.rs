//! # Core Type Definitions
//!
//! This module contains the domain types shared by every layer:
//! - Identifiers (`PrototypeId`, `TestCaseId`)
//! - Closed enumerations (`Area`, `Status`, `TestType`, `TestResult`)
//! - Records (`Prototype`, `TestCase`) and the read model (`PrototypeView`)
//! - Validation payloads (`FieldError`, `ValidationErrors`)
//! - Error types (`ProtolabError`)
//!
//! Every enumeration has exactly one wire spelling, returned by `as_str()`
//! and accepted by `parse()`. Records derive serde so the redb store can
//! encode them with postcard.

use crate::gate::GateDecision;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ulid::Ulid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque identifier of a prototype.
///
/// Freshly minted ids are ULIDs, so lexical order follows creation order.
/// Ids coming from callers are taken verbatim and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrototypeId(pub String);

impl PrototypeId {
    /// Mint a new unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Wrap an existing id.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrototypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a test case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TestCaseId(pub String);

impl TestCaseId {
    /// Mint a new unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Wrap an existing id.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// AREA
// =============================================================================

/// Engineering domain a prototype belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Area {
    Space,
    Automotive,
    Industrial,
    Other,
}

impl Area {
    /// All areas in display order.
    pub const ALL: [Area; 4] = [Area::Space, Area::Automotive, Area::Industrial, Area::Other];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Space => "Space",
            Area::Automotive => "Automotive",
            Area::Industrial => "Industrial",
            Area::Other => "Other",
        }
    }

    /// Parse the exact wire spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Lifecycle stage of a prototype.
///
/// The declaration order is the lifecycle order, so `Ord` agrees with it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Status {
    #[default]
    Design,
    Build,
    Test,
    Ready,
}

impl Status {
    /// All statuses in lifecycle order.
    pub const ALL: [Status; 4] = [Status::Design, Status::Build, Status::Test, Status::Ready];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Design => "DESIGN",
            Status::Build => "BUILD",
            Status::Test => "TEST",
            Status::Ready => "READY",
        }
    }

    /// Parse the exact wire spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    /// The only transition out of this status, if any.
    ///
    /// This is the whole transition table: DESIGN→BUILD, BUILD→TEST,
    /// TEST→READY. READY has no successor.
    #[must_use]
    pub fn next(&self) -> Option<Status> {
        match self {
            Status::Design => Some(Status::Build),
            Status::Build => Some(Status::Test),
            Status::Test => Some(Status::Ready),
            Status::Ready => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TEST TYPE & RESULT
// =============================================================================

/// Kind of verification a test case performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TestType {
    Functional,
    Environmental,
    Integration,
}

impl TestType {
    pub const ALL: [TestType; 3] = [
        TestType::Functional,
        TestType::Environmental,
        TestType::Integration,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Functional => "FUNCTIONAL",
            TestType::Environmental => "ENVIRONMENTAL",
            TestType::Integration => "INTEGRATION",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the last run of a test case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum TestResult {
    #[default]
    NotRun,
    Pass,
    Fail,
}

impl TestResult {
    pub const ALL: [TestResult; 3] = [TestResult::NotRun, TestResult::Pass, TestResult::Fail];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TestResult::NotRun => "NOT_RUN",
            TestResult::Pass => "PASS",
            TestResult::Fail => "FAIL",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A hardware prototype as persisted.
///
/// Readiness is not stored: it is derived from the test cases on
/// every read (see [`PrototypeView`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prototype {
    pub id: PrototypeId,
    pub name: String,
    pub area: Area,
    pub owner: String,
    /// ISO 8601 calendar date, `YYYY-MM-DD`.
    pub target_date: String,
    pub status: Status,
}

/// A test case attached to a prototype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: TestCaseId,
    /// Back-reference to the owning prototype.
    pub prototype_id: PrototypeId,
    pub title: String,
    pub test_type: TestType,
    pub result: TestResult,
}

/// Read model: a prototype, its test cases and the readiness derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrototypeView {
    pub prototype: Prototype,
    pub tests: Vec<TestCase>,
    pub readiness: u8,
}

// =============================================================================
// VALIDATION PAYLOADS
// =============================================================================

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field-level problem found in one request, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), ProtolabError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ProtolabError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Protolab system.
///
/// The first five variants are request-level outcomes the caller can act on.
/// The remaining ones are storage failures with no automatic recovery.
#[derive(Debug, Error)]
pub enum ProtolabError {
    /// One or more input fields are malformed or out of range.
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Prototype not found")]
    PrototypeNotFound(PrototypeId),

    #[error("Test case not found")]
    TestCaseNotFound(TestCaseId),

    /// The prototype is already in a terminal status.
    #[error("Prototype is already {0}")]
    InvalidTransition(Status),

    /// TEST→READY was blocked by the release gate.
    #[error("{}", .0.message())]
    GateRejected(GateDecision),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl ProtolabError {
    /// Shorthand for a validation error on a single field.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(field, message);
        Self::Validation(errors)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PrototypeNotFound(_) | Self::TestCaseNotFound(_))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::ReasonCode;

    #[test]
    fn transition_table_is_linear() {
        assert_eq!(Status::Design.next(), Some(Status::Build));
        assert_eq!(Status::Build.next(), Some(Status::Test));
        assert_eq!(Status::Test.next(), Some(Status::Ready));
        assert_eq!(Status::Ready.next(), None);
    }

    #[test]
    fn status_order_follows_lifecycle() {
        let mut shuffled = vec![Status::Ready, Status::Design, Status::Test, Status::Build];
        shuffled.sort();
        assert_eq!(shuffled, Status::ALL.to_vec());
    }

    #[test]
    fn wire_spellings_roundtrip() {
        for area in Area::ALL {
            assert_eq!(Area::parse(area.as_str()), Some(area));
        }
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        for ty in TestType::ALL {
            assert_eq!(TestType::parse(ty.as_str()), Some(ty));
        }
        for result in TestResult::ALL {
            assert_eq!(TestResult::parse(result.as_str()), Some(result));
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(Area::parse("space"), None);
        assert_eq!(Status::parse("design"), None);
        assert_eq!(TestResult::parse("Pass"), None);
        assert_eq!(TestType::parse(""), None);
    }

    #[test]
    fn defaults_match_creation_state() {
        assert_eq!(Status::default(), Status::Design);
        assert_eq!(TestResult::default(), TestResult::NotRun);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = PrototypeId::generate();
        let b = PrototypeId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }

    #[test]
    fn validation_errors_join_messages() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "Name must be at least 3 characters");
        errors.push("owner", "Owner must be at least 2 characters");

        let err = ProtolabError::Validation(errors);
        assert_eq!(
            err.to_string(),
            "Name must be at least 3 characters, Owner must be at least 2 characters"
        );
    }

    #[test]
    fn empty_validation_errors_are_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn error_messages_match_wire_contract() {
        assert_eq!(
            ProtolabError::PrototypeNotFound(PrototypeId::new("x")).to_string(),
            "Prototype not found"
        );
        assert_eq!(
            ProtolabError::TestCaseNotFound(TestCaseId::new("x")).to_string(),
            "Test case not found"
        );
        assert_eq!(
            ProtolabError::InvalidTransition(Status::Ready).to_string(),
            "Prototype is already READY"
        );

        let decision = GateDecision {
            allowed: false,
            reasons: vec![ReasonCode::HasFail],
        };
        assert_eq!(
            ProtolabError::GateRejected(decision).to_string(),
            "There are failing tests"
        );
    }
}
