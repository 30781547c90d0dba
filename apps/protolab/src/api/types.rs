//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Keys are camelCase (`targetDate`, `prototypeId`); a test case's kind is
//! the key `type`. Enum values use their exact wire spelling.

use protolab_core::{
    FieldError, NewPrototype, NewTestCase, PortfolioMetrics, ProtolabError, Prototype,
    PrototypePatch, PrototypeView, TestCase, TestResult, ValidationErrors, Validator,
};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Portfolio status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub prototype_count: usize,
    pub test_case_count: usize,
    pub by_status: StatusCountsJson,
    /// Prototypes in TEST that would pass the release gate right now.
    pub releasable: usize,
}

/// Prototype count per lifecycle status, keyed by wire spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct StatusCountsJson {
    pub design: usize,
    pub build: usize,
    pub test: usize,
    pub ready: usize,
}

impl From<&PortfolioMetrics> for StatusResponse {
    fn from(metrics: &PortfolioMetrics) -> Self {
        Self {
            prototype_count: metrics.prototype_count,
            test_case_count: metrics.test_case_count,
            by_status: StatusCountsJson {
                design: metrics.by_status.design,
                build: metrics.by_status.build,
                test: metrics.by_status.test,
                ready: metrics.by_status.ready,
            },
            releasable: metrics.releasable,
        }
    }
}

// =============================================================================
// PROTOTYPE REQUESTS
// =============================================================================

/// Body of `POST /api/prototypes`. Missing fields are reported by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrototypeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
}

impl CreatePrototypeRequest {
    /// Validate every field at once.
    pub fn validate(&self) -> Result<NewPrototype, ProtolabError> {
        Validator::new_prototype(
            self.name.as_deref(),
            self.area.as_deref(),
            self.owner.as_deref(),
            self.target_date.as_deref(),
        )
    }
}

/// Body of `PATCH /api/prototypes/{id}`. Omitted fields stay unchanged.
///
/// An explicit `null` is kept apart from an omitted key (`Some(None)`) and
/// rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrototypeRequest {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub area: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Option<String>>,
}

impl UpdatePrototypeRequest {
    pub fn validate(&self) -> Result<PrototypePatch, ProtolabError> {
        let mut errors = ValidationErrors::new();
        let fields = [
            ("name", "Name", &self.name),
            ("area", "Area", &self.area),
            ("owner", "Owner", &self.owner),
            ("targetDate", "Target date", &self.target_date),
        ];
        for (field, label, value) in fields {
            if matches!(value, Some(None)) {
                errors.push(field, format!("{} must not be null", label));
            }
        }

        let patch = Validator::prototype_patch(
            supplied(&self.name),
            supplied(&self.area),
            supplied(&self.owner),
            supplied(&self.target_date),
        );
        if errors.is_empty() {
            return patch;
        }
        if let Err(ProtolabError::Validation(more)) = patch {
            errors.0.extend(more.0);
        }
        Err(ProtolabError::Validation(errors))
    }
}

/// A key that is present in the body, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn supplied(value: &Option<Option<String>>) -> Option<&str> {
    value.as_ref().and_then(Option::as_deref)
}

// =============================================================================
// TEST CASE REQUESTS
// =============================================================================

/// Body of `POST /api/test-cases`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestCaseRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub test_type: Option<String>,
}

impl CreateTestCaseRequest {
    pub fn validate(&self) -> Result<NewTestCase, ProtolabError> {
        Validator::new_test_case(
            self.prototype_id.as_deref(),
            self.title.as_deref(),
            self.test_type.as_deref(),
        )
    }
}

/// Body of `PATCH /api/test-cases/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTestResultRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl UpdateTestResultRequest {
    pub fn validate(&self) -> Result<TestResult, ProtolabError> {
        Validator::test_result(self.result.as_deref())
    }
}

// =============================================================================
// RECORD RESPONSES
// =============================================================================

/// A prototype record without its tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrototypeJson {
    pub id: String,
    pub name: String,
    pub area: String,
    pub owner: String,
    pub target_date: String,
    pub status: String,
}

impl From<&Prototype> for PrototypeJson {
    fn from(p: &Prototype) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            area: p.area.as_str().to_string(),
            owner: p.owner.clone(),
            target_date: p.target_date.clone(),
            status: p.status.as_str().to_string(),
        }
    }
}

/// A test case record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseJson {
    pub id: String,
    pub prototype_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub test_type: String,
    pub result: String,
}

impl From<&TestCase> for TestCaseJson {
    fn from(t: &TestCase) -> Self {
        Self {
            id: t.id.to_string(),
            prototype_id: t.prototype_id.to_string(),
            title: t.title.clone(),
            test_type: t.test_type.as_str().to_string(),
            result: t.result.as_str().to_string(),
        }
    }
}

/// A prototype with its test cases and derived readiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrototypeWithTestsJson {
    pub id: String,
    pub name: String,
    pub area: String,
    pub owner: String,
    pub target_date: String,
    pub status: String,
    pub tests: Vec<TestCaseJson>,
    pub readiness: u8,
}

impl From<&PrototypeView> for PrototypeWithTestsJson {
    fn from(view: &PrototypeView) -> Self {
        let p = PrototypeJson::from(&view.prototype);
        Self {
            id: p.id,
            name: p.name,
            area: p.area,
            owner: p.owner,
            target_date: p.target_date,
            status: p.status,
            tests: view.tests.iter().map(TestCaseJson::from).collect(),
            readiness: view.readiness,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    /// Gate reason codes, in evaluation order. Only on gate rejections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    /// Per-field problems. Only on validation errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reasons: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// The client-facing body for a core error.
    ///
    /// Storage failures are reduced to a generic message.
    pub fn from_error(err: &ProtolabError) -> Self {
        match err {
            ProtolabError::Validation(errors) => Self {
                message: errors.to_string(),
                reasons: Vec::new(),
                errors: errors.fields().to_vec(),
            },
            ProtolabError::GateRejected(decision) => Self {
                message: decision.message(),
                reasons: decision
                    .reasons
                    .iter()
                    .map(|r| r.as_str().to_string())
                    .collect(),
                errors: Vec::new(),
            },
            ProtolabError::PrototypeNotFound(_)
            | ProtolabError::TestCaseNotFound(_)
            | ProtolabError::InvalidTransition(_) => Self::new(err.to_string()),
            ProtolabError::IoError(_)
            | ProtolabError::SerializationError(_)
            | ProtolabError::DeserializationError(_) => Self::new("Internal server error"),
        }
    }
}
