//! # Validation Module
//!
//! Input validation for everything that creates or edits a record.
//!
//! - Validate raw caller input before any store is touched
//! - Report every offending field, not just the first
//! - Produce typed, already-valid values (`NewPrototype`, `PrototypePatch`,
//!   `NewTestCase`) so stores never see unchecked strings
//!
//! Fields arrive as `Option<&str>`: `None` means the caller omitted the field.

use crate::primitives::{
    DATE_FORMAT, MAX_ID_LENGTH, MAX_TEXT_LENGTH, MIN_NAME_LENGTH, MIN_OWNER_LENGTH,
    MIN_TITLE_LENGTH,
};
use crate::{
    Area, Prototype, PrototypeId, ProtolabError, Status, TestCase, TestCaseId, TestResult,
    TestType, ValidationErrors,
};
use chrono::NaiveDate;

// =============================================================================
// VALIDATED INPUT
// =============================================================================

/// Fields of a prototype about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrototype {
    pub name: String,
    pub area: Area,
    pub owner: String,
    pub target_date: String,
}

impl NewPrototype {
    /// Build the record with a fresh id and status DESIGN.
    #[must_use]
    pub fn into_prototype(self) -> Prototype {
        Prototype {
            id: PrototypeId::generate(),
            name: self.name,
            area: self.area,
            owner: self.owner,
            target_date: self.target_date,
            status: Status::Design,
        }
    }
}

/// Partial edit of a prototype. `None` leaves the field unchanged.
///
/// Status is not editable here; it only moves through the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrototypePatch {
    pub name: Option<String>,
    pub area: Option<Area>,
    pub owner: Option<String>,
    pub target_date: Option<String>,
}

impl PrototypePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.area.is_none()
            && self.owner.is_none()
            && self.target_date.is_none()
    }

    /// Apply the patch to a prototype in place.
    pub fn apply(&self, prototype: &mut Prototype) {
        if let Some(name) = &self.name {
            prototype.name.clone_from(name);
        }
        if let Some(area) = self.area {
            prototype.area = area;
        }
        if let Some(owner) = &self.owner {
            prototype.owner.clone_from(owner);
        }
        if let Some(target_date) = &self.target_date {
            prototype.target_date.clone_from(target_date);
        }
    }
}

/// Fields of a test case about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestCase {
    pub prototype_id: PrototypeId,
    pub title: String,
    pub test_type: TestType,
}

impl NewTestCase {
    /// Build the record with a fresh id and result NOT_RUN.
    #[must_use]
    pub fn into_test_case(self) -> TestCase {
        TestCase {
            id: TestCaseId::generate(),
            prototype_id: self.prototype_id,
            title: self.title,
            test_type: self.test_type,
            result: TestResult::NotRun,
        }
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// The Validator turns raw caller input into validated values.
pub struct Validator;

impl Validator {
    /// Validate a prototype creation request. All four fields are required.
    pub fn new_prototype(
        name: Option<&str>,
        area: Option<&str>,
        owner: Option<&str>,
        target_date: Option<&str>,
    ) -> Result<NewPrototype, ProtolabError> {
        let mut errors = ValidationErrors::new();

        let name = required(&mut errors, "name", "Name", name)
            .and_then(|v| record(&mut errors, "name", check_name(v)));
        let area = required(&mut errors, "area", "Area", area)
            .and_then(|v| record(&mut errors, "area", check_area(v)));
        let owner = required(&mut errors, "owner", "Owner", owner)
            .and_then(|v| record(&mut errors, "owner", check_owner(v)));
        let target_date = required(&mut errors, "targetDate", "Target date", target_date)
            .and_then(|v| record(&mut errors, "targetDate", check_date(v)));

        match (name, area, owner, target_date) {
            (Some(name), Some(area), Some(owner), Some(target_date)) if errors.is_empty() => {
                Ok(NewPrototype {
                    name,
                    area,
                    owner,
                    target_date,
                })
            }
            _ => Err(ProtolabError::Validation(errors)),
        }
    }

    /// Validate a partial prototype edit. Omitted fields are left alone;
    /// supplied fields follow the creation rules.
    pub fn prototype_patch(
        name: Option<&str>,
        area: Option<&str>,
        owner: Option<&str>,
        target_date: Option<&str>,
    ) -> Result<PrototypePatch, ProtolabError> {
        let mut errors = ValidationErrors::new();

        let patch = PrototypePatch {
            name: name.and_then(|v| record(&mut errors, "name", check_name(v))),
            area: area.and_then(|v| record(&mut errors, "area", check_area(v))),
            owner: owner.and_then(|v| record(&mut errors, "owner", check_owner(v))),
            target_date: target_date
                .and_then(|v| record(&mut errors, "targetDate", check_date(v))),
        };

        errors.into_result().map(|()| patch)
    }

    /// Validate a test case creation request.
    ///
    /// Only the shape is checked here; whether the prototype exists is
    /// decided by the store.
    pub fn new_test_case(
        prototype_id: Option<&str>,
        title: Option<&str>,
        test_type: Option<&str>,
    ) -> Result<NewTestCase, ProtolabError> {
        let mut errors = ValidationErrors::new();

        let prototype_id = required(&mut errors, "prototypeId", "Prototype id", prototype_id)
            .and_then(|v| record(&mut errors, "prototypeId", check_id(v)));
        let title = required(&mut errors, "title", "Title", title)
            .and_then(|v| record(&mut errors, "title", check_title(v)));
        let test_type = required(&mut errors, "type", "Type", test_type)
            .and_then(|v| record(&mut errors, "type", check_test_type(v)));

        match (prototype_id, title, test_type) {
            (Some(prototype_id), Some(title), Some(test_type)) if errors.is_empty() => {
                Ok(NewTestCase {
                    prototype_id: PrototypeId::new(prototype_id),
                    title,
                    test_type,
                })
            }
            _ => Err(ProtolabError::Validation(errors)),
        }
    }

    /// Validate a test result update.
    pub fn test_result(result: Option<&str>) -> Result<TestResult, ProtolabError> {
        let mut errors = ValidationErrors::new();
        let result = required(&mut errors, "result", "Result", result)
            .and_then(|v| record(&mut errors, "result", check_result(v)));

        match result {
            Some(result) if errors.is_empty() => Ok(result),
            _ => Err(ProtolabError::Validation(errors)),
        }
    }
}

// =============================================================================
// FIELD CHECKS
// =============================================================================

fn required<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    if value.is_none() {
        errors.push(field, format!("{} is required", label));
    }
    value
}

fn record<T>(errors: &mut ValidationErrors, field: &str, checked: Result<T, String>) -> Option<T> {
    match checked {
        Ok(v) => Some(v),
        Err(message) => {
            errors.push(field, message);
            None
        }
    }
}

fn check_text(value: &str, label: &str, min: usize) -> Result<String, String> {
    let len = value.chars().count();
    if len < min {
        return Err(if min == 1 {
            format!("{} is required", label)
        } else {
            format!("{} must be at least {} characters", label, min)
        });
    }
    if len > MAX_TEXT_LENGTH {
        return Err(format!(
            "{} must be at most {} characters",
            label, MAX_TEXT_LENGTH
        ));
    }
    Ok(value.to_string())
}

fn check_name(value: &str) -> Result<String, String> {
    check_text(value, "Name", MIN_NAME_LENGTH)
}

fn check_owner(value: &str) -> Result<String, String> {
    check_text(value, "Owner", MIN_OWNER_LENGTH)
}

fn check_title(value: &str) -> Result<String, String> {
    check_text(value, "Title", MIN_TITLE_LENGTH)
}

fn check_id(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("Prototype id is required".to_string());
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(format!(
            "Prototype id must be at most {} characters",
            MAX_ID_LENGTH
        ));
    }
    Ok(value.to_string())
}

fn check_area(value: &str) -> Result<Area, String> {
    Area::parse(value).ok_or_else(|| {
        format!(
            "Area must be one of {}",
            join_names(Area::ALL.iter().map(Area::as_str))
        )
    })
}

fn check_test_type(value: &str) -> Result<TestType, String> {
    TestType::parse(value).ok_or_else(|| {
        format!(
            "Type must be one of {}",
            join_names(TestType::ALL.iter().map(TestType::as_str))
        )
    })
}

fn check_result(value: &str) -> Result<TestResult, String> {
    TestResult::parse(value).ok_or_else(|| {
        format!(
            "Result must be one of {}",
            join_names(TestResult::ALL.iter().map(TestResult::as_str))
        )
    })
}

/// Accept exactly `YYYY-MM-DD` naming a real calendar day.
fn check_date(value: &str) -> Result<String, String> {
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err("Date must be YYYY-MM-DD format".to_string());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| "Date must be a valid calendar date".to_string())?;
    Ok(value.to_string())
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

// =============================================================================
// TESTS
// =============================================================================
