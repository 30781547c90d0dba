//! # Rule Constants
//!
//! Fixed thresholds and limits compiled into the binary.
//!
//! These are not configurable at runtime: changing any of them changes the
//! meaning of "ready", so they live in one place and are covered by tests.

/// Minimum readiness percentage the release gate accepts.
///
/// - Prototypes with `readiness < READINESS_THRESHOLD` cannot become READY.
/// - Compared against the rounded integer readiness, so 79.5% (rounded to 80)
///   passes.
pub const READINESS_THRESHOLD: u8 = 80;

/// Upper bound of the readiness scale.
pub const READINESS_MAX: u8 = 100;

/// Minimum length of a prototype name, in characters.
pub const MIN_NAME_LENGTH: usize = 3;

/// Minimum length of a prototype owner, in characters.
pub const MIN_OWNER_LENGTH: usize = 2;

/// Minimum length of a test case title, in characters.
pub const MIN_TITLE_LENGTH: usize = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for free-text fields (name, owner, title), in characters.
///
/// Longer input is rejected at validation time.
pub const MAX_TEXT_LENGTH: usize = 256;

/// Maximum length accepted for an identifier supplied by a caller.
pub const MAX_ID_LENGTH: usize = 128;

/// Wire format of target dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
