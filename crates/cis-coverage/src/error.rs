//! Coverage error types.

use std::fmt;

use thiserror::Error;

/// Result type alias using CoverageError.
pub type CoverageResult<T> = Result<T, CoverageError>;

/// Errors raised while building, validating, querying or (de)serializing a coverage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoverageError {
    // === Axis Errors ===
    #[error("Invalid axis '{label}': {reason}")]
    InvalidAxis { label: String, reason: String },

    #[error("Axis '{label}' spans {count} cells, which is not an integer")]
    NonIntegerCellCount { label: String, count: f64 },

    #[error("Position {position} is outside axis '{label}' (0..={cells})")]
    OutOfDomain {
        label: String,
        position: f64,
        cells: usize,
    },

    // === Domain Errors ===
    #[error("Axis order mismatch in {context}: expected {expected:?}, found {actual:?}")]
    AxisOrderMismatch {
        context: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Grid limits for axis '{label}' span {actual} cells, axis defines {expected}")]
    InconsistentGridLimits {
        label: String,
        expected: i64,
        actual: i64,
    },

    #[error("Envelope disagrees with domain set on axis '{label}': {reason}")]
    EnvelopeMismatch { label: String, reason: String },

    // === Range Errors ===
    #[error("Duplicate field name: {0}")]
    DuplicateFieldName(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Range set holds {actual} values, domain and range type require {expected}")]
    CardinalityMismatch { expected: usize, actual: usize },

    #[error("Index {index} out of range for dimension '{dimension}' of size {size}")]
    IndexOutOfRange {
        dimension: String,
        index: usize,
        size: usize,
    },

    #[error("Inline values present but no payload layout is declared")]
    UndeclaredLayout,

    #[error("Range values unavailable: {0}")]
    PayloadUnavailable(String),

    #[error("Failed to load range set from '{href}': {reason}")]
    Loader { href: String, reason: String },

    // === Codec Errors ===
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to encode coverage: {0}")]
    Encode(String),

    #[error(transparent)]
    Invalid(#[from] Violations),
}

impl CoverageError {
    pub(crate) fn invalid_axis(label: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAxis {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CoverageError {
    fn from(err: serde_json::Error) -> Self {
        CoverageError::Encode(format!("JSON error: {}", err))
    }
}

/// A structural problem found while decoding one section of a document.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Failed to decode '{section}': {reason}")]
pub struct DecodeError {
    /// Dotted path of the section, e.g. `domainSet.generalGrid`.
    pub section: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(section: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            reason: reason.into(),
        }
    }
}

/// Every violation found by [`crate::Coverage::assemble`], in check order.
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(pub Vec<CoverageError>);

impl Violations {
    pub fn iter(&self) -> std::slice::Iter<'_, CoverageError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<CoverageError> {
        self.0
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} coverage violation(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  - {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}
