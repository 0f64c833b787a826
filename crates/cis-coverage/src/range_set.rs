//! Range set: the sampled values of a coverage.
//!
//! Values are either embedded in the document, left as a placeholder by the
//! producer, or stored externally and fetched through a [`RangeLoader`].

use serde_json::Value;

use crate::domain_set::DomainSet;
use crate::error::{CoverageError, CoverageResult};
use crate::layout::{payload_len, PayloadGrid, PayloadLayout};
use crate::range_type::RangeType;

/// Media type of a JSON array payload.
pub const MEDIA_TYPE_JSON: &str = "application/json";
/// Media type of a raw little-endian float64 payload.
pub const MEDIA_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Pointer to externally stored range values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeReference {
    pub href: String,
    pub media_type: Option<String>,
}

impl RangeReference {
    pub fn new(href: impl Into<String>, media_type: Option<String>) -> Self {
        Self {
            href: href.into(),
            media_type,
        }
    }
}

/// Byte-fetch capability used to resolve a [`RangeReference`].
///
/// Where the bytes come from (file, object store, HTTP) and whether the
/// fetch blocks is up to the implementor.
pub trait RangeLoader {
    fn load(
        &self,
        reference: &RangeReference,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> RangeLoader for F
where
    F: Fn(&RangeReference) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>,
{
    fn load(
        &self,
        reference: &RangeReference,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        self(reference)
    }
}

/// Inline values bound to the grid they were flattened from.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineRange {
    values: Vec<Option<f64>>,
    grid: PayloadGrid,
}

impl InlineRange {
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn grid(&self) -> &PayloadGrid {
        &self.grid
    }

    pub fn value_at(&self, field: &str, index: &[usize]) -> CoverageResult<Option<f64>> {
        let offset = self.grid.offset(field, index)?;
        Ok(self.values[offset])
    }
}

/// The payload of a coverage.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSet {
    /// Values embedded in the document.
    Inline(InlineRange),
    /// Non-numeric stand-in entries emitted by producers that omit the data.
    Placeholder(Vec<String>),
    /// Values stored elsewhere.
    Reference(RangeReference),
}

impl RangeSet {
    /// Bind flat values to a domain and range type.
    ///
    /// Fails with `CardinalityMismatch` unless there is exactly one value per
    /// cell and field.
    pub fn decode_inline(
        values: Vec<Option<f64>>,
        domain: &DomainSet,
        range_type: &RangeType,
        layout: PayloadLayout,
        epsilon: f64,
    ) -> CoverageResult<Self> {
        let grid = PayloadGrid::new(
            domain.axis_labels(),
            domain.shape(epsilon)?,
            range_type.field_names(),
            layout,
        );
        let expected = grid.expected_len();
        if values.len() != expected {
            return Err(CoverageError::CardinalityMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(RangeSet::Inline(InlineRange { values, grid }))
    }

    /// Check a payload length against a domain and range type without
    /// materializing the values.
    pub fn check_cardinality(
        len: usize,
        domain: &DomainSet,
        range_type: &RangeType,
        epsilon: f64,
    ) -> CoverageResult<usize> {
        let expected = payload_len(&domain.shape(epsilon)?, range_type.len());
        if len != expected {
            return Err(CoverageError::CardinalityMismatch {
                expected,
                actual: len,
            });
        }
        Ok(expected)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, RangeSet::Inline(_))
    }

    /// Value of `field` at grid position `index`.
    pub fn value_at(&self, field: &str, index: &[usize]) -> CoverageResult<Option<f64>> {
        match self {
            RangeSet::Inline(inline) => inline.value_at(field, index),
            RangeSet::Placeholder(_) => Err(CoverageError::PayloadUnavailable(
                "range set is a placeholder".to_string(),
            )),
            RangeSet::Reference(reference) => Err(CoverageError::PayloadUnavailable(format!(
                "range set references '{}' and has not been resolved",
                reference.href
            ))),
        }
    }

    /// Fetch a referenced payload and bind it inline.
    ///
    /// Inline and placeholder range sets are returned unchanged.
    pub fn resolve(
        &self,
        loader: &dyn RangeLoader,
        domain: &DomainSet,
        range_type: &RangeType,
        layout: PayloadLayout,
        epsilon: f64,
    ) -> CoverageResult<RangeSet> {
        let reference = match self {
            RangeSet::Reference(reference) => reference,
            other => return Ok(other.clone()),
        };

        let bytes = loader.load(reference).map_err(|e| CoverageError::Loader {
            href: reference.href.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(href = %reference.href, bytes = bytes.len(), "Loaded referenced range set");

        let values = parse_payload(reference, &bytes)?;
        Self::decode_inline(values, domain, range_type, layout, epsilon)
    }
}

fn parse_payload(reference: &RangeReference, bytes: &[u8]) -> CoverageResult<Vec<Option<f64>>> {
    let loader_error = |reason: String| CoverageError::Loader {
        href: reference.href.clone(),
        reason,
    };

    match reference.media_type.as_deref().unwrap_or(MEDIA_TYPE_JSON) {
        MEDIA_TYPE_JSON => {
            let raw: Vec<Value> = serde_json::from_slice(bytes)
                .map_err(|e| loader_error(format!("invalid JSON payload: {}", e)))?;
            raw.iter()
                .enumerate()
                .map(|(i, v)| match v {
                    Value::Null => Ok(None),
                    Value::Number(n) => Ok(n.as_f64()),
                    other => Err(loader_error(format!("entry {} is not numeric: {}", i, other))),
                })
                .collect()
        }
        MEDIA_TYPE_OCTET_STREAM => {
            if bytes.len() % 8 != 0 {
                return Err(loader_error(format!(
                    "{} bytes is not a whole number of float64 values",
                    bytes.len()
                )));
            }
            Ok(bytes
                .chunks_exact(8)
                .map(|chunk| {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(chunk);
                    let v = f64::from_le_bytes(buf);
                    if v.is_nan() {
                        None
                    } else {
                        Some(v)
                    }
                })
                .collect())
        }
        other => Err(loader_error(format!("unsupported media type '{}'", other))),
    }
}
