//! OGC Coverage Implementation Schema (CIS) regular-grid coverages
//!
//! This crate provides a typed model of a CIS 1.1 `CoverageByDomainAndRange`
//! whose domain is a regular, axis-aligned grid, together with a JSON codec.
//!
//! A coverage is made of
//! - an envelope (real-world extent per axis),
//! - a domain set (the grid axes plus their integer index limits),
//! - a range type (the named fields sampled at each cell),
//! - a range set (the values, inline, placeholder or referenced),
//! - free-form string metadata.
//!
//! # Example
//!
//! ```rust,no_run
//! use cis_coverage::{CisJsonCodec, CoverageConfig, PayloadLayout};
//!
//! let layout: PayloadLayout = "field-fastest,row-major".parse().unwrap();
//! let codec = CisJsonCodec::new(CoverageConfig::default().with_layout(layout));
//! let bytes = std::fs::read("coverage.json").unwrap();
//! let coverage = codec.decode(&bytes).unwrap();
//! println!("{} has shape {:?}", coverage.id(), coverage.shape());
//! ```

pub mod axis;
pub mod codec;
pub mod config;
pub mod coverage;
pub mod domain_set;
pub mod envelope;
pub mod error;
pub mod grid_limits;
pub mod layout;
pub mod range_set;
pub mod range_type;
pub mod time;

// Re-export commonly used types
pub use axis::{AxisKind, AxisValue, RegularAxis, DEFAULT_EPSILON};
pub use codec::{CisJsonCodec, TypeTag};
pub use config::CoverageConfig;
pub use coverage::{Coverage, CoverageParts, RangePayload};
pub use domain_set::DomainSet;
pub use envelope::Envelope;
pub use error::{CoverageError, CoverageResult, DecodeError, Violations};
pub use grid_limits::{index_srs_name, GridLimits, IndexAxis};
pub use layout::{payload_len, AxisOrder, FieldPlacement, PayloadGrid, PayloadLayout};
pub use range_set::{InlineRange, RangeLoader, RangeReference, RangeSet};
pub use range_type::{DataType, FieldDescriptor, RangeType};
pub use time::{format_instant, parse_instant, TimeUnit};

/// Media types of coverage documents and referenced payloads
pub mod media_types {
    /// CIS-JSON coverage document
    pub const CIS_JSON: &str = "application/json";
    /// JSON array of numbers and nulls
    pub const JSON: &str = crate::range_set::MEDIA_TYPE_JSON;
    /// Little-endian float64 values, NaN for missing
    pub const OCTET_STREAM: &str = crate::range_set::MEDIA_TYPE_OCTET_STREAM;
}
