//! CIS-JSON encoding of regular-grid coverages.
//!
//! The wire shape is
//!
//! ```text
//! { id, type: "CoverageByDomainAndRange",
//!   envelope:  { type: "EnvelopeByAxis", srsName, axisLabels, axis: [RegularAxis] },
//!   domainSet: { type: "DomainSet", generalGrid: {
//!                  type: "GeneralGridCoverage", srsName, axisLabels, axis: [RegularAxis],
//!                  gridLimits: { type: "GridLimits", srsName, axisLabels, axis: [IndexAxis] } } },
//!   rangeSet:  { type: "RangeSet", dataBlock: { type: "VDataBlock", values } },
//!   rangeType: { type: "DataRecord", field: [{ type: "Quantity", name, description,
//!                                             encodingInfo: { dataType } }] },
//!   metadata:  { key: value } }
//! ```
//!
//! Each section is decoded on its own so errors name the section at fault.
//! Unknown keys are ignored; unknown `type` tags are rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::axis::{AxisValue, RegularAxis};
use crate::config::CoverageConfig;
use crate::coverage::{Coverage, CoverageParts, RangePayload};
use crate::domain_set::DomainSet;
use crate::envelope::Envelope;
use crate::error::{CoverageResult, DecodeError};
use crate::grid_limits::{GridLimits, IndexAxis};
use crate::range_set::{RangeReference, RangeSet};
use crate::range_type::{DataType, FieldDescriptor, RangeType};
use crate::time::{format_instant, parse_instant};

/// Closed set of `type` discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    CoverageByDomainAndRange,
    EnvelopeByAxis,
    DomainSet,
    GeneralGridCoverage,
    RegularAxis,
    GridLimits,
    IndexAxis,
    RangeSet,
    VDataBlock,
    DataRecord,
    Quantity,
}

/// A `type` value as found on the wire. Unknown names are kept so that
/// the error can point at the object that carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum WireTag {
    Known(TypeTag),
    Unknown(String),
}

impl From<TypeTag> for WireTag {
    fn from(tag: TypeTag) -> Self {
        WireTag::Known(tag)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoverageDoc {
    id: String,
    #[serde(rename = "type")]
    type_: WireTag,
    envelope: Value,
    domain_set: Value,
    range_set: Value,
    range_type: Value,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoverageDoc {
    id: String,
    #[serde(rename = "type")]
    type_: WireTag,
    envelope: EnvelopeDoc,
    domain_set: DomainSetDoc,
    range_set: RangeSetDoc,
    range_type: RangeTypeDoc,
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    srs_name: String,
    axis_labels: Vec<String>,
    axis: Vec<AxisDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AxisDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    axis_label: String,
    lower_bound: BoundDoc,
    upper_bound: BoundDoc,
    resolution: f64,
    uom_label: String,
}

/// A bound is a JSON number or an ISO-8601 string.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum BoundDoc {
    Number(f64),
    Text(String),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainSetDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    general_grid: GeneralGridDoc,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneralGridDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    srs_name: String,
    axis_labels: Vec<String>,
    axis: Vec<AxisDoc>,
    grid_limits: GridLimitsDoc,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridLimitsDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    srs_name: String,
    axis_labels: Vec<String>,
    axis: Vec<IndexAxisDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexAxisDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    axis_label: String,
    lower_bound: i64,
    upper_bound: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeSetDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_block: Option<DataBlockDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_reference: Option<FileReferenceDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DataBlockDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    values: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileReferenceDoc {
    href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RangeTypeDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    field: Vec<QuantityDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuantityDoc {
    #[serde(rename = "type")]
    type_: WireTag,
    name: String,
    description: String,
    encoding_info: EncodingInfoDoc,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodingInfoDoc {
    data_type: String,
}

// ============================================================================
// Codec
// ============================================================================

/// Reads and writes coverages in the CIS-JSON shape.
#[derive(Debug, Clone, Default)]
pub struct CisJsonCodec {
    config: CoverageConfig,
}

impl CisJsonCodec {
    pub fn new(config: CoverageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Decode and assemble a coverage.
    ///
    /// Structural problems surface as `CoverageError::Decode`, consistency
    /// problems as `CoverageError::Invalid` listing every violation.
    pub fn decode(&self, bytes: &[u8]) -> CoverageResult<Coverage> {
        let parts = self.decode_parts(bytes)?;
        Ok(Coverage::assemble_with(parts, &self.config)?)
    }

    /// Decode and assemble a coverage from an already parsed JSON value.
    pub fn decode_value(&self, doc: Value) -> CoverageResult<Coverage> {
        let parts = self.decode_parts_value(doc)?;
        Ok(Coverage::assemble_with(parts, &self.config)?)
    }

    /// Decode the sections of a document without cross-checking them.
    pub fn decode_parts(&self, bytes: &[u8]) -> Result<CoverageParts, DecodeError> {
        let doc: Value = serde_json::from_slice(bytes)
            .map_err(|e| DecodeError::new("document", e.to_string()))?;
        self.decode_parts_value(doc)
    }

    pub fn decode_parts_value(&self, doc: Value) -> Result<CoverageParts, DecodeError> {
        let raw: RawCoverageDoc = section("coverage", doc)?;
        expect_tag("coverage", raw.type_, TypeTag::CoverageByDomainAndRange)?;

        let envelope = decode_envelope(section("envelope", raw.envelope)?)?;
        let domain_set = decode_domain_set(section("domainSet", raw.domain_set)?)?;
        let range_type = decode_range_type(section("rangeType", raw.range_type)?)?;
        let range_set = decode_range_set(section("rangeSet", raw.range_set)?)?;
        let metadata = decode_metadata(raw.metadata)?;

        debug!(
            id = %raw.id,
            axes = domain_set.axes().len(),
            fields = range_type.len(),
            "Decoded coverage document"
        );

        Ok(CoverageParts {
            id: raw.id,
            envelope,
            domain_set,
            range_type,
            range_set,
            metadata,
        })
    }

    /// Encode a coverage as compact JSON bytes.
    pub fn encode(&self, coverage: &Coverage) -> CoverageResult<Vec<u8>> {
        Ok(serde_json::to_vec(&to_doc(coverage))?)
    }

    /// Encode a coverage as pretty-printed JSON.
    pub fn encode_pretty(&self, coverage: &Coverage) -> CoverageResult<String> {
        Ok(serde_json::to_string_pretty(&to_doc(coverage))?)
    }

    /// Encode a coverage as a JSON value.
    pub fn encode_value(&self, coverage: &Coverage) -> CoverageResult<Value> {
        Ok(serde_json::to_value(to_doc(coverage))?)
    }
}

fn section<T: serde::de::DeserializeOwned>(name: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|e| DecodeError::new(name, e.to_string()))
}

fn expect_tag(section: &str, found: WireTag, expected: TypeTag) -> Result<(), DecodeError> {
    match found {
        WireTag::Known(tag) if tag == expected => Ok(()),
        WireTag::Known(tag) => Err(DecodeError::new(
            section,
            format!("expected type {:?}, found {:?}", expected, tag),
        )),
        WireTag::Unknown(name) => Err(DecodeError::new(
            section,
            format!("unknown type '{}', expected {:?}", name, expected),
        )),
    }
}

fn decode_axes(section_name: &str, docs: Vec<AxisDoc>) -> Result<Vec<RegularAxis>, DecodeError> {
    docs.into_iter()
        .enumerate()
        .map(|(i, doc)| {
            let path = format!("{}.axis[{}]", section_name, i);
            expect_tag(&path, doc.type_, TypeTag::RegularAxis)?;
            let lower = decode_bound(&path, "lowerBound", doc.lower_bound)?;
            let upper = decode_bound(&path, "upperBound", doc.upper_bound)?;
            RegularAxis::from_spec(doc.axis_label, lower, upper, doc.resolution, doc.uom_label)
                .map_err(|e| DecodeError::new(&path, e.to_string()))
        })
        .collect()
}

fn decode_bound(path: &str, key: &str, bound: BoundDoc) -> Result<AxisValue, DecodeError> {
    match bound {
        BoundDoc::Number(v) => Ok(AxisValue::Number(v)),
        BoundDoc::Text(s) => parse_instant(&s)
            .map(AxisValue::Instant)
            .map_err(|e| DecodeError::new(path, format!("{}: {}", key, e))),
    }
}

fn decode_envelope(doc: EnvelopeDoc) -> Result<Envelope, DecodeError> {
    expect_tag("envelope", doc.type_, TypeTag::EnvelopeByAxis)?;
    let axes = decode_axes("envelope", doc.axis)?;
    Ok(Envelope::new(doc.srs_name, doc.axis_labels, axes))
}

fn decode_domain_set(doc: DomainSetDoc) -> Result<DomainSet, DecodeError> {
    expect_tag("domainSet", doc.type_, TypeTag::DomainSet)?;

    let grid = doc.general_grid;
    expect_tag("domainSet.generalGrid", grid.type_, TypeTag::GeneralGridCoverage)?;
    let axes = decode_axes("domainSet.generalGrid", grid.axis)?;

    let limits_path = "domainSet.generalGrid.gridLimits";
    let limits = grid.grid_limits;
    expect_tag(limits_path, limits.type_, TypeTag::GridLimits)?;
    let index_axes = limits
        .axis
        .into_iter()
        .enumerate()
        .map(|(i, doc)| {
            expect_tag(&format!("{}.axis[{}]", limits_path, i), doc.type_, TypeTag::IndexAxis)?;
            Ok(IndexAxis::new(doc.axis_label, doc.lower_bound, doc.upper_bound))
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;
    let grid_limits = GridLimits::new(limits.srs_name, index_axes);

    if limits.axis_labels != grid_limits.labels() {
        return Err(DecodeError::new(
            limits_path,
            format!(
                "axisLabels {:?} do not match axis order {:?}",
                limits.axis_labels,
                grid_limits.labels()
            ),
        ));
    }

    DomainSet::build(grid.srs_name, &grid.axis_labels, axes, grid_limits)
        .map_err(|e| DecodeError::new("domainSet.generalGrid", e.to_string()))
}

fn decode_range_type(doc: RangeTypeDoc) -> Result<RangeType, DecodeError> {
    expect_tag("rangeType", doc.type_, TypeTag::DataRecord)?;
    let fields = doc
        .field
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            let path = format!("rangeType.field[{}]", i);
            expect_tag(&path, q.type_, TypeTag::Quantity)?;
            let data_type = DataType::from_uri(&q.encoding_info.data_type).ok_or_else(|| {
                DecodeError::new(
                    &path,
                    format!("unknown dataType '{}'", q.encoding_info.data_type),
                )
            })?;
            Ok(FieldDescriptor::new(q.name, q.description, data_type))
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;
    RangeType::new(fields).map_err(|e| DecodeError::new("rangeType", e.to_string()))
}

fn decode_range_set(doc: RangeSetDoc) -> Result<RangePayload, DecodeError> {
    expect_tag("rangeSet", doc.type_, TypeTag::RangeSet)?;
    match (doc.data_block, doc.file_reference) {
        (Some(block), None) => {
            expect_tag("rangeSet.dataBlock", block.type_, TypeTag::VDataBlock)?;
            decode_values(block.values)
        }
        (None, Some(reference)) => Ok(RangePayload::Reference(RangeReference::new(
            reference.href,
            reference.media_type,
        ))),
        (Some(_), Some(_)) => Err(DecodeError::new(
            "rangeSet",
            "both dataBlock and fileReference present",
        )),
        (None, None) => Err(DecodeError::new(
            "rangeSet",
            "missing field `dataBlock` or `fileReference`",
        )),
    }
}

/// Numbers and nulls are data; an all-string or empty block is a placeholder.
fn decode_values(values: Vec<Value>) -> Result<RangePayload, DecodeError> {
    if values.is_empty() {
        return Ok(RangePayload::Placeholder(Vec::new()));
    }

    if values.iter().all(Value::is_string) {
        let entries = values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        return Ok(RangePayload::Placeholder(entries));
    }

    values
        .iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(DecodeError::new(
                "rangeSet.dataBlock",
                format!("values[{}] is not a number or null: {}", i, other),
            )),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(RangePayload::Values)
}

fn decode_metadata(metadata: Option<Value>) -> Result<BTreeMap<String, String>, DecodeError> {
    let map = match metadata {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(DecodeError::new(
                "metadata",
                format!("expected an object, found {}", other),
            ))
        }
    };

    Ok(map
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => (key, s),
            other => {
                warn!(key = %key, "Metadata value is not a string, keeping its JSON text");
                (key, other.to_string())
            }
        })
        .collect())
}

fn axis_doc(axis: &RegularAxis) -> AxisDoc {
    let bound = |value: AxisValue| match value {
        AxisValue::Number(v) => BoundDoc::Number(v),
        AxisValue::Instant(dt) => BoundDoc::Text(format_instant(&dt)),
    };
    AxisDoc {
        type_: TypeTag::RegularAxis.into(),
        axis_label: axis.label().to_string(),
        lower_bound: bound(axis.lower_bound()),
        upper_bound: bound(axis.upper_bound()),
        resolution: axis.resolution(),
        uom_label: axis.uom_label().to_string(),
    }
}

fn to_doc(coverage: &Coverage) -> CoverageDoc {
    let domain = coverage.domain_set();
    let envelope = coverage.envelope();
    let limits = domain.index_space();

    let range_set = match coverage.range_set() {
        RangeSet::Inline(inline) => RangeSetDoc {
            type_: TypeTag::RangeSet.into(),
            data_block: Some(DataBlockDoc {
                type_: TypeTag::VDataBlock.into(),
                values: inline
                    .values()
                    .iter()
                    .map(|v| v.map_or(Value::Null, Value::from))
                    .collect(),
            }),
            file_reference: None,
        },
        RangeSet::Placeholder(entries) => RangeSetDoc {
            type_: TypeTag::RangeSet.into(),
            data_block: Some(DataBlockDoc {
                type_: TypeTag::VDataBlock.into(),
                values: entries.iter().cloned().map(Value::String).collect(),
            }),
            file_reference: None,
        },
        RangeSet::Reference(reference) => RangeSetDoc {
            type_: TypeTag::RangeSet.into(),
            data_block: None,
            file_reference: Some(FileReferenceDoc {
                href: reference.href.clone(),
                media_type: reference.media_type.clone(),
            }),
        },
    };

    CoverageDoc {
        id: coverage.id().to_string(),
        type_: TypeTag::CoverageByDomainAndRange.into(),
        envelope: EnvelopeDoc {
            type_: TypeTag::EnvelopeByAxis.into(),
            srs_name: envelope.srs_name,
            axis_labels: envelope.axis_labels,
            axis: envelope.axes.iter().map(axis_doc).collect(),
        },
        domain_set: DomainSetDoc {
            type_: TypeTag::DomainSet.into(),
            general_grid: GeneralGridDoc {
                type_: TypeTag::GeneralGridCoverage.into(),
                srs_name: domain.srs_name().to_string(),
                axis_labels: domain.axis_labels(),
                axis: domain.axes().iter().map(axis_doc).collect(),
                grid_limits: GridLimitsDoc {
                    type_: TypeTag::GridLimits.into(),
                    srs_name: limits.srs_name.clone(),
                    axis_labels: limits.labels(),
                    axis: limits
                        .axes
                        .iter()
                        .map(|a| IndexAxisDoc {
                            type_: TypeTag::IndexAxis.into(),
                            axis_label: a.label.clone(),
                            lower_bound: a.lower_bound,
                            upper_bound: a.upper_bound,
                        })
                        .collect(),
                },
            },
        },
        range_set,
        range_type: RangeTypeDoc {
            type_: TypeTag::DataRecord.into(),
            field: coverage
                .range_type()
                .fields()
                .iter()
                .map(|f| QuantityDoc {
                    type_: TypeTag::Quantity.into(),
                    name: f.name.clone(),
                    description: f.description.clone(),
                    encoding_info: EncodingInfoDoc {
                        data_type: f.data_type.uri(),
                    },
                })
                .collect(),
        },
        metadata: coverage.metadata().clone(),
    }
}
